use gophermart_core::money::Unit;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered Mart user, keyed by an opaque id.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
}

/// `users` + `balances` joined row: current and withdrawn, both non-negative.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct Balance {
    pub current: Unit,
    pub withdrawn: Unit,
}

/// `POST /api/user/register` and `POST /api/user/login` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub login: String,
    pub password: String,
}

/// `GET /api/user/balance` response body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BalanceResponse {
    pub current: Unit,
    pub withdrawn: Unit,
}

impl From<Balance> for BalanceResponse {
    fn from(b: Balance) -> Self {
        BalanceResponse { current: b.current, withdrawn: b.withdrawn }
    }
}
