use chrono::{DateTime, Utc};
use gophermart_core::money::Unit;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A withdrawal, debited against a user's current balance and credited to
/// `withdrawn`, logged against the order it paid for.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Operation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub sum: Unit,
    pub processed_at: DateTime<Utc>,
}

/// `POST /api/user/balance/withdraw` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: Unit,
}

/// `GET /api/user/withdrawals` element.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResponse {
    pub order: String,
    pub sum: Unit,
    pub processed_at: DateTime<Utc>,
}

impl From<Operation> for OperationResponse {
    fn from(op: Operation) -> Self {
        OperationResponse { order: op.order_number, sum: op.sum, processed_at: op.processed_at }
    }
}
