use gophermart_core::money::{NullUnit, Unit};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of an order as tracked by the Accrual engine.
///
/// `Processed` and `Invalid` are terminal; nothing transitions out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "accrual_order_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Registered,
    Invalid,
    Processing,
    Processed,
}

/// A line item within a submitted order.
#[derive(Debug, Clone, Deserialize)]
pub struct GoodsRequest {
    pub description: String,
    pub price: f64,
}

/// `POST /orders` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub order: String,
    pub goods: Vec<GoodsRequest>,
}

/// A goods line as persisted against an order, after its reward rule (if
/// any) has been resolved.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Goods {
    pub id: Uuid,
    pub order_id: Uuid,
    pub match_id: Uuid,
    pub price: Unit,
    pub accrual: Unit,
}

/// An order as persisted by the Accrual store.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub number: String,
    pub status: OrderStatus,
    pub accrual: Unit,
}

/// `GET /orders/{number}` response body.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub order: String,
    pub status: OrderStatus,
    pub accrual: NullUnit,
}
