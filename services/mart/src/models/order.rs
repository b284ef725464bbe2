use chrono::{DateTime, Utc};
use gophermart_core::money::NullUnit;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Status of an order as tracked by Mart. `Processing` and `Invalid` are
/// not terminal in the same sense as Accrual's: `Processing` still awaits
/// a poll outcome, `Invalid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize)]
#[sqlx(type_name = "mart_order_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Processing,
    Processed,
    Invalid,
}

/// An order owned by a Mart user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub number: String,
    pub status: OrderStatus,
    pub accrual: NullUnit,
    pub uploaded_at: DateTime<Utc>,
}

/// `GET /api/user/orders` element.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub number: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "is_invalid_accrual", serialize_with = "serialize_accrual")]
    pub accrual: NullUnit,
    pub uploaded_at: DateTime<Utc>,
}

fn is_invalid_accrual(accrual: &NullUnit) -> bool {
    !accrual.valid
}

fn serialize_accrual<S>(accrual: &NullUnit, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    accrual.unit.serialize(serializer)
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            number: o.number,
            status: o.status,
            accrual: o.accrual,
            uploaded_at: o.uploaded_at,
        }
    }
}
