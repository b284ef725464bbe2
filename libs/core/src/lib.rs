pub mod accrual_client;
pub mod error;
pub mod luhn;
pub mod money;
pub mod queue;
pub mod sign;
