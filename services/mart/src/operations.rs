//! Withdrawals against a user's balance.

use std::sync::Arc;

use gophermart_core::error::StoreError;
use gophermart_core::luhn;
use gophermart_core::money::Unit;
use uuid::Uuid;

use crate::db::Store;
use crate::models::Operation;

#[derive(Debug, thiserror::Error)]
pub enum OperationsError {
    #[error("order number fails the Luhn check")]
    InvalidNumber,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Operations {
    store: Arc<Store>,
}

impl Operations {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Validates the order number, then delegates to the store's
    /// transactional withdrawal, which surfaces `BalanceBelowZero`
    /// distinctly.
    pub async fn perform(
        &self,
        user_id: Uuid,
        order_number: &str,
        sum: Unit,
    ) -> Result<(), OperationsError> {
        if !luhn::check(order_number) {
            return Err(OperationsError::InvalidNumber);
        }
        self.store.perform_operation(user_id, order_number, sum).await?;
        Ok(())
    }

    pub async fn get_operations(&self, user_id: Uuid) -> Result<Vec<Operation>, OperationsError> {
        Ok(self.store.get_operations_by_user(user_id).await?)
    }
}
