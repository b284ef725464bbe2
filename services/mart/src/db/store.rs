use chrono::Utc;
use gophermart_core::error::{classify, StoreError};
use gophermart_core::money::Unit;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Balance, Operation, Order, OrderStatus, User};

/// Mart's relational store: users, balances, orders, and withdrawal
/// operations. Every operation that touches more than one row goes through
/// a single transaction, as spec'd per method below.
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the user and its zero-balance row in one transaction.
    /// A duplicate login surfaces as [`StoreError::Duplicate`].
    pub async fn create_user(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<Uuid, StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        let user_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (login, password_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(login)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        sqlx::query(
            r#"
            INSERT INTO balances (user_id, current, withdrawn)
            VALUES ($1, 0, 0)
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await.map_err(classify)?;
        Ok(user_id)
    }

    pub async fn get_user_by_login(&self, login: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash
            FROM users
            WHERE login = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound)
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound)
    }

    /// SELECT the current owner of `number`, then decide: own order is a
    /// no-op `Duplicate`, someone else's is `DuplicateOtherUser`, absent is
    /// a fresh insert at `NEW`. This is the only correct way to
    /// distinguish the two — a unique-constraint catch can't tell them
    /// apart.
    pub async fn create_order(&self, user_id: Uuid, number: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        let owner: Option<Uuid> = sqlx::query_scalar(
            r#"SELECT user_id FROM orders WHERE number = $1"#,
        )
        .bind(number)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify)?;

        match owner {
            Some(owner_id) if owner_id == user_id => Err(StoreError::Duplicate),
            Some(_) => Err(StoreError::DuplicateOtherUser),
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO orders (user_id, number, status, accrual, uploaded_at)
                    VALUES ($1, $2, $3, NULL, $4)
                    "#,
                )
                .bind(user_id)
                .bind(number)
                .bind(OrderStatus::New)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await
                .map_err(classify)?;

                tx.commit().await.map_err(classify)?;
                Ok(())
            }
        }
    }

    pub async fn get_orders_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<Order> = sqlx::query_as(
            r#"
            SELECT id, user_id, number, status, accrual, uploaded_at
            FROM orders
            WHERE user_id = $1
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows)
    }

    pub async fn get_order_by_number(&self, number: &str) -> Result<Order, StoreError> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, number, status, accrual, uploaded_at
            FROM orders
            WHERE number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound)
    }

    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE orders SET status = $2 WHERE id = $1"#,
        )
        .bind(order_id)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(classify)?;
        Ok(())
    }

    /// Terminal transition: credits the user's balance and marks the order
    /// `PROCESSED` with its final accrual, in one transaction, so a retried
    /// observation of `PROCESSED` never double-credits.
    pub async fn process_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        accrual: Unit,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        sqlx::query(
            r#"UPDATE balances SET current = current + $2 WHERE user_id = $1"#,
        )
        .bind(user_id)
        .bind(accrual)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        sqlx::query(
            r#"UPDATE orders SET status = $2, accrual = $3 WHERE id = $1"#,
        )
        .bind(order_id)
        .bind(OrderStatus::Processed)
        .bind(accrual)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await.map_err(classify)?;
        Ok(())
    }

    pub async fn get_balance(&self, user_id: Uuid) -> Result<Balance, StoreError> {
        sqlx::query_as::<_, Balance>(
            r#"SELECT current, withdrawn FROM balances WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound)
    }

    /// SELECTs the current balance, rejects an overdraw with
    /// `BalanceBelowZero`, then inserts the operation and updates the
    /// balance, all inside one transaction.
    pub async fn perform_operation(
        &self,
        user_id: Uuid,
        order_number: &str,
        sum: Unit,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        let current: Unit = sqlx::query_scalar(
            r#"SELECT current FROM balances WHERE user_id = $1 FOR UPDATE"#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound)?;

        if current.checked_sub(sum).map(|v| v.is_negative()).unwrap_or(true) {
            return Err(StoreError::BalanceBelowZero);
        }

        sqlx::query(
            r#"
            INSERT INTO operations (user_id, order_number, sum, processed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(order_number)
        .bind(sum)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        sqlx::query(
            r#"UPDATE balances SET current = current - $2, withdrawn = withdrawn + $2 WHERE user_id = $1"#,
        )
        .bind(user_id)
        .bind(sum)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await.map_err(classify)?;
        Ok(())
    }

    pub async fn get_operations_by_user(&self, user_id: Uuid) -> Result<Vec<Operation>, StoreError> {
        let rows: Vec<Operation> = sqlx::query_as(
            r#"
            SELECT id, user_id, order_number, sum, processed_at
            FROM operations
            WHERE user_id = $1
            ORDER BY processed_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows)
    }

    /// Every order not yet at a terminal status, for a boot-time rescan
    /// that re-enqueues them into the Order Processor.
    pub async fn list_unsettled_orders(&self) -> Result<Vec<Order>, StoreError> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, number, status, accrual, uploaded_at
            FROM orders
            WHERE status IN ($1, $2)
            "#,
        )
        .bind(OrderStatus::New)
        .bind(OrderStatus::Processing)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }
}
