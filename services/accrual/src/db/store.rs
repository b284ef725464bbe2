use std::collections::HashMap;

use gophermart_core::error::{classify, StoreError};
use gophermart_core::money::Unit;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Goods, MatchRule, Order, OrderStatus, RewardKind};

/// Accrual's relational store: matches, orders, and their goods lines.
///
/// Every multi-row write goes through a single transaction so a caller never
/// observes an order with some but not all of its goods, or a goods row
/// updated without its order.
pub struct Store {
    pool: PgPool,
}

/// The order and its freshly-inserted goods lines, as created by
/// [`Store::create_order_with_goods`].
pub struct CreatedOrder {
    pub order_id: Uuid,
    pub goods: Vec<Goods>,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_match(
        &self,
        name: &str,
        kind: RewardKind,
        reward: i64,
    ) -> Result<Uuid, StoreError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO matches (name, kind, reward)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(kind)
        .bind(reward)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    pub async fn get_match_by_name(&self, name: &str) -> Result<MatchRule, StoreError> {
        sqlx::query_as::<_, MatchRule>(
            r#"
            SELECT id, name, kind, reward
            FROM matches
            WHERE name = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound)
    }

    /// Resolves every distinct goods description in one round trip. Goods
    /// without a matching rule are simply absent from the returned map; the
    /// engine decides what to do with the gap.
    pub async fn get_matches_by_names(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, MatchRule>, StoreError> {
        let rows: Vec<MatchRule> = sqlx::query_as(
            r#"
            SELECT id, name, kind, reward
            FROM matches
            WHERE name = ANY($1) AND deleted_at IS NULL
            "#,
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows.into_iter().map(|m| (m.name.clone(), m)).collect())
    }

    /// Inserts the order and all of its goods lines at status `REGISTERED`
    /// inside one transaction.
    pub async fn create_order_with_goods(
        &self,
        number: &str,
        goods: &[(Uuid, Unit)],
    ) -> Result<CreatedOrder, StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        let order_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO orders (number, status, accrual)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(number)
        .bind(OrderStatus::Registered)
        .bind(Unit::ZERO)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        let mut created = Vec::with_capacity(goods.len());
        for (match_id, price) in goods {
            let good_id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO goods (order_id, match_id, price, accrual)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(order_id)
            .bind(match_id)
            .bind(price)
            .bind(Unit::ZERO)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify)?;

            created.push(Goods {
                id: good_id,
                order_id,
                match_id: *match_id,
                price: *price,
                accrual: Unit::ZERO,
            });
        }

        tx.commit().await.map_err(classify)?;

        Ok(CreatedOrder { order_id, goods: created })
    }

    /// Creates an order at status `INVALID` with no goods rows, for orders
    /// whose line items matched no reward rule at all.
    pub async fn create_invalid_order(&self, number: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (number, status, accrual)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(number)
        .bind(OrderStatus::Invalid)
        .bind(Unit::ZERO)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        Ok(())
    }

    pub async fn update_order(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        accrual: Unit,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, accrual = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(accrual)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        Ok(())
    }

    /// Persists the per-good accrual for every line of an order, in one
    /// transaction.
    pub async fn batch_update_goods(
        &self,
        goods: &[(Uuid, Unit)],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        for (good_id, accrual) in goods {
            sqlx::query(
                r#"
                UPDATE goods
                SET accrual = $2, updated_at = now()
                WHERE id = $1
                "#,
            )
            .bind(good_id)
            .bind(accrual)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        }

        tx.commit().await.map_err(classify)?;
        Ok(())
    }

    pub async fn get_order_by_number(&self, number: &str) -> Result<Order, StoreError> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, number, status, accrual
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

    /// Every order left at `PROCESSING` by an engine that crashed mid-compute,
    /// for a boot-time rescan.
    pub async fn list_stuck_orders(&self) -> Result<Vec<Order>, StoreError> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, number, status, accrual
            FROM orders
            WHERE status = $1
            "#,
        )
        .bind(OrderStatus::Processing)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }
}
