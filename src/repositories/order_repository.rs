use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::order::{KitchenTransition, Order, OrderFilters, OrderStatus};
use crate::models::table::{Seating, Table};
use crate::repositories::table_repository::{recompute_total, upsert_occupied};
use crate::repositories::OrderRepository;
use crate::utils::errors::AppResult;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_with_table(&self, mut order: Order) -> AppResult<(Order, Table)> {
        let mut tx = self.pool.begin().await?;

        let (table, _) = upsert_occupied(&mut tx, &Seating::from_order(&order)).await?;
        order.table_id = table.id;

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (id, table_id, table_number, customer_name, number_of_people,
                                waiter_id, waiter_name, items, observations, total,
                                status, payment_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.table_id)
        .bind(order.table_number)
        .bind(&order.customer_name)
        .bind(order.number_of_people)
        .bind(order.waiter_id)
        .bind(&order.waiter_name)
        .bind(Json(&order.items))
        .bind(&order.observations)
        .bind(order.total)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        let table = recompute_total(&mut tx, table.id).await?;
        tx.commit().await?;

        Ok((order, table))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn list(&self, filters: &OrderFilters) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::uuid IS NULL OR waiter_id = $1)
              AND ($2::int IS NULL OR table_number = $2)
              AND ($3::order_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filters.waiter_id)
        .bind(filters.table_number)
        .bind(filters.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    async fn billable_for_table(&self, table_id: Uuid) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE table_id = $1
              AND status <> 'cancelled'
              AND payment_status IN ('active', 'pending_payment')
            ORDER BY created_at DESC
            "#,
        )
        .bind(table_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    async fn update_contents(&self, order: &Order) -> AppResult<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET items = $2, observations = $3, total = $4, updated_at = $5
            WHERE id = $1 AND status = 'new' AND payment_status IN ('active', 'pending_payment')
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(Json(&order.items))
        .bind(&order.observations)
        .bind(order.total)
        .bind(order.updated_at)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(updated) = &updated {
            recompute_total(&mut tx, updated.table_id).await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_new(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let table_id: Option<Uuid> =
            sqlx::query_scalar(
                r#"
                DELETE FROM orders
                WHERE id = $1 AND status = 'new' AND payment_status IN ('active', 'pending_payment')
                RETURNING table_id
                "#,
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(table_id) = table_id {
            recompute_total(&mut tx, table_id).await?;
        }

        tx.commit().await?;
        Ok(table_id.is_some())
    }

    async fn apply_transition(&self, id: Uuid, transition: &KitchenTransition) -> AppResult<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        let updated = match transition {
            KitchenTransition::Start { by, at } => {
                sqlx::query_as::<_, Order>(
                    r#"
                    UPDATE orders
                    SET status = 'in_progress', in_progress_at = $2, processed_by = $3, updated_at = $2
                    WHERE id = $1 AND status = 'new'
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(at)
                .bind(by)
                .fetch_optional(&mut *tx)
                .await?
            }
            KitchenTransition::Ready { by, at } => {
                sqlx::query_as::<_, Order>(
                    r#"
                    UPDATE orders
                    SET status = 'ready', ready_at = $2, completed_by = $3, updated_at = $2,
                        preparation_time_minutes =
                            GREATEST(0, FLOOR(EXTRACT(EPOCH FROM ($2 - created_at)) / 60))::int
                    WHERE id = $1 AND status = 'in_progress'
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(at)
                .bind(by)
                .fetch_optional(&mut *tx)
                .await?
            }
            KitchenTransition::Cancel {
                by,
                at,
                missing_ingredient,
                reason,
            } => {
                let cancelled = sqlx::query_as::<_, Order>(
                    r#"
                    UPDATE orders
                    SET status = 'cancelled', cancelled_at = $2, cancelled_by = $3,
                        missing_ingredient = $4, cancellation_reason = $5, updated_at = $2
                    WHERE id = $1 AND status = 'new'
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(at)
                .bind(by)
                .bind(missing_ingredient)
                .bind(reason)
                .fetch_optional(&mut *tx)
                .await?;

                if let Some(order) = &cancelled {
                    recompute_total(&mut tx, order.table_id).await?;
                }
                cancelled
            }
        };

        tx.commit().await?;
        Ok(updated)
    }

    async fn list_kitchen(&self, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE status IN ('new', 'in_progress', 'ready')
              AND ($1::order_status IS NULL OR status = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}
