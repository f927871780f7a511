use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::account::{Account, AccountModification, PaymentMethod};
use crate::models::table::{Seating, Table};
use crate::repositories::account_repository::insert_open_account;
use crate::repositories::TableRepository;
use crate::services::billing_service::compose_bill;
use crate::utils::errors::{AppError, AppResult};

pub const RELEASED_WITHOUT_CONSUMPTION: &str = "Mesa liberada sin consumo";
pub const PENDING_ADJUSTMENTS: &str = "La mesa tiene consumos pendientes de cobro";

/// Sin pedidos por cobrar, la cuenta solo lleva lo que dejen sus ajustes
pub(crate) fn adjustments_leave_consumption(modifications: &[AccountModification]) -> bool {
    !compose_bill(&[], modifications).lines.is_empty()
}

pub struct PgTableRepository {
    pool: PgPool,
}

impl PgTableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Upsert sobre el índice único parcial `(table_number) WHERE status = 'occupied'`.
/// Si la fila es nueva se abre su cuenta en la misma transacción.
pub(crate) async fn upsert_occupied(conn: &mut PgConnection, seating: &Seating) -> AppResult<(Table, bool)> {
    let now = Utc::now();
    let row = sqlx::query(
        r#"
        INSERT INTO dining_tables (id, table_number, customer_name, number_of_people,
                                   waiter_id, waiter_name, total, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 0, 'occupied', $7, $7)
        ON CONFLICT (table_number) WHERE status = 'occupied'
        DO UPDATE SET
            customer_name = CASE WHEN btrim(EXCLUDED.customer_name) = ''
                                 THEN dining_tables.customer_name
                                 ELSE EXCLUDED.customer_name END,
            number_of_people = CASE WHEN EXCLUDED.number_of_people > 0
                                    THEN EXCLUDED.number_of_people
                                    ELSE dining_tables.number_of_people END,
            updated_at = EXCLUDED.updated_at
        RETURNING *, (xmax = 0) AS inserted
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(seating.table_number)
    .bind(&seating.customer_name)
    .bind(seating.number_of_people)
    .bind(seating.waiter_id)
    .bind(&seating.waiter_name)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    let table = Table::from_row(&row)?;
    let inserted: bool = row.try_get("inserted")?;

    if inserted {
        insert_open_account(&mut *conn, &Account::open_for(&table)).await?;
        info!(table_number = table.table_number, "Mesa ocupada");
    }

    Ok((table, inserted))
}

/// Total de la mesa = Σ pedidos por cobrar que la referencian
pub(crate) async fn recompute_total(conn: &mut PgConnection, table_id: Uuid) -> AppResult<Table> {
    let table = sqlx::query_as::<_, Table>(
        r#"
        UPDATE dining_tables
        SET total = COALESCE((
                SELECT SUM(o.total) FROM orders o
                WHERE o.table_id = $1
                  AND o.status <> 'cancelled'
                  AND o.payment_status IN ('active', 'pending_payment')
            ), 0),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(table_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(table)
}

pub(crate) async fn count_billable(conn: &mut PgConnection, table_id: Uuid) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM orders
        WHERE table_id = $1
          AND status <> 'cancelled'
          AND payment_status IN ('active', 'pending_payment')
        "#,
    )
    .bind(table_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

#[async_trait]
impl TableRepository for PgTableRepository {
    async fn seat(&self, seating: &Seating) -> AppResult<(Table, bool)> {
        let mut tx = self.pool.begin().await?;
        let seated = upsert_occupied(&mut tx, seating).await?;
        tx.commit().await?;
        Ok(seated)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>("SELECT * FROM dining_tables WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(table)
    }

    async fn find_occupied(&self, table_number: i32) -> AppResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>(
            "SELECT * FROM dining_tables WHERE table_number = $1 AND status = 'occupied'",
        )
        .bind(table_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    async fn list_occupied(&self) -> AppResult<Vec<Table>> {
        let tables = sqlx::query_as::<_, Table>(
            "SELECT * FROM dining_tables WHERE status = 'occupied' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    async fn update_seat_info(
        &self,
        id: Uuid,
        customer_name: Option<String>,
        number_of_people: Option<i32>,
    ) -> AppResult<Option<Table>> {
        let mut tx = self.pool.begin().await?;

        let table = sqlx::query_as::<_, Table>(
            r#"
            UPDATE dining_tables
            SET customer_name = COALESCE($2, customer_name),
                number_of_people = COALESCE($3, number_of_people),
                updated_at = NOW()
            WHERE id = $1 AND status = 'occupied'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&customer_name)
        .bind(number_of_people)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(table) = &table {
            sqlx::query(
                r#"
                UPDATE accounts
                SET customer_name = $2, number_of_people = $3
                WHERE table_id = $1 AND status = 'open'
                "#,
            )
            .bind(table.id)
            .bind(&table.customer_name)
            .bind(table.number_of_people)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(table)
    }

    async fn release(
        &self,
        id: Uuid,
        payment_method: PaymentMethod,
        released_by: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Table> {
        let mut tx = self.pool.begin().await?;

        let table = sqlx::query_as::<_, Table>("SELECT * FROM dining_tables WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Mesa no encontrada".to_string()))?;

        if !table.is_occupied() {
            return Err(AppError::InvalidState("La mesa ya está libre".to_string()));
        }
        if count_billable(&mut tx, id).await? > 0 {
            return Err(AppError::InvalidState(
                "La mesa tiene pedidos pendientes de cobro".to_string(),
            ));
        }

        // Bloquea la cuenta abierta contra ajustes concurrentes
        let open_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE table_id = $1 AND status = 'open' FOR UPDATE")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        let modifications = sqlx::query_as::<_, AccountModification>(
            "SELECT * FROM account_modifications WHERE account_id = ANY($1) ORDER BY modified_at ASC",
        )
        .bind(&open_ids)
        .fetch_all(&mut *tx)
        .await?;
        if adjustments_leave_consumption(&modifications) {
            return Err(AppError::InvalidState(PENDING_ADJUSTMENTS.to_string()));
        }

        let table = sqlx::query_as::<_, Table>(
            r#"
            UPDATE dining_tables
            SET status = 'libre', payment_method = $2, closed_at = $3, total = 0, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_method)
        .bind(at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE accounts
            SET status = 'cancelled', cancelled_at = $2, cancelled_by = $3, cancellation_reason = $4
            WHERE table_id = $1 AND status = 'open'
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(released_by)
        .bind(RELEASED_WITHOUT_CONSUMPTION)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(table_number = table.table_number, "Mesa liberada");
        Ok(table)
    }
}
