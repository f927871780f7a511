use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::account::{Account, AccountModification, AccountStatus, Cancellation, Settlement};
use crate::models::table::Table;
use crate::repositories::table_repository::{count_billable, recompute_total};
use crate::repositories::AccountRepository;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::round_money;

pub const SETTLEMENT_CONFLICT: &str = "La cuenta cambió mientras se cerraba";

pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) async fn insert_open_account(conn: &mut PgConnection, account: &Account) -> AppResult<Account> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (id, table_id, table_number, customer_name, number_of_people,
                              waiter_name, items, subtotal, adjustments_total, total,
                              change_amount, status, opened_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, 0, 0, 'open', $8)
        RETURNING *
        "#,
    )
    .bind(account.id)
    .bind(account.table_id)
    .bind(account.table_number)
    .bind(&account.customer_name)
    .bind(account.number_of_people)
    .bind(&account.waiter_name)
    .bind(Json(&account.items))
    .bind(account.opened_at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(account)
}

/// Igualdad de conjuntos de ids, sin importar el orden
pub(crate) fn same_ids(current: &[Uuid], expected: &[Uuid]) -> bool {
    let mut current = current.to_vec();
    let mut expected = expected.to_vec();
    current.sort_unstable();
    expected.sort_unstable();
    current == expected
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_open_by_table(&self, table_number: i32) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            WHERE table_number = $1 AND status = 'open'
            ORDER BY opened_at DESC
            LIMIT 1
            "#,
        )
        .bind(table_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_folio(&self, folio: i64) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE folio = $1")
            .bind(folio)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    async fn modifications(&self, account_id: Uuid) -> AppResult<Vec<AccountModification>> {
        let modifications = sqlx::query_as::<_, AccountModification>(
            "SELECT * FROM account_modifications WHERE account_id = $1 ORDER BY modified_at ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(modifications)
    }

    async fn add_modifications(&self, modifications: &[AccountModification]) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Mismo candado que toma el cierre: o entra antes o ve la cuenta cerrada
        let mut account_ids: Vec<Uuid> = modifications.iter().map(|m| m.account_id).collect();
        account_ids.sort_unstable();
        account_ids.dedup();
        let open: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM accounts WHERE id = ANY($1) AND status = 'open' ORDER BY id FOR UPDATE",
        )
        .bind(&account_ids)
        .fetch_all(&mut *tx)
        .await?;
        if open.len() != account_ids.len() {
            return Ok(false);
        }

        for m in modifications {
            sqlx::query(
                r#"
                INSERT INTO account_modifications (id, account_id, product_id, product_name, unit_price,
                                                   action, quantity, reason, modified_by, modified_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(m.id)
            .bind(m.account_id)
            .bind(m.product_id)
            .bind(&m.product_name)
            .bind(m.unit_price)
            .bind(m.action)
            .bind(m.quantity)
            .bind(&m.reason)
            .bind(&m.modified_by)
            .bind(m.modified_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn settle(&self, s: &Settlement) -> AppResult<Account> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(s.account_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Cuenta no encontrada".to_string()))?;

        if !current.is_open() {
            return Err(AppError::Conflict(SETTLEMENT_CONFLICT.to_string()));
        }

        let current_modifications: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM account_modifications WHERE account_id = $1")
                .bind(s.account_id)
                .fetch_all(&mut *tx)
                .await?;
        if !same_ids(&current_modifications, &s.modification_ids) {
            warn!(table_number = current.table_number, "Ajustes agregados durante el cierre");
            return Err(AppError::Conflict(SETTLEMENT_CONFLICT.to_string()));
        }

        // Solo se cierran pedidos que siguen por cobrar; cualquier diferencia aborta
        let closed_totals: Vec<Decimal> = sqlx::query_scalar(
            r#"
            UPDATE orders
            SET payment_status = 'closed', account_id = $2, updated_at = $3
            WHERE id = ANY($1)
              AND table_id = $4
              AND status <> 'cancelled'
              AND payment_status IN ('active', 'pending_payment')
            RETURNING total
            "#,
        )
        .bind(&s.order_ids)
        .bind(s.account_id)
        .bind(s.closed_at)
        .bind(s.table_id)
        .fetch_all(&mut *tx)
        .await?;

        let closed_sum = round_money(closed_totals.iter().copied().sum());
        if closed_totals.len() != s.order_ids.len() || closed_sum != s.orders_subtotal {
            warn!(
                table_number = current.table_number,
                expected = s.order_ids.len(),
                found = closed_totals.len(),
                "Pedidos modificados durante el cierre"
            );
            return Err(AppError::Conflict(SETTLEMENT_CONFLICT.to_string()));
        }

        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET folio = $2, customer_name = $3, number_of_people = $4, waiter_name = $5,
                items = $6, subtotal = $7, adjustments_total = $8, total = $9,
                payment_method = $10, cash_received = $11, change_amount = $12,
                status = 'closed', closed_at = $13, closed_by = $14
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(s.account_id)
        .bind(s.folio)
        .bind(&s.customer_name)
        .bind(s.number_of_people)
        .bind(&s.waiter_name)
        .bind(Json(&s.items))
        .bind(s.subtotal)
        .bind(s.adjustments_total)
        .bind(s.total)
        .bind(s.payment_method)
        .bind(s.cash_received)
        .bind(s.change)
        .bind(s.closed_at)
        .bind(&s.closed_by)
        .fetch_one(&mut *tx)
        .await?;

        if count_billable(&mut tx, s.table_id).await? == 0 {
            sqlx::query(
                r#"
                UPDATE dining_tables
                SET status = 'libre', payment_method = $2, closed_at = $3, total = 0, updated_at = $3
                WHERE id = $1
                "#,
            )
            .bind(s.table_id)
            .bind(s.payment_method)
            .bind(s.closed_at)
            .execute(&mut *tx)
            .await?;
        } else {
            // Llegaron pedidos nuevos mientras se cobraba: la mesa sigue ocupada
            let table = recompute_total(&mut tx, s.table_id).await?;
            insert_open_account(&mut tx, &Account::open_for(&table)).await?;
            info!(table_number = table.table_number, "Mesa sigue ocupada tras el cierre");
        }

        tx.commit().await?;
        Ok(account)
    }

    async fn cancel(&self, c: &Cancellation) -> AppResult<Account> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE folio = $1 FOR UPDATE")
            .bind(c.folio)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Cuenta no encontrada".to_string()))?;

        match current.status {
            AccountStatus::Cancelled => {
                return Err(AppError::InvalidState("La cuenta ya está cancelada".to_string()))
            }
            AccountStatus::Open => {
                return Err(AppError::InvalidState("La cuenta sigue abierta".to_string()))
            }
            AccountStatus::Closed => {}
        }

        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET status = 'cancelled', cancelled_at = $2, cancelled_by = $3, cancellation_reason = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(c.cancelled_at)
        .bind(&c.cancelled_by)
        .bind(&c.reason)
        .fetch_one(&mut *tx)
        .await?;

        let occupied = sqlx::query_as::<_, Table>(
            "SELECT * FROM dining_tables WHERE table_number = $1 AND status = 'occupied' FOR UPDATE",
        )
        .bind(account.table_number)
        .fetch_optional(&mut *tx)
        .await?;

        let target = match occupied {
            Some(table) => table,
            None => {
                let table = sqlx::query_as::<_, Table>(
                    r#"
                    UPDATE dining_tables
                    SET status = 'occupied', closed_at = NULL, payment_method = NULL, updated_at = $2
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(account.table_id)
                .bind(c.cancelled_at)
                .fetch_one(&mut *tx)
                .await?;
                insert_open_account(&mut tx, &Account::open_for(&table)).await?;
                table
            }
        };

        sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = 'pending_payment', table_id = $2, account_id = NULL, updated_at = $3
            WHERE account_id = $1
            "#,
        )
        .bind(account.id)
        .bind(target.id)
        .bind(c.cancelled_at)
        .execute(&mut *tx)
        .await?;

        let target = recompute_total(&mut tx, target.id).await?;
        tx.commit().await?;

        info!(
            folio = c.folio,
            table_number = target.table_number,
            "Cuenta anulada, mesa reabierta"
        );
        Ok(account)
    }

    async fn closed_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            WHERE status IN ('closed', 'cancelled')
              AND closed_at BETWEEN $1 AND $2
            ORDER BY closed_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }
}
