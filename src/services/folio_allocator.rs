//! Asignación de folios
//!
//! El contador de folios es el único valor mutable compartido del sistema.
//! Todo folio sale de un `FolioAllocator`; nadie más lee ni escribe el contador.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::utils::errors::{is_transient_failure, AppError, AppResult};

pub const FOLIO_COUNTER: &str = "accounts";

/// Entrega folios únicos y estrictamente crecientes
#[async_trait]
pub trait FolioAllocator: Send + Sync {
    async fn next_folio(&self) -> AppResult<i64>;
}

/// Reintenta `op` mientras falle con un error transitorio, hasta `max_attempts` veces
pub async fn retry_transient<T, E, F, Fut, P>(max_attempts: u32, is_transient: P, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_attempts && is_transient(&error) => {
                warn!(attempt, max_attempts, "Transacción en conflicto, reintentando");
                tokio::time::sleep(Duration::from_millis(5 * u64::from(attempt))).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Asignador sobre la tabla `counters` en una transacción SERIALIZABLE
pub struct PgFolioAllocator {
    pool: PgPool,
    max_attempts: u32,
}

impl PgFolioAllocator {
    pub fn new(pool: PgPool, max_attempts: u32) -> Self {
        Self { pool, max_attempts }
    }

    async fn allocate_once(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let folio: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (name, last_folio)
            VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET last_folio = counters.last_folio + 1
            RETURNING last_folio
            "#,
        )
        .bind(FOLIO_COUNTER)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(folio)
    }
}

#[async_trait]
impl FolioAllocator for PgFolioAllocator {
    async fn next_folio(&self) -> AppResult<i64> {
        let pool = &self.pool;
        let folio = retry_transient(self.max_attempts, is_transient_failure, || {
            Self::allocate_once(pool)
        })
        .await
        .map_err(AppError::Database)?;

        debug!(folio, "Folio asignado");
        Ok(folio)
    }
}
