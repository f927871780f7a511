//! Repositorios de datos
//!
//! Cada repositorio es un trait con una implementación PostgreSQL y otra en
//! memoria (`MemoryStore`). Las operaciones que tocan varias entidades a la vez
//! (pedido + mesa, liquidación, anulación) se exponen como una sola llamada para
//! que cada backend las ejecute de forma atómica.

pub mod account_repository;
pub mod memory_store;
pub mod order_repository;
pub mod product_repository;
pub mod table_repository;
pub mod user_repository;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::account::{Account, AccountModification, Cancellation, PaymentMethod, Settlement};
use crate::models::auth::UserRole;
use crate::models::order::{KitchenTransition, Order, OrderFilters, OrderStatus};
use crate::models::product::{Product, ProductFilters};
use crate::models::table::{Seating, Table};
use crate::models::user::User;
use crate::services::folio_allocator::{FolioAllocator, PgFolioAllocator};
use crate::utils::errors::AppResult;

pub use account_repository::PgAccountRepository;
pub use memory_store::MemoryStore;
pub use order_repository::PgOrderRepository;
pub use product_repository::PgProductRepository;
pub use table_repository::PgTableRepository;
pub use user_repository::PgUserRepository;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self, filters: &ProductFilters) -> AppResult<Vec<Product>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>>;
    async fn search_by_name(&self, term: &str) -> AppResult<Vec<Product>>;
    async fn exists_with_name(&self, name: &str, category: &str, exclude: Option<Uuid>) -> AppResult<bool>;
    async fn insert(&self, product: &Product) -> AppResult<Product>;
    async fn update(&self, product: &Product) -> AppResult<Product>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<User>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>>;
    async fn find_by_access_token(&self, token: &str) -> AppResult<Option<User>>;
    async fn search(&self, term: &str) -> AppResult<Vec<User>>;
    async fn count_by_role(&self, role: UserRole) -> AppResult<i64>;
    async fn insert(&self, user: &User) -> AppResult<User>;
    async fn update(&self, user: &User) -> AppResult<User>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserta el pedido sentando (o reutilizando) la mesa ocupada de su número.
    /// Recalcula el total de la mesa en la misma transacción.
    async fn create_with_table(&self, order: Order) -> AppResult<(Order, Table)>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;
    /// Más recientes primero
    async fn list(&self, filters: &OrderFilters) -> AppResult<Vec<Order>>;
    /// Pedidos por cobrar de una mesa
    async fn billable_for_table(&self, table_id: Uuid) -> AppResult<Vec<Order>>;
    /// Reescribe líneas y observaciones solo si el pedido sigue `new`
    async fn update_contents(&self, order: &Order) -> AppResult<Option<Order>>;
    /// Borra el pedido solo si sigue `new`
    async fn delete_new(&self, id: Uuid) -> AppResult<bool>;
    /// Transición condicional; `None` si el estado ya no era el esperado
    async fn apply_transition(&self, id: Uuid, transition: &KitchenTransition) -> AppResult<Option<Order>>;
    /// Pedidos visibles en cocina, más antiguos primero
    async fn list_kitchen(&self, status: Option<OrderStatus>) -> AppResult<Vec<Order>>;
}

#[async_trait]
pub trait TableRepository: Send + Sync {
    /// Upsert atómico de la mesa ocupada; devuelve si se creó
    async fn seat(&self, seating: &Seating) -> AppResult<(Table, bool)>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Table>>;
    async fn find_occupied(&self, table_number: i32) -> AppResult<Option<Table>>;
    /// Más recientes primero
    async fn list_occupied(&self) -> AppResult<Vec<Table>>;
    async fn update_seat_info(
        &self,
        id: Uuid,
        customer_name: Option<String>,
        number_of_people: Option<i32>,
    ) -> AppResult<Option<Table>>;
    /// Libera una mesa sin pedidos por cobrar y anula su cuenta vacía
    async fn release(
        &self,
        id: Uuid,
        payment_method: PaymentMethod,
        released_by: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Table>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_open_by_table(&self, table_number: i32) -> AppResult<Option<Account>>;
    async fn find_by_folio(&self, folio: i64) -> AppResult<Option<Account>>;
    async fn modifications(&self, account_id: Uuid) -> AppResult<Vec<AccountModification>>;
    /// Agrega los ajustes de una misma cuenta, todos o ninguno, solo si sigue abierta
    async fn add_modifications(&self, modifications: &[AccountModification]) -> AppResult<bool>;
    /// Escribe la liquidación completa de forma atómica
    async fn settle(&self, settlement: &Settlement) -> AppResult<Account>;
    /// Anula una cuenta cerrada y reabre su mesa
    async fn cancel(&self, cancellation: &Cancellation) -> AppResult<Account>;
    /// Cuentas cerradas (o anuladas) con `closed_at` en el rango
    async fn closed_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Vec<Account>>;
}

/// Conjunto de repositorios compartido por el estado de la aplicación
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub tables: Arc<dyn TableRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub folios: Arc<dyn FolioAllocator>,
}

impl Repositories {
    pub fn postgres(pool: PgPool, folio_max_retries: u32) -> Self {
        Self {
            products: Arc::new(PgProductRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            tables: Arc::new(PgTableRepository::new(pool.clone())),
            accounts: Arc::new(PgAccountRepository::new(pool.clone())),
            folios: Arc::new(PgFolioAllocator::new(pool, folio_max_retries)),
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            products: store.clone(),
            users: store.clone(),
            orders: store.clone(),
            tables: store.clone(),
            accounts: store.clone(),
            folios: store,
        }
    }
}
