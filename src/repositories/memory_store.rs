//! Almacenamiento en memoria
//!
//! Implementa todos los repositorios y el asignador de folios sobre un único
//! estado protegido por un mutex asíncrono. Cada operación toma el candado una
//! sola vez, lo que la vuelve atómica frente a las demás. Se usa con
//! `STORAGE_BACKEND=memory` y en las pruebas.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::account::{
    Account, AccountModification, AccountStatus, Cancellation, PaymentMethod, Settlement,
};
use crate::models::auth::UserRole;
use crate::models::order::{KitchenTransition, Order, OrderFilters, OrderStatus, PaymentStatus};
use crate::models::product::{sort_by_name, Product, ProductFilters};
use crate::models::table::{Seating, Table, TableStatus};
use crate::models::user::User;
use crate::repositories::account_repository::{same_ids, SETTLEMENT_CONFLICT};
use crate::repositories::table_repository::{
    adjustments_leave_consumption, PENDING_ADJUSTMENTS, RELEASED_WITHOUT_CONSUMPTION,
};
use crate::repositories::{
    AccountRepository, OrderRepository, ProductRepository, TableRepository, UserRepository,
};
use crate::services::folio_allocator::FolioAllocator;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::round_money;

#[derive(Debug, Default)]
struct MemoryState {
    products: Vec<Product>,
    users: Vec<User>,
    orders: Vec<Order>,
    tables: Vec<Table>,
    accounts: Vec<Account>,
    modifications: Vec<AccountModification>,
    last_folio: i64,
}

impl MemoryState {
    fn upsert_occupied(&mut self, seating: &Seating) -> (Table, bool) {
        if let Some(table) = self
            .tables
            .iter_mut()
            .find(|t| t.table_number == seating.table_number && t.is_occupied())
        {
            table.absorb(seating);
            return (table.clone(), false);
        }

        let table = Table::occupy(seating);
        self.accounts.push(Account::open_for(&table));
        self.tables.push(table.clone());
        (table, true)
    }

    fn recompute_total(&mut self, table_id: Uuid) -> Option<Table> {
        let orders = &self.orders;
        let table = self.tables.iter_mut().find(|t| t.id == table_id)?;
        table.recompute_total(orders.iter());
        Some(table.clone())
    }

    fn count_billable(&self, table_id: Uuid) -> usize {
        self.orders
            .iter()
            .filter(|o| o.table_id == table_id && o.is_billable())
            .count()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list(&self, filters: &ProductFilters) -> AppResult<Vec<Product>> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect();
        sort_by_name(&mut products);
        Ok(products)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let state = self.state.lock().await;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn search_by_name(&self, term: &str) -> AppResult<Vec<Product>> {
        let needle = term.to_lowercase();
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        sort_by_name(&mut products);
        Ok(products)
    }

    async fn exists_with_name(&self, name: &str, category: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .iter()
            .any(|p| p.name == name && p.category == category && Some(p.id) != exclude))
    }

    async fn insert(&self, product: &Product) -> AppResult<Product> {
        let mut state = self.state.lock().await;
        if state
            .products
            .iter()
            .any(|p| p.name == product.name && p.category == product.category)
        {
            return Err(AppError::Conflict(
                "Error: Producto ya registrado en esta categoría".to_string(),
            ));
        }
        state.products.push(product.clone());
        Ok(product.clone())
    }

    async fn update(&self, product: &Product) -> AppResult<Product> {
        let mut state = self.state.lock().await;
        if state
            .products
            .iter()
            .any(|p| p.id != product.id && p.name == product.name && p.category == product.category)
        {
            return Err(AppError::Conflict(
                "Error: Producto ya registrado en esta categoría".to_string(),
            ));
        }
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| AppError::NotFound("Producto no encontrado".to_string()))?;
        *slot = product.clone();
        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        Ok(state.products.len() < before)
    }

    async fn count(&self) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state.products.len() as i64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<User>> {
        let state = self.state.lock().await;
        let mut users = state.users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.identifier == identifier).cloned())
    }

    async fn find_by_access_token(&self, token: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.role != UserRole::Administrator && u.access_token.as_deref() == Some(token))
            .cloned())
    }

    async fn search(&self, term: &str) -> AppResult<Vec<User>> {
        let needle = term.to_lowercase();
        let state = self.state.lock().await;
        let mut users: Vec<User> = state
            .users
            .iter()
            .filter(|u| {
                u.first_name.to_lowercase().contains(&needle)
                    || u.last_name.to_lowercase().contains(&needle)
                    || u.identifier.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| (&a.first_name, &a.last_name).cmp(&(&b.first_name, &b.last_name)));
        Ok(users)
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state.users.iter().filter(|u| u.role == role).count() as i64)
    }

    async fn insert(&self, user: &User) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.identifier == user.identifier) {
            return Err(AppError::Conflict("El identifier ya existe".to_string()));
        }
        state.users.push(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut state = self.state.lock().await;
        let slot = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        Ok(state.users.len() < before)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_with_table(&self, mut order: Order) -> AppResult<(Order, Table)> {
        let mut state = self.state.lock().await;

        let (table, _) = state.upsert_occupied(&Seating::from_order(&order));
        order.table_id = table.id;
        state.orders.push(order.clone());

        let table = state
            .recompute_total(table.id)
            .ok_or_else(|| AppError::Internal("Mesa desaparecida".to_string()))?;
        Ok((order, table))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let state = self.state.lock().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list(&self, filters: &OrderFilters) -> AppResult<Vec<Order>> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| filters.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn billable_for_table(&self, table_id: Uuid) -> AppResult<Vec<Order>> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| o.table_id == table_id && o.is_billable())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_contents(&self, order: &Order) -> AppResult<Option<Order>> {
        let mut state = self.state.lock().await;

        let updated = match state
            .orders
            .iter_mut()
            .find(|o| o.id == order.id && o.is_editable())
        {
            Some(current) => {
                current.items = order.items.clone();
                current.observations = order.observations.clone();
                current.total = order.total;
                current.updated_at = order.updated_at;
                current.clone()
            }
            None => return Ok(None),
        };

        state.recompute_total(updated.table_id);
        Ok(Some(updated))
    }

    async fn delete_new(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;

        let position = state
            .orders
            .iter()
            .position(|o| o.id == id && o.is_editable());
        match position {
            Some(index) => {
                let removed = state.orders.remove(index);
                state.recompute_total(removed.table_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn apply_transition(&self, id: Uuid, transition: &KitchenTransition) -> AppResult<Option<Order>> {
        let mut state = self.state.lock().await;

        let updated = match state.orders.iter_mut().find(|o| o.id == id) {
            Some(order) if order.status == transition.expected_status() => {
                order.apply_transition(transition)?;
                order.clone()
            }
            _ => return Ok(None),
        };

        if updated.status == OrderStatus::Cancelled {
            state.recompute_total(updated.table_id);
        }
        Ok(Some(updated))
    }

    async fn list_kitchen(&self, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| o.status.kitchen_visible() && status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(orders)
    }
}

#[async_trait]
impl TableRepository for MemoryStore {
    async fn seat(&self, seating: &Seating) -> AppResult<(Table, bool)> {
        let mut state = self.state.lock().await;
        Ok(state.upsert_occupied(seating))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Table>> {
        let state = self.state.lock().await;
        Ok(state.tables.iter().find(|t| t.id == id).cloned())
    }

    async fn find_occupied(&self, table_number: i32) -> AppResult<Option<Table>> {
        let state = self.state.lock().await;
        Ok(state
            .tables
            .iter()
            .find(|t| t.table_number == table_number && t.is_occupied())
            .cloned())
    }

    async fn list_occupied(&self) -> AppResult<Vec<Table>> {
        let state = self.state.lock().await;
        let mut tables: Vec<Table> = state.tables.iter().filter(|t| t.is_occupied()).cloned().collect();
        tables.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tables)
    }

    async fn update_seat_info(
        &self,
        id: Uuid,
        customer_name: Option<String>,
        number_of_people: Option<i32>,
    ) -> AppResult<Option<Table>> {
        let mut state = self.state.lock().await;

        let table = match state.tables.iter_mut().find(|t| t.id == id && t.is_occupied()) {
            Some(table) => {
                if let Some(name) = customer_name {
                    table.customer_name = name;
                }
                if let Some(people) = number_of_people {
                    table.number_of_people = people;
                }
                table.updated_at = Utc::now();
                table.clone()
            }
            None => return Ok(None),
        };

        for account in state
            .accounts
            .iter_mut()
            .filter(|a| a.table_id == id && a.is_open())
        {
            account.customer_name = table.customer_name.clone();
            account.number_of_people = table.number_of_people;
        }
        Ok(Some(table))
    }

    async fn release(
        &self,
        id: Uuid,
        payment_method: PaymentMethod,
        released_by: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Table> {
        let mut state = self.state.lock().await;

        let occupied = state
            .tables
            .iter()
            .find(|t| t.id == id)
            .map(Table::is_occupied)
            .ok_or_else(|| AppError::NotFound("Mesa no encontrada".to_string()))?;
        if !occupied {
            return Err(AppError::InvalidState("La mesa ya está libre".to_string()));
        }
        if state.count_billable(id) > 0 {
            return Err(AppError::InvalidState(
                "La mesa tiene pedidos pendientes de cobro".to_string(),
            ));
        }
        let open_ids: Vec<Uuid> = state
            .accounts
            .iter()
            .filter(|a| a.table_id == id && a.is_open())
            .map(|a| a.id)
            .collect();
        let adjustments: Vec<AccountModification> = state
            .modifications
            .iter()
            .filter(|m| open_ids.contains(&m.account_id))
            .cloned()
            .collect();
        if adjustments_leave_consumption(&adjustments) {
            return Err(AppError::InvalidState(PENDING_ADJUSTMENTS.to_string()));
        }

        for account in state.accounts.iter_mut().filter(|a| a.table_id == id && a.is_open()) {
            account.status = AccountStatus::Cancelled;
            account.cancelled_at = Some(at);
            account.cancelled_by = Some(released_by.to_string());
            account.cancellation_reason = Some(RELEASED_WITHOUT_CONSUMPTION.to_string());
        }

        let table = state
            .tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound("Mesa no encontrada".to_string()))?;
        table.status = TableStatus::Libre;
        table.payment_method = Some(payment_method);
        table.closed_at = Some(at);
        table.total = rust_decimal::Decimal::ZERO;
        table.updated_at = at;
        Ok(table.clone())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_open_by_table(&self, table_number: i32) -> AppResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| a.table_number == table_number && a.is_open())
            .max_by_key(|a| a.opened_at)
            .cloned())
    }

    async fn find_by_folio(&self, folio: i64) -> AppResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state.accounts.iter().find(|a| a.folio == Some(folio)).cloned())
    }

    async fn modifications(&self, account_id: Uuid) -> AppResult<Vec<AccountModification>> {
        let state = self.state.lock().await;
        Ok(state
            .modifications
            .iter()
            .filter(|m| m.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn add_modifications(&self, modifications: &[AccountModification]) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let open = modifications.iter().all(|m| {
            state
                .accounts
                .iter()
                .any(|a| a.id == m.account_id && a.is_open())
        });
        if open {
            state.modifications.extend_from_slice(modifications);
        }
        Ok(open)
    }

    async fn settle(&self, s: &Settlement) -> AppResult<Account> {
        let mut state = self.state.lock().await;

        let is_open = state
            .accounts
            .iter()
            .find(|a| a.id == s.account_id)
            .map(Account::is_open)
            .ok_or_else(|| AppError::NotFound("Cuenta no encontrada".to_string()))?;
        if !is_open {
            return Err(AppError::Conflict(SETTLEMENT_CONFLICT.to_string()));
        }

        // Validar antes de escribir: el candado hace de transacción
        let still_billable: Vec<&Order> = state
            .orders
            .iter()
            .filter(|o| s.order_ids.contains(&o.id) && o.table_id == s.table_id && o.is_billable())
            .collect();
        let sum = round_money(still_billable.iter().map(|o| o.total).sum());
        if still_billable.len() != s.order_ids.len() || sum != s.orders_subtotal {
            return Err(AppError::Conflict(SETTLEMENT_CONFLICT.to_string()));
        }
        let current_modifications: Vec<Uuid> = state
            .modifications
            .iter()
            .filter(|m| m.account_id == s.account_id)
            .map(|m| m.id)
            .collect();
        if !same_ids(&current_modifications, &s.modification_ids) {
            return Err(AppError::Conflict(SETTLEMENT_CONFLICT.to_string()));
        }

        for order in state.orders.iter_mut().filter(|o| s.order_ids.contains(&o.id)) {
            order.payment_status = PaymentStatus::Closed;
            order.account_id = Some(s.account_id);
            order.updated_at = s.closed_at;
        }

        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == s.account_id)
            .ok_or_else(|| AppError::NotFound("Cuenta no encontrada".to_string()))?;
        account.folio = Some(s.folio);
        account.customer_name = s.customer_name.clone();
        account.number_of_people = s.number_of_people;
        account.waiter_name = s.waiter_name.clone();
        account.items = s.items.clone();
        account.subtotal = s.subtotal;
        account.adjustments_total = s.adjustments_total;
        account.total = s.total;
        account.payment_method = Some(s.payment_method);
        account.cash_received = s.cash_received;
        account.change = s.change;
        account.status = AccountStatus::Closed;
        account.closed_at = Some(s.closed_at);
        account.closed_by = Some(s.closed_by.clone());
        let account = account.clone();

        if state.count_billable(s.table_id) == 0 {
            if let Some(table) = state.tables.iter_mut().find(|t| t.id == s.table_id) {
                table.status = TableStatus::Libre;
                table.payment_method = Some(s.payment_method);
                table.closed_at = Some(s.closed_at);
                table.total = rust_decimal::Decimal::ZERO;
                table.updated_at = s.closed_at;
            }
        } else if let Some(table) = state.recompute_total(s.table_id) {
            state.accounts.push(Account::open_for(&table));
        }

        Ok(account)
    }

    async fn cancel(&self, c: &Cancellation) -> AppResult<Account> {
        let mut state = self.state.lock().await;

        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.folio == Some(c.folio))
            .ok_or_else(|| AppError::NotFound("Cuenta no encontrada".to_string()))?;
        match account.status {
            AccountStatus::Cancelled => {
                return Err(AppError::InvalidState("La cuenta ya está cancelada".to_string()))
            }
            AccountStatus::Open => {
                return Err(AppError::InvalidState("La cuenta sigue abierta".to_string()))
            }
            AccountStatus::Closed => {}
        }
        account.status = AccountStatus::Cancelled;
        account.cancelled_at = Some(c.cancelled_at);
        account.cancelled_by = Some(c.cancelled_by.clone());
        account.cancellation_reason = Some(c.reason.clone());
        let account = account.clone();

        let occupied_id = state
            .tables
            .iter()
            .find(|t| t.table_number == account.table_number && t.is_occupied())
            .map(|t| t.id);

        let target_id = match occupied_id {
            Some(id) => id,
            None => {
                let table = state
                    .tables
                    .iter_mut()
                    .find(|t| t.id == account.table_id)
                    .ok_or_else(|| AppError::NotFound("Mesa no encontrada".to_string()))?;
                table.status = TableStatus::Occupied;
                table.closed_at = None;
                table.payment_method = None;
                table.updated_at = c.cancelled_at;
                let reopened = table.clone();
                state.accounts.push(Account::open_for(&reopened));
                reopened.id
            }
        };

        for order in state
            .orders
            .iter_mut()
            .filter(|o| o.account_id == Some(account.id))
        {
            order.payment_status = PaymentStatus::PendingPayment;
            order.table_id = target_id;
            order.account_id = None;
            order.updated_at = c.cancelled_at;
        }
        state.recompute_total(target_id);

        Ok(account)
    }

    async fn closed_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Vec<Account>> {
        let state = self.state.lock().await;
        let mut accounts: Vec<Account> = state
            .accounts
            .iter()
            .filter(|a| matches!(a.status, AccountStatus::Closed | AccountStatus::Cancelled))
            .filter(|a| a.closed_at.map_or(false, |at| at >= start && at <= end))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| b.closed_at.cmp(&a.closed_at));
        Ok(accounts)
    }
}

#[async_trait]
impl FolioAllocator for MemoryStore {
    async fn next_folio(&self) -> AppResult<i64> {
        let mut state = self.state.lock().await;
        state.last_folio += 1;
        Ok(state.last_folio)
    }
}
