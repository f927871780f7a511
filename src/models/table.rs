//! Modelo de Table
//!
//! Agregado de mesa: existe a lo sumo una fila `occupied` por número de mesa.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::account::PaymentMethod;
use crate::models::auth::Caller;
use crate::models::order::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "table_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Occupied,
    Libre,
}

/// Table - mapea exactamente a la tabla dining_tables
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: Uuid,
    pub table_number: i32,
    pub customer_name: String,
    pub number_of_people: i32,
    pub waiter_id: Uuid,
    pub waiter_name: String,
    pub total: Decimal,
    pub status: TableStatus,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Datos para sentar (o reutilizar) la mesa ocupada de un número
#[derive(Debug, Clone)]
pub struct Seating {
    pub table_number: i32,
    pub customer_name: String,
    pub number_of_people: i32,
    pub waiter_id: Uuid,
    pub waiter_name: String,
}

impl Seating {
    pub fn new(table_number: i32, customer_name: String, number_of_people: i32, waiter: &Caller) -> Self {
        Self {
            table_number,
            customer_name,
            number_of_people,
            waiter_id: waiter.id,
            waiter_name: waiter.name.clone(),
        }
    }

    pub fn from_order(order: &Order) -> Self {
        Self {
            table_number: order.table_number,
            customer_name: order.customer_name.clone(),
            number_of_people: order.number_of_people,
            waiter_id: order.waiter_id,
            waiter_name: order.waiter_name.clone(),
        }
    }
}

impl Table {
    pub fn occupy(seating: &Seating) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            table_number: seating.table_number,
            customer_name: seating.customer_name.clone(),
            number_of_people: seating.number_of_people,
            waiter_id: seating.waiter_id,
            waiter_name: seating.waiter_name.clone(),
            total: Decimal::ZERO,
            status: TableStatus::Occupied,
            payment_method: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.status == TableStatus::Occupied
    }

    /// Una mesa ya ocupada solo adopta los datos del cliente si vienen informados
    pub fn absorb(&mut self, seating: &Seating) {
        if !seating.customer_name.trim().is_empty() {
            self.customer_name = seating.customer_name.clone();
        }
        if seating.number_of_people > 0 {
            self.number_of_people = seating.number_of_people;
        }
        self.updated_at = Utc::now();
    }

    /// Recalcula el total con los pedidos por cobrar de la mesa
    pub fn recompute_total<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) {
        self.total = orders
            .into_iter()
            .filter(|o| o.table_id == self.id && o.is_billable())
            .map(|o| o.total)
            .sum();
        self.updated_at = Utc::now();
    }
}

/// Resumen de un pedido dentro de la vista de mesa
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOrderSummary {
    pub id: Uuid,
    pub waiter_name: String,
    pub items_count: i32,
    pub total: Decimal,
    pub status: crate::models::order::OrderStatus,
    pub payment_status: crate::models::order::PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for TableOrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            waiter_name: order.waiter_name.clone(),
            items_count: order.items.iter().map(|i| i.quantity).sum(),
            total: order.total,
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at,
        }
    }
}

/// Mesa con sus pedidos por cobrar (más recientes primero)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    #[serde(flatten)]
    pub table: Table,
    pub orders: Vec<TableOrderSummary>,
    pub total_active_orders: Decimal,
    pub active_orders_count: usize,
}

impl TableView {
    pub fn build(table: Table, orders: &[Order]) -> Self {
        let mut billable: Vec<&Order> = orders
            .iter()
            .filter(|o| o.table_id == table.id && o.is_billable())
            .collect();
        billable.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total_active_orders = billable.iter().map(|o| o.total).sum();
        let summaries: Vec<TableOrderSummary> = billable.into_iter().map(TableOrderSummary::from).collect();

        Self {
            table,
            active_orders_count: summaries.len(),
            orders: summaries,
            total_active_orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::models::order::{NewOrder, OrderItem, OrderStatus};
    use chrono::Duration;

    fn waiter() -> Caller {
        Caller {
            id: Uuid::new_v4(),
            identifier: "luis".into(),
            role: UserRole::Waiter,
            name: "Luis Pérez".into(),
        }
    }

    fn order_for(table: &Table, price: i64) -> Order {
        let mut order = Order::new(
            NewOrder {
                table_number: table.table_number,
                customer_name: String::new(),
                number_of_people: 0,
                items: vec![OrderItem {
                    product_id: Uuid::new_v4(),
                    name: "Taco".into(),
                    price: Decimal::new(price, 0),
                    quantity: 1,
                    notes: String::new(),
                }],
                observations: String::new(),
            },
            &waiter(),
        );
        order.table_id = table.id;
        order
    }

    #[test]
    fn test_recompute_total_skips_cancelled_orders() {
        let mut table = Table::occupy(&Seating::new(3, "Familia".into(), 4, &waiter()));
        let a = order_for(&table, 100);
        let mut b = order_for(&table, 40);
        b.status = OrderStatus::Cancelled;
        table.recompute_total([&a, &b]);
        assert_eq!(table.total, Decimal::new(100, 0));
    }

    #[test]
    fn test_absorb_keeps_existing_customer_when_blank() {
        let mut table = Table::occupy(&Seating::new(3, "Familia".into(), 4, &waiter()));
        table.absorb(&Seating::new(3, "  ".into(), 0, &waiter()));
        assert_eq!(table.customer_name, "Familia");
        assert_eq!(table.number_of_people, 4);
    }

    #[test]
    fn test_view_orders_most_recent_first() {
        let table = Table::occupy(&Seating::new(5, "".into(), 2, &waiter()));
        let mut older = order_for(&table, 10);
        older.created_at = Utc::now() - Duration::minutes(30);
        let newer = order_for(&table, 20);

        let view = TableView::build(table, &[older.clone(), newer.clone()]);
        assert_eq!(view.active_orders_count, 2);
        assert_eq!(view.orders[0].id, newer.id);
        assert_eq!(view.total_active_orders, Decimal::new(30, 0));
    }
}
