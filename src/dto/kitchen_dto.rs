use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::{Order, OrderItem, OrderStatus};

// Query del tablero de cocina
#[derive(Debug, Default, Deserialize)]
pub struct KitchenQuery {
    pub status: Option<OrderStatus>,
}

// Request para cancelar un pedido desde cocina
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenCancelRequest {
    pub missing_ingredient: Option<String>,
    pub reason: Option<String>,
}

// Pedido tal como lo ve la cocina
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenOrder {
    pub id: Uuid,
    pub table_number: i32,
    pub waiter_name: String,
    pub items: Vec<OrderItem>,
    pub observations: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub time_elapsed_minutes: i64,
}

impl KitchenOrder {
    pub fn from_order(order: Order, now: DateTime<Utc>) -> Self {
        let time_elapsed_minutes = order.elapsed_minutes(now);
        Self {
            id: order.id,
            table_number: order.table_number,
            waiter_name: order.waiter_name,
            items: order.items,
            observations: order.observations,
            status: order.status,
            created_at: order.created_at,
            time_elapsed_minutes,
        }
    }
}

// Response del tablero
#[derive(Debug, Serialize)]
pub struct KitchenOrdersResponse {
    pub orders: Vec<KitchenOrder>,
    pub count: usize,
}
