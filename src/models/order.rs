//! Modelo de Order
//!
//! Un pedido pertenece a una mesa y lleva dos estados independientes:
//! `status` (avance en cocina) y `payment_status` (si ya fue cobrado).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::auth::Caller;
use crate::utils::errors::AppError;
use crate::utils::validation::round_money;

/// Estado del pedido en cocina
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProgress,
    Ready,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Estados visibles en la pantalla de cocina
    pub fn kitchen_visible(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

/// Estado de cobro del pedido
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Active,
    Closed,
    PendingPayment,
}

/// Línea de un pedido, con nombre y precio copiados del catálogo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    #[serde(default)]
    pub notes: String,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order - mapea exactamente a la tabla orders
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub table_id: Uuid,
    pub table_number: i32,
    pub customer_name: String,
    pub number_of_people: i32,
    pub waiter_id: Uuid,
    pub waiter_name: String,
    #[sqlx(json)]
    pub items: Vec<OrderItem>,
    pub observations: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub account_id: Option<Uuid>,
    pub in_progress_at: Option<DateTime<Utc>>,
    pub processed_by: Option<String>,
    pub ready_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
    pub preparation_time_minutes: Option<i32>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub missing_ingredient: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos de la mesa capturados al crear el pedido
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_number: i32,
    pub customer_name: String,
    pub number_of_people: i32,
    pub items: Vec<OrderItem>,
    pub observations: String,
}

impl Order {
    /// Construye un pedido nuevo; `table_id` se asigna al sentar la mesa
    pub fn new(input: NewOrder, waiter: &Caller) -> Self {
        let now = Utc::now();
        let total = compute_total(&input.items);
        Self {
            id: Uuid::new_v4(),
            table_id: Uuid::nil(),
            table_number: input.table_number,
            customer_name: input.customer_name,
            number_of_people: input.number_of_people,
            waiter_id: waiter.id,
            waiter_name: waiter.name.clone(),
            items: input.items,
            observations: input.observations,
            total,
            status: OrderStatus::New,
            payment_status: PaymentStatus::Active,
            account_id: None,
            in_progress_at: None,
            processed_by: None,
            ready_at: None,
            completed_by: None,
            preparation_time_minutes: None,
            cancelled_at: None,
            cancelled_by: None,
            missing_ingredient: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pedido que todavía debe cobrarse
    pub fn is_billable(&self) -> bool {
        self.status != OrderStatus::Cancelled
            && matches!(self.payment_status, PaymentStatus::Active | PaymentStatus::PendingPayment)
    }

    /// Solo un pedido nuevo y sin cobrar admite edición o borrado
    pub fn is_editable(&self) -> bool {
        self.status == OrderStatus::New && self.is_billable()
    }

    /// Reemplaza las líneas y recalcula el total
    pub fn set_items(&mut self, items: Vec<OrderItem>) {
        self.total = compute_total(&items);
        self.items = items;
        self.updated_at = Utc::now();
    }

    /// Minutos transcurridos desde la creación
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        whole_minutes(self.created_at, now)
    }

    /// Aplica una transición de cocina validando el estado de origen
    pub fn apply_transition(&mut self, transition: &KitchenTransition) -> Result<(), AppError> {
        if self.status != transition.expected_status() {
            return Err(AppError::InvalidState(transition.rejection_message().to_string()));
        }

        self.status = transition.target_status();
        match transition {
            KitchenTransition::Start { by, at } => {
                self.in_progress_at = Some(*at);
                self.processed_by = Some(by.clone());
                self.updated_at = *at;
            }
            KitchenTransition::Ready { by, at } => {
                self.ready_at = Some(*at);
                self.completed_by = Some(by.clone());
                self.preparation_time_minutes = Some(whole_minutes(self.created_at, *at) as i32);
                self.updated_at = *at;
            }
            KitchenTransition::Cancel {
                by,
                at,
                missing_ingredient,
                reason,
            } => {
                self.cancelled_at = Some(*at);
                self.cancelled_by = Some(by.clone());
                self.missing_ingredient = Some(missing_ingredient.clone());
                self.cancellation_reason = reason.clone();
                self.updated_at = *at;
            }
        }
        Ok(())
    }
}

/// Transiciones permitidas en cocina: new → in_progress → ready, new → cancelled
#[derive(Debug, Clone)]
pub enum KitchenTransition {
    Start {
        by: String,
        at: DateTime<Utc>,
    },
    Ready {
        by: String,
        at: DateTime<Utc>,
    },
    Cancel {
        by: String,
        at: DateTime<Utc>,
        missing_ingredient: String,
        reason: Option<String>,
    },
}

impl KitchenTransition {
    pub fn expected_status(&self) -> OrderStatus {
        match self {
            KitchenTransition::Start { .. } | KitchenTransition::Cancel { .. } => OrderStatus::New,
            KitchenTransition::Ready { .. } => OrderStatus::InProgress,
        }
    }

    pub fn target_status(&self) -> OrderStatus {
        match self {
            KitchenTransition::Start { .. } => OrderStatus::InProgress,
            KitchenTransition::Ready { .. } => OrderStatus::Ready,
            KitchenTransition::Cancel { .. } => OrderStatus::Cancelled,
        }
    }

    pub fn rejection_message(&self) -> &'static str {
        match self {
            KitchenTransition::Start { .. } => "El pedido ya fue procesado",
            KitchenTransition::Ready { .. } => "El pedido no está en preparación",
            KitchenTransition::Cancel { .. } => {
                "No se puede cancelar un pedido ya en preparación o listo"
            }
        }
    }
}

/// Filtros del listado de pedidos
#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub waiter_id: Option<Uuid>,
    pub table_number: Option<i32>,
    pub status: Option<OrderStatus>,
}

impl OrderFilters {
    pub fn matches(&self, order: &Order) -> bool {
        self.waiter_id.map_or(true, |id| order.waiter_id == id)
            && self.table_number.map_or(true, |n| order.table_number == n)
            && self.status.map_or(true, |s| order.status == s)
    }
}

/// Σ precio × cantidad, redondeado a centavos
pub fn compute_total(items: &[OrderItem]) -> Decimal {
    round_money(items.iter().map(OrderItem::line_total).sum())
}

fn whole_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_minutes().max(0)
}
