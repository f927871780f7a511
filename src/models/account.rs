//! Modelo de Account
//!
//! Una cuenta abierta acompaña a cada mesa ocupada; al cerrarse recibe folio
//! y congela sus líneas y totales. Las cuentas nunca se eliminan.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Open,
    Closed,
    Cancelled,
}

/// Métodos de pago aceptados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    DebitCard,
    CreditCard,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::CreditCard => "credit_card",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "debit_card" => Some(PaymentMethod::DebitCard),
            "credit_card" => Some(PaymentMethod::CreditCard),
            _ => None,
        }
    }

    /// Etiqueta impresa en el ticket
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::DebitCard => "Tarjeta de débito",
            PaymentMethod::CreditCard => "Tarjeta de crédito",
        }
    }
}

/// Línea de cuenta: producto agrupado por precio unitario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub amount: Decimal,
}

/// Account - mapea exactamente a la tabla accounts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub folio: Option<i64>,
    pub table_id: Uuid,
    pub table_number: i32,
    pub customer_name: String,
    pub number_of_people: i32,
    pub waiter_name: String,
    #[sqlx(json)]
    pub items: Vec<BillLine>,
    pub subtotal: Decimal,
    pub adjustments_total: Decimal,
    pub total: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub cash_received: Option<Decimal>,
    #[sqlx(rename = "change_amount")]
    pub change: Decimal,
    pub status: AccountStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
}

impl Account {
    /// Cuenta corriente de una mesa recién ocupada
    pub fn open_for(table: &Table) -> Self {
        Self {
            id: Uuid::new_v4(),
            folio: None,
            table_id: table.id,
            table_number: table.table_number,
            customer_name: table.customer_name.clone(),
            number_of_people: table.number_of_people,
            waiter_name: table.waiter_name.clone(),
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            adjustments_total: Decimal::ZERO,
            total: Decimal::ZERO,
            payment_method: None,
            cash_received: None,
            change: Decimal::ZERO,
            status: AccountStatus::Open,
            opened_at: Utc::now(),
            closed_at: None,
            closed_by: None,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == AccountStatus::Open
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "modification_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModificationAction {
    Add,
    Remove,
}

/// Ajuste manual sobre una cuenta abierta (solo se agregan, nunca se editan)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccountModification {
    pub id: Uuid,
    pub account_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
    pub action: ModificationAction,
    pub quantity: i32,
    pub reason: Option<String>,
    pub modified_by: String,
    pub modified_at: DateTime<Utc>,
}

impl AccountModification {
    /// Importe con signo: positivo al agregar, negativo al quitar
    pub fn signed_amount(&self) -> Decimal {
        let amount = self.unit_price * Decimal::from(self.quantity);
        match self.action {
            ModificationAction::Add => amount,
            ModificationAction::Remove => -amount,
        }
    }
}

/// Todo lo que la liquidación escribe de una sola vez
#[derive(Debug, Clone)]
pub struct Settlement {
    pub account_id: Uuid,
    pub table_id: Uuid,
    pub order_ids: Vec<Uuid>,
    pub orders_subtotal: Decimal,
    /// Ajustes con los que se calculó el total
    pub modification_ids: Vec<Uuid>,
    pub folio: i64,
    pub customer_name: String,
    pub number_of_people: i32,
    pub waiter_name: String,
    pub items: Vec<BillLine>,
    pub subtotal: Decimal,
    pub adjustments_total: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub cash_received: Option<Decimal>,
    pub change: Decimal,
    pub closed_by: String,
    pub closed_at: DateTime<Utc>,
}

/// Datos de la anulación de una cuenta cerrada
#[derive(Debug, Clone)]
pub struct Cancellation {
    pub folio: i64,
    pub reason: String,
    pub cancelled_by: String,
    pub cancelled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!(PaymentMethod::from_str("debit_card"), Some(PaymentMethod::DebitCard));
        assert_eq!(PaymentMethod::from_str("bitcoin"), None);
        assert_eq!(PaymentMethod::Cash.label(), "Efectivo");
    }

    #[test]
    fn test_signed_amount() {
        let mut m = AccountModification {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Coca chica".into(),
            unit_price: Decimal::new(25, 0),
            action: ModificationAction::Add,
            quantity: 2,
            reason: None,
            modified_by: "admin".into(),
            modified_at: Utc::now(),
        };
        assert_eq!(m.signed_amount(), Decimal::new(50, 0));
        m.action = ModificationAction::Remove;
        assert_eq!(m.signed_amount(), Decimal::new(-50, 0));
    }
}
