use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::account::{Account, AccountModification, ModificationAction, PaymentMethod};
use crate::models::order::Order;
use crate::utils::validation::validate_price;

// Request para cerrar una cuenta
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CloseAccountRequest {
    pub payment_method: String,

    #[validate(custom = "validate_price")]
    pub cash_received: Option<Decimal>,
}

// Request para agregar o quitar productos de una cuenta abierta
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModifyAccountRequest {
    pub action: ModificationAction,

    pub product_id: Uuid,

    #[validate(range(min = 1, max = 999))]
    pub quantity: i32,

    pub reason: Option<String>,
}

// Request para anular una cuenta cerrada
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAccountRequest {
    pub reason: Option<String>,
}

// Query del historial
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHistoryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub folio: Option<i64>,
    pub table_number: Option<i32>,
    pub waiter_name: Option<String>,
    pub payment_method: Option<String>,
}

// Cuenta abierta con sus pedidos y ajustes
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountResponse {
    #[serde(flatten)]
    pub account: Account,
    pub orders: Vec<Order>,
    pub modifications: Vec<AccountModification>,
}

// Resultado de cerrar una cuenta
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseAccountResponse {
    pub folio: i64,
    pub total: Decimal,
    pub change: Decimal,
    pub account: Account,
}

// Response del historial
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHistoryResponse {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub count: usize,
    pub total_amount: Decimal,
    pub cancelled_count: usize,
    pub cancelled_amount: Decimal,
    pub accounts: Vec<Account>,
}

// Filtros en memoria del historial
#[derive(Debug, Clone, Default)]
pub struct HistoryFilters {
    pub folio: Option<i64>,
    pub table_number: Option<i32>,
    pub waiter_name: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

impl HistoryFilters {
    pub fn matches(&self, account: &Account) -> bool {
        let waiter_matches = self.waiter_name.as_ref().map_or(true, |needle| {
            account
                .waiter_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });

        self.folio.map_or(true, |f| account.folio == Some(f))
            && self.table_number.map_or(true, |n| account.table_number == n)
            && self.payment_method.map_or(true, |m| account.payment_method == Some(m))
            && waiter_matches
    }
}
