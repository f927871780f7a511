use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::account::PaymentMethod;
use crate::utils::validation::validate_price;

// Request para sentar una mesa
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeatTableRequest {
    #[validate(range(min = 1))]
    pub table_number: i32,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub customer_name: String,

    #[serde(default)]
    #[validate(range(min = 0, max = 99))]
    pub number_of_people: i32,
}

// Request para editar los datos de una mesa ocupada
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTableRequest {
    #[validate(length(max = 100))]
    pub customer_name: Option<String>,

    #[validate(range(min = 0, max = 99))]
    pub number_of_people: Option<i32>,
}

// Request para liberar una mesa
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTableRequest {
    pub payment_method: Option<PaymentMethod>,
}

// Request para generar la cuenta desde la mesa
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBillRequest {
    #[validate(length(max = 100))]
    pub customer_name: Option<String>,

    #[validate(range(min = 0, max = 99))]
    pub number_of_people: Option<i32>,

    pub payment_method: Option<PaymentMethod>,

    #[validate(custom = "validate_price")]
    pub cash_received: Option<Decimal>,
}
