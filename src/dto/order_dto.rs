use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::order::{Order, OrderStatus};

// Línea solicitada por el mesero
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Uuid,

    #[validate(range(min = 1, max = 999))]
    pub quantity: i32,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub notes: String,
}

// Request para crear un pedido
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(required, range(min = 1))]
    pub table_number: Option<i32>,

    #[validate(length(min = 1))]
    pub items: Vec<OrderItemRequest>,

    #[serde(default)]
    pub customer_name: String,

    #[serde(default)]
    #[validate(range(min = 0, max = 99))]
    pub number_of_people: i32,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub observations: String,
}

// Request para editar un pedido nuevo
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1))]
    pub items: Option<Vec<OrderItemRequest>>,

    #[validate(length(max = 500))]
    pub observations: Option<String>,
}

// Query del listado de pedidos
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub table_number: Option<i32>,
    pub status: Option<OrderStatus>,
}

// Response del listado
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32) -> OrderItemRequest {
        OrderItemRequest {
            product_id: Uuid::new_v4(),
            quantity,
            notes: String::new(),
        }
    }

    #[test]
    fn test_table_number_is_required() {
        let request = CreateOrderRequest {
            table_number: None,
            items: vec![item(1)],
            customer_name: String::new(),
            number_of_people: 2,
            observations: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_items_must_not_be_empty() {
        let request = CreateOrderRequest {
            table_number: Some(7),
            items: vec![],
            customer_name: String::new(),
            number_of_people: 2,
            observations: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_item_quantity_must_be_positive() {
        assert!(item(0).validate().is_err());
        assert!(item(3).validate().is_ok());

        let ok = CreateOrderRequest {
            table_number: Some(7),
            items: vec![item(2)],
            customer_name: "Mesa 7".into(),
            number_of_people: 2,
            observations: String::new(),
        };
        assert!(ok.validate().is_ok());
    }
}
