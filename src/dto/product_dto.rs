use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::product::ProductChanges;
use crate::utils::validation::{validate_not_empty, validate_price};

// Request para crear un producto
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(custom = "validate_not_empty")]
    pub name: String,

    #[validate(length(max = 300))]
    pub description: String,

    #[validate(custom = "validate_price")]
    pub price: Decimal,

    #[validate(custom = "validate_not_empty")]
    pub category: String,

    pub available: Option<bool>,
    pub image_url: Option<String>,
}

// Request para actualizar un producto (parcial)
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(custom = "validate_not_empty")]
    pub name: Option<String>,

    #[validate(length(max = 300))]
    pub description: Option<String>,

    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,

    #[validate(custom = "validate_not_empty")]
    pub category: Option<String>,

    pub available: Option<bool>,
    pub image_url: Option<String>,
}

impl From<UpdateProductRequest> for ProductChanges {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            name: request.name.map(|n| n.trim().to_string()),
            description: request.description,
            price: request.price,
            category: request.category.map(|c| c.trim().to_string()),
            available: request.available,
            image_url: request.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_rules() {
        let ok = CreateProductRequest {
            name: "Mojarra Frita".into(),
            description: "Con ensalada".into(),
            price: Decimal::new(85, 0),
            category: "Comidas".into(),
            available: None,
            image_url: None,
        };
        assert!(ok.validate().is_ok());

        let long = CreateProductRequest {
            description: "x".repeat(301),
            ..ok
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let request = UpdateProductRequest {
            price: Some(Decimal::new(-5, 0)),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
