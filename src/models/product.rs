//! Modelo de Product
//!
//! Catálogo de productos vendibles. `(name, category)` es único.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::validation::round_money;

pub const MAX_DESCRIPTION_CHARS: usize = 300;

/// Product - mapea exactamente a la tabla products
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub available: bool,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: String,
        description: String,
        price: Decimal,
        category: String,
        available: bool,
        image_url: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            price: round_money(price),
            category,
            available,
            image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Aplica cambios parciales y devuelve si el par (name, category) cambió
    pub fn apply(&mut self, changes: ProductChanges) -> bool {
        let before = (self.name.clone(), self.category.clone());

        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = round_money(price);
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(available) = changes.available {
            self.available = available;
        }
        if let Some(image_url) = changes.image_url {
            self.image_url = image_url;
        }
        self.updated_at = Utc::now();

        before != (self.name.clone(), self.category.clone())
    }
}

/// Cambios parciales de un producto
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub available: Option<bool>,
    pub image_url: Option<String>,
}

/// Filtros del listado de productos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub available: Option<bool>,
}

impl ProductFilters {
    pub fn matches(&self, product: &Product) -> bool {
        self.category.as_ref().map_or(true, |c| &product.category == c)
            && self.available.map_or(true, |a| product.available == a)
    }
}

/// Orden alfabético por nombre, sin distinguir mayúsculas
pub fn sort_by_name(products: &mut [Product]) {
    products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, category: &str) -> Product {
        Product::new(
            name.to_string(),
            "desc".to_string(),
            Decimal::new(25, 0),
            category.to_string(),
            true,
            String::new(),
        )
    }

    #[test]
    fn test_price_is_rounded_to_cents() {
        let p = Product::new("Agua".into(), "".into(), Decimal::new(19999, 3), "Bebidas".into(), true, "".into());
        assert_eq!(p.price, Decimal::new(2000, 2));
    }

    #[test]
    fn test_apply_reports_identity_change() {
        let mut p = product("Coca chica", "Bebidas");
        assert!(!p.apply(ProductChanges { available: Some(false), ..Default::default() }));
        assert!(!p.available);
        assert!(p.apply(ProductChanges { category: Some("Refrescos".into()), ..Default::default() }));
    }

    #[test]
    fn test_filters() {
        let mut p = product("Mojarra Frita", "Comidas");
        let filters = ProductFilters { category: Some("Comidas".into()), available: Some(true) };
        assert!(filters.matches(&p));
        p.available = false;
        assert!(!filters.matches(&p));
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let mut list = vec![product("taco", "C"), product("Agua", "B"), product("burrito", "C")];
        sort_by_name(&mut list);
        let names: Vec<_> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Agua", "burrito", "taco"]);
    }
}
