//! Arranque del sistema
//!
//! Garantiza un administrador inicial y, si se pide, un catálogo mínimo.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::models::auth::UserRole;
use crate::models::product::Product;
use crate::models::user::{generate_temporary_password, User};
use crate::repositories::Repositories;
use crate::services::auth_service::hash_password;
use crate::utils::errors::AppResult;

pub const INITIAL_ADMIN_IDENTIFIER: &str = "admin";

/// Resultado del arranque
#[derive(Debug, Default)]
pub struct BootstrapReport {
    /// Contraseña temporal del administrador creado en este arranque
    pub temporary_password: Option<String>,
    pub seeded_products: usize,
}

/// Crea el administrador inicial y siembra productos base
pub async fn bootstrap(repos: &Repositories, seed_products: bool) -> AppResult<BootstrapReport> {
    let mut report = BootstrapReport::default();

    if repos.users.count_by_role(UserRole::Administrator).await? == 0 {
        let password = generate_temporary_password();
        let mut admin = User::new(
            "Administrador".to_string(),
            "Principal".to_string(),
            INITIAL_ADMIN_IDENTIFIER.to_string(),
            UserRole::Administrator,
        );
        admin.password_hash = Some(hash_password(&password)?);
        admin.first_login = true;
        repos.users.insert(&admin).await?;

        warn!(
            identifier = INITIAL_ADMIN_IDENTIFIER,
            temporary_password = %password,
            "👤 Administrador inicial creado; cambie la contraseña en el primer acceso"
        );
        report.temporary_password = Some(password);
    }

    if seed_products && repos.products.count().await? == 0 {
        for product in base_products() {
            repos.products.insert(&product).await?;
            report.seeded_products += 1;
        }
        info!(count = report.seeded_products, "🍽️ Catálogo base creado");
    }

    Ok(report)
}

fn base_products() -> Vec<Product> {
    vec![
        Product::new(
            "Mojarra Frita".to_string(),
            "Mojarra frita con arroz y ensalada".to_string(),
            Decimal::new(85, 0),
            "Comidas".to_string(),
            true,
            String::new(),
        ),
        Product::new(
            "Coca chica".to_string(),
            "Refresco de 355 ml".to_string(),
            Decimal::new(25, 0),
            "Bebidas".to_string(),
            true,
            String::new(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::ProductFilters;
    use crate::services::auth_service::verify_password;

    #[tokio::test]
    async fn test_bootstrap_creates_admin_once() {
        let repos = Repositories::memory();

        let first = bootstrap(&repos, false).await.unwrap();
        let password = first.temporary_password.unwrap();

        let admin = repos
            .users
            .find_by_identifier(INITIAL_ADMIN_IDENTIFIER)
            .await
            .unwrap()
            .unwrap();
        assert!(admin.first_login);
        assert!(verify_password(&password, admin.password_hash.as_deref().unwrap()).unwrap());

        let second = bootstrap(&repos, false).await.unwrap();
        assert!(second.temporary_password.is_none());
        assert_eq!(repos.products.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_only_fills_empty_catalog() {
        let repos = Repositories::memory();

        let report = bootstrap(&repos, true).await.unwrap();
        assert_eq!(report.seeded_products, 2);

        let again = bootstrap(&repos, true).await.unwrap();
        assert_eq!(again.seeded_products, 0);

        let products = repos.products.list(&ProductFilters::default()).await.unwrap();
        assert_eq!(products.len(), 2);
    }
}
