use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::product_dto::{CreateProductRequest, UpdateProductRequest};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::models::product::{Product, ProductChanges, ProductFilters};
use crate::repositories::ProductRepository;
use crate::services::authorization_service::{authorize, Action, Target};
use crate::state::AppState;
use crate::utils::errors::AppError;

const DUPLICATE_PRODUCT: &str = "Error: Producto ya registrado en esta categoría";
const ADMIN_ONLY: &str = "Solo los administradores pueden gestionar productos";

pub struct ProductController {
    products: Arc<dyn ProductRepository>,
}

impl ProductController {
    pub fn new(state: &AppState) -> Self {
        Self {
            products: state.repos.products.clone(),
        }
    }

    pub async fn list(&self, filters: ProductFilters) -> Result<Vec<Product>, AppError> {
        self.products.list(&filters).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Product, AppError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Producto no encontrado".to_string()))
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Product>, AppError> {
        self.products.search_by_name(term.trim()).await
    }

    pub async fn by_category(&self, category: &str) -> Result<Vec<Product>, AppError> {
        let filters = ProductFilters {
            category: Some(category.trim().to_string()),
            available: None,
        };
        self.products.list(&filters).await
    }

    pub async fn create(
        &self,
        caller: &Caller,
        request: CreateProductRequest,
    ) -> Result<ApiResponse<Product>, AppError> {
        authorize(caller, Action::ManageProducts, Target::None, ADMIN_ONLY)?;
        request.validate()?;

        let name = request.name.trim().to_string();
        let category = request.category.trim().to_string();

        if self.products.exists_with_name(&name, &category, None).await? {
            return Err(AppError::Conflict(DUPLICATE_PRODUCT.to_string()));
        }

        let product = Product::new(
            name,
            request.description,
            request.price,
            category,
            request.available.unwrap_or(true),
            request.image_url.unwrap_or_default(),
        );
        let product = self.products.insert(&product).await?;

        tracing::info!(product_id = %product.id, name = %product.name, "Producto creado");
        Ok(ApiResponse::success_with_message(product, "Producto creado exitosamente"))
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ApiResponse<Product>, AppError> {
        authorize(caller, Action::ManageProducts, Target::None, ADMIN_ONLY)?;
        request.validate()?;

        let mut product = self.get_by_id(id).await?;
        let identity_changed = product.apply(ProductChanges::from(request));

        if identity_changed
            && self
                .products
                .exists_with_name(&product.name, &product.category, Some(product.id))
                .await?
        {
            return Err(AppError::Conflict(DUPLICATE_PRODUCT.to_string()));
        }

        let product = self.products.update(&product).await?;
        Ok(ApiResponse::success_with_message(product, "Producto actualizado exitosamente"))
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        authorize(caller, Action::ManageProducts, Target::None, ADMIN_ONLY)?;

        if !self.products.delete(id).await? {
            return Err(AppError::NotFound("Producto no encontrado".to_string()));
        }

        tracing::info!(product_id = %id, "Producto eliminado");
        Ok(ApiResponse::message_only("Producto eliminado exitosamente"))
    }
}
