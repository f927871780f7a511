use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::ProductController;
use crate::dto::product_dto::{CreateProductRequest, UpdateProductRequest};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::models::product::{Product, ProductFilters};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_product_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search/:term", get(search_products))
        .route("/category/:category", get(products_by_category))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
}

async fn list_products(
    State(state): State<AppState>,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<Vec<Product>>, AppError> {
    let controller = ProductController::new(&state);
    Ok(Json(controller.list(filters).await?))
}

async fn search_products(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let controller = ProductController::new(&state);
    Ok(Json(controller.search(&term).await?))
}

async fn products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let controller = ProductController::new(&state);
    Ok(Json(controller.by_category(&category).await?))
}

async fn get_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Product>, AppError> {
    let controller = ProductController::new(&state);
    Ok(Json(controller.get_by_id(id).await?))
}

async fn create_product(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), AppError> {
    let controller = ProductController::new(&state);
    let response = controller.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_product(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let controller = ProductController::new(&state);
    Ok(Json(controller.update(&caller, id, request).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = ProductController::new(&state);
    Ok(Json(controller.delete(&caller, id).await?))
}
