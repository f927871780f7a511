use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::KitchenController;
use crate::dto::kitchen_dto::{KitchenCancelRequest, KitchenOrdersResponse, KitchenQuery};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::models::order::Order;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_kitchen_router() -> Router<AppState> {
    Router::new()
        .route("/", get(kitchen_orders))
        .route("/:id/in-progress", put(mark_in_progress))
        .route("/:id/ready", put(mark_ready))
        .route("/:id/cancel", put(cancel_order))
}

async fn kitchen_orders(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<KitchenQuery>,
) -> Result<Json<KitchenOrdersResponse>, AppError> {
    let controller = KitchenController::new(&state);
    Ok(Json(controller.list(&caller, query).await?))
}

async fn mark_in_progress(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let controller = KitchenController::new(&state);
    Ok(Json(controller.mark_in_progress(&caller, id).await?))
}

async fn mark_ready(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let controller = KitchenController::new(&state);
    Ok(Json(controller.mark_ready(&caller, id).await?))
}

async fn cancel_order(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    request: Option<Json<KitchenCancelRequest>>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = KitchenController::new(&state);
    Ok(Json(controller.cancel(&caller, id, request).await?))
}
