use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::OrderController;
use crate::dto::order_dto::{CreateOrderRequest, OrderListQuery, OrderListResponse, UpdateOrderRequest};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::models::order::Order;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_order_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
}

async fn create_order(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), AppError> {
    let controller = OrderController::new(&state);
    let response = controller.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_orders(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>, AppError> {
    let controller = OrderController::new(&state);
    Ok(Json(controller.list(&caller, query).await?))
}

async fn get_order(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let controller = OrderController::new(&state);
    Ok(Json(controller.get_by_id(&caller, id).await?))
}

async fn update_order(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let controller = OrderController::new(&state);
    Ok(Json(controller.update(&caller, id, request).await?))
}

async fn delete_order(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = OrderController::new(&state);
    Ok(Json(controller.delete(&caller, id).await?))
}
