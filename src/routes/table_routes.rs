use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::TableController;
use crate::dto::account_dto::CloseAccountResponse;
use crate::dto::table_dto::{CloseTableRequest, GenerateBillRequest, SeatTableRequest, UpdateTableRequest};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::models::table::{Table, TableView};
use crate::state::AppState;
use crate::utils::errors::AppError;

// `:id` es el UUID de la mesa salvo en generate-bill, donde es su número
pub fn create_table_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables).post(seat_table))
        .route("/:id", get(get_table).put(update_table))
        .route("/:id/close", put(close_table))
        .route("/:id/generate-bill", post(generate_bill))
}

async fn seat_table(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<SeatTableRequest>,
) -> Result<Json<ApiResponse<TableView>>, AppError> {
    let controller = TableController::new(&state);
    Ok(Json(controller.seat(&caller, request).await?))
}

async fn list_tables(State(state): State<AppState>, _caller: Caller) -> Result<Json<Vec<TableView>>, AppError> {
    let controller = TableController::new(&state);
    Ok(Json(controller.list_active().await?))
}

async fn get_table(
    State(state): State<AppState>,
    _caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<TableView>, AppError> {
    let controller = TableController::new(&state);
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_table(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTableRequest>,
) -> Result<Json<ApiResponse<TableView>>, AppError> {
    let controller = TableController::new(&state);
    Ok(Json(controller.update(&caller, id, request).await?))
}

async fn close_table(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    request: Option<Json<CloseTableRequest>>,
) -> Result<Json<ApiResponse<Table>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = TableController::new(&state);
    Ok(Json(controller.close(&caller, id, request).await?))
}

async fn generate_bill(
    State(state): State<AppState>,
    caller: Caller,
    Path(table_number): Path<i32>,
    request: Option<Json<GenerateBillRequest>>,
) -> Result<Json<ApiResponse<CloseAccountResponse>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = TableController::new(&state);
    Ok(Json(controller.generate_bill(&caller, table_number, request).await?))
}
