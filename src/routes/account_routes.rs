use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};

use crate::controllers::AccountController;
use crate::dto::account_dto::{
    AccountHistoryQuery, AccountHistoryResponse, CancelAccountRequest, CloseAccountRequest,
    CloseAccountResponse, ModifyAccountRequest, OpenAccountResponse,
};
use crate::dto::ApiResponse;
use crate::models::account::{Account, AccountModification};
use crate::models::auth::Caller;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_account_router() -> Router<AppState> {
    Router::new()
        .route("/history", get(account_history))
        .route("/table/:table_number", get(get_open_account).patch(modify_account))
        .route("/table/:table_number/close", post(close_account))
        .route("/table/:table_number/modifications", get(account_modifications))
        .route("/folio/:folio/cancel", delete(cancel_account))
}

async fn get_open_account(
    State(state): State<AppState>,
    caller: Caller,
    Path(table_number): Path<i32>,
) -> Result<Json<OpenAccountResponse>, AppError> {
    let controller = AccountController::new(&state);
    Ok(Json(controller.get_open(&caller, table_number).await?))
}

async fn close_account(
    State(state): State<AppState>,
    caller: Caller,
    Path(table_number): Path<i32>,
    Json(request): Json<CloseAccountRequest>,
) -> Result<Json<ApiResponse<CloseAccountResponse>>, AppError> {
    let controller = AccountController::new(&state);
    Ok(Json(controller.close(&caller, table_number, request).await?))
}

async fn modify_account(
    State(state): State<AppState>,
    caller: Caller,
    Path(table_number): Path<i32>,
    Json(request): Json<ModifyAccountRequest>,
) -> Result<Json<ApiResponse<OpenAccountResponse>>, AppError> {
    let controller = AccountController::new(&state);
    Ok(Json(controller.modify(&caller, table_number, request).await?))
}

async fn account_modifications(
    State(state): State<AppState>,
    caller: Caller,
    Path(table_number): Path<i32>,
) -> Result<Json<Vec<AccountModification>>, AppError> {
    let controller = AccountController::new(&state);
    Ok(Json(controller.modifications(&caller, table_number).await?))
}

async fn cancel_account(
    State(state): State<AppState>,
    caller: Caller,
    Path(folio): Path<i64>,
    request: Option<Json<CancelAccountRequest>>,
) -> Result<Json<ApiResponse<Account>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = AccountController::new(&state);
    Ok(Json(controller.cancel(&caller, folio, request).await?))
}

async fn account_history(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<AccountHistoryQuery>,
) -> Result<Json<AccountHistoryResponse>, AppError> {
    let controller = AccountController::new(&state);
    Ok(Json(controller.history(&caller, query).await?))
}
