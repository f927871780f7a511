use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::UserController;
use crate::dto::user_dto::{CreateUserRequest, UpdateProfileRequest, UpdateUserRequest, UserResponse};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/search/:term", get(search_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/token", post(regenerate_token))
}

async fn list_users(State(state): State<AppState>, caller: Caller) -> Result<Json<Vec<UserResponse>>, AppError> {
    let controller = UserController::new(&state);
    Ok(Json(controller.list(&caller).await?))
}

async fn create_user(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let controller = UserController::new(&state);
    let response = controller.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn search_users(
    State(state): State<AppState>,
    caller: Caller,
    Path(term): Path<String>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let controller = UserController::new(&state);
    Ok(Json(controller.search(&caller, &term).await?))
}

async fn get_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = UserController::new(&state);
    Ok(Json(controller.get_by_id(&caller, id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(&state);
    Ok(Json(controller.update(&caller, id, request).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = UserController::new(&state);
    Ok(Json(controller.delete(&caller, id).await?))
}

async fn regenerate_token(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(&state);
    Ok(Json(controller.regenerate_token(&caller, id).await?))
}

async fn get_profile(State(state): State<AppState>, caller: Caller) -> Result<Json<UserResponse>, AppError> {
    let controller = UserController::new(&state);
    Ok(Json(controller.profile(&caller).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(&state);
    Ok(Json(controller.update_profile(&caller, request).await?))
}
