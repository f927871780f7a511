use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use crate::controllers::ticket_controller::{TicketController, TicketResponse};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_ticket_router() -> Router<AppState> {
    Router::new().route("/:folio/print", post(print_ticket))
}

async fn print_ticket(
    State(state): State<AppState>,
    caller: Caller,
    Path(folio): Path<i64>,
) -> Result<Json<ApiResponse<TicketResponse>>, AppError> {
    let controller = TicketController::new(&state);
    Ok(Json(controller.print(&caller, folio).await?))
}
