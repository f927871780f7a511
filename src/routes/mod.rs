//! Rutas HTTP
//!
//! Cada recurso expone su propio router; aquí se anidan bajo `/api`.

pub mod account_routes;
pub mod auth_routes;
pub mod kitchen_routes;
pub mod order_routes;
pub mod product_routes;
pub mod table_routes;
pub mod ticket_routes;
pub mod user_routes;

use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Router completo de la API, sin capas de transporte
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router())
        .nest("/api/products", product_routes::create_product_router())
        .nest("/api/users", user_routes::create_user_router())
        .nest("/api/orders", order_routes::create_order_router())
        .nest("/api/tables", table_routes::create_table_router())
        .nest("/api/accounts", account_routes::create_account_router())
        .nest("/api/kitchen", kitchen_routes::create_kitchen_router())
        .nest("/api/tickets", ticket_routes::create_ticket_router())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
