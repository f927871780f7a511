//! Restaurant POS backend
//!
//! Pedidos por mesa, flujo de cocina, cuentas con folio, historial y
//! anulaciones, catálogo de productos y directorio de usuarios.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Router de la aplicación con trazas y CORS
pub fn build_router(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config.cors_origins);

    routes::create_api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
