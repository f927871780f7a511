//! DTOs de la API
//!
//! Requests y responses expuestos por los controladores.

pub mod account_dto;
pub mod api_response;
pub mod auth_dto;
pub mod kitchen_dto;
pub mod order_dto;
pub mod product_dto;
pub mod table_dto;
pub mod user_dto;

pub use api_response::ApiResponse;
