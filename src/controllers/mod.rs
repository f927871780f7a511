//! Controladores
//!
//! Cada controlador se construye por petición a partir del `AppState`,
//! consulta la política de permisos y delega en los repositorios.

pub mod account_controller;
pub mod auth_controller;
pub mod kitchen_controller;
pub mod order_controller;
pub mod product_controller;
pub mod table_controller;
pub mod ticket_controller;
pub mod user_controller;

pub use account_controller::AccountController;
pub use auth_controller::AuthController;
pub use kitchen_controller::KitchenController;
pub use order_controller::OrderController;
pub use product_controller::ProductController;
pub use table_controller::TableController;
pub use ticket_controller::TicketController;
pub use user_controller::UserController;
