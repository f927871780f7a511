//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! junto con las reglas puras de cada entidad.

pub mod account;
pub mod auth;
pub mod order;
pub mod product;
pub mod table;
pub mod user;

pub use account::{Account, AccountModification, AccountStatus, BillLine, ModificationAction, PaymentMethod};
pub use auth::{Caller, UserRole};
pub use order::{Order, OrderItem, OrderStatus, PaymentStatus};
pub use product::Product;
pub use table::{Table, TableStatus};
pub use user::User;
