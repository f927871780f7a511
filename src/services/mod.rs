//! Services module
//!
//! Este módulo contiene la lógica de negocio transversal: autenticación,
//! política de permisos, cálculo de cuentas, folios, tickets y arranque.

pub mod auth_service;
pub mod authorization_service;
pub mod billing_service;
pub mod bootstrap_service;
pub mod folio_allocator;
pub mod ticket_service;

pub use auth_service::AuthService;
pub use authorization_service::{authorize, can_perform, Action, Target};
pub use folio_allocator::FolioAllocator;
pub use ticket_service::{SpoolPrinter, TicketPrinter};
