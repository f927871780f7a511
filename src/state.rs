//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::Repositories;
use crate::services::auth_service::AuthService;
use crate::services::ticket_service::{SpoolPrinter, TicketPrinter};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub repos: Repositories,
    pub printer: Option<Arc<dyn TicketPrinter>>,
}

impl AppState {
    /// La impresora de cola se activa solo si hay directorio configurado
    pub fn new(config: EnvironmentConfig, repos: Repositories) -> Self {
        let printer = config
            .ticket_spool_dir
            .clone()
            .map(|dir| Arc::new(SpoolPrinter::new(dir)) as Arc<dyn TicketPrinter>);

        Self { config, repos, printer }
    }

    pub fn with_printer(mut self, printer: Option<Arc<dyn TicketPrinter>>) -> Self {
        self.printer = printer;
        self
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.repos.users.clone(), JwtConfig::from(&self.config))
    }
}
