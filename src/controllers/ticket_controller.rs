use std::sync::Arc;

use serde::Serialize;

use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::repositories::AccountRepository;
use crate::services::authorization_service::{authorize, Action, Target};
use crate::services::ticket_service::{print_ticket, Ticket, TicketPrinter};
use crate::state::AppState;
use crate::utils::errors::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub ticket: Ticket,
    pub text: String,
    pub printed: bool,
}

pub struct TicketController {
    accounts: Arc<dyn AccountRepository>,
    printer: Option<Arc<dyn TicketPrinter>>,
    restaurant_name: String,
    restaurant_address: String,
}

impl TicketController {
    pub fn new(state: &AppState) -> Self {
        Self {
            accounts: state.repos.accounts.clone(),
            printer: state.printer.clone(),
            restaurant_name: state.config.restaurant_name.clone(),
            restaurant_address: state.config.restaurant_address.clone(),
        }
    }

    /// Renderiza el ticket de un folio y lo envía a la impresora si existe
    pub async fn print(&self, caller: &Caller, folio: i64) -> Result<ApiResponse<TicketResponse>, AppError> {
        authorize(caller, Action::PrintTicket, Target::None, "No tienes permiso para imprimir tickets")?;

        let account = self
            .accounts
            .find_by_folio(folio)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cuenta con folio {} no encontrada", folio)))?;
        let ticket = Ticket::from_account(&account, &self.restaurant_name, &self.restaurant_address)
            .ok_or_else(|| AppError::NotFound(format!("Cuenta con folio {} no encontrada", folio)))?;

        let outcome = print_ticket(self.printer.as_deref(), &ticket).await;
        let response = TicketResponse {
            text: ticket.render(),
            ticket,
            printed: outcome.printed,
        };
        Ok(ApiResponse::success_with_message(response, outcome.message))
    }
}
