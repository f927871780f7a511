use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::account_controller::{AccountController, SettleOptions};
use crate::dto::account_dto::CloseAccountResponse;
use crate::dto::table_dto::{CloseTableRequest, GenerateBillRequest, SeatTableRequest, UpdateTableRequest};
use crate::dto::ApiResponse;
use crate::models::account::PaymentMethod;
use crate::models::auth::Caller;
use crate::models::table::{Seating, Table, TableView};
use crate::repositories::{OrderRepository, TableRepository};
use crate::services::authorization_service::{authorize, Action, Target};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct TableController {
    tables: Arc<dyn TableRepository>,
    orders: Arc<dyn OrderRepository>,
    billing: AccountController,
}

impl TableController {
    pub fn new(state: &AppState) -> Self {
        Self {
            tables: state.repos.tables.clone(),
            orders: state.repos.orders.clone(),
            billing: AccountController::new(state),
        }
    }

    /// Sienta una mesa o actualiza la que ya está ocupada con ese número
    pub async fn seat(&self, caller: &Caller, request: SeatTableRequest) -> Result<ApiResponse<TableView>, AppError> {
        authorize(
            caller,
            Action::SeatTable,
            Target::None,
            "Solo meseros y administradores pueden abrir mesas",
        )?;
        request.validate()?;

        let seating = Seating::new(
            request.table_number,
            request.customer_name.trim().to_string(),
            request.number_of_people,
            caller,
        );
        let (table, created) = self.tables.seat(&seating).await?;
        let message = if created { "Mesa ocupada exitosamente" } else { "Mesa actualizada exitosamente" };

        tracing::info!(table_number = table.table_number, created, "🪑 Mesa sentada");
        Ok(ApiResponse::success_with_message(self.view(table).await?, message))
    }

    /// Mesas ocupadas con sus pedidos por cobrar, más recientes primero
    pub async fn list_active(&self) -> Result<Vec<TableView>, AppError> {
        let tables = self.tables.list_occupied().await?;
        let mut views = Vec::with_capacity(tables.len());
        for table in tables {
            views.push(self.view(table).await?);
        }
        Ok(views)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TableView, AppError> {
        let table = self.find(id).await?;
        self.view(table).await
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        request: UpdateTableRequest,
    ) -> Result<ApiResponse<TableView>, AppError> {
        authorize(caller, Action::SeatTable, Target::None, "No tienes permiso para editar mesas")?;
        request.validate()?;

        let customer_name = request.customer_name.map(|n| n.trim().to_string());
        let table = match self
            .tables
            .update_seat_info(id, customer_name, request.number_of_people)
            .await?
        {
            Some(table) => table,
            None => {
                self.find(id).await?;
                return Err(AppError::InvalidState("La mesa ya está libre".to_string()));
            }
        };

        Ok(ApiResponse::success_with_message(self.view(table).await?, "Mesa actualizada exitosamente"))
    }

    /// Libera una mesa sin consumo pendiente; no genera folio
    pub async fn close(
        &self,
        caller: &Caller,
        id: Uuid,
        request: CloseTableRequest,
    ) -> Result<ApiResponse<Table>, AppError> {
        authorize(
            caller,
            Action::CloseTable,
            Target::None,
            "Solo meseros y administradores pueden cerrar mesas",
        )?;

        let method = request.payment_method.unwrap_or(PaymentMethod::Cash);
        let table = self.tables.release(id, method, &caller.identifier, Utc::now()).await?;

        tracing::info!(table_number = table.table_number, "Mesa liberada");
        Ok(ApiResponse::success_with_message(table, "Mesa cerrada exitosamente"))
    }

    /// Cobra la mesa por el mismo camino que el cierre de cuenta
    pub async fn generate_bill(
        &self,
        caller: &Caller,
        table_number: i32,
        request: GenerateBillRequest,
    ) -> Result<ApiResponse<CloseAccountResponse>, AppError> {
        authorize(
            caller,
            Action::GenerateBill,
            Target::None,
            "Solo meseros y administradores pueden generar cuentas",
        )?;
        request.validate()?;
        if self.tables.find_occupied(table_number).await?.is_none() {
            return Err(AppError::NotFound(format!("La mesa {} no está ocupada", table_number)));
        }

        let options = SettleOptions {
            customer_name: request.customer_name,
            number_of_people: request.number_of_people,
            payment_method: request.payment_method.unwrap_or(PaymentMethod::Cash),
            cash_received: request.cash_received,
            exact_cash_by_default: true,
        };
        let account = self.billing.settle(caller, table_number, options).await?;

        let folio = account.folio.unwrap_or_default();
        let response = CloseAccountResponse {
            folio,
            total: account.total,
            change: account.change,
            account,
        };
        Ok(ApiResponse::success_with_message(
            response,
            format!("Cuenta generada exitosamente. Folio: {}", folio),
        ))
    }

    async fn find(&self, id: Uuid) -> Result<Table, AppError> {
        self.tables
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mesa no encontrada".to_string()))
    }

    async fn view(&self, table: Table) -> Result<TableView, AppError> {
        let orders = self.orders.billable_for_table(table.id).await?;
        Ok(TableView::build(table, &orders))
    }
}
