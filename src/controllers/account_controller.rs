use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::dto::account_dto::{
    AccountHistoryQuery, AccountHistoryResponse, CancelAccountRequest, CloseAccountRequest,
    CloseAccountResponse, HistoryFilters, ModifyAccountRequest, OpenAccountResponse,
};
use crate::dto::ApiResponse;
use crate::models::account::{
    Account, AccountModification, AccountStatus, Cancellation, ModificationAction, PaymentMethod,
    Settlement,
};
use crate::models::auth::Caller;
use crate::repositories::{AccountRepository, OrderRepository, ProductRepository};
use crate::services::authorization_service::{authorize, Action, Target};
use crate::services::billing_service::{
    compose_bill, parse_payment_method, plan_removal, settle_payment,
};
use crate::services::folio_allocator::FolioAllocator;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{parse_range_end, parse_range_start, require_min_chars, validate_date_range};

pub const MIN_REASON_CHARS: usize = 10;
const ACCOUNT_CLOSED: &str = "La cuenta ya está cerrada";

/// Parámetros de una liquidación
#[derive(Debug, Clone)]
pub struct SettleOptions {
    pub customer_name: Option<String>,
    pub number_of_people: Option<i32>,
    pub payment_method: PaymentMethod,
    pub cash_received: Option<Decimal>,
    /// Sin monto recibido en efectivo se asume pago exacto
    pub exact_cash_by_default: bool,
}

pub struct AccountController {
    accounts: Arc<dyn AccountRepository>,
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    folios: Arc<dyn FolioAllocator>,
    history_max_days: i64,
}

impl AccountController {
    pub fn new(state: &AppState) -> Self {
        Self {
            accounts: state.repos.accounts.clone(),
            orders: state.repos.orders.clone(),
            products: state.repos.products.clone(),
            folios: state.repos.folios.clone(),
            history_max_days: state.config.history_max_days,
        }
    }

    /// Cuenta abierta de una mesa con sus líneas vivas
    pub async fn get_open(&self, caller: &Caller, table_number: i32) -> Result<OpenAccountResponse, AppError> {
        authorize(caller, Action::ViewAccount, Target::None, "No tienes permiso para ver cuentas")?;
        let account = self.find_open(table_number).await?;
        self.open_view(account).await
    }

    pub async fn close(
        &self,
        caller: &Caller,
        table_number: i32,
        request: CloseAccountRequest,
    ) -> Result<ApiResponse<CloseAccountResponse>, AppError> {
        authorize(
            caller,
            Action::CloseAccount,
            Target::None,
            "No tienes permiso para cerrar cuentas",
        )?;
        request.validate()?;

        let options = SettleOptions {
            customer_name: None,
            number_of_people: None,
            payment_method: parse_payment_method(&request.payment_method)?,
            cash_received: request.cash_received,
            exact_cash_by_default: false,
        };
        let account = self.settle(caller, table_number, options).await?;

        let folio = account.folio.unwrap_or_default();
        let response = CloseAccountResponse {
            folio,
            total: account.total,
            change: account.change,
            account,
        };
        Ok(ApiResponse::success_with_message(
            response,
            format!("Cuenta cerrada exitosamente. Folio: {}", folio),
        ))
    }

    /// Único camino de liquidación: calcula, valida el pago, asigna folio y
    /// escribe todo en una sola operación del repositorio.
    pub async fn settle(&self, caller: &Caller, table_number: i32, options: SettleOptions) -> Result<Account, AppError> {
        let account = self
            .accounts
            .find_open_by_table(table_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No hay cuenta abierta para la mesa {}", table_number)))?;

        let orders = self.orders.billable_for_table(account.table_id).await?;
        let modifications = self.accounts.modifications(account.id).await?;
        let bill = compose_bill(&orders, &modifications);
        // Una cuenta sin pedidos solo se cobra si sus ajustes dejan consumo
        if orders.is_empty() && bill.lines.is_empty() {
            return Err(AppError::NotFound(format!(
                "No hay pedidos pendientes de cobro para la mesa {}",
                table_number
            )));
        }

        let cash_received = match (options.payment_method, options.cash_received) {
            (PaymentMethod::Cash, None) if options.exact_cash_by_default => Some(bill.total),
            (_, cash) => cash,
        };
        let payment = settle_payment(bill.total, options.payment_method, cash_received)?;

        // El folio se pide solo después de validar el pago
        let folio = self.folios.next_folio().await?;

        let settlement = Settlement {
            account_id: account.id,
            table_id: account.table_id,
            order_ids: orders.iter().map(|o| o.id).collect(),
            orders_subtotal: bill.subtotal,
            modification_ids: modifications.iter().map(|m| m.id).collect(),
            folio,
            customer_name: options
                .customer_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or(account.customer_name),
            number_of_people: options
                .number_of_people
                .filter(|n| *n > 0)
                .unwrap_or(account.number_of_people),
            waiter_name: account.waiter_name,
            items: bill.lines,
            subtotal: bill.subtotal,
            adjustments_total: bill.adjustments_total,
            total: bill.total,
            payment_method: payment.method,
            cash_received: payment.cash_received,
            change: payment.change,
            closed_by: caller.identifier.clone(),
            closed_at: Utc::now(),
        };

        let closed = self.accounts.settle(&settlement).await?;
        tracing::info!(
            folio,
            table_number,
            total = %closed.total,
            method = closed.payment_method.map(|m| m.as_str()).unwrap_or_default(),
            "💰 Cuenta cerrada"
        );
        Ok(closed)
    }

    /// Ajuste manual sobre la cuenta abierta
    pub async fn modify(
        &self,
        caller: &Caller,
        table_number: i32,
        request: ModifyAccountRequest,
    ) -> Result<ApiResponse<OpenAccountResponse>, AppError> {
        authorize(
            caller,
            Action::ModifyAccount,
            Target::None,
            "No tienes permiso para modificar cuentas",
        )?;
        request.validate()?;

        let account = self
            .accounts
            .find_open_by_table(table_number)
            .await?
            .ok_or_else(|| AppError::NotFound(ACCOUNT_CLOSED.to_string()))?;
        let product = self
            .products
            .find_by_id(request.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Producto no encontrado".to_string()))?;

        // Una devolución se registra por cada precio al que se cobró el producto
        let (pieces, reason) = match request.action {
            ModificationAction::Add => (
                vec![(product.price, request.quantity)],
                request.reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            ),
            ModificationAction::Remove => {
                let reason = require_min_chars(
                    request.reason.as_deref(),
                    MIN_REASON_CHARS,
                    "Debe especificar un motivo (mínimo 10 caracteres)",
                )?;
                let orders = self.orders.billable_for_table(account.table_id).await?;
                let modifications = self.accounts.modifications(account.id).await?;
                let bill = compose_bill(&orders, &modifications);

                let pieces = plan_removal(&bill, product.id, request.quantity).ok_or_else(|| {
                    AppError::Validation("No se pueden quitar más unidades de las que tiene la cuenta".to_string())
                })?;
                (pieces, Some(reason))
            }
        };

        let modified_at = Utc::now();
        let modifications: Vec<AccountModification> = pieces
            .into_iter()
            .map(|(unit_price, quantity)| AccountModification {
                id: Uuid::new_v4(),
                account_id: account.id,
                product_id: product.id,
                product_name: product.name.clone(),
                unit_price,
                action: request.action,
                quantity,
                reason: reason.clone(),
                modified_by: caller.identifier.clone(),
                modified_at,
            })
            .collect();
        if !self.accounts.add_modifications(&modifications).await? {
            return Err(AppError::NotFound(ACCOUNT_CLOSED.to_string()));
        }

        tracing::info!(
            table_number,
            action = ?request.action,
            product = %product.name,
            quantity = request.quantity,
            "Cuenta modificada"
        );
        let view = self.open_view(account).await?;
        Ok(ApiResponse::success_with_message(view, "Cuenta modificada exitosamente"))
    }

    pub async fn modifications(
        &self,
        caller: &Caller,
        table_number: i32,
    ) -> Result<Vec<AccountModification>, AppError> {
        authorize(caller, Action::ViewAccount, Target::None, "No tienes permiso para ver cuentas")?;
        let account = self.find_open(table_number).await?;
        self.accounts.modifications(account.id).await
    }

    /// Anula una cuenta cerrada; sus pedidos vuelven a quedar por cobrar
    pub async fn cancel(
        &self,
        caller: &Caller,
        folio: i64,
        request: CancelAccountRequest,
    ) -> Result<ApiResponse<Account>, AppError> {
        authorize(
            caller,
            Action::CancelAccount,
            Target::None,
            "Solo los administradores pueden cancelar cuentas",
        )?;
        let reason = require_min_chars(
            request.reason.as_deref(),
            MIN_REASON_CHARS,
            "El motivo de cancelación debe tener al menos 10 caracteres",
        )?;

        let account = self
            .accounts
            .cancel(&Cancellation {
                folio,
                reason,
                cancelled_by: caller.identifier.clone(),
                cancelled_at: Utc::now(),
            })
            .await?;

        tracing::warn!(folio, table_number = account.table_number, by = %caller.identifier, "Cuenta cancelada");
        Ok(ApiResponse::success_with_message(account, "Cuenta cancelada exitosamente"))
    }

    /// Cuentas cerradas o anuladas en un rango de fechas
    pub async fn history(&self, caller: &Caller, query: AccountHistoryQuery) -> Result<AccountHistoryResponse, AppError> {
        authorize(
            caller,
            Action::ViewHistory,
            Target::None,
            "Solo los administradores pueden consultar el historial",
        )?;

        let end = match query.end_date.as_deref() {
            Some(value) => parse_range_end(value)?,
            None => Utc::now(),
        };
        let start = match query.start_date.as_deref() {
            Some(value) => parse_range_start(value)?,
            None => end - Duration::days(1),
        };
        validate_date_range(start, end, self.history_max_days)?;

        let filters = HistoryFilters {
            folio: query.folio,
            table_number: query.table_number,
            waiter_name: query.waiter_name.filter(|w| !w.trim().is_empty()),
            payment_method: query
                .payment_method
                .as_deref()
                .map(parse_payment_method)
                .transpose()?,
        };

        let accounts: Vec<Account> = self
            .accounts
            .closed_between(start, end)
            .await?
            .into_iter()
            .filter(|a| filters.matches(a))
            .collect();

        let (closed, cancelled): (Vec<&Account>, Vec<&Account>) = accounts
            .iter()
            .partition(|a| a.status == AccountStatus::Closed);

        Ok(AccountHistoryResponse {
            start_date: start,
            end_date: end,
            count: accounts.len(),
            total_amount: closed.iter().map(|a| a.total).sum(),
            cancelled_count: cancelled.len(),
            cancelled_amount: cancelled.iter().map(|a| a.total).sum(),
            accounts,
        })
    }

    async fn find_open(&self, table_number: i32) -> Result<Account, AppError> {
        self.accounts
            .find_open_by_table(table_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No hay cuenta abierta para la mesa {}", table_number)))
    }

    async fn open_view(&self, mut account: Account) -> Result<OpenAccountResponse, AppError> {
        let orders = self.orders.billable_for_table(account.table_id).await?;
        let modifications = self.accounts.modifications(account.id).await?;
        let bill = compose_bill(&orders, &modifications);

        account.items = bill.lines;
        account.subtotal = bill.subtotal;
        account.adjustments_total = bill.adjustments_total;
        account.total = bill.total;

        Ok(OpenAccountResponse {
            account,
            orders,
            modifications,
        })
    }
}
