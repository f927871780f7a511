use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::dto::kitchen_dto::{KitchenCancelRequest, KitchenOrder, KitchenOrdersResponse, KitchenQuery};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::models::order::{KitchenTransition, Order};
use crate::repositories::OrderRepository;
use crate::services::authorization_service::{authorize, Action, Target};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::require_min_chars;

const KITCHEN_ONLY: &str = "Solo cocina y administradores pueden operar la cocina";
pub const MIN_INGREDIENT_CHARS: usize = 5;

pub struct KitchenController {
    orders: Arc<dyn OrderRepository>,
}

impl KitchenController {
    pub fn new(state: &AppState) -> Self {
        Self {
            orders: state.repos.orders.clone(),
        }
    }

    /// Pedidos pendientes en cocina, más antiguos primero
    pub async fn list(&self, caller: &Caller, query: KitchenQuery) -> Result<KitchenOrdersResponse, AppError> {
        authorize(caller, Action::OperateKitchen, Target::None, KITCHEN_ONLY)?;

        let now = Utc::now();
        let orders: Vec<KitchenOrder> = self
            .orders
            .list_kitchen(query.status)
            .await?
            .into_iter()
            .map(|order| KitchenOrder::from_order(order, now))
            .collect();

        Ok(KitchenOrdersResponse {
            count: orders.len(),
            orders,
        })
    }

    pub async fn mark_in_progress(&self, caller: &Caller, id: Uuid) -> Result<ApiResponse<Order>, AppError> {
        authorize(caller, Action::OperateKitchen, Target::None, KITCHEN_ONLY)?;
        let transition = KitchenTransition::Start {
            by: caller.identifier.clone(),
            at: Utc::now(),
        };
        let order = self.transition(id, &transition).await?;
        Ok(ApiResponse::success_with_message(order, "Pedido en preparación"))
    }

    pub async fn mark_ready(&self, caller: &Caller, id: Uuid) -> Result<ApiResponse<Order>, AppError> {
        authorize(caller, Action::OperateKitchen, Target::None, KITCHEN_ONLY)?;
        let transition = KitchenTransition::Ready {
            by: caller.identifier.clone(),
            at: Utc::now(),
        };
        let order = self.transition(id, &transition).await?;
        Ok(ApiResponse::success_with_message(order, "Pedido listo"))
    }

    /// El ingrediente faltante se valida antes que el estado del pedido
    pub async fn cancel(
        &self,
        caller: &Caller,
        id: Uuid,
        request: KitchenCancelRequest,
    ) -> Result<ApiResponse<Order>, AppError> {
        authorize(caller, Action::OperateKitchen, Target::None, KITCHEN_ONLY)?;

        let missing_ingredient = require_min_chars(
            request.missing_ingredient.as_deref(),
            MIN_INGREDIENT_CHARS,
            "Debe especificar el ingrediente faltante (mínimo 5 caracteres)",
        )?;
        let reason = request
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let transition = KitchenTransition::Cancel {
            by: caller.identifier.clone(),
            at: Utc::now(),
            missing_ingredient,
            reason,
        };
        let order = self.transition(id, &transition).await?;
        Ok(ApiResponse::success_with_message(order, "Pedido cancelado por cocina"))
    }

    async fn transition(&self, id: Uuid, transition: &KitchenTransition) -> Result<Order, AppError> {
        if self.orders.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Pedido no encontrado".to_string()));
        }

        let order = self
            .orders
            .apply_transition(id, transition)
            .await?
            .ok_or_else(|| AppError::InvalidState(transition.rejection_message().to_string()))?;

        tracing::info!(
            order_id = %order.id,
            status = order.status.as_str(),
            by = %caller_name(transition),
            "👨‍🍳 Transición de cocina"
        );
        Ok(order)
    }
}

fn caller_name(transition: &KitchenTransition) -> &str {
    match transition {
        KitchenTransition::Start { by, .. }
        | KitchenTransition::Ready { by, .. }
        | KitchenTransition::Cancel { by, .. } => by,
    }
}
