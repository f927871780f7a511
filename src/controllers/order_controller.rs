use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::order_dto::{
    CreateOrderRequest, OrderItemRequest, OrderListQuery, OrderListResponse, UpdateOrderRequest,
};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::models::order::{NewOrder, Order, OrderFilters, OrderItem};
use crate::repositories::{OrderRepository, ProductRepository};
use crate::services::authorization_service::{authorize, can_perform, Action, Target};
use crate::state::AppState;
use crate::utils::errors::AppError;

const NOT_NEW: &str = "Solo se pueden modificar pedidos que no han entrado a cocina ni se han cobrado";

pub struct OrderController {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
}

impl OrderController {
    pub fn new(state: &AppState) -> Self {
        Self {
            orders: state.repos.orders.clone(),
            products: state.repos.products.clone(),
        }
    }

    /// Crea el pedido y sienta (o reutiliza) la mesa en la misma operación
    pub async fn create(
        &self,
        caller: &Caller,
        request: CreateOrderRequest,
    ) -> Result<ApiResponse<Order>, AppError> {
        authorize(
            caller,
            Action::CreateOrder,
            Target::None,
            "Solo meseros y administradores pueden crear pedidos",
        )?;
        request.validate()?;

        let table_number = request
            .table_number
            .ok_or_else(|| AppError::Validation("El número de mesa es requerido".to_string()))?;
        let items = self.resolve_items(&request.items).await?;

        let order = Order::new(
            NewOrder {
                table_number,
                customer_name: request.customer_name.trim().to_string(),
                number_of_people: request.number_of_people,
                items,
                observations: request.observations,
            },
            caller,
        );

        let (order, table) = self.orders.create_with_table(order).await?;
        tracing::info!(
            order_id = %order.id,
            table_number = table.table_number,
            total = %order.total,
            "🧾 Pedido creado"
        );

        Ok(ApiResponse::success_with_message(order, "Pedido creado exitosamente"))
    }

    pub async fn get_by_id(&self, caller: &Caller, id: Uuid) -> Result<Order, AppError> {
        let order = self.find(id).await?;
        authorize(
            caller,
            Action::ReadOrder,
            Target::Order { waiter_id: order.waiter_id },
            "No tienes permiso para ver este pedido",
        )?;
        Ok(order)
    }

    /// Los meseros solo ven sus propios pedidos
    pub async fn list(&self, caller: &Caller, query: OrderListQuery) -> Result<OrderListResponse, AppError> {
        let waiter_id = if can_perform(caller, Action::ListAllOrders, Target::None) {
            None
        } else {
            Some(caller.id)
        };

        let filters = OrderFilters {
            waiter_id,
            table_number: query.table_number,
            status: query.status,
        };
        let orders = self.orders.list(&filters).await?;

        Ok(OrderListResponse {
            count: orders.len(),
            orders,
        })
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<ApiResponse<Order>, AppError> {
        let mut order = self.find(id).await?;
        authorize(
            caller,
            Action::EditOrder,
            Target::Order { waiter_id: order.waiter_id },
            "No tienes permiso para editar este pedido",
        )?;
        if !order.is_editable() {
            return Err(AppError::Forbidden(NOT_NEW.to_string()));
        }
        request.validate()?;

        if let Some(items) = request.items.as_deref() {
            let items = self.resolve_items(items).await?;
            order.set_items(items);
        }
        if let Some(observations) = request.observations {
            order.observations = observations;
        }

        // La cocina pudo tomar el pedido entre la lectura y la escritura
        let order = self
            .orders
            .update_contents(&order)
            .await?
            .ok_or_else(|| AppError::Forbidden(NOT_NEW.to_string()))?;

        Ok(ApiResponse::success_with_message(order, "Pedido actualizado exitosamente"))
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        let order = self.find(id).await?;
        authorize(
            caller,
            Action::DeleteOrder,
            Target::Order { waiter_id: order.waiter_id },
            "Solo el mesero que creó el pedido puede eliminarlo",
        )?;
        if !order.is_editable() || !self.orders.delete_new(order.id).await? {
            return Err(AppError::Forbidden(NOT_NEW.to_string()));
        }

        tracing::info!(order_id = %order.id, table_number = order.table_number, "Pedido eliminado");
        Ok(ApiResponse::message_only("Pedido eliminado exitosamente"))
    }

    /// Copia nombre y precio del catálogo; valida existencia y disponibilidad
    async fn resolve_items(&self, requested: &[OrderItemRequest]) -> Result<Vec<OrderItem>, AppError> {
        if requested.is_empty() {
            return Err(AppError::Validation("El pedido debe tener al menos un producto".to_string()));
        }
        for item in requested {
            item.validate()?;
        }

        let ids: Vec<Uuid> = requested.iter().map(|i| i.product_id).collect();
        let products = self.products.find_by_ids(&ids).await?;

        requested
            .iter()
            .map(|item| {
                let product = products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .ok_or_else(|| AppError::NotFound(format!("Producto {} no encontrado", item.product_id)))?;
                if !product.available {
                    return Err(AppError::Validation(format!(
                        "El producto {} no está disponible",
                        product.name
                    )));
                }
                Ok(OrderItem {
                    product_id: product.id,
                    name: product.name.clone(),
                    price: product.price,
                    quantity: item.quantity,
                    notes: item.notes.trim().to_string(),
                })
            })
            .collect()
    }

    async fn find(&self, id: Uuid) -> Result<Order, AppError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))
    }
}
