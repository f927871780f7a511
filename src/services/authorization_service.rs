//! Política de autorización
//!
//! Una sola función decide qué puede hacer cada rol. Los controladores la
//! consultan a través de `authorize` antes de cualquier escritura.

use uuid::Uuid;

use crate::models::auth::{Caller, UserRole};
use crate::utils::errors::AppError;

/// Acciones sujetas a permiso
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageProducts,
    ManageUsers,
    CreateOrder,
    ReadOrder,
    EditOrder,
    DeleteOrder,
    ListAllOrders,
    SeatTable,
    CloseTable,
    GenerateBill,
    OperateKitchen,
    ViewAccount,
    CloseAccount,
    ModifyAccount,
    CancelAccount,
    ViewHistory,
    PrintTicket,
}

/// Entidad sobre la que se actúa, cuando la decisión depende de ella
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    None,
    /// Pedido, identificado por su mesero
    Order { waiter_id: Uuid },
    /// Usuario administrado, identificado por su rol
    User { role: UserRole },
}

/// Decide si `caller` puede ejecutar `action` sobre `target`
pub fn can_perform(caller: &Caller, action: Action, target: Target) -> bool {
    use Action::*;
    use UserRole::*;

    let owns_order = match target {
        Target::Order { waiter_id } => waiter_id == caller.id,
        _ => false,
    };

    match (caller.role, action) {
        // Nadie administra cuentas de administrador desde gestión de usuarios
        (Administrator, ManageUsers) => !matches!(target, Target::User { role: Administrator }),
        (Administrator, DeleteOrder) => false,
        (Administrator, _) => true,

        (Waiter, CreateOrder | SeatTable | CloseTable | GenerateBill) => true,
        (Waiter, ReadOrder | EditOrder | DeleteOrder) => owns_order,
        (Waiter, ViewAccount | CloseAccount | ModifyAccount | PrintTicket) => true,
        (Waiter, _) => false,

        (Kitchen, OperateKitchen | ReadOrder | ListAllOrders | ViewAccount) => true,
        (Kitchen, _) => false,
    }
}

/// Igual que `can_perform`, pero devuelve `Forbidden` con el mensaje dado
pub fn authorize(caller: &Caller, action: Action, target: Target, message: &str) -> Result<(), AppError> {
    if can_perform(caller, action, target) {
        Ok(())
    } else {
        tracing::warn!(
            caller = %caller.identifier,
            role = caller.role.as_str(),
            action = ?action,
            "Acceso denegado"
        );
        Err(AppError::Forbidden(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: UserRole) -> Caller {
        Caller {
            id: Uuid::new_v4(),
            identifier: role.as_str().to_string(),
            role,
            name: "Usuario".into(),
        }
    }

    #[test]
    fn test_admin_can_do_almost_everything() {
        let admin = caller(UserRole::Administrator);
        for action in [
            Action::ManageProducts,
            Action::CreateOrder,
            Action::EditOrder,
            Action::ListAllOrders,
            Action::OperateKitchen,
            Action::CancelAccount,
            Action::ViewHistory,
        ] {
            assert!(can_perform(&admin, action, Target::None), "{:?}", action);
        }
        assert!(can_perform(&admin, Action::ManageUsers, Target::User { role: UserRole::Waiter }));
        assert!(!can_perform(&admin, Action::ManageUsers, Target::User { role: UserRole::Administrator }));
        assert!(!can_perform(&admin, Action::DeleteOrder, Target::Order { waiter_id: admin.id }));
    }

    #[test]
    fn test_waiters_only_touch_their_own_orders() {
        let waiter = caller(UserRole::Waiter);
        let own = Target::Order { waiter_id: waiter.id };
        let other = Target::Order { waiter_id: Uuid::new_v4() };

        assert!(can_perform(&waiter, Action::EditOrder, own));
        assert!(can_perform(&waiter, Action::DeleteOrder, own));
        assert!(!can_perform(&waiter, Action::EditOrder, other));
        assert!(!can_perform(&waiter, Action::ReadOrder, other));
        assert!(!can_perform(&waiter, Action::ListAllOrders, Target::None));
        assert!(!can_perform(&waiter, Action::CancelAccount, Target::None));
        assert!(!can_perform(&waiter, Action::OperateKitchen, Target::None));
    }

    #[test]
    fn test_kitchen_scope() {
        let kitchen = caller(UserRole::Kitchen);
        assert!(can_perform(&kitchen, Action::OperateKitchen, Target::None));
        assert!(can_perform(&kitchen, Action::ListAllOrders, Target::None));
        assert!(!can_perform(&kitchen, Action::CreateOrder, Target::None));
        assert!(!can_perform(&kitchen, Action::EditOrder, Target::Order { waiter_id: kitchen.id }));
        assert!(!can_perform(&kitchen, Action::CloseAccount, Target::None));
    }

    #[test]
    fn test_authorize_maps_to_forbidden() {
        let kitchen = caller(UserRole::Kitchen);
        let err = authorize(&kitchen, Action::ManageProducts, Target::None, "Solo administradores").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Solo administradores"));
    }
}
