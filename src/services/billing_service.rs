//! Cálculo de cuentas
//!
//! Reglas puras de facturación: agrupación de líneas, ajustes manuales y
//! validación del pago. No toca almacenamiento.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::account::{AccountModification, BillLine, ModificationAction, PaymentMethod};
use crate::models::order::Order;
use crate::utils::errors::AppError;
use crate::utils::validation::round_money;

/// Cuenta calculada a partir de pedidos y ajustes
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    pub lines: Vec<BillLine>,
    pub subtotal: Decimal,
    pub adjustments_total: Decimal,
    pub total: Decimal,
}

/// Pago validado
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub method: PaymentMethod,
    pub cash_received: Option<Decimal>,
    pub change: Decimal,
}

/// Arma la cuenta: líneas de pedidos por cobrar más los ajustes manuales.
/// `subtotal` suma los pedidos y `adjustments_total` los ajustes con signo.
pub fn compose_bill(orders: &[Order], modifications: &[AccountModification]) -> Bill {
    let mut lines: Vec<BillLine> = Vec::new();
    let mut subtotal = Decimal::ZERO;

    // Las líneas quedan en el orden en que se pidieron
    let mut billable: Vec<&Order> = orders.iter().filter(|o| o.is_billable()).collect();
    billable.sort_by_key(|o| o.created_at);

    for order in billable {
        subtotal += order.total;
        for item in &order.items {
            add_units(&mut lines, item.product_id, &item.name, item.price, item.quantity);
        }
    }

    // Los ajustes solo cuentan por las unidades que realmente entran o salen de las líneas
    let mut adjustments_total = Decimal::ZERO;
    for modification in modifications {
        match modification.action {
            ModificationAction::Add => {
                adjustments_total += modification.signed_amount();
                add_units(
                    &mut lines,
                    modification.product_id,
                    &modification.product_name,
                    modification.unit_price,
                    modification.quantity,
                );
            }
            ModificationAction::Remove => {
                let taken = remove_units(
                    &mut lines,
                    modification.product_id,
                    modification.unit_price,
                    modification.quantity,
                );
                adjustments_total -= modification.unit_price * Decimal::from(taken);
            }
        }
    }

    lines.retain(|line| line.quantity > 0);
    let subtotal = round_money(subtotal);
    let adjustments_total = round_money(adjustments_total);

    Bill {
        lines,
        subtotal,
        adjustments_total,
        total: round_money(subtotal + adjustments_total),
    }
}

/// Unidades de un producto que la cuenta lleva en este momento
pub fn quantity_on_bill(bill: &Bill, product_id: Uuid) -> i32 {
    bill.lines
        .iter()
        .filter(|line| line.product_id == product_id)
        .map(|line| line.quantity)
        .sum()
}

/// Reparte una devolución entre las líneas del producto, de la más reciente a
/// la más antigua. Devuelve `(precio unitario, unidades)` por línea, o `None`
/// si la cuenta no tiene suficientes unidades.
pub fn plan_removal(bill: &Bill, product_id: Uuid, quantity: i32) -> Option<Vec<(Decimal, i32)>> {
    if quantity <= 0 || quantity_on_bill(bill, product_id) < quantity {
        return None;
    }

    let mut pending = quantity;
    let mut plan = Vec::new();
    for line in bill.lines.iter().rev().filter(|l| l.product_id == product_id && l.quantity > 0) {
        if pending == 0 {
            break;
        }
        let taken = pending.min(line.quantity);
        plan.push((line.unit_price, taken));
        pending -= taken;
    }
    Some(plan)
}

/// Valida el pago contra el total y calcula el cambio
pub fn settle_payment(
    total: Decimal,
    method: PaymentMethod,
    cash_received: Option<Decimal>,
) -> Result<Payment, AppError> {
    match method {
        PaymentMethod::Cash => {
            let received = cash_received
                .map(round_money)
                .filter(|received| *received >= total)
                .ok_or_else(|| AppError::Validation("Monto recibido insuficiente".to_string()))?;
            Ok(Payment {
                method,
                cash_received: Some(received),
                change: round_money(received - total),
            })
        }
        PaymentMethod::DebitCard | PaymentMethod::CreditCard => Ok(Payment {
            method,
            cash_received: None,
            change: Decimal::ZERO,
        }),
    }
}

/// Interpreta el método de pago recibido como texto
pub fn parse_payment_method(value: &str) -> Result<PaymentMethod, AppError> {
    PaymentMethod::from_str(value.trim())
        .ok_or_else(|| AppError::Validation("Método de pago inválido".to_string()))
}

fn add_units(lines: &mut Vec<BillLine>, product_id: Uuid, name: &str, unit_price: Decimal, quantity: i32) {
    match lines
        .iter_mut()
        .find(|line| line.product_id == product_id && line.unit_price == unit_price)
    {
        Some(line) => {
            line.quantity += quantity;
            line.amount = round_money(line.unit_price * Decimal::from(line.quantity));
        }
        None => lines.push(BillLine {
            product_id,
            name: name.to_string(),
            unit_price,
            quantity,
            amount: round_money(unit_price * Decimal::from(quantity)),
        }),
    }
}

// Descuenta solo de la línea con ese precio; devuelve las unidades quitadas
fn remove_units(lines: &mut [BillLine], product_id: Uuid, unit_price: Decimal, quantity: i32) -> i32 {
    match lines
        .iter_mut()
        .find(|line| line.product_id == product_id && line.unit_price == unit_price)
    {
        Some(line) => {
            let taken = quantity.min(line.quantity).max(0);
            line.quantity -= taken;
            line.amount = round_money(line.unit_price * Decimal::from(line.quantity));
            taken
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{Caller, UserRole};
    use crate::models::order::{NewOrder, OrderItem, OrderStatus};
    use chrono::Utc;

    fn caller() -> Caller {
        Caller {
            id: Uuid::new_v4(),
            identifier: "ana".into(),
            role: UserRole::Waiter,
            name: "Ana".into(),
        }
    }

    fn order(items: Vec<(Uuid, i64, i32)>) -> Order {
        Order::new(
            NewOrder {
                table_number: 7,
                customer_name: String::new(),
                number_of_people: 2,
                items: items
                    .into_iter()
                    .map(|(product_id, price, quantity)| OrderItem {
                        product_id,
                        name: format!("p-{}", price),
                        price: Decimal::new(price, 0),
                        quantity,
                        notes: String::new(),
                    })
                    .collect(),
                observations: String::new(),
            },
            &caller(),
        )
    }

    fn modification(product_id: Uuid, price: i64, action: ModificationAction, quantity: i32) -> AccountModification {
        AccountModification {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            product_id,
            product_name: "ajuste".into(),
            unit_price: Decimal::new(price, 0),
            action,
            quantity,
            reason: None,
            modified_by: "admin".into(),
            modified_at: Utc::now(),
        }
    }

    #[test]
    fn test_lines_are_grouped_by_product_and_price() {
        let mojarra = Uuid::new_v4();
        let coca = Uuid::new_v4();
        let orders = vec![order(vec![(mojarra, 60, 2), (coca, 30, 1)]), order(vec![(coca, 30, 1)])];

        let bill = compose_bill(&orders, &[]);
        assert_eq!(bill.lines.len(), 2);
        assert_eq!(quantity_on_bill(&bill, coca), 2);
        assert_eq!(bill.subtotal, Decimal::new(180, 0));
        assert_eq!(bill.total, Decimal::new(180, 0));
    }

    #[test]
    fn test_cancelled_orders_are_left_out() {
        let p = Uuid::new_v4();
        let mut cancelled = order(vec![(p, 50, 1)]);
        cancelled.status = OrderStatus::Cancelled;
        let bill = compose_bill(&[order(vec![(p, 10, 1)]), cancelled], &[]);
        assert_eq!(bill.total, Decimal::new(10, 0));
    }

    #[test]
    fn test_modifications_change_the_total() {
        let p = Uuid::new_v4();
        let extra = Uuid::new_v4();
        let orders = vec![order(vec![(p, 60, 2)])];
        let mods = vec![
            modification(extra, 25, ModificationAction::Add, 2),
            modification(p, 60, ModificationAction::Remove, 1),
        ];

        let bill = compose_bill(&orders, &mods);
        assert_eq!(bill.subtotal, Decimal::new(120, 0));
        assert_eq!(bill.adjustments_total, Decimal::new(-10, 0));
        assert_eq!(bill.total, Decimal::new(110, 0));
        assert_eq!(quantity_on_bill(&bill, p), 1);
        assert_eq!(quantity_on_bill(&bill, extra), 2);
    }

    #[test]
    fn test_fully_removed_lines_disappear() {
        let p = Uuid::new_v4();
        let bill = compose_bill(
            &[order(vec![(p, 15, 1)])],
            &[modification(p, 15, ModificationAction::Remove, 1)],
        );
        assert!(bill.lines.is_empty());
        assert_eq!(bill.total, Decimal::ZERO);
        assert_eq!(plan_removal(&bill, p, 1), None);
    }

    #[test]
    fn test_removal_spans_price_lines() {
        let p = Uuid::new_v4();
        let orders = vec![order(vec![(p, 60, 1)]), order(vec![(p, 70, 1)])];
        let bill = compose_bill(&orders, &[]);

        let plan = plan_removal(&bill, p, 2).unwrap();
        assert_eq!(plan.len(), 2);
        assert!(plan.contains(&(Decimal::new(60, 0), 1)));
        assert!(plan.contains(&(Decimal::new(70, 0), 1)));
        assert_eq!(plan_removal(&bill, p, 3), None);

        let mods: Vec<AccountModification> = plan
            .into_iter()
            .map(|(price, quantity)| AccountModification {
                unit_price: price,
                quantity,
                ..modification(p, 0, ModificationAction::Remove, 1)
            })
            .collect();
        let bill = compose_bill(&orders, &mods);
        assert!(bill.lines.is_empty());
        assert_eq!(bill.subtotal, Decimal::new(130, 0));
        assert_eq!(bill.adjustments_total, Decimal::new(-130, 0));
        assert_eq!(bill.total, Decimal::ZERO);
    }

    #[test]
    fn test_removal_without_matching_line_changes_nothing() {
        let p = Uuid::new_v4();
        let orders = vec![order(vec![(p, 60, 2)])];
        let bill = compose_bill(&orders, &[modification(p, 70, ModificationAction::Remove, 2)]);
        assert_eq!(bill.adjustments_total, Decimal::ZERO);
        assert_eq!(bill.total, Decimal::new(120, 0));
        assert_eq!(quantity_on_bill(&bill, p), 2);
    }

    #[test]
    fn test_cash_must_cover_total() {
        let total = Decimal::new(200, 0);
        let err = settle_payment(total, PaymentMethod::Cash, Some(Decimal::new(150, 0))).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Monto recibido insuficiente"));
        assert!(settle_payment(total, PaymentMethod::Cash, None).is_err());

        let payment = settle_payment(total, PaymentMethod::Cash, Some(Decimal::new(250, 0))).unwrap();
        assert_eq!(payment.change, Decimal::new(50, 0));
    }

    #[test]
    fn test_cards_have_no_change() {
        let payment = settle_payment(Decimal::new(99, 0), PaymentMethod::CreditCard, Some(Decimal::new(500, 0))).unwrap();
        assert_eq!(payment.change, Decimal::ZERO);
        assert_eq!(payment.cash_received, None);
    }

    #[test]
    fn test_parse_payment_method() {
        assert_eq!(parse_payment_method(" cash ").unwrap(), PaymentMethod::Cash);
        assert!(matches!(parse_payment_method("cheque"), Err(AppError::Validation(_))));
    }
}
