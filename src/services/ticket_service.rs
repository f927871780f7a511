//! Tickets de venta
//!
//! Convierte una cuenta cerrada en un `Ticket`, lo renderiza a texto de ancho
//! fijo y lo entrega a la impresora configurada. Un fallo de impresión nunca
//! invalida el cierre de la cuenta.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::models::account::{Account, AccountStatus, BillLine};

pub const TICKET_WIDTH: usize = 40;
pub const PRINTER_UNAVAILABLE: &str = "Cuenta guardada correctamente. Impresora no disponible";
pub const PRINTED: &str = "Ticket enviado a la impresora";

/// Datos del ticket
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub restaurant_name: String,
    pub restaurant_address: String,
    pub folio: i64,
    pub date: String,
    pub time: String,
    pub waiter_name: String,
    pub table_number: i32,
    pub customer_name: String,
    pub lines: Vec<BillLine>,
    pub subtotal: Decimal,
    pub adjustments_total: Decimal,
    pub total: Decimal,
    pub payment_method: String,
    pub cash_received: Option<Decimal>,
    pub change: Decimal,
    pub cancelled: bool,
}

impl Ticket {
    /// Solo las cuentas con folio tienen ticket
    pub fn from_account(account: &Account, restaurant_name: &str, restaurant_address: &str) -> Option<Self> {
        let folio = account.folio?;
        let closed_at: DateTime<Utc> = account.closed_at.unwrap_or(account.opened_at);

        Some(Self {
            restaurant_name: restaurant_name.to_string(),
            restaurant_address: restaurant_address.to_string(),
            folio,
            date: closed_at.format("%d/%m/%Y").to_string(),
            time: closed_at.format("%H:%M").to_string(),
            waiter_name: account.waiter_name.clone(),
            table_number: account.table_number,
            customer_name: account.customer_name.clone(),
            lines: account.items.clone(),
            subtotal: account.subtotal,
            adjustments_total: account.adjustments_total,
            total: account.total,
            payment_method: account
                .payment_method
                .map(|m| m.label().to_string())
                .unwrap_or_default(),
            cash_received: account.cash_received,
            change: account.change,
            cancelled: account.status == AccountStatus::Cancelled,
        })
    }

    /// Texto de ancho fijo listo para la impresora
    pub fn render(&self) -> String {
        let rule = "-".repeat(TICKET_WIDTH);
        let mut out: Vec<String> = Vec::new();

        out.push(center(&self.restaurant_name));
        if !self.restaurant_address.is_empty() {
            out.push(center(&self.restaurant_address));
        }
        out.push(rule.clone());
        out.push(two_columns(&format!("Folio: {:06}", self.folio), &format!("Fecha: {}", self.date)));
        out.push(two_columns(&format!("Mesa: {}", self.table_number), &format!("Hora: {}", self.time)));
        out.push(format!("Mesero: {}", self.waiter_name));
        if !self.customer_name.trim().is_empty() {
            out.push(format!("Cliente: {}", self.customer_name));
        }
        if self.cancelled {
            out.push(center("*** CUENTA CANCELADA ***"));
        }
        out.push(rule.clone());
        out.push(format!("{:>4} {:<17} {:>8} {:>8}", "Cant", "Producto", "P.U.", "Importe"));
        for line in &self.lines {
            let name: String = line.name.chars().take(17).collect();
            out.push(format!(
                "{:>4} {:<17} {:>8} {:>8}",
                line.quantity,
                name,
                money(line.unit_price),
                money(line.amount)
            ));
        }
        out.push(rule.clone());
        out.push(total_row("Subtotal:", self.subtotal));
        if !self.adjustments_total.is_zero() {
            out.push(total_row("Ajustes:", self.adjustments_total));
        }
        out.push(total_row("TOTAL:", self.total));
        out.push(format!("Pago: {}", self.payment_method));
        if let Some(received) = self.cash_received {
            out.push(format!("Recibido: {}", money(received)));
            out.push(format!("Cambio: {}", money(self.change)));
        }
        out.push("=".repeat(TICKET_WIDTH));
        out.push(center("¡Gracias por su visita!"));

        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn center(text: &str) -> String {
    format!("{:^width$}", text, width = TICKET_WIDTH).trim_end().to_string()
}

fn two_columns(left: &str, right: &str) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = TICKET_WIDTH.saturating_sub(used).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

fn total_row(label: &str, value: Decimal) -> String {
    format!("{:>30} {:>9}", label, money(value))
}

/// Destino de impresión
#[async_trait]
pub trait TicketPrinter: Send + Sync {
    async fn print(&self, folio: i64, text: &str) -> anyhow::Result<()>;
}

/// Impresora de cola: deja cada ticket como archivo en un directorio
pub struct SpoolPrinter {
    dir: PathBuf,
}

impl SpoolPrinter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl TicketPrinter for SpoolPrinter {
    async fn print(&self, folio: i64, text: &str) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let file = self
            .dir
            .join(format!("ticket-{:06}-{}.txt", folio, Utc::now().format("%Y%m%d%H%M%S%3f")));
        tokio::fs::write(&file, text).await?;
        info!(folio, path = %file.display(), "Ticket en cola de impresión");
        Ok(())
    }
}

/// Resultado de intentar imprimir
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOutcome {
    pub printed: bool,
    pub message: String,
}

/// Imprime si hay impresora; cualquier fallo se degrada a `printed = false`
pub async fn print_ticket(printer: Option<&dyn TicketPrinter>, ticket: &Ticket) -> PrintOutcome {
    let Some(printer) = printer else {
        return PrintOutcome {
            printed: false,
            message: PRINTER_UNAVAILABLE.to_string(),
        };
    };

    match printer.print(ticket.folio, &ticket.render()).await {
        Ok(()) => PrintOutcome {
            printed: true,
            message: PRINTED.to_string(),
        },
        Err(e) => {
            warn!(folio = ticket.folio, error = %e, "No se pudo imprimir el ticket");
            PrintOutcome {
                printed: false,
                message: PRINTER_UNAVAILABLE.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::PaymentMethod;
    use crate::models::table::{Seating, Table};
    use crate::models::auth::{Caller, UserRole};
    use uuid::Uuid;

    fn closed_account() -> Account {
        let waiter = Caller {
            id: Uuid::new_v4(),
            identifier: "ana".into(),
            role: UserRole::Waiter,
            name: "Ana López".into(),
        };
        let table = Table::occupy(&Seating::new(7, "Familia Pérez".into(), 3, &waiter));
        let mut account = Account::open_for(&table);
        account.folio = Some(12);
        account.items = vec![BillLine {
            product_id: Uuid::new_v4(),
            name: "Mojarra Frita con ensalada de la casa".into(),
            unit_price: Decimal::new(85, 0),
            quantity: 2,
            amount: Decimal::new(170, 0),
        }];
        account.subtotal = Decimal::new(170, 0);
        account.total = Decimal::new(170, 0);
        account.payment_method = Some(PaymentMethod::Cash);
        account.cash_received = Some(Decimal::new(200, 0));
        account.change = Decimal::new(30, 0);
        account.status = AccountStatus::Closed;
        account.closed_at = Some(Utc::now());
        account
    }

    struct BrokenPrinter;

    #[async_trait]
    impl TicketPrinter for BrokenPrinter {
        async fn print(&self, _folio: i64, _text: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("sin papel"))
        }
    }

    #[test]
    fn test_open_accounts_have_no_ticket() {
        let mut account = closed_account();
        account.folio = None;
        assert!(Ticket::from_account(&account, "El Alevin", "").is_none());
    }

    #[test]
    fn test_render_fits_width() {
        let ticket = Ticket::from_account(&closed_account(), "El Alevin", "Malecón 12").unwrap();
        let text = ticket.render();

        assert!(text.contains("Folio: 000012"));
        assert!(text.contains("Efectivo"));
        assert!(text.contains("Cambio: 30.00"));
        for line in text.lines() {
            assert!(line.chars().count() <= TICKET_WIDTH, "línea demasiado larga: {:?}", line);
        }
    }

    #[tokio::test]
    async fn test_missing_or_broken_printer_degrades() {
        let ticket = Ticket::from_account(&closed_account(), "El Alevin", "").unwrap();

        let outcome = print_ticket(None, &ticket).await;
        assert!(!outcome.printed);
        assert_eq!(outcome.message, PRINTER_UNAVAILABLE);

        let outcome = print_ticket(Some(&BrokenPrinter), &ticket).await;
        assert!(!outcome.printed);
    }

    #[tokio::test]
    async fn test_spool_printer_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let printer = SpoolPrinter::new(dir.path().join("spool"));
        let ticket = Ticket::from_account(&closed_account(), "El Alevin", "").unwrap();

        let outcome = print_ticket(Some(&printer), &ticket).await;
        assert!(outcome.printed);

        let mut entries = std::fs::read_dir(dir.path().join("spool")).unwrap();
        let file = entries.next().unwrap().unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("El Alevin"));
    }
}
