//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use validator::ValidationError;

use crate::utils::errors::AppError;

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar y convertir string a datetime
pub fn validate_datetime(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"RFC3339".to_string());
            error
        })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un precio no sea negativo
pub fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("price");
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Redondear un importe a centavos
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Exigir un texto con un mínimo de caracteres (sin contar espacios extremos)
pub fn require_min_chars(value: Option<&str>, min: usize, message: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(text) if text.chars().count() >= min => Ok(text.to_string()),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

/// Interpretar el inicio de un rango: fecha simple (inicio del día) o RFC3339
pub fn parse_range_start(value: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(date) = validate_date(value) {
        if let Some(start) = date.and_hms_opt(0, 0, 0) {
            return Ok(start.and_utc());
        }
    }
    validate_datetime(value).map_err(|_| AppError::Validation(format!("Fecha inválida: {}", value)))
}

/// Interpretar el fin de un rango: fecha simple (fin del día) o RFC3339
pub fn parse_range_end(value: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(date) = validate_date(value) {
        if let Some(end) = date.and_hms_milli_opt(23, 59, 59, 999) {
            return Ok(end.and_utc());
        }
    }
    validate_datetime(value).map_err(|_| AppError::Validation(format!("Fecha inválida: {}", value)))
}

/// Validar un rango de fechas con un máximo de días
pub fn validate_date_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    max_days: i64,
) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::Validation(
            "La fecha inicial debe ser anterior o igual a la final".to_string(),
        ));
    }
    if end - start > Duration::days(max_days) {
        return Err(AppError::Validation(format!(
            "El rango de fechas no puede exceder {} días",
            max_days
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-01-15").is_ok());
        assert!(validate_date("15/01/2025").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(&Decimal::new(8500, 2)).is_ok());
        assert!(validate_price(&Decimal::ZERO).is_ok());
        assert!(validate_price(&Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
    }

    #[test]
    fn test_require_min_chars_trims() {
        assert!(require_min_chars(Some("  sal  "), 5, "corto").is_err());
        assert_eq!(require_min_chars(Some("tomate"), 5, "corto").unwrap(), "tomate");
        assert!(require_min_chars(None, 1, "requerido").is_err());
    }

    #[test]
    fn test_range_bounds_cover_whole_days() {
        let start = parse_range_start("2025-03-01").unwrap();
        let end = parse_range_end("2025-03-01").unwrap();
        assert!(start < end);
        assert_eq!((end - start).num_hours(), 23);
    }

    #[test]
    fn test_validate_date_range() {
        let start = parse_range_start("2025-01-01").unwrap();
        let end = parse_range_end("2025-01-31").unwrap();
        assert!(validate_date_range(start, end, 90).is_ok());
        assert!(validate_date_range(end, start, 90).is_err());

        let far = parse_range_end("2025-06-01").unwrap();
        assert!(validate_date_range(start, far, 90).is_err());
    }
}
