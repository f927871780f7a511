//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Todas las variables tienen
//! un valor por defecto salvo `JWT_SECRET` y, con almacenamiento PostgreSQL,
//! `DATABASE_URL`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Backend de almacenamiento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("STORAGE_BACKEND inválido: {}", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub history_max_days: i64,
    pub folio_max_retries: u32,
    pub restaurant_name: String,
    pub restaurant_address: String,
    pub ticket_spool_dir: Option<PathBuf>,
    pub seed_products: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            database_url: None,
            db_max_connections: 10,
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: "dev-secret-change-me".to_string(),
            jwt_expiration: 7200,
            cors_origins: Vec::new(),
            log_level: "info".to_string(),
            history_max_days: 90,
            folio_max_retries: 5,
            restaurant_name: "El Alevin".to_string(),
            restaurant_address: String::new(),
            ticket_spool_dir: None,
            seed_products: false,
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Postgres,
        };
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when STORAGE_BACKEND=postgres"));
        }

        Ok(Self {
            storage_backend,
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiration: parse_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            history_max_days: parse_var("HISTORY_MAX_DAYS", defaults.history_max_days)?,
            folio_max_retries: parse_var("FOLIO_MAX_RETRIES", defaults.folio_max_retries)?,
            restaurant_name: env::var("RESTAURANT_NAME").unwrap_or(defaults.restaurant_name),
            restaurant_address: env::var("RESTAURANT_ADDRESS").unwrap_or(defaults.restaurant_address),
            ticket_spool_dir: env::var("TICKET_SPOOL_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            seed_products: parse_var("SEED_PRODUCTS", defaults.seed_products)?,
        })
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} must be a valid value: {}", name, e)),
        Err(_) => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!(" Postgres ".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_split_list_skips_blanks() {
        assert_eq!(
            split_list("http://a.test, ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.jwt_expiration, 7200);
        assert_eq!(config.history_max_days, 90);
        assert_eq!(config.folio_max_retries, 5);
        assert_eq!(config.server_url(), "0.0.0.0:3000");
    }
}
