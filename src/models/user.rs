//! Modelo de User
//!
//! Meseros, cocina y administradores. Los administradores se autentican con
//! contraseña; meseros y cocina con un token de acceso generado al crearlos.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::auth::{Caller, UserRole};

/// User - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub identifier: String,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub access_token: Option<String>,
    pub first_login: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(first_name: String, last_name: String, identifier: String, role: UserRole) -> Self {
        let now = Utc::now();
        let access_token = match role {
            UserRole::Administrator => None,
            UserRole::Waiter | UserRole::Kitchen => Some(generate_access_token()),
        };

        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            identifier,
            role,
            password_hash: None,
            access_token,
            first_login: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn to_caller(&self) -> Caller {
        Caller {
            id: self.id,
            identifier: self.identifier.clone(),
            role: self.role,
            name: self.full_name(),
        }
    }
}

/// Token de acceso de 8 caracteres en mayúsculas
pub fn generate_access_token() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Contraseña temporal para el administrador inicial
pub fn generate_temporary_password() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waiters_get_access_token() {
        let waiter = User::new("Ana".into(), "López".into(), "ana".into(), UserRole::Waiter);
        let token = waiter.access_token.clone().unwrap();
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(waiter.full_name(), "Ana López");
    }

    #[test]
    fn test_admins_have_no_access_token() {
        let admin = User::new("Admin".into(), "Principal".into(), "admin".into(), UserRole::Administrator);
        assert!(admin.access_token.is_none());
        assert!(admin.to_caller().is_admin());
    }

    #[test]
    fn test_temporary_password_length() {
        assert_eq!(generate_temporary_password().len(), 10);
    }
}
