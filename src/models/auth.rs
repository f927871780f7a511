use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Administrator,
    Waiter,
    Kitchen,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Administrator => "administrator",
            UserRole::Waiter => "waiter",
            UserRole::Kitchen => "kitchen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "administrator" => Some(UserRole::Administrator),
            "waiter" => Some(UserRole::Waiter),
            "kitchen" => Some(UserRole::Kitchen),
            _ => None,
        }
    }
}

/// Identidad del usuario autenticado en una petición
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub id: Uuid,
    pub identifier: String,
    pub role: UserRole,
    pub name: String,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Administrator
    }
}

/// Claims del JWT de administrador
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // user_id
    pub identifier: String,
    pub role: String,
    pub name: String,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Credenciales aceptadas por el servicio de autenticación
#[derive(Debug, Clone)]
pub enum Credentials {
    AdminPassword { identifier: String, password: String },
    BearerJwt(String),
    AccessToken(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [UserRole::Administrator, UserRole::Waiter, UserRole::Kitchen] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("admin"), None);
    }
}
