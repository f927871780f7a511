use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::UserRole;
use crate::models::user::User;
use crate::utils::validation::validate_not_empty;

// Request para crear un mesero o personal de cocina
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(custom = "validate_not_empty")]
    pub first_name: String,

    #[validate(custom = "validate_not_empty")]
    pub last_name: String,

    #[validate(length(min = 3, max = 50))]
    pub identifier: String,

    pub role: UserRole,
}

// Request para actualizar un usuario desde administración
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(custom = "validate_not_empty")]
    pub first_name: Option<String>,

    #[validate(custom = "validate_not_empty")]
    pub last_name: Option<String>,

    pub role: Option<UserRole>,

    // Solo se acepta para rechazarlo: el identifier es inmutable
    pub identifier: Option<String>,
}

// Request para actualizar el perfil propio
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(custom = "validate_not_empty")]
    pub first_name: Option<String>,

    #[validate(custom = "validate_not_empty")]
    pub last_name: Option<String>,

    pub current_password: Option<String>,

    #[validate(length(min = 6, max = 100))]
    pub new_password: Option<String>,
}

// Response de usuario (sin hash de contraseña)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub identifier: String,
    pub role: UserRole,
    pub access_token: Option<String>,
    pub first_login: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            identifier: user.identifier,
            role: user.role,
            access_token: user.access_token,
            first_login: user.first_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
