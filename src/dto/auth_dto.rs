use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::auth::Caller;

// Login request del administrador
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 50))]
    pub identifier: String,

    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub first_login: bool,
    pub user: Caller,
}

impl LoginResponse {
    pub fn bearer(token: String, expires_in: u64, first_login: bool, user: Caller) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            first_login,
            user,
        }
    }
}
