use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::dto::ApiResponse;
use crate::models::auth::Caller;
use crate::services::auth_service::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AuthController {
    auth: AuthService,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            auth: state.auth_service(),
        }
    }

    /// Login de administrador con identifier y contraseña
    pub async fn login(&self, request: LoginRequest) -> Result<ApiResponse<LoginResponse>, AppError> {
        request.validate()?;

        let (token, user) = self.auth.login(&request.identifier, &request.password).await?;
        tracing::info!(identifier = %user.identifier, "🔐 Login exitoso");

        let response = LoginResponse::bearer(token, self.auth.token_lifetime(), user.first_login, user.to_caller());
        Ok(ApiResponse::success_with_message(response, "Login exitoso"))
    }

    pub fn me(&self, caller: Caller) -> ApiResponse<Caller> {
        ApiResponse::success(caller)
    }
}
