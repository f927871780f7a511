use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::user_dto::{CreateUserRequest, UpdateProfileRequest, UpdateUserRequest, UserResponse};
use crate::dto::ApiResponse;
use crate::models::auth::{Caller, UserRole};
use crate::models::user::{generate_access_token, User};
use crate::repositories::UserRepository;
use crate::services::auth_service::{hash_password, verify_password};
use crate::services::authorization_service::{authorize, Action, Target};
use crate::state::AppState;
use crate::utils::errors::AppError;

const ADMIN_ONLY: &str = "Solo los administradores pueden gestionar usuarios";
const ADMIN_PROTECTED: &str = "No se pueden modificar cuentas de administrador";

pub struct UserController {
    users: Arc<dyn UserRepository>,
}

impl UserController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.repos.users.clone(),
        }
    }

    pub async fn list(&self, caller: &Caller) -> Result<Vec<UserResponse>, AppError> {
        authorize(caller, Action::ManageUsers, Target::None, ADMIN_ONLY)?;
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_by_id(&self, caller: &Caller, id: Uuid) -> Result<UserResponse, AppError> {
        authorize(caller, Action::ManageUsers, Target::None, ADMIN_ONLY)?;
        Ok(self.find(id).await?.into())
    }

    pub async fn search(&self, caller: &Caller, term: &str) -> Result<Vec<UserResponse>, AppError> {
        authorize(caller, Action::ManageUsers, Target::None, ADMIN_ONLY)?;
        let users = self.users.search(term.trim()).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn create(
        &self,
        caller: &Caller,
        request: CreateUserRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        authorize(caller, Action::ManageUsers, Target::None, ADMIN_ONLY)?;
        authorize(
            caller,
            Action::ManageUsers,
            Target::User { role: request.role },
            "No se puede asignar el rol de administrador",
        )?;
        request.validate()?;

        let identifier = request.identifier.trim().to_string();
        if self.users.find_by_identifier(&identifier).await?.is_some() {
            return Err(AppError::Conflict("El identifier ya existe".to_string()));
        }

        let user = User::new(
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
            identifier,
            request.role,
        );
        let user = self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "Usuario creado");
        Ok(ApiResponse::success_with_message(user.into(), "Usuario creado exitosamente"))
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        authorize(caller, Action::ManageUsers, Target::None, ADMIN_ONLY)?;
        request.validate()?;

        if request.identifier.is_some() {
            return Err(AppError::Validation("El identifier no se puede modificar".to_string()));
        }

        let mut user = self.find(id).await?;
        authorize(caller, Action::ManageUsers, Target::User { role: user.role }, ADMIN_PROTECTED)?;

        if let Some(role) = request.role {
            authorize(
                caller,
                Action::ManageUsers,
                Target::User { role },
                "No se puede asignar el rol de administrador",
            )?;
            user.role = role;
        }
        if let Some(first_name) = request.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name.trim().to_string();
        }
        user.updated_at = Utc::now();

        let user = self.users.update(&user).await?;
        Ok(ApiResponse::success_with_message(user.into(), "Usuario actualizado exitosamente"))
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        authorize(caller, Action::ManageUsers, Target::None, ADMIN_ONLY)?;

        let user = self.find(id).await?;
        authorize(caller, Action::ManageUsers, Target::User { role: user.role }, ADMIN_PROTECTED)?;

        self.users.delete(user.id).await?;
        tracing::info!(user_id = %user.id, "Usuario eliminado");
        Ok(ApiResponse::message_only("Usuario eliminado exitosamente"))
    }

    /// Emite un token de acceso nuevo; el anterior deja de funcionar
    pub async fn regenerate_token(
        &self,
        caller: &Caller,
        id: Uuid,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        authorize(caller, Action::ManageUsers, Target::None, ADMIN_ONLY)?;

        let mut user = self.find(id).await?;
        authorize(caller, Action::ManageUsers, Target::User { role: user.role }, ADMIN_PROTECTED)?;

        user.access_token = Some(generate_access_token());
        user.updated_at = Utc::now();
        let user = self.users.update(&user).await?;

        Ok(ApiResponse::success_with_message(user.into(), "Token regenerado exitosamente"))
    }

    pub async fn profile(&self, caller: &Caller) -> Result<UserResponse, AppError> {
        Ok(self.find(caller.id).await?.into())
    }

    pub async fn update_profile(
        &self,
        caller: &Caller,
        request: UpdateProfileRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        request.validate()?;
        let mut user = self.find(caller.id).await?;

        if let Some(new_password) = request.new_password.as_deref() {
            if user.role != UserRole::Administrator {
                return Err(AppError::Forbidden(
                    "Solo los administradores pueden cambiar su contraseña".to_string(),
                ));
            }
            let current = request
                .current_password
                .as_deref()
                .ok_or_else(|| AppError::Validation("La contraseña actual es requerida".to_string()))?;
            let hash = user.password_hash.as_deref().unwrap_or_default();
            if hash.is_empty() || !verify_password(current, hash)? {
                return Err(AppError::Unauthorized("Contraseña actual incorrecta".to_string()));
            }
            user.password_hash = Some(hash_password(new_password)?);
            user.first_login = false;
        }

        if let Some(first_name) = request.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name.trim().to_string();
        }
        user.updated_at = Utc::now();

        let user = self.users.update(&user).await?;
        Ok(ApiResponse::success_with_message(user.into(), "Perfil actualizado exitosamente"))
    }

    async fn find(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))
    }
}
