//! Servicio de autenticación
//!
//! Resuelve cualquier credencial aceptada a un `Caller`: contraseña de
//! administrador, JWT emitido en el login o token de acceso de mesero/cocina.

use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::auth::{Caller, Credentials, UserRole};
use crate::models::user::User;
use crate::repositories::UserRepository;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, verify_token, JwtConfig};

const INVALID_CREDENTIALS: &str = "Credenciales inválidas";

/// Servicio de autenticación
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    /// Autentica cualquier tipo de credencial
    pub async fn authenticate(&self, credentials: Credentials) -> AppResult<Caller> {
        match credentials {
            Credentials::AdminPassword { identifier, password } => {
                let user = self.verify_admin_password(&identifier, &password).await?;
                Ok(user.to_caller())
            }
            Credentials::BearerJwt(token) => self.authenticate_jwt(&token).await,
            Credentials::AccessToken(token) => self.authenticate_access_token(&token).await,
        }
    }

    /// Login de administrador: devuelve el JWT y el usuario
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<(String, User)> {
        let user = self.verify_admin_password(identifier, password).await?;
        let token = generate_token(&user.to_caller(), &self.jwt)?;
        debug!(identifier = %user.identifier, "Login de administrador");
        Ok((token, user))
    }

    pub fn token_lifetime(&self) -> u64 {
        self.jwt.expiration
    }

    async fn verify_admin_password(&self, identifier: &str, password: &str) -> AppResult<User> {
        let user = self
            .users
            .find_by_identifier(identifier.trim())
            .await?
            .filter(|u| u.role == UserRole::Administrator)
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let password_hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(password, password_hash)? {
            warn!(identifier = %identifier, "Contraseña incorrecta");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user)
    }

    async fn authenticate_jwt(&self, token: &str) -> AppResult<Caller> {
        let claims = verify_token(token, &self.jwt)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Jwt("Token inválido: sub no es un UUID".to_string()))?;

        // El usuario puede haber sido eliminado después de emitir el token
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;

        Ok(user.to_caller())
    }

    async fn authenticate_access_token(&self, token: &str) -> AppResult<Caller> {
        let user = self
            .users
            .find_by_access_token(token.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized("Token de acceso inválido".to_string()))?;

        Ok(user.to_caller())
    }
}

/// Hash bcrypt de una contraseña
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Hash(e.to_string()))
}

/// Verifica una contraseña contra su hash bcrypt
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    verify(password, password_hash).map_err(|e| AppError::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "secreto".into(),
            expiration: 120,
        }
    }

    async fn service_with_users() -> (AuthService, User, User) {
        let users: Arc<dyn UserRepository> = Arc::new(MemoryStore::new());

        let mut admin = User::new("Admin".into(), "Principal".into(), "admin".into(), UserRole::Administrator);
        admin.password_hash = Some(hash_password("secreta1").unwrap());
        let waiter = User::new("Ana".into(), "López".into(), "ana".into(), UserRole::Waiter);

        users.insert(&admin).await.unwrap();
        users.insert(&waiter).await.unwrap();

        (AuthService::new(users, jwt()), admin, waiter)
    }

    #[tokio::test]
    async fn test_admin_login_and_jwt() {
        let (service, admin, _) = service_with_users().await;

        let (token, user) = service.login("admin", "secreta1").await.unwrap();
        assert_eq!(user.id, admin.id);

        let caller = service.authenticate(Credentials::BearerJwt(token)).await.unwrap();
        assert!(caller.is_admin());
        assert_eq!(caller.identifier, "admin");
    }

    #[tokio::test]
    async fn test_bad_password_and_unknown_admin() {
        let (service, _, _) = service_with_users().await;
        assert!(matches!(
            service.login("admin", "otra").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.login("nadie", "secreta1").await,
            Err(AppError::Unauthorized(_))
        ));
        // Los meseros no inician sesión con contraseña
        assert!(matches!(
            service.login("ana", "secreta1").await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_access_token_resolves_waiter() {
        let (service, _, waiter) = service_with_users().await;
        let token = waiter.access_token.clone().unwrap();

        let caller = service.authenticate(Credentials::AccessToken(token)).await.unwrap();
        assert_eq!(caller.role, UserRole::Waiter);
        assert_eq!(caller.name, "Ana López");

        assert!(service
            .authenticate(Credentials::AccessToken("ZZZZZZZZ".into()))
            .await
            .is_err());
    }
}
