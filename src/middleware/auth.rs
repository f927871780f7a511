//! Extractor de autenticación
//!
//! Resuelve el `Caller` de cada petición. Acepta `Authorization: Bearer <valor>`
//! o `X-Waiter-Token: <valor>`; un valor con forma de JWT se verifica como JWT
//! de administrador y cualquier otro se busca como token de acceso.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::{
    models::auth::{Caller, Credentials},
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, looks_like_jwt},
    },
};

pub const WAITER_TOKEN_HEADER: &str = "x-waiter-token";

#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = credential_from_headers(&parts.headers)?;
        let caller = state.auth_service().authenticate(classify(token)).await?;

        tracing::debug!(caller = %caller.identifier, role = caller.role.as_str(), "Petición autenticada");
        Ok(caller)
    }
}

/// Extrae el valor de la credencial de los headers
pub fn credential_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let value = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Header Authorization inválido".to_string()))?;
        return extract_token_from_header(value).map(str::to_string);
    }

    headers
        .get(WAITER_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))
}

/// Decide cómo verificar la credencial según su forma
pub fn classify(token: String) -> Credentials {
    if looks_like_jwt(&token) {
        Credentials::BearerJwt(token)
    } else {
        Credentials::AccessToken(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer AB12CD34"));
        headers.insert(WAITER_TOKEN_HEADER, HeaderValue::from_static("ZZZZZZZZ"));
        assert_eq!(credential_from_headers(&headers).unwrap(), "AB12CD34");
    }

    #[test]
    fn test_waiter_token_header() {
        let mut headers = HeaderMap::new();
        headers.insert(WAITER_TOKEN_HEADER, HeaderValue::from_static(" AB12CD34 "));
        assert_eq!(credential_from_headers(&headers).unwrap(), "AB12CD34");

        assert!(matches!(
            credential_from_headers(&HeaderMap::new()),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_classify_by_shape() {
        assert!(matches!(classify("a.b.c".into()), Credentials::BearerJwt(_)));
        assert!(matches!(classify("AB12CD34".into()), Credentials::AccessToken(_)));
    }
}
