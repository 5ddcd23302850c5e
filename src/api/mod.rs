//! HTTP layer: one module per resource, plus the shared auth extractor.

pub mod auth;
pub mod authors;
pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod publishers;
pub mod stats;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::{error::AppError, models::user::UserClaims, AppState};

/// Caller identity, decoded from the `Authorization: Bearer` header.
/// Taking this as a handler argument is what makes an endpoint require
/// a login; role checks happen in the handler against the claims.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Expected a bearer token".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}
