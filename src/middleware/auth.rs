use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{Claims, TokenError};
use crate::error::ApiError;

/// Authenticated identity extracted from the bearer token and placed in
/// request extensions for downstream handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

/// Why a request carried no usable bearer token
#[derive(Debug, PartialEq, Eq)]
pub enum BearerError {
    Missing,
    Malformed,
}

impl From<BearerError> for ApiError {
    fn from(err: BearerError) -> Self {
        match err {
            BearerError::Missing => ApiError::unauthorized("Missing Authorization header"),
            BearerError::Malformed => ApiError::unauthorized("Invalid token format"),
        }
    }
}

/// Gate for protected routes: the wrapped handler only runs once the token
/// has been verified and the identity injected.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(|e| {
        tracing::debug!("Rejected {} {}: {:?}", request.method(), request.uri().path(), e);
        ApiError::from(e)
    })?;

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::from(TokenError::Invalid))?;

    // Convert claims to AuthUser and inject into request
    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated {} ({})", auth_user.email, auth_user.user_id);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// The header must be exactly `Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?;

    let value = value.to_str().map_err(|_| BearerError::Malformed)?;
    if value.is_empty() {
        return Err(BearerError::Missing);
    }

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(BearerError::Malformed),
    }
}
