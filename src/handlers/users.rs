// POST /register, POST /login

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::database::{models::Credentials, models::User, StoreError};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::validation::Validate;

/// Same text for unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// POST /register - create an account
///
/// Body: `{"email": "...", "password": "..."}`; the password must be at least
/// six characters. Responds 201 with `{id, email}`, 409 when the email is taken.
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Credentials>,
) -> ApiResult<User> {
    payload.validate()?;

    let hasher = state.hasher.clone();
    let password = payload.password;
    let password_hash = run_blocking(move || hasher.hash(&password)).await??;

    let user = state
        .credentials
        .create_user(&payload.email, &password_hash)
        .await
        .map_err(|e| {
            if matches!(e, StoreError::Conflict(_)) {
                tracing::info!("Registration refused: {} already registered", payload.email);
            }
            ApiError::from(e)
        })?;

    tracing::info!("Registered user {} ({})", user.email, user.id);
    Ok(ApiResponse::created("User registered successfully", user))
}

/// POST /login - exchange credentials for a bearer token
///
/// Unknown email and wrong password both yield 401 with the same message.
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.validate_login()?;

    let stored = match state.credentials.find_user_by_email(&payload.email).await {
        Ok(user) => Some(user),
        Err(StoreError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    let hasher = state.hasher.clone();
    let password = payload.password;
    let user = run_blocking(move || match stored {
        Some(user) if hasher.verify(&password, &user.password_hash) => Some(user),
        Some(_) => None,
        None => {
            hasher.verify_dummy(&password);
            None
        }
    })
    .await?;

    let Some(user) = user else {
        tracing::info!("Failed login attempt for {}", payload.email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let token = state.tokens.issue(user.id, &user.email)?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        token,
        expires_in: state.tokens.ttl().num_seconds(),
    }))
}

/// bcrypt is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Password worker failed: {}", e);
        ApiError::internal_server_error("Failed to process password")
    })
}
