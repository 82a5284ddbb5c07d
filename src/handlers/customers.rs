// /customers

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::{Customer, NewCustomer};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::validation::Validate;

pub async fn customers_get(State(state): State<AppState>) -> ApiResult<Vec<Customer>> {
    let customers = state.catalog.list_customers().await?;
    Ok(ApiResponse::success(customers))
}

/// POST /customers - protected; 409 on duplicate email
pub async fn customers_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<NewCustomer>,
) -> ApiResult<Customer> {
    payload.validate()?;

    let customer = state.catalog.create_customer(&payload).await?;
    tracing::info!("Customer {} created by {}", customer.id, user.email);

    Ok(ApiResponse::created("Customer created successfully", customer))
}
