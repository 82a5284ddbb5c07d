// /categories and /categories/:id

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::{Category, NewCategory};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::validation::Validate;

use super::parse_id;

pub async fn categories_get(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let categories = state.catalog.list_categories().await?;
    Ok(ApiResponse::success(categories))
}

pub async fn categories_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<NewCategory>,
) -> ApiResult<Category> {
    payload.validate()?;

    let category = state.catalog.create_category(&payload).await?;
    tracing::info!("Category {} created by {}", category.id, user.email);

    Ok(ApiResponse::created("Category created successfully", category))
}

/// DELETE /categories/:id - 409 while products still reference it
pub async fn category_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, "Category")?;

    state.catalog.delete_category(id).await?;
    tracing::info!("Category {} deleted by {}", id, user.email);

    Ok(ApiResponse::message("Category deleted successfully"))
}
