// /products and /products/:id

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::{Product, ProductInput};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::validation::Validate;

use super::parse_id;

/// GET /products - all products with their category names
pub async fn products_get(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.catalog.list_products().await?;
    Ok(ApiResponse::success(products))
}

/// POST /products - protected
pub async fn products_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ProductInput>,
) -> ApiResult<Product> {
    payload.validate()?;

    let product = state.catalog.create_product(&payload).await?;
    tracing::info!("Product {} ({}) created by {}", product.id, product.sku, user.email);

    Ok(ApiResponse::created("Product created successfully", product))
}

/// GET /products/:id
pub async fn product_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let id = parse_id(&id, "Product")?;
    let product = state.catalog.get_product(id).await?;
    Ok(ApiResponse::success(product))
}

/// PUT /products/:id - protected, full replace
pub async fn product_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ProductInput>,
) -> ApiResult<Product> {
    let id = parse_id(&id, "Product")?;
    payload.validate()?;

    let product = state.catalog.update_product(id, &payload).await?;
    tracing::info!("Product {} updated by {}", product.id, user.email);

    Ok(ApiResponse::with_message("Product updated successfully", product))
}

/// DELETE /products/:id - protected
pub async fn product_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, "Product")?;

    state.catalog.delete_product(id).await?;
    tracing::info!("Product {} deleted by {}", id, user.email);

    Ok(ApiResponse::message("Product deleted successfully"))
}
