//! Catalog management handlers, admin-gated.

use crate::context::RequestContext;
use crate::error::AppError;
use crate::handlers::auth::MessageResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use vitrine_commerce::catalog::Product;
use vitrine_commerce::ids::ProductId;
use vitrine_commerce::money::Money;

#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub title: String,
    /// Unit price in minor units.
    pub price: i64,
    pub description: String,
    pub image_url: Option<String>,
}

fn validate_product_form(form: &ProductForm) -> Result<(), AppError> {
    if form.title.trim().len() < 3 {
        return Err(AppError::Validation(
            "Title must be at least 3 characters.".to_string(),
        ));
    }
    if form.price < 1 {
        return Err(AppError::Validation("Price must be positive.".to_string()));
    }
    let description = form.description.trim();
    if description.len() < 5 || description.len() > 400 {
        return Err(AppError::Validation(
            "Description must be between 5 and 400 characters.".to_string(),
        ));
    }
    Ok(())
}

/// `GET /admin/products` — the admin's own products.
pub async fn list_products(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<Product>>, AppError> {
    let admin = ctx.require_admin()?;
    let products = state.products.list_by_owner(&admin.id).await?;
    Ok(Json(products))
}

/// `POST /admin/products` — add a product to the catalog.
pub async fn create_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<ProductForm>,
) -> Result<Json<Product>, AppError> {
    ctx.verify_csrf()?;
    let admin = ctx.require_admin()?;
    validate_product_form(&form)?;
    let image_url = form
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("Image URL is required.".to_string()))?;

    let product = Product::new(
        form.title.trim(),
        Money::new(form.price, state.config.pricing.currency),
        form.description.trim(),
        image_url,
        admin.id.clone(),
    );
    state.products.insert(product.clone()).await?;
    tracing::info!(product = %product.id, admin = %admin.id, "product created");
    Ok(Json(product))
}

/// `PUT /admin/products/{id}` — edit an owned product.
pub async fn update_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(form): Json<ProductForm>,
) -> Result<Json<Product>, AppError> {
    ctx.verify_csrf()?;
    let admin = ctx.require_admin()?;
    validate_product_form(&form)?;

    let mut product = state
        .products
        .find(&ProductId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    if !product.is_owned_by(&admin.id) {
        return Err(AppError::Forbidden);
    }

    let image_url = form
        .image_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    product.apply_edit(
        form.title.trim(),
        Money::new(form.price, state.config.pricing.currency),
        form.description.trim(),
        image_url,
    );
    state.products.update(product.clone()).await?;
    Ok(Json(product))
}

/// `DELETE /admin/products/{id}` — remove an owned product. Orders keep
/// their snapshots; carts referencing it simply stop resolving it.
pub async fn delete_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.verify_csrf()?;
    let admin = ctx.require_admin()?;

    let product_id = ProductId::new(id);
    let product = state
        .products
        .find(&product_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !product.is_owned_by(&admin.id) {
        return Err(AppError::Forbidden);
    }

    state.products.delete(&product_id).await?;
    tracing::info!(product = %product_id, admin = %admin.id, "product deleted");
    Ok(Json(MessageResponse {
        message: "Success".to_string(),
    }))
}
