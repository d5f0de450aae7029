//! Storefront handlers: catalog, cart, checkout, orders, invoices.

use crate::checkout::{
    finalize_checkout, load_cart_view, mutate_cart, start_checkout as start_checkout_service,
    CartEntry,
};
use crate::context::RequestContext;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};
use vitrine_commerce::catalog::Product;
use vitrine_commerce::checkout::ContactDetails;
use vitrine_commerce::ids::{OrderId, ProductId, UserId};
use vitrine_commerce::money::Money;
use vitrine_commerce::order::Order;
use vitrine_commerce::pricing::{compute_quote, Quote};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// 1-indexed page number.
    pub page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub last_page: u64,
}

/// `GET /products` — one page of the catalog.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProductListResponse>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let listing = state
        .products
        .page(page, state.config.items_per_page)
        .await?;
    Ok(Json(ProductListResponse {
        has_next_page: listing.has_next_page(),
        has_previous_page: listing.has_previous_page(),
        last_page: listing.last_page(),
        items: listing.items,
        total: listing.total,
        page: listing.page,
        per_page: listing.per_page,
    }))
}

/// `GET /products/{id}` — product detail.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .products
        .find(&ProductId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(product))
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartEntry>,
    pub total_price: Money,
    pub item_count: i64,
}

async fn cart_response(state: &AppState, user_id: &UserId) -> Result<Json<CartResponse>, AppError> {
    let user = state
        .users
        .find(user_id)
        .await?
        .ok_or(AppError::NotLoggedIn)?;
    let view = load_cart_view(state, &user).await?;
    let item_count = view.entries.iter().map(|e| e.quantity).sum();
    Ok(Json(CartResponse {
        items: view.entries,
        total_price: view.total_price,
        item_count,
    }))
}

/// `GET /cart` — the cart joined with the catalog.
pub async fn get_cart(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<CartResponse>, AppError> {
    let user = ctx.require_user()?;
    cart_response(&state, &user.id).await
}

#[derive(Debug, Deserialize)]
pub struct CartForm {
    pub product_id: String,
}

/// `POST /cart` — add one unit of a product, merging into an existing
/// line.
pub async fn add_to_cart(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<CartForm>,
) -> Result<Json<CartResponse>, AppError> {
    ctx.verify_csrf()?;
    let user = ctx.require_user()?;
    let product_id = ProductId::new(form.product_id);

    // Only products that still exist can be added.
    state
        .products
        .find(&product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    mutate_cart(&state, &user.id, |cart| {
        cart.add_or_increment(product_id.clone())
    })
    .await?;
    cart_response(&state, &user.id).await
}

/// `POST /cart/increase` — one more of an existing line.
pub async fn increase_quantity(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<CartForm>,
) -> Result<Json<CartResponse>, AppError> {
    ctx.verify_csrf()?;
    let user = ctx.require_user()?;
    let product_id = ProductId::new(form.product_id);
    mutate_cart(&state, &user.id, |cart| cart.increment(&product_id)).await?;
    cart_response(&state, &user.id).await
}

/// `POST /cart/decrease` — one fewer; the last unit removes the line.
pub async fn decrease_quantity(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<CartForm>,
) -> Result<Json<CartResponse>, AppError> {
    ctx.verify_csrf()?;
    let user = ctx.require_user()?;
    let product_id = ProductId::new(form.product_id);
    mutate_cart(&state, &user.id, |cart| cart.decrement(&product_id)).await?;
    cart_response(&state, &user.id).await
}

/// `POST /cart/delete` — drop a line entirely.
pub async fn remove_from_cart(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<CartForm>,
) -> Result<Json<CartResponse>, AppError> {
    ctx.verify_csrf()?;
    let user = ctx.require_user()?;
    let product_id = ProductId::new(form.product_id);
    mutate_cart(&state, &user.id, |cart| {
        cart.remove(&product_id);
        Ok(())
    })
    .await?;
    cart_response(&state, &user.id).await
}

#[derive(Debug, Serialize)]
pub struct CheckoutPreview {
    pub items: Vec<CartEntry>,
    pub total_price: Money,
    /// The full quote, absent while the cart is empty.
    pub quote: Option<Quote>,
}

/// `GET /checkout` — the cart priced for checkout.
pub async fn checkout_preview(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<CheckoutPreview>, AppError> {
    let user = ctx.require_user()?;
    let view = load_cart_view(&state, user).await?;
    let quote = if view.is_empty() {
        None
    } else {
        Some(compute_quote(&view.quote_items(), &state.config.pricing)?)
    };
    Ok(Json(CheckoutPreview {
        total_price: view.total_price,
        items: view.entries,
        quote,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct StartCheckoutResponse {
    /// The hosted payment page to redirect the customer to.
    pub url: String,
}

/// `POST /checkout/start` — validate the form, create the hosted
/// payment session, and park the checkout details in the session.
pub async fn start_checkout(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<ContactForm>,
) -> Result<Json<StartCheckoutResponse>, AppError> {
    ctx.verify_csrf()?;
    let user = ctx.require_user()?.clone();
    let mut session = ctx.session;

    let contact = ContactDetails {
        full_name: form.full_name,
        phone: form.phone,
        address: form.address,
        email: form.email,
    };
    let provider_session = start_checkout_service(&state, &mut session, &user, contact).await?;
    Ok(Json(StartCheckoutResponse {
        url: provider_session.url,
    }))
}

/// `GET /checkout/success` — the provider's success callback. Settles
/// the order (idempotently) and sends the customer to their orders.
pub async fn checkout_success(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Redirect, AppError> {
    let user = ctx.require_user()?.clone();
    let mut session = ctx.session;

    finalize_checkout(&state, &mut session, &user).await?;

    session.set_flash("Order placed.");
    state.sessions.save(session).await?;
    Ok(Redirect::to("/orders"))
}

/// `GET /checkout/cancel` — the provider's cancel callback. The cart
/// and the session-held details are untouched; the customer may retry.
pub async fn checkout_cancel() -> Redirect {
    Redirect::to("/checkout")
}

/// `GET /orders` — order history, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<Order>>, AppError> {
    let user = ctx.require_user()?;
    let orders = state.orders.find_by_user(&user.id).await?;
    Ok(Json(orders))
}

/// `GET /orders/{id}/invoice` — render the invoice, keep a durable
/// copy, and stream it to the owner.
pub async fn download_invoice(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let user = ctx.require_user()?;
    let order = state
        .orders
        .find(&OrderId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    if !order.is_owned_by(&user.id) {
        return Err(AppError::Forbidden);
    }

    let bytes = state.invoices.render(&order);
    let file_name = state.invoices.file_name(&order);

    let dir = state.config.invoice_dir();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Transient(e.to_string()))?;
    tokio::fs::write(dir.join(&file_name), &bytes)
        .await
        .map_err(|e| AppError::Transient(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ))
}
