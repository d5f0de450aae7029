//! HTTP routing.

pub mod admin;
pub mod auth;
pub mod shop;

use crate::context;
use crate::state::AppState;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Shop
        .route("/products", get(shop::list_products))
        .route("/products/{id}", get(shop::get_product))
        .route("/cart", get(shop::get_cart).post(shop::add_to_cart))
        .route("/cart/increase", post(shop::increase_quantity))
        .route("/cart/decrease", post(shop::decrease_quantity))
        .route("/cart/delete", post(shop::remove_from_cart))
        .route("/checkout", get(shop::checkout_preview))
        .route("/checkout/start", post(shop::start_checkout))
        .route("/checkout/success", get(shop::checkout_success))
        .route("/checkout/cancel", get(shop::checkout_cancel))
        .route("/orders", get(shop::list_orders))
        .route("/orders/{id}/invoice", get(shop::download_invoice))
        // Auth
        .route("/session", get(auth::session_info))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/reset", post(auth::request_reset))
        .route("/reset/{token}", get(auth::reset_token_info))
        .route("/reset/confirm", post(auth::confirm_reset))
        // Admin
        .route(
            "/admin/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/admin/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            context::session_middleware,
        ))
        .with_state(state)
}
