//! Cart and checkout orchestration.
//!
//! Handlers call into this module so the ordering contracts live in one
//! place: quotes are computed and validated before any provider call,
//! the order is persisted before the cart is cleared, and a retried
//! success callback settles on the order persisted first.

use crate::error::AppError;
use crate::payment::{CheckoutSessionRef, CheckoutSessionRequest};
use crate::state::AppState;
use serde::Serialize;
use vitrine_auth::{Session, UserRecord};
use vitrine_commerce::cart::Cart;
use vitrine_commerce::catalog::Product;
use vitrine_commerce::checkout::{CheckoutDetails, ContactDetails};
use vitrine_commerce::error::CommerceError;
use vitrine_commerce::ids::UserId;
use vitrine_commerce::money::Money;
use vitrine_commerce::order::Order;
use vitrine_commerce::pricing::{compute_quote, QuoteItem};
use vitrine_store::StoreError;

/// One cart line joined with its product.
#[derive(Debug, Clone, Serialize)]
pub struct CartEntry {
    /// The product, freshly loaded.
    pub product: Product,
    /// Quantity in the cart.
    pub quantity: i64,
    /// unit price * quantity.
    pub line_total: Money,
}

/// The cart joined with the catalog, ready for display or quoting.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    /// Lines with resolved products.
    pub entries: Vec<CartEntry>,
    /// Sum of line totals.
    pub total_price: Money,
}

impl CartView {
    /// Whether there is anything to buy.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quote inputs for the entries.
    pub fn quote_items(&self) -> Vec<QuoteItem> {
        self.entries
            .iter()
            .map(|e| QuoteItem {
                name: e.product.title.clone(),
                description: e.product.description.clone(),
                unit_price: e.product.price,
                quantity: e.quantity,
            })
            .collect()
    }

    /// (product, quantity) pairs for order materialization.
    pub fn purchased(&self) -> Vec<(Product, i64)> {
        self.entries
            .iter()
            .map(|e| (e.product.clone(), e.quantity))
            .collect()
    }
}

/// Join a user's cart against the catalog. Lines whose product has been
/// deleted since it was added are skipped, not surfaced as errors.
pub async fn load_cart_view(state: &AppState, user: &UserRecord) -> Result<CartView, AppError> {
    let currency = state.config.pricing.currency;
    let mut entries = Vec::with_capacity(user.cart.items.len());
    let mut total_price = Money::zero(currency);

    for item in &user.cart.items {
        let Some(product) = state.products.find(&item.product_id).await? else {
            tracing::debug!(product_id = %item.product_id, "cart references a deleted product, skipping");
            continue;
        };
        let line_total = product
            .price
            .checked_mul(item.quantity)
            .ok_or_else(|| AppError::Internal("cart line total overflow".to_string()))?;
        total_price = total_price
            .checked_add(&line_total)
            .ok_or_else(|| AppError::Internal("cart total overflow".to_string()))?;
        entries.push(CartEntry {
            product,
            quantity: item.quantity,
            line_total,
        });
    }

    Ok(CartView {
        entries,
        total_price,
    })
}

/// Apply a mutation to the user's cart with compare-and-swap, retrying
/// once against a concurrent writer before giving up.
pub async fn mutate_cart<F>(
    state: &AppState,
    user_id: &UserId,
    mutate: F,
) -> Result<Cart, AppError>
where
    F: Fn(&mut Cart) -> Result<(), CommerceError>,
{
    for _ in 0..2 {
        let user = state
            .users
            .find(user_id)
            .await?
            .ok_or(AppError::NotLoggedIn)?;
        let mut cart = user.cart.clone();
        mutate(&mut cart)?;
        match state
            .users
            .update_cart(user_id, cart.clone(), user.cart_revision)
            .await
        {
            Ok(_) => return Ok(cart),
            Err(StoreError::Conflict(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Transient("cart is busy, please retry".to_string()))
}

/// Start a checkout: validate the form and the cart, compute the quote,
/// create the hosted payment session, and park the checkout details in
/// the session.
///
/// Nothing is persisted to the order store here; until the provider
/// reports success the only state is the session-held bundle, which
/// expires on the provider's clock.
pub async fn start_checkout(
    state: &AppState,
    session: &mut Session,
    user: &UserRecord,
    contact: ContactDetails,
) -> Result<CheckoutSessionRef, AppError> {
    contact.validate()?;

    let view = load_cart_view(state, user).await?;
    if view.is_empty() {
        return Err(AppError::Validation("Cart is empty".to_string()));
    }

    let quote = compute_quote(&view.quote_items(), &state.config.pricing)?;

    let provider_session = state
        .checkout
        .create_session(CheckoutSessionRequest {
            line_items: quote.line_items.clone(),
            customer_email: user.email.clone(),
            success_url: state.config.success_url(),
            cancel_url: state.config.cancel_url(),
        })
        .await
        .map_err(|e| AppError::Transient(e.to_string()))?;

    session.set_checkout(CheckoutDetails::new(
        contact,
        quote,
        provider_session.id.clone(),
    ));
    state.sessions.save(session.clone()).await?;

    tracing::info!(payment_ref = %provider_session.id, user = %user.id, "checkout started");
    Ok(provider_session)
}

/// Settle a successful payment callback into an order.
///
/// Safe to call more than once for the same checkout: the order store is
/// unique per payment reference, and a repeat call (provider retry, user
/// reloading the success page) returns the order persisted first. The
/// cart is cleared only after the order exists, and the session bundle
/// is discarded last, so a failure at any point leaves the whole
/// operation retryable.
pub async fn finalize_checkout(
    state: &AppState,
    session: &mut Session,
    user: &UserRecord,
) -> Result<Order, AppError> {
    let details = session
        .valid_checkout()
        .cloned()
        .ok_or_else(|| AppError::Validation("No checkout in progress".to_string()))?;

    // Re-read the user: the cart may have been written since the request
    // context was built.
    let fresh = state
        .users
        .find(&user.id)
        .await?
        .ok_or(AppError::NotLoggedIn)?;

    let order = if let Some(existing) = state.orders.find_by_payment_ref(&details.payment_ref).await? {
        // Already materialized by an earlier callback; fall through to
        // the cleanup steps in case they were interrupted.
        existing
    } else {
        let view = load_cart_view(state, &fresh).await?;
        let order = Order::materialize(
            fresh.id.clone(),
            &view.purchased(),
            &details.contact,
            &details.quote,
            details.payment_ref.clone(),
        )?;
        state.orders.insert(order).await?
    };

    clear_cart(state, &fresh.id).await?;

    session.clear_checkout();
    state.sessions.save(session.clone()).await?;

    tracing::info!(order_id = %order.id, payment_ref = %order.payment_ref, "order settled");
    Ok(order)
}

/// Empty the user's cart, tolerating concurrent writers.
async fn clear_cart(state: &AppState, user_id: &UserId) -> Result<(), AppError> {
    for _ in 0..2 {
        let user = state
            .users
            .find(user_id)
            .await?
            .ok_or(AppError::NotLoggedIn)?;
        if user.cart.is_empty() {
            return Ok(());
        }
        let mut cart = user.cart.clone();
        cart.clear();
        match state
            .users
            .update_cart(user_id, cart, user.cart_revision)
            .await
        {
            Ok(_) => return Ok(()),
            Err(StoreError::Conflict(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Transient("cart is busy, please retry".to_string()))
}
