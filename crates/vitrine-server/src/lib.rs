//! Storefront HTTP service for Vitrine.
//!
//! Wires the domain, auth, and store crates into an axum application:
//! catalog browsing, cart mutations, the hosted-checkout flow, order
//! history, invoices, and the auth endpoints. External collaborators
//! (checkout provider, mailer, invoice renderer) sit behind traits with
//! HTTP implementations for production and mock/dev implementations for
//! tests and local runs.

pub mod checkout;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod invoice;
pub mod mailer;
pub mod payment;
pub mod state;

pub use config::{CliArgs, Config};
pub use error::AppError;
pub use state::AppState;
