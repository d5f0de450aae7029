//! Shared application state.

use crate::config::Config;
use crate::invoice::{InvoiceRenderer, TextInvoiceRenderer};
use crate::mailer::{HttpMailer, LogMailer, Mailer};
use crate::payment::{CheckoutProvider, HttpCheckoutProvider, MockCheckoutProvider};
use std::sync::Arc;
use vitrine_store::{
    MemoryOrderStore, MemoryProductStore, MemorySessionStore, MemoryUserStore, OrderStore,
    ProductStore, SessionStore, UserStore,
};

/// Everything handlers need, cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration.
    pub config: Arc<Config>,
    /// Catalog store.
    pub products: Arc<dyn ProductStore>,
    /// User store (carts live on the user documents).
    pub users: Arc<dyn UserStore>,
    /// Order store.
    pub orders: Arc<dyn OrderStore>,
    /// Session store.
    pub sessions: Arc<dyn SessionStore>,
    /// Hosted checkout provider.
    pub checkout: Arc<dyn CheckoutProvider>,
    /// Outgoing mail.
    pub mailer: Arc<dyn Mailer>,
    /// Invoice renderer.
    pub invoices: Arc<dyn InvoiceRenderer>,
}

impl AppState {
    /// Wire up state from configuration: in-memory stores, and HTTP
    /// collaborators where endpoints are configured, mock/dev ones
    /// otherwise.
    pub fn from_config(config: Config) -> Self {
        let checkout: Arc<dyn CheckoutProvider> = match &config.checkout_api {
            Some((endpoint, secret)) => Arc::new(HttpCheckoutProvider::new(endpoint, secret)),
            None => {
                tracing::warn!("no checkout endpoint configured, using the mock provider");
                Arc::new(MockCheckoutProvider::new(config.base_url.clone()))
            }
        };
        let mailer: Arc<dyn Mailer> = match &config.mail_api {
            Some((endpoint, key)) => {
                Arc::new(HttpMailer::new(endpoint, key, config.mail_from.clone()))
            }
            None => {
                tracing::warn!("no mail endpoint configured, emails will only be logged");
                Arc::new(LogMailer)
            }
        };

        Self {
            config: Arc::new(config),
            products: Arc::new(MemoryProductStore::new()),
            users: Arc::new(MemoryUserStore::new()),
            orders: Arc::new(MemoryOrderStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            checkout,
            mailer,
            invoices: Arc::new(TextInvoiceRenderer::default()),
        }
    }

    /// State for tests: in-memory stores, mock checkout, log mailer.
    pub fn in_memory(config: Config) -> Self {
        let base_url = config.base_url.clone();
        let mut state = Self::from_config(config);
        state.checkout = Arc::new(MockCheckoutProvider::new(base_url));
        state.mailer = Arc::new(LogMailer);
        state
    }
}
