//! Hosted checkout provider.
//!
//! The shop never touches card data: checkout hands the computed line
//! items to a hosted payment page and waits for the success or cancel
//! callback. Everything behind [`CheckoutProvider`] is replaceable; the
//! mock implementation backs tests and local development.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use vitrine_commerce::pricing::ProviderLineItem;

/// Checkout provider errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider could not be reached.
    #[error("checkout provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("checkout provider rejected the session: {0}")]
    Rejected(String),
}

/// Everything the provider needs to host a payment page.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionRequest {
    /// Line items with the surcharge already folded in.
    pub line_items: Vec<ProviderLineItem>,
    /// Email to attach to the payment.
    pub customer_email: String,
    /// Where the provider sends the customer on success.
    pub success_url: String,
    /// Where the provider sends the customer on cancel.
    pub cancel_url: String,
}

/// A created hosted checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionRef {
    /// Opaque session id; becomes the order's `payment_ref`.
    pub id: String,
    /// The page to redirect the customer to.
    pub url: String,
}

/// A hosted checkout backend.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a payment session and return its id and redirect URL.
    async fn create_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSessionRef, ProviderError>;
}

/// Production implementation: posts a form-encoded session request to
/// the hosted checkout API.
pub struct HttpCheckoutProvider {
    client: reqwest::Client,
    endpoint: String,
    secret_key: String,
}

impl HttpCheckoutProvider {
    /// Create a provider talking to `endpoint`, authorized by
    /// `secret_key`.
    pub fn new(endpoint: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            secret_key: secret_key.into(),
        }
    }

    fn form_pairs(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("mode".to_string(), "payment".to_string()),
            ("customer_email".to_string(), request.customer_email.clone()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];
        for (i, line) in request.line_items.iter().enumerate() {
            pairs.push((
                format!("line_items[{}][price_data][currency]", i),
                line.unit_amount.currency.code().to_lowercase(),
            ));
            pairs.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                line.unit_amount.amount.to_string(),
            ));
            pairs.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                line.name.clone(),
            ));
            pairs.push((
                format!("line_items[{}][price_data][product_data][description]", i),
                line.description.clone(),
            ));
            pairs.push((format!("line_items[{}][quantity]", i), line.quantity.to_string()));
        }
        pairs
    }
}

#[async_trait]
impl CheckoutProvider for HttpCheckoutProvider {
    async fn create_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSessionRef, ProviderError> {
        #[derive(Deserialize)]
        struct CreatedSession {
            id: String,
            url: String,
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.secret_key)
            .form(&Self::form_pairs(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected(format!("{}: {}", status, body)));
        }

        let created: CreatedSession = response.json().await?;
        tracing::info!(session_id = %created.id, "checkout session created");
        Ok(CheckoutSessionRef {
            id: created.id,
            url: created.url,
        })
    }
}

/// Test/dev implementation: returns deterministic session ids and
/// records every request for inspection.
pub struct MockCheckoutProvider {
    base_url: String,
    counter: AtomicU64,
    /// Requests seen, in order.
    pub requests: Mutex<Vec<CheckoutSessionRequest>>,
}

impl MockCheckoutProvider {
    /// Create a mock issuing redirect URLs under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            counter: AtomicU64::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSessionRef, ProviderError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let id = format!("cs_test_{}", n);
        let url = format!("{}/pay/{}", self.base_url, id);
        Ok(CheckoutSessionRef { id, url })
    }
}
