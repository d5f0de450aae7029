//! Outgoing email.
//!
//! Mail is fire-and-forget from the handlers' perspective: the response
//! owed to the client is never blocked on delivery, and a failed send is
//! logged, not surfaced.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Mailer errors.
#[derive(Error, Debug)]
pub enum MailError {
    /// The mail API could not be reached.
    #[error("mail API unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The mail API rejected the message.
    #[error("mail API rejected the message: {0}")]
    Rejected(String),
}

/// An email to deliver.
#[derive(Debug, Clone, Serialize)]
pub struct Email {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// A mail delivery backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// Production implementation: posts the message to an HTTP mail API.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    /// Create a mailer posting to `endpoint`, authorized by `api_key`,
    /// sending as `from`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        #[derive(Serialize)]
        struct Payload<'a> {
            from: &'a str,
            to: &'a str,
            subject: &'a str,
            html: &'a str,
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&Payload {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                html: &email.html_body,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(format!("{}: {}", status, body)));
        }
        Ok(())
    }
}

/// Dev implementation: logs the message instead of delivering it.
#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "email (dev mailer, not delivered)");
        Ok(())
    }
}

/// Deliver an email without blocking the current request.
pub fn send_in_background(mailer: Arc<dyn Mailer>, email: Email) {
    let to = email.to.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send(email).await {
            tracing::warn!(to = %to, error = %e, "email delivery failed");
        }
    });
}

/// The welcome message sent after signup.
pub fn welcome_email(base_url: &str, to: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Welcome to Vitrine!".to_string(),
        html_body: format!(
            concat!(
                "<div style=\"font-family: Arial; background:#f6f7f9; padding:30px;\">",
                "<div style=\"max-width:520px; margin:auto; background:#fff; padding:25px; border-radius:10px;\">",
                "<h2>Welcome to Vitrine</h2>",
                "<p>Your account has been created successfully.</p>",
                "<a href=\"{}/login\" style=\"background:#4a73fa; color:white; padding:10px 20px; border-radius:6px; text-decoration:none;\">Go to your account</a>",
                "</div></div>"
            ),
            base_url
        ),
    }
}

/// The password-reset message with the tokenized link.
pub fn reset_email(base_url: &str, to: &str, token: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Reset your Vitrine password".to_string(),
        html_body: format!(
            concat!(
                "<div style=\"font-family: Arial; background:#f6f7f9; padding:30px;\">",
                "<div style=\"max-width:520px; margin:auto; background:#fff; padding:25px; border-radius:10px;\">",
                "<h2>Password reset</h2>",
                "<p>Click the button below to reset your password:</p>",
                "<a href=\"{}/reset/{}\" style=\"background:#4a73fa; color:white; padding:12px 22px; border-radius:6px; text-decoration:none;\">Reset password</a>",
                "<p>This link is valid for 1 hour.</p>",
                "</div></div>"
            ),
            base_url, token
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_email_contains_link() {
        let email = reset_email("https://shop.example", "a@example.com", "tok123");
        assert_eq!(email.to, "a@example.com");
        assert!(email.html_body.contains("https://shop.example/reset/tok123"));
    }

    #[test]
    fn test_welcome_email_links_login() {
        let email = welcome_email("https://shop.example", "a@example.com");
        assert!(email.html_body.contains("https://shop.example/login"));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let mailer = LogMailer;
        assert!(mailer
            .send(welcome_email("http://localhost:3000", "a@example.com"))
            .await
            .is_ok());
    }
}
