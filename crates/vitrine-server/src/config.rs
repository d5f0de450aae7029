//! Server configuration.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use vitrine_commerce::money::Currency;
use vitrine_commerce::pricing::PricingConfig;

/// Command-line and environment configuration for the server binary.
#[derive(Parser, Debug)]
#[command(name = "vitrine-server", about = "Vitrine storefront service")]
pub struct CliArgs {
    /// Address to listen on.
    #[arg(long, env = "VITRINE_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Public base URL, used in checkout callbacks and email links.
    #[arg(long, env = "VITRINE_BASE_URL", default_value = "http://localhost:3000")]
    pub base_url: String,

    /// Directory for generated invoices.
    #[arg(long, env = "VITRINE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Currency code for all prices.
    #[arg(long, env = "VITRINE_CURRENCY", default_value = "INR")]
    pub currency: String,

    /// Tax rate in whole percent.
    #[arg(long, env = "VITRINE_TAX_RATE_PERCENT", default_value_t = 12)]
    pub tax_rate_percent: u32,

    /// Subtotal (minor units) at or above which shipping is free.
    #[arg(long, env = "VITRINE_FREE_SHIPPING_THRESHOLD", default_value_t = 5000)]
    pub free_shipping_threshold: i64,

    /// Flat shipping cost (minor units) below the threshold.
    #[arg(long, env = "VITRINE_FLAT_SHIPPING_COST", default_value_t = 500)]
    pub flat_shipping_cost: i64,

    /// Products per catalog page.
    #[arg(long, env = "VITRINE_ITEMS_PER_PAGE", default_value_t = 4)]
    pub items_per_page: u64,

    /// Hosted checkout API endpoint; the mock provider is used when
    /// unset.
    #[arg(long, env = "VITRINE_CHECKOUT_ENDPOINT")]
    pub checkout_endpoint: Option<String>,

    /// Hosted checkout API secret key.
    #[arg(long, env = "VITRINE_CHECKOUT_SECRET")]
    pub checkout_secret: Option<String>,

    /// Mail API endpoint; emails are logged instead when unset.
    #[arg(long, env = "VITRINE_MAIL_ENDPOINT")]
    pub mail_endpoint: Option<String>,

    /// Mail API key.
    #[arg(long, env = "VITRINE_MAIL_API_KEY")]
    pub mail_api_key: Option<String>,

    /// From address for outgoing mail.
    #[arg(long, env = "VITRINE_MAIL_FROM", default_value = "Vitrine <shop@vitrine.example>")]
    pub mail_from: String,

    /// Bootstrap admin email; created at startup when set together with
    /// the password.
    #[arg(long, env = "VITRINE_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Bootstrap admin password.
    #[arg(long, env = "VITRINE_ADMIN_PASSWORD")]
    pub admin_password: Option<String>,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address.
    pub bind: SocketAddr,
    /// Public base URL without a trailing slash.
    pub base_url: String,
    /// Directory for generated invoices.
    pub data_dir: PathBuf,
    /// Pricing constants.
    pub pricing: PricingConfig,
    /// Products per catalog page.
    pub items_per_page: u64,
    /// Hosted checkout endpoint + secret, when configured.
    pub checkout_api: Option<(String, String)>,
    /// Mail endpoint + API key, when configured.
    pub mail_api: Option<(String, String)>,
    /// From address for outgoing mail.
    pub mail_from: String,
    /// Bootstrap admin credentials, when configured.
    pub bootstrap_admin: Option<(String, String)>,
}

impl Config {
    /// Build a config from parsed arguments.
    pub fn from_args(args: CliArgs) -> anyhow::Result<Self> {
        let currency = Currency::from_code(&args.currency)
            .ok_or_else(|| anyhow::anyhow!("unsupported currency code: {}", args.currency))?;
        Ok(Self {
            bind: args.bind,
            base_url: args.base_url.trim_end_matches('/').to_string(),
            data_dir: args.data_dir,
            pricing: PricingConfig {
                currency,
                tax_rate_percent: args.tax_rate_percent,
                free_shipping_threshold: args.free_shipping_threshold,
                flat_shipping_cost: args.flat_shipping_cost,
            },
            items_per_page: args.items_per_page,
            checkout_api: args.checkout_endpoint.zip(args.checkout_secret),
            mail_api: args.mail_endpoint.zip(args.mail_api_key),
            mail_from: args.mail_from,
            bootstrap_admin: args.admin_email.zip(args.admin_password),
        })
    }

    /// Defaults suitable for tests and local development.
    pub fn for_tests() -> Self {
        Self {
            bind: "127.0.0.1:0".parse().unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 0))),
            base_url: "http://localhost:3000".to_string(),
            data_dir: PathBuf::from("data"),
            pricing: PricingConfig::default(),
            items_per_page: 4,
            checkout_api: None,
            mail_api: None,
            mail_from: "Vitrine <shop@vitrine.example>".to_string(),
            bootstrap_admin: None,
        }
    }

    /// Callback URL the provider redirects to after a successful payment.
    pub fn success_url(&self) -> String {
        format!("{}/checkout/success", self.base_url)
    }

    /// Callback URL the provider redirects to on cancel.
    pub fn cancel_url(&self) -> String {
        format!("{}/checkout/cancel", self.base_url)
    }

    /// Directory invoices are written to.
    pub fn invoice_dir(&self) -> PathBuf {
        self.data_dir.join("invoices")
    }
}
