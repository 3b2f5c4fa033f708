//! Server configuration.
//!
//! Everything is read from `TSG_*` environment variables. Missing or invalid values fall back to defaults, and every
//! fallback is logged so that a misconfigured deployment is easy to spot.
use std::env;

use log::*;
use stripe_tools::{webhook::DEFAULT_TOLERANCE_SECS, StripeConfig};
use ticket_common::{helpers::parse_boolean_flag, Secret, CURRENCY_CODE_LOWER};
use ticket_sales_engine::checkout_objects::{CheckoutConfig, DEFAULT_MAX_TICKETS_PER_ORDER};

const DEFAULT_TSG_HOST: &str = "127.0.0.1";
const DEFAULT_TSG_PORT: u16 = 3001;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/ticket_store.db";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_EVENT_NAME: &str = "Abyzma";
const DEFAULT_PRODUCT_PREFIX: &str = "Abyzma Ticket";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAIL_FROM: &str = "noreply@abyzma.com";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub checkout: CheckoutConfig,
    pub stripe: StripeConfig,
    pub webhook: WebhookConfig,
    pub mail: MailConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TSG_HOST.to_string(),
            port: DEFAULT_TSG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            checkout: CheckoutConfig::default(),
            stripe: StripeConfig::default(),
            webhook: WebhookConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("TSG_HOST").ok().unwrap_or_else(|| DEFAULT_TSG_HOST.into());
        let port = env::var("TSG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for TSG_PORT. {e} Using the default, {DEFAULT_TSG_PORT}, instead."
                    );
                    DEFAULT_TSG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_TSG_PORT);
        let database_url = env::var("TSG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ TSG_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let checkout = CheckoutConfig {
            public_url: env::var("TSG_PUBLIC_URL").unwrap_or_else(|_| {
                warn!("🪛️ TSG_PUBLIC_URL is not set. Checkout return links will point at {DEFAULT_PUBLIC_URL}.");
                DEFAULT_PUBLIC_URL.to_string()
            }),
            product_prefix: env::var("TSG_PRODUCT_PREFIX").unwrap_or_else(|_| DEFAULT_PRODUCT_PREFIX.to_string()),
            currency: env::var("TSG_CURRENCY")
                .map(|c| c.trim().to_lowercase())
                .unwrap_or_else(|_| CURRENCY_CODE_LOWER.to_string()),
            max_tickets_per_order: env::var("TSG_MAX_TICKETS_PER_ORDER")
                .ok()
                .and_then(|s| {
                    let max = s.parse::<i64>().ok().filter(|n| *n > 0);
                    if max.is_none() {
                        warn!("🪛️ Invalid TSG_MAX_TICKETS_PER_ORDER value '{s}'. Using {DEFAULT_MAX_TICKETS_PER_ORDER}.");
                    }
                    max
                })
                .unwrap_or(DEFAULT_MAX_TICKETS_PER_ORDER),
        };
        let stripe = StripeConfig::new_from_env_or_default();
        let webhook = WebhookConfig::from_env_or_default();
        let mail = MailConfig::from_env_or_default();
        Self { host, port, database_url, checkout, stripe, webhook, mail }
    }
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub secret: Secret<String>,
    /// If false, webhook signatures are not checked at all. **DANGER**
    pub signature_checks: bool,
    pub tolerance_secs: i64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self { secret: Secret::default(), signature_checks: true, tolerance_secs: DEFAULT_TOLERANCE_SECS }
    }
}

impl WebhookConfig {
    pub fn from_env_or_default() -> Self {
        let secret = Secret::new(env::var("TSG_STRIPE_WEBHOOK_SECRET").unwrap_or_default());
        let signature_checks = parse_boolean_flag(env::var("TSG_STRIPE_SIGNATURE_CHECKS").ok(), true);
        let tolerance_secs = env::var("TSG_STRIPE_SIGNATURE_TOLERANCE_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid TSG_STRIPE_SIGNATURE_TOLERANCE_SECS value '{s}'. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_TOLERANCE_SECS);
        let result = Self { secret, signature_checks, tolerance_secs };
        result.warn_if_insecure();
        result
    }

    pub fn warn_if_insecure(&self) {
        if !self.signature_checks {
            warn!("🪛️ Stripe webhook signature checks are DISABLED. Anyone can forge payment confirmations.");
        } else if self.secret.reveal().is_empty() {
            warn!("🪛️ TSG_STRIPE_WEBHOOK_SECRET is not set. Every Stripe webhook will be rejected.");
        }
    }
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub event_name: String,
    pub from: String,
    /// When `None`, confirmation emails are written to the log instead of being sent.
    pub smtp: Option<SmtpConfig>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self { event_name: DEFAULT_EVENT_NAME.to_string(), from: DEFAULT_MAIL_FROM.to_string(), smtp: None }
    }
}

impl MailConfig {
    pub fn from_env_or_default() -> Self {
        let event_name = env::var("TSG_EVENT_NAME").unwrap_or_else(|_| DEFAULT_EVENT_NAME.to_string());
        let from = env::var("TSG_MAIL_FROM").unwrap_or_else(|_| DEFAULT_MAIL_FROM.to_string());
        let smtp = match env::var("TSG_SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => {
                let port = env::var("TSG_SMTP_PORT")
                    .ok()
                    .and_then(|s| s.parse::<u16>().map_err(|e| warn!("🪛️ Invalid TSG_SMTP_PORT '{s}'. {e}")).ok())
                    .unwrap_or(DEFAULT_SMTP_PORT);
                let username = env::var("TSG_SMTP_USERNAME").unwrap_or_default();
                let password = Secret::new(env::var("TSG_SMTP_PASSWORD").unwrap_or_default());
                Some(SmtpConfig { host, port, username, password })
            },
            _ => {
                warn!("🪛️ TSG_SMTP_HOST is not set. Confirmation emails will be logged, not sent.");
                None
            },
        };
        Self { event_name, from, smtp }
    }
}
