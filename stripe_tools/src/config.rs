use std::time::Duration;

use log::*;
use ticket_common::Secret;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Secret<String>,
    /// Base URL of the REST API, without a trailing slash. Overridden in tests.
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: Secret::default(),
            api_url: DEFAULT_STRIPE_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl StripeConfig {
    pub fn new<K: Into<String>, U: Into<String>>(secret_key: K, api_url: U) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { secret_key: Secret::new(secret_key.into()), api_url, ..Default::default() }
    }

    pub fn new_from_env_or_default() -> Self {
        let secret_key = Secret::new(std::env::var("TSG_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ TSG_STRIPE_SECRET_KEY not set. Calls to Stripe will fail.");
            String::default()
        }));
        let api_url = std::env::var("TSG_STRIPE_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_STRIPE_API_URL.to_string());
        let timeout = std::env::var("TSG_STRIPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid TSG_STRIPE_TIMEOUT_SECS value '{s}'. {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self { secret_key, api_url, timeout: Duration::from_secs(timeout) }
    }
}
