use thiserror::Error;

use crate::traits::{CheckoutSessionRequest, ProviderLineItem, ProviderSession};

/// The hosted checkout provider, as seen by the engine.
#[allow(async_fn_in_trait)]
pub trait CheckoutProvider {
    /// Creates a hosted checkout session and returns it, including the URL the buyer should be redirected to.
    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<ProviderSession, ProviderError>;

    async fn fetch_checkout_session(&self, session_id: &str) -> Result<ProviderSession, ProviderError>;

    async fn fetch_line_items(&self, session_id: &str) -> Result<Vec<ProviderLineItem>, ProviderError>;
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider answered, but refused the request. The message is the provider's own.
    #[error("{0}")]
    Rejected(String),
    #[error("Could not reach the payment provider: {0}")]
    Unavailable(String),
    #[error("Unexpected response from the payment provider: {0}")]
    InvalidResponse(String),
}
