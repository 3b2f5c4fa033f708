use std::sync::Arc;

use log::*;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    config::StripeConfig,
    data_objects::{List, NewCheckoutSession},
    CheckoutSession,
    LineItem,
    StripeApiError,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for StripeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StripeApi({})", self.config.api_url)
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        trace!("Sending Stripe request: {method} {url}");
        self.client.request(method, url).bearer_auth(self.config.secret_key.reveal())
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, StripeApiError> {
        let response = req.send().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("Stripe request successful. {status}");
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let body = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error.message)
                .unwrap_or(body);
            warn!("Stripe request failed. {status}. {message}");
            Err(StripeApiError::QueryError { status: status.as_u16(), message })
        }
    }

    pub async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> Result<CheckoutSession, StripeApiError> {
        debug!("Creating checkout session for {} x '{}'", session.quantity, session.product_name);
        let req = self.request(Method::POST, "/checkout/sessions").form(&session.to_form());
        let result = self.send::<CheckoutSession>(req).await?;
        info!("Created checkout session {}", result.id);
        Ok(result)
    }

    pub async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, StripeApiError> {
        let session_id = checked_id(session_id)?;
        debug!("Fetching checkout session {session_id}");
        let req = self.request(Method::GET, &format!("/checkout/sessions/{session_id}"));
        self.send(req).await
    }

    /// Fetches the line items of a session with each price's product expanded, so product metadata is available.
    pub async fn list_line_items(&self, session_id: &str) -> Result<Vec<LineItem>, StripeApiError> {
        let session_id = checked_id(session_id)?;
        debug!("Fetching line items for checkout session {session_id}");
        let req = self
            .request(Method::GET, &format!("/checkout/sessions/{session_id}/line_items"))
            .query(&[("expand[]", "data.price.product"), ("limit", "100")]);
        let list = self.send::<List<LineItem>>(req).await?;
        Ok(list.data)
    }
}

/// Ids become a URL path segment. Only letters, digits and underscores are accepted.
fn checked_id(id: &str) -> Result<&str, StripeApiError> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(id)
    } else {
        warn!("Refusing to query Stripe with the id '{id}'");
        Err(StripeApiError::InvalidId(id.to_string()))
    }
}
