use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::StripeApiError;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";

//--------------------------------------   Checkout sessions   ---------------------------------------------------------
/// Parameters for a single-line-item, card-only, hosted checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCheckoutSession {
    pub product_name: String,
    pub currency: String,
    /// Price of one unit, in cents.
    pub unit_amount: i64,
    pub quantity: i64,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Copied onto both the session and its payment intent.
    pub metadata: BTreeMap<String, String>,
}

impl NewCheckoutSession {
    /// Stripe expects form-encoded bodies with bracketed keys for nested fields.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("customer_email".to_string(), self.customer_email.clone()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("line_items[0][quantity]".to_string(), self.quantity.to_string()),
            ("line_items[0][price_data][currency]".to_string(), self.currency.clone()),
            ("line_items[0][price_data][unit_amount]".to_string(), self.unit_amount.to_string()),
            ("line_items[0][price_data][product_data][name]".to_string(), self.product_name.clone()),
        ];
        for (k, v) in &self.metadata {
            form.push((format!("metadata[{k}]"), v.clone()));
            form.push((format!("payment_intent_data[metadata][{k}]"), v.clone()));
        }
        form
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<Expandable<PaymentIntent>>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl CheckoutSession {
    pub fn payment_intent_id(&self) -> Option<&str> {
        self.payment_intent.as_ref().map(Expandable::id)
    }

    /// The email the buyer typed on the checkout page, or the one we pre-filled.
    pub fn email(&self) -> Option<&str> {
        self.customer_details.as_ref().and_then(|d| d.email.as_deref()).or(self.customer_email.as_deref())
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_details.as_ref().and_then(|d| d.name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

//--------------------------------------      Line items       ---------------------------------------------------------
/// A field that holds either an object id or, when requested with `expand[]`, the object itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T: HasId> Expandable<T> {
    pub fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id.as_str(),
            Expandable::Object(o) => o.object_id(),
        }
    }
}

impl<T> Expandable<T> {
    pub fn as_object(&self) -> Option<&T> {
        match self {
            Expandable::Id(_) => None,
            Expandable::Object(o) => Some(o.as_ref()),
        }
    }
}

pub trait HasId {
    fn object_id(&self) -> &str;
}

impl HasId for PaymentIntent {
    fn object_id(&self) -> &str {
        &self.id
    }
}

impl HasId for Product {
    fn object_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub id: String,
    #[serde(default)]
    pub unit_amount: Option<i64>,
    #[serde(default)]
    pub product: Option<Expandable<Product>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub price: Option<Price>,
}

impl LineItem {
    pub fn product(&self) -> Option<&Product> {
        self.price.as_ref().and_then(|p| p.product.as_ref()).and_then(Expandable::as_object)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct List<T> {
    pub data: Vec<T>,
}

//--------------------------------------        Events         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripeEventData {
    pub object: Value,
}

/// A webhook event. Only the envelope is typed; `data.object` is decoded on demand for the event types we handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    pub data: StripeEventData,
}

impl StripeEvent {
    pub fn from_payload(payload: &[u8]) -> Result<Self, StripeApiError> {
        serde_json::from_slice(payload).map_err(|e| StripeApiError::JsonError(e.to_string()))
    }

    pub fn checkout_session(&self) -> Result<CheckoutSession, StripeApiError> {
        self.object()
    }

    pub fn payment_intent(&self) -> Result<PaymentIntent, StripeApiError> {
        self.object()
    }

    fn object<T: DeserializeOwned>(&self) -> Result<T, StripeApiError> {
        serde_json::from_value(self.data.object.clone()).map_err(|e| StripeApiError::JsonError(e.to_string()))
    }
}
