use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ticket_common::Cents;

use crate::db_types::{Cupon, PaymentId, Ticket};

pub enum InsertFulfillmentResult {
    Fulfilled { tickets: Vec<Ticket>, cupon: Option<Cupon> },
    AlreadyFulfilled(PaymentId),
}

/// A request for a single-line hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub product_name: String,
    pub currency: String,
    pub unit_amount: Cents,
    pub quantity: i64,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Attached to both the session and the underlying payment.
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSession {
    pub id: String,
    pub url: Option<String>,
    /// The provider's payment reference (payment intent) once one exists.
    pub payment_reference: Option<String>,
    pub payment_status: Option<String>,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl ProviderSession {
    /// The reference tickets for this session are stored under. Falls back to the session id when the provider has not
    /// (yet) attached a payment.
    pub fn payment_id(&self) -> PaymentId {
        PaymentId::from(self.payment_reference.clone().unwrap_or_else(|| self.id.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLineItem {
    pub description: Option<String>,
    pub quantity: i64,
    pub product_metadata: BTreeMap<String, String>,
}
