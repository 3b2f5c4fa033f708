use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db_types::{Buyer, PaymentId, Phase, Ticket};

pub const META_PHASE_ID: &str = "phase_id";
pub const META_PHASE_NAME: &str = "phase_name";
pub const META_CUPON_CODE: &str = "cupon_code";
pub const META_QUANTITY: &str = "quantity";
pub const META_BUYER_NAME: &str = "buyer_name";
pub const META_BUYER_EMAIL: &str = "buyer_email";

/// The payment provider events the reconciler understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEvent {
    CheckoutSessionCompleted(CompletedCheckout),
    PaymentConfirmed(ConfirmedPayment),
    Unhandled { event_type: String },
}

impl PaymentEvent {
    pub fn name(&self) -> &str {
        match self {
            PaymentEvent::CheckoutSessionCompleted(_) => "checkout session completed",
            PaymentEvent::PaymentConfirmed(_) => "payment confirmed",
            PaymentEvent::Unhandled { event_type } => event_type.as_str(),
        }
    }
}

/// A hosted checkout session that the buyer has paid for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedCheckout {
    pub session_id: Option<String>,
    pub payment_reference: Option<String>,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// A successful charge, independent of the checkout session that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedPayment {
    pub payment_reference: String,
    pub receipt_email: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// What a payment event asks us to issue, once phases have been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseIntent {
    pub payment_id: PaymentId,
    pub session_id: Option<String>,
    pub buyer: Buyer,
    pub cupon_code: Option<String>,
    pub lines: Vec<(Phase, i64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    Fulfilled { payment_id: PaymentId, tickets: Vec<Ticket> },
    AlreadyFulfilled(PaymentId),
    /// The event referred to no phase we could find. Logged, but not an error.
    NothingToFulfil(PaymentId),
    /// The event type is not one we act on, or it carried nothing actionable.
    Ignored,
}
