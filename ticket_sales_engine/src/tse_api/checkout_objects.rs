use serde::{Deserialize, Serialize};
use ticket_common::{Cents, CURRENCY_CODE_LOWER};

use crate::db_types::{Ticket, TicketId};

/// The largest number of tickets a single order may ask for, unless configured otherwise.
pub const DEFAULT_MAX_TICKETS_PER_ORDER: i64 = 100;

/// Static settings that shape the hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Base URL of the public site. The buyer is sent back here once the provider is done with them.
    pub public_url: String,
    /// Product name prefix shown on the checkout page. The phase name is appended to it.
    pub product_prefix: String,
    pub currency: String,
    /// Orders asking for more tickets than this are turned away before anything is priced or stored.
    pub max_tickets_per_order: i64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:3000".to_string(),
            product_prefix: "Abyzma Ticket".to_string(),
            currency: CURRENCY_CODE_LOWER.to_string(),
            max_tickets_per_order: DEFAULT_MAX_TICKETS_PER_ORDER,
        }
    }
}

impl CheckoutConfig {
    pub fn success_url(&self) -> String {
        format!("{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}", self.public_url.trim_end_matches('/'))
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/checkout?canceled=true", self.public_url.trim_end_matches('/'))
    }

    pub fn product_name(&self, phase_name: &str) -> String {
        format!("{} {phase_name}", self.product_prefix)
    }
}

/// A buyer's request to purchase tickets in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub quantity: i64,
    pub cupon_code: Option<String>,
}

impl PurchaseRequest {
    pub fn new<S: Into<String>>(email: S, quantity: i64) -> Self {
        Self { email: Some(email.into()), name: None, quantity, cupon_code: None }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_cupon_code<S: Into<String>>(mut self, code: S) -> Self {
        self.cupon_code = Some(code.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTicket {
    pub id: TicketId,
    pub price: Cents,
}

impl From<&Ticket> for IssuedTicket {
    fn from(ticket: &Ticket) -> Self {
        Self { id: ticket.id.clone(), price: ticket.price }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order cost nothing. Tickets were issued on the spot.
    FreeTickets(Vec<Ticket>),
    /// The buyer must complete payment at `checkout_url`. Nothing has been stored yet.
    ProviderCheckout { checkout_url: String, session_id: String },
}

impl CheckoutOutcome {
    pub fn is_free(&self) -> bool {
        matches!(self, CheckoutOutcome::FreeTickets(_))
    }
}
