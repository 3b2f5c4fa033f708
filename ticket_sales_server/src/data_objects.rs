use serde::{Deserialize, Deserializer, Serialize};
use ticket_sales_engine::{
    checkout_objects::{IssuedTicket, PurchaseRequest},
    db_types::{Cupon, Phase, PhaseTicket},
};

//--------------------------------------       Checkout        ---------------------------------------------------------
/// The body of a `create-checkout-session` request, as sent by the public site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_quantity", deserialize_with = "quantity_from_int_or_string")]
    pub quantity: i64,
    #[serde(default, rename = "cuponCode", alias = "cupon_code")]
    pub cupon_code: Option<String>,
}

impl From<CheckoutRequest> for PurchaseRequest {
    fn from(req: CheckoutRequest) -> Self {
        Self { email: req.email, name: req.name, quantity: req.quantity, cupon_code: req.cupon_code }
    }
}

fn default_quantity() -> i64 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

/// Browsers frequently send the quantity as a string. Text that is not a number becomes zero, which checkout then
/// rejects as an invalid quantity.
fn quantity_from_int_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let quantity = match Option::<IntOrString>::deserialize(deserializer)? {
        None => default_quantity(),
        Some(IntOrString::Int(q)) => q,
        Some(IntOrString::Str(s)) if s.trim().is_empty() => default_quantity(),
        Some(IntOrString::Str(s)) => s.trim().parse::<i64>().unwrap_or(0),
    };
    Ok(quantity)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    #[serde(rename = "checkoutUrl")]
    pub checkout_url: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeTicketsResponse {
    pub success: bool,
    pub message: String,
    pub tickets: Vec<IssuedTicket>,
}

impl FreeTicketsResponse {
    pub fn new(tickets: Vec<IssuedTicket>) -> Self {
        Self { success: true, message: "Free tickets created successfully".to_string(), tickets }
    }
}

//--------------------------------------        Phases         ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub name: String,
    pub price: i64,
    pub active: bool,
}

impl From<Phase> for PhaseSummary {
    fn from(phase: Phase) -> Self {
        Self { name: phase.name, price: phase.price, active: phase.active }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseList {
    pub phases: Vec<PhaseSummary>,
}

//--------------------------------------        Cupons         ---------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct CuponQuery {
    pub cupon_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuponSummary {
    pub name: String,
    pub amount: i64,
    pub value: i64,
    pub percentage: bool,
}

impl From<Cupon> for CuponSummary {
    fn from(c: Cupon) -> Self {
        Self { name: c.name, amount: c.amount, value: c.value, percentage: c.percentage }
    }
}

//--------------------------------------    Payment status     ---------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSuccessQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSuccessResponse {
    pub success: bool,
    pub message: String,
    pub session_id: String,
    pub tickets_created: usize,
    pub tickets: Vec<PhaseTicket>,
}

impl PaymentSuccessResponse {
    pub fn new(session_id: String, tickets: Vec<PhaseTicket>) -> Self {
        Self {
            success: true,
            message: "Payment successful!".to_string(),
            session_id,
            tickets_created: tickets.len(),
            tickets,
        }
    }
}
