use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use ticket_common::Cents;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generates a fresh random (v4 UUID) identifier.
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(PhaseId);
string_id!(CuponId);
string_id!(TicketId);
string_id!(PaymentId);

pub const FREE_PAYMENT_PREFIX: &str = "free_";

impl PaymentId {
    /// A synthetic payment reference for purchases that never touch the payment provider.
    pub fn free() -> Self {
        Self(format!("{FREE_PAYMENT_PREFIX}{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn is_free(&self) -> bool {
        self.0.starts_with(FREE_PAYMENT_PREFIX)
    }
}

//--------------------------------------        Phase          ---------------------------------------------------------
/// A time-boxed pricing tier. `price` is in major currency units.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    pub name: String,
    pub price: i64,
    pub ticket_amount: i64,
    pub active: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhase {
    pub name: String,
    pub price: i64,
    pub ticket_amount: i64,
    pub active: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl NewPhase {
    pub fn new<S: Into<String>>(name: S, price: i64, ticket_amount: i64) -> Self {
        Self { name: name.into(), price, ticket_amount, ..Default::default() }
    }

    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

//--------------------------------------        Cupon          ---------------------------------------------------------
/// A discount code with a finite number of remaining uses.
///
/// When `percentage` is true, `value` is a percentage off the phase price. Otherwise `value` is the flat unit price
/// (in major units) that replaces the phase price.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Cupon {
    pub id: CuponId,
    pub name: String,
    pub active: bool,
    pub value: i64,
    pub amount: i64,
    pub percentage: bool,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cupon {
    /// The coupon is still valid on its end date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    pub fn is_available(&self, today: NaiveDate) -> bool {
        self.active && !self.is_expired(today) && self.amount > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCupon {
    pub name: String,
    pub value: i64,
    pub amount: i64,
    pub percentage: bool,
    pub end_date: NaiveDate,
    pub active: bool,
}

impl NewCupon {
    pub fn flat<S: Into<String>>(name: S, value: i64, amount: i64, end_date: NaiveDate) -> Self {
        Self { name: name.into(), value, amount, percentage: false, end_date, active: true }
    }

    pub fn percentage<S: Into<String>>(name: S, value: i64, amount: i64, end_date: NaiveDate) -> Self {
        Self { name: name.into(), value, amount, percentage: true, end_date, active: true }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

//--------------------------------------        Ticket         ---------------------------------------------------------
/// One admission. The ticket id doubles as its scannable code. `price` is the charged unit price in cents.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub phase_id: PhaseId,
    pub cupon_id: Option<CuponId>,
    pub client_name: Option<String>,
    pub client_email: String,
    pub payment_id: PaymentId,
    pub price: Cents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ticket annotated with the name of the phase it was sold in.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PhaseTicket {
    pub id: TicketId,
    pub phase_name: String,
    pub client_name: Option<String>,
    pub client_email: String,
    pub price: Cents,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     Fulfillment       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub name: Option<String>,
    pub email: String,
}

impl Buyer {
    pub fn new<S: Into<String>>(name: Option<String>, email: S) -> Self {
        Self { name, email: email.into() }
    }
}

/// How a coupon's remaining uses are consumed when tickets are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedemptionMode {
    /// Fail the whole fulfillment if fewer uses remain than tickets are being issued.
    Reserve,
    /// Money has already been collected: decrement, stopping at zero.
    Clamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuponRedemption {
    pub cupon_id: CuponId,
    pub mode: RedemptionMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentLine {
    pub phase_id: PhaseId,
    pub unit_price: Cents,
    pub quantity: i64,
}

/// Everything needed to issue the tickets for one payment reference in a single atomic step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    pub payment_id: PaymentId,
    pub session_id: Option<String>,
    pub buyer: Buyer,
    pub cupon: Option<CuponRedemption>,
    pub lines: Vec<FulfillmentLine>,
}

impl Fulfillment {
    pub fn new(payment_id: PaymentId, buyer: Buyer) -> Self {
        Self { payment_id, session_id: None, buyer, cupon: None, lines: Vec::new() }
    }

    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_cupon(mut self, cupon_id: CuponId, mode: RedemptionMode) -> Self {
        self.cupon = Some(CuponRedemption { cupon_id, mode });
        self
    }

    pub fn with_line(mut self, phase_id: PhaseId, unit_price: Cents, quantity: i64) -> Self {
        self.lines.push(FulfillmentLine { phase_id, unit_price, quantity });
        self
    }

    pub fn ticket_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}
