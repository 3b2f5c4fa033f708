use serde::{Deserialize, Serialize};

use crate::db_types::{Buyer, PaymentId, Ticket};

/// Published once for every payment reference whose tickets have just been issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketsIssuedEvent {
    pub payment_id: PaymentId,
    pub buyer: Buyer,
    pub tickets: Vec<Ticket>,
}

impl TicketsIssuedEvent {
    pub fn new(payment_id: PaymentId, buyer: Buyer, tickets: Vec<Ticket>) -> Self {
        Self { payment_id, buyer, tickets }
    }
}
