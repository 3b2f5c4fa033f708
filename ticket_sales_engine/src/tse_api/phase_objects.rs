use serde::{Deserialize, Serialize};

use crate::db_types::PhaseTicket;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPhase {
    pub name: String,
    pub price: i64,
    pub ticket_amount: i64,
    pub tickets_left: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub session_id: String,
    pub payment_status: Option<String>,
    pub tickets: Vec<PhaseTicket>,
}
