use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Cupon, Fulfillment, PaymentId, Ticket},
    events::{EventProducers, TicketsIssuedEvent},
    traits::{InsertFulfillmentResult, TicketGatewayError, TicketSalesDatabase},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueResult {
    Issued { tickets: Vec<Ticket>, cupon: Option<Cupon> },
    AlreadyIssued(PaymentId),
}

/// `TicketIssuer` turns a [`Fulfillment`] into tickets exactly once per payment reference, and tells any subscribers
/// about it.
pub struct TicketIssuer<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for TicketIssuer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TicketIssuer")
    }
}

impl<B> TicketIssuer<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> TicketIssuer<B>
where B: TicketSalesDatabase
{
    /// Issues every ticket in the fulfillment, records the payment reference and redeems the coupon, all in one
    /// transaction. If the payment reference was already used, nothing is issued.
    ///
    /// Subscribers to the tickets-issued hook are notified after the transaction commits. Notification is
    /// fire-and-forget and cannot fail this call.
    pub async fn issue(&self, fulfillment: Fulfillment) -> Result<IssueResult, TicketGatewayError> {
        let buyer = fulfillment.buyer.clone();
        let payment_id = fulfillment.payment_id.clone();
        match self.db.fulfill(fulfillment).await? {
            InsertFulfillmentResult::Fulfilled { tickets, cupon } => {
                info!("🎟️ {} tickets issued for payment {payment_id} ({})", tickets.len(), buyer.email);
                self.call_tickets_issued_hook(TicketsIssuedEvent::new(payment_id, buyer, tickets.clone())).await;
                Ok(IssueResult::Issued { tickets, cupon })
            },
            InsertFulfillmentResult::AlreadyFulfilled(id) => {
                info!("🎟️ Tickets for payment {id} were already issued. Skipping.");
                Ok(IssueResult::AlreadyIssued(id))
            },
        }
    }

    async fn call_tickets_issued_hook(&self, event: TicketsIssuedEvent) {
        for emitter in &self.producers.tickets_issued_producer {
            debug!("🎟️ Notifying tickets issued hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }
}
