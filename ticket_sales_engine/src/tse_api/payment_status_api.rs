use std::fmt::Debug;

use log::*;

use crate::{
    traits::{CheckoutProvider, TicketSalesDatabase},
    tse_api::{errors::PaymentStatusError, phase_objects::PaymentStatus},
};

/// Lets a buyer returning from the hosted checkout see which tickets their payment produced.
pub struct PaymentStatusApi<B, P> {
    db: B,
    provider: P,
}

impl<B, P> Debug for PaymentStatusApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentStatusApi")
    }
}

impl<B, P> PaymentStatusApi<B, P> {
    pub fn new(db: B, provider: P) -> Self {
        Self { db, provider }
    }
}

impl<B, P> PaymentStatusApi<B, P>
where
    B: TicketSalesDatabase,
    P: CheckoutProvider,
{
    /// Fetches the session from the provider and lists the tickets stored under its payment reference.
    ///
    /// The list may be empty if the payment event has not been reconciled yet.
    pub async fn status_for_session(&self, session_id: &str) -> Result<PaymentStatus, PaymentStatusError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(PaymentStatusError::MissingSessionId);
        }
        let session = self.provider.fetch_checkout_session(session_id).await.map_err(|e| {
            warn!("🎟️ Could not verify checkout session {session_id}. {e}");
            PaymentStatusError::ProviderError(e.to_string())
        })?;
        let payment_id = session.payment_id();
        let tickets = self.db.fetch_phase_tickets_for_payment(&payment_id).await?;
        debug!("🎟️ Session {session_id} (payment {payment_id}) has {} tickets", tickets.len());
        Ok(PaymentStatus { session_id: session.id, payment_status: session.payment_status, tickets })
    }
}
