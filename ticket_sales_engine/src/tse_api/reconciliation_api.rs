use std::{collections::BTreeMap, fmt::Debug};

use log::*;

use crate::{
    db_types::{Buyer, Fulfillment, PaymentId, Phase, PhaseId, RedemptionMode},
    events::EventProducers,
    pricing::compute_unit_price,
    traits::{CheckoutProvider, ProviderLineItem, TicketSalesDatabase},
    tse_api::{
        cupon_api::CuponLedgerApi,
        errors::ReconciliationError,
        reconciliation_objects::{
            CompletedCheckout,
            ConfirmedPayment,
            PaymentEvent,
            PurchaseIntent,
            ReconciliationOutcome,
            META_BUYER_EMAIL,
            META_BUYER_NAME,
            META_CUPON_CODE,
            META_PHASE_ID,
            META_QUANTITY,
        },
        ticket_issuer::{IssueResult, TicketIssuer},
    },
};

const INVALID_SESSION: &str = "Invalid session data";

/// `ReconciliationApi` turns payment provider confirmations into tickets.
///
/// Providers deliver events at least once and in no particular order, and a single purchase produces more than one
/// event type. The payment reference is the idempotency key: the first event to reach [`TicketIssuer::issue`] for a
/// reference issues the tickets and redeems the coupon, and every later event for the same reference is a no-op.
pub struct ReconciliationApi<B, P> {
    db: B,
    provider: P,
    cupons: CuponLedgerApi<B>,
    issuer: TicketIssuer<B>,
    product_prefix: String,
}

impl<B, P> Debug for ReconciliationApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B: Clone, P> ReconciliationApi<B, P> {
    /// `product_prefix` is the text that precedes the phase name in product descriptions. It is only needed for
    /// sessions that arrive without purchase metadata.
    pub fn new<S: Into<String>>(db: B, provider: P, producers: EventProducers, product_prefix: S) -> Self {
        let cupons = CuponLedgerApi::new(db.clone());
        let issuer = TicketIssuer::new(db.clone(), producers);
        Self { db, provider, cupons, issuer, product_prefix: product_prefix.into() }
    }
}

impl<B, P> ReconciliationApi<B, P>
where
    B: TicketSalesDatabase,
    P: CheckoutProvider,
{
    /// Processes a single, already authenticated, payment event.
    pub async fn process_event(&self, event: PaymentEvent) -> Result<ReconciliationOutcome, ReconciliationError> {
        debug!("🔄️ Processing {} event", event.name());
        match event {
            PaymentEvent::CheckoutSessionCompleted(checkout) => self.reconcile_checkout(checkout).await,
            PaymentEvent::PaymentConfirmed(payment) => self.reconcile_payment(payment).await,
            PaymentEvent::Unhandled { event_type } => {
                info!("🔄️ Unhandled event type: {event_type}");
                Ok(ReconciliationOutcome::Ignored)
            },
        }
    }

    async fn reconcile_checkout(
        &self,
        checkout: CompletedCheckout,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        let CompletedCheckout { session_id, payment_reference, customer_email, customer_name, metadata } = checkout;
        let email = customer_email.filter(|e| !e.trim().is_empty()).or_else(|| metadata.get(META_BUYER_EMAIL).cloned());
        let (Some(session_id), Some(email)) = (session_id.filter(|s| !s.is_empty()), email) else {
            warn!("🔄️ Completed checkout session is missing its id or the buyer's email. Ignoring it.");
            return Err(ReconciliationError::InvalidEvent(INVALID_SESSION.to_string()));
        };
        let payment_id = PaymentId::from(payment_reference.unwrap_or_else(|| session_id.clone()));
        if self.db.payment_is_fulfilled(&payment_id).await? {
            info!("🔄️ Payment {payment_id} (session {session_id}) has already been fulfilled");
            return Ok(ReconciliationOutcome::AlreadyFulfilled(payment_id));
        }
        let name = customer_name.or_else(|| metadata.get(META_BUYER_NAME).cloned());
        let lines = match self.phase_from_metadata(&metadata).await? {
            Some(phase) => vec![(phase, quantity_from_metadata(&metadata))],
            None => {
                debug!("🔄️ Session {session_id} carries no usable phase. Falling back to its line items.");
                self.phases_from_line_items(&session_id).await?
            },
        };
        let intent = PurchaseIntent {
            payment_id,
            session_id: Some(session_id),
            buyer: Buyer::new(name, email),
            cupon_code: metadata.get(META_CUPON_CODE).cloned(),
            lines,
        };
        self.fulfil(intent).await
    }

    async fn reconcile_payment(
        &self,
        payment: ConfirmedPayment,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        let ConfirmedPayment { payment_reference, receipt_email, metadata } = payment;
        let email = metadata.get(META_BUYER_EMAIL).cloned().or(receipt_email).filter(|e| !e.trim().is_empty());
        let (Some(phase_id), Some(email)) = (metadata.get(META_PHASE_ID), email) else {
            debug!("🔄️ Payment {payment_reference} has no purchase metadata. Leaving it to the session event.");
            return Ok(ReconciliationOutcome::Ignored);
        };
        let payment_id = PaymentId::from(payment_reference);
        if self.db.payment_is_fulfilled(&payment_id).await? {
            info!("🔄️ Payment {payment_id} has already been fulfilled");
            return Ok(ReconciliationOutcome::AlreadyFulfilled(payment_id));
        }
        let lines = match self.active_phase_by_id(phase_id).await? {
            Some(phase) => vec![(phase, quantity_from_metadata(&metadata))],
            None => Vec::new(),
        };
        let intent = PurchaseIntent {
            payment_id,
            session_id: None,
            buyer: Buyer::new(metadata.get(META_BUYER_NAME).cloned(), email),
            cupon_code: metadata.get(META_CUPON_CODE).cloned(),
            lines,
        };
        self.fulfil(intent).await
    }

    async fn fulfil(&self, intent: PurchaseIntent) -> Result<ReconciliationOutcome, ReconciliationError> {
        let PurchaseIntent { payment_id, session_id, buyer, cupon_code, lines } = intent;
        if lines.is_empty() {
            warn!("🔄️ No phase could be resolved for payment {payment_id}. No tickets were issued.");
            return Ok(ReconciliationOutcome::NothingToFulfil(payment_id));
        }
        let cupon = match cupon_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => {
                let cupon = self.cupons.find_available(code).await?;
                if cupon.is_none() {
                    info!("🔄️ Cupon '{code}' on payment {payment_id} is not available. Treating it as no cupon.");
                }
                cupon
            },
            None => None,
        };
        let mut fulfillment = Fulfillment::new(payment_id.clone(), buyer);
        if let Some(id) = session_id {
            fulfillment = fulfillment.with_session_id(id);
        }
        if let Some(c) = &cupon {
            fulfillment = fulfillment.with_cupon(c.id.clone(), RedemptionMode::Clamp);
        }
        for (phase, quantity) in lines {
            let unit_price = compute_unit_price(phase.price, cupon.as_ref());
            fulfillment = fulfillment.with_line(phase.id, unit_price, quantity);
        }
        match self.issuer.issue(fulfillment).await? {
            IssueResult::Issued { tickets, .. } => {
                info!("🔄️ Payment {payment_id} reconciled. {} tickets issued.", tickets.len());
                Ok(ReconciliationOutcome::Fulfilled { payment_id, tickets })
            },
            IssueResult::AlreadyIssued(id) => {
                info!("🔄️ Payment {id} was fulfilled concurrently by another event");
                Ok(ReconciliationOutcome::AlreadyFulfilled(id))
            },
        }
    }

    async fn phase_from_metadata(
        &self,
        metadata: &BTreeMap<String, String>,
    ) -> Result<Option<Phase>, ReconciliationError> {
        match metadata.get(META_PHASE_ID).filter(|id| !id.trim().is_empty()) {
            Some(id) => self.active_phase_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn active_phase_by_id(&self, id: &str) -> Result<Option<Phase>, ReconciliationError> {
        let phase = self.db.fetch_phase(&PhaseId::from(id.trim())).await?;
        let phase = phase.filter(|p| {
            if !p.active {
                warn!("🔄️ Phase '{}' is referenced by a payment, but is no longer active", p.name);
            }
            p.active
        });
        Ok(phase)
    }

    /// Compatibility path for sessions created without purchase metadata. Each line item is matched to an active phase
    /// by its product's `phase_id` metadata, or failing that, by its description with the product prefix removed.
    async fn phases_from_line_items(&self, session_id: &str) -> Result<Vec<(Phase, i64)>, ReconciliationError> {
        let items = self.provider.fetch_line_items(session_id).await.map_err(|e| {
            error!("🔄️ Could not fetch the line items for session {session_id}. {e}");
            ReconciliationError::ProviderError(e.to_string())
        })?;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity < 1 {
                continue;
            }
            match self.phase_for_line_item(&item).await? {
                Some(phase) => lines.push((phase, item.quantity)),
                None => warn!("🔄️ No active phase matches line item {:?} of session {session_id}", item.description),
            }
        }
        Ok(lines)
    }

    async fn phase_for_line_item(&self, item: &ProviderLineItem) -> Result<Option<Phase>, ReconciliationError> {
        if let Some(id) = item.product_metadata.get(META_PHASE_ID) {
            if let Some(phase) = self.active_phase_by_id(id).await? {
                return Ok(Some(phase));
            }
        }
        let description = item.description.as_deref().unwrap_or_default();
        let name = strip_product_prefix(description, &self.product_prefix);
        let phase = self.db.fetch_active_phase_by_name(name).await?;
        Ok(phase)
    }
}

/// Reads the `quantity` metadata. Missing values mean a single ticket; anything that is not a positive integer is
/// logged and also treated as a single ticket.
pub fn quantity_from_metadata(metadata: &BTreeMap<String, String>) -> i64 {
    match metadata.get(META_QUANTITY).map(|q| q.trim().parse::<i64>()) {
        None => 1,
        Some(Ok(q)) if q >= 1 => q,
        Some(_) => {
            warn!("🔄️ Invalid quantity {:?} in payment metadata. Issuing one ticket.", metadata.get(META_QUANTITY));
            1
        },
    }
}

fn strip_product_prefix<'a>(description: &'a str, prefix: &str) -> &'a str {
    let description = description.trim();
    description.strip_prefix(prefix).map(str::trim).unwrap_or(description)
}
