use std::{collections::BTreeMap, fmt::Debug};

use log::*;
use ticket_common::Cents;

use crate::{
    db_types::{Buyer, Cupon, Fulfillment, PaymentId, Phase, RedemptionMode},
    events::EventProducers,
    pricing::compute_unit_price,
    traits::{CheckoutProvider, CheckoutSessionRequest, TicketSalesDatabase},
    tse_api::{
        checkout_objects::{CheckoutConfig, CheckoutOutcome, PurchaseRequest},
        cupon_api::CuponLedgerApi,
        errors::CheckoutError,
        reconciliation_objects::{
            META_BUYER_EMAIL,
            META_BUYER_NAME,
            META_CUPON_CODE,
            META_PHASE_ID,
            META_PHASE_NAME,
            META_QUANTITY,
        },
        ticket_issuer::{IssueResult, TicketIssuer},
    },
};

/// `CheckoutApi` decides how a purchase request is paid for.
///
/// A request is validated against the active phase and the coupon ledger, then priced. Zero-cost orders are fulfilled
/// immediately without involving the payment provider. Everything else gets a hosted checkout session, and ticket
/// creation is left to the [`crate::ReconciliationApi`] once the provider confirms payment.
pub struct CheckoutApi<B, P> {
    db: B,
    provider: P,
    cupons: CuponLedgerApi<B>,
    issuer: TicketIssuer<B>,
    config: CheckoutConfig,
}

impl<B, P> Debug for CheckoutApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B: Clone, P> CheckoutApi<B, P> {
    pub fn new(db: B, provider: P, producers: EventProducers, config: CheckoutConfig) -> Self {
        let cupons = CuponLedgerApi::new(db.clone());
        let issuer = TicketIssuer::new(db.clone(), producers);
        Self { db, provider, cupons, issuer, config }
    }
}

impl<B, P> CheckoutApi<B, P>
where
    B: TicketSalesDatabase,
    P: CheckoutProvider,
{
    pub async fn checkout(&self, request: PurchaseRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let phase = self.db.fetch_active_phase().await?.ok_or(CheckoutError::NoActivePhase)?;
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(CheckoutError::MissingEmail)?
            .to_string();
        let quantity = request.quantity;
        if quantity < 1 {
            return Err(CheckoutError::InvalidQuantity);
        }
        if quantity > self.config.max_tickets_per_order {
            debug!("🎟️ Turned away an order for {quantity} tickets from {email}");
            return Err(CheckoutError::QuantityOverLimit(self.config.max_tickets_per_order));
        }
        let cupon = match non_blank(request.cupon_code.as_deref()) {
            Some(code) => {
                let cupon = self.cupons.find_available(code).await?.ok_or_else(|| {
                    debug!("🎟️ Cupon '{code}' was requested, but it is not available");
                    CheckoutError::InsufficientCupons
                })?;
                self.cupons.reserve(&cupon, quantity)?;
                Some(cupon)
            },
            None => None,
        };
        let unit_price = compute_unit_price(phase.price, cupon.as_ref());
        let buyer = Buyer::new(non_blank(request.name.as_deref()).map(String::from), email);
        trace!("🎟️ {quantity} x '{}' at {unit_price} each for {}", phase.name, buyer.email);
        if unit_price.is_zero() {
            self.free_fulfillment(&phase, cupon.as_ref(), buyer, unit_price, quantity).await
        } else {
            self.provider_checkout(&phase, cupon.as_ref(), buyer, unit_price, quantity).await
        }
    }

    async fn free_fulfillment(
        &self,
        phase: &Phase,
        cupon: Option<&Cupon>,
        buyer: Buyer,
        unit_price: Cents,
        quantity: i64,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let mut fulfillment =
            Fulfillment::new(PaymentId::free(), buyer).with_line(phase.id.clone(), unit_price, quantity);
        if let Some(c) = cupon {
            fulfillment = fulfillment.with_cupon(c.id.clone(), RedemptionMode::Reserve);
        }
        match self.issuer.issue(fulfillment).await? {
            IssueResult::Issued { tickets, .. } => {
                info!("🎟️ {} free tickets issued in phase '{}'", tickets.len(), phase.name);
                Ok(CheckoutOutcome::FreeTickets(tickets))
            },
            IssueResult::AlreadyIssued(id) => {
                error!("🎟️ Freshly generated payment reference {id} was already in use");
                Err(CheckoutError::DatabaseError(format!("Duplicate payment reference {id}")))
            },
        }
    }

    async fn provider_checkout(
        &self,
        phase: &Phase,
        cupon: Option<&Cupon>,
        buyer: Buyer,
        unit_price: Cents,
        quantity: i64,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let mut metadata = BTreeMap::new();
        metadata.insert(META_PHASE_ID.to_string(), phase.id.to_string());
        metadata.insert(META_PHASE_NAME.to_string(), phase.name.clone());
        metadata.insert(META_QUANTITY.to_string(), quantity.to_string());
        metadata.insert(META_BUYER_EMAIL.to_string(), buyer.email.clone());
        if let Some(name) = &buyer.name {
            metadata.insert(META_BUYER_NAME.to_string(), name.clone());
        }
        if let Some(c) = cupon {
            metadata.insert(META_CUPON_CODE.to_string(), c.name.clone());
        }
        let request = CheckoutSessionRequest {
            product_name: self.config.product_name(&phase.name),
            currency: self.config.currency.clone(),
            unit_amount: unit_price,
            quantity,
            customer_email: buyer.email,
            success_url: self.config.success_url(),
            cancel_url: self.config.cancel_url(),
            metadata,
        };
        let session = self.provider.create_checkout_session(request).await.map_err(|e| {
            warn!("🎟️ The payment provider refused to open a checkout session. {e}");
            CheckoutError::ProviderError(e.to_string())
        })?;
        let checkout_url = session
            .url
            .ok_or_else(|| CheckoutError::ProviderError("The checkout session has no payment URL".to_string()))?;
        info!("🎟️ Checkout session {} opened for {quantity} tickets in phase '{}'", session.id, phase.name);
        Ok(CheckoutOutcome::ProviderCheckout { checkout_url, session_id: session.id })
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
