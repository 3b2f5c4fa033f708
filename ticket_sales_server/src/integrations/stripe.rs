//! Glue between the Stripe client and the ticket sales engine.
//!
//! [`StripeCheckoutProvider`] implements the engine's [`CheckoutProvider`] seam on top of [`StripeApi`], and
//! [`payment_event_from_stripe`] turns a verified webhook event into the engine's closed [`PaymentEvent`] enum.
use log::*;
use stripe_tools::{
    CheckoutSession,
    LineItem,
    NewCheckoutSession,
    StripeApi,
    StripeApiError,
    StripeEvent,
    CHECKOUT_SESSION_COMPLETED,
    PAYMENT_INTENT_SUCCEEDED,
};
use ticket_sales_engine::{
    reconciliation_objects::{CompletedCheckout, ConfirmedPayment, PaymentEvent},
    traits::{CheckoutProvider, CheckoutSessionRequest, ProviderError, ProviderLineItem, ProviderSession},
};

#[derive(Debug, Clone)]
pub struct StripeCheckoutProvider {
    api: StripeApi,
}

impl StripeCheckoutProvider {
    pub fn new(api: StripeApi) -> Self {
        Self { api }
    }
}

impl CheckoutProvider for StripeCheckoutProvider {
    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<ProviderSession, ProviderError> {
        let session = NewCheckoutSession {
            product_name: request.product_name,
            currency: request.currency,
            unit_amount: request.unit_amount.value(),
            quantity: request.quantity,
            customer_email: request.customer_email,
            success_url: request.success_url,
            cancel_url: request.cancel_url,
            metadata: request.metadata,
        };
        let session = self.api.create_checkout_session(&session).await.map_err(provider_error)?;
        Ok(provider_session(session))
    }

    async fn fetch_checkout_session(&self, session_id: &str) -> Result<ProviderSession, ProviderError> {
        let session = self.api.retrieve_checkout_session(session_id).await.map_err(provider_error)?;
        Ok(provider_session(session))
    }

    async fn fetch_line_items(&self, session_id: &str) -> Result<Vec<ProviderLineItem>, ProviderError> {
        let items = self.api.list_line_items(session_id).await.map_err(provider_error)?;
        Ok(items.into_iter().map(provider_line_item).collect())
    }
}

fn provider_error(e: StripeApiError) -> ProviderError {
    match e {
        StripeApiError::QueryError { message, .. } => ProviderError::Rejected(message),
        e @ StripeApiError::InvalidId(_) => ProviderError::Rejected(e.to_string()),
        StripeApiError::JsonError(s) => ProviderError::InvalidResponse(s),
        StripeApiError::RestResponseError(s) | StripeApiError::Initialization(s) => ProviderError::Unavailable(s),
    }
}

fn provider_session(session: CheckoutSession) -> ProviderSession {
    ProviderSession {
        payment_reference: session.payment_intent_id().map(String::from),
        customer_email: session.email().map(String::from),
        customer_name: session.customer_name().map(String::from),
        id: session.id,
        url: session.url,
        payment_status: session.payment_status,
        metadata: session.metadata,
    }
}

fn provider_line_item(item: LineItem) -> ProviderLineItem {
    let product_metadata = item.product().map(|p| p.metadata.clone()).unwrap_or_default();
    ProviderLineItem { description: item.description, quantity: item.quantity.unwrap_or(1), product_metadata }
}

/// Maps a Stripe webhook event onto a [`PaymentEvent`]. Event types the reconciler does not act on become
/// [`PaymentEvent::Unhandled`]. An error means the event claimed to be a type we handle, but its object was malformed.
pub fn payment_event_from_stripe(event: &StripeEvent) -> Result<PaymentEvent, StripeApiError> {
    match event.event_type.as_str() {
        CHECKOUT_SESSION_COMPLETED => {
            let session = event.checkout_session()?;
            trace!("Stripe checkout session {} completed", session.id);
            Ok(PaymentEvent::CheckoutSessionCompleted(CompletedCheckout {
                payment_reference: session.payment_intent_id().map(String::from),
                customer_email: session.email().map(String::from),
                customer_name: session.customer_name().map(String::from),
                session_id: Some(session.id).filter(|s| !s.is_empty()),
                metadata: session.metadata,
            }))
        },
        PAYMENT_INTENT_SUCCEEDED => {
            let intent = event.payment_intent()?;
            trace!("Stripe payment intent {} succeeded", intent.id);
            Ok(PaymentEvent::PaymentConfirmed(ConfirmedPayment {
                payment_reference: intent.id,
                receipt_email: intent.receipt_email,
                metadata: intent.metadata,
            }))
        },
        other => Ok(PaymentEvent::Unhandled { event_type: other.to_string() }),
    }
}
