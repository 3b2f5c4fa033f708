//! A small client for the parts of the Stripe API that the ticket gateway uses: hosted checkout sessions, their line
//! items, and signed webhook events.
mod api;
mod config;
mod data_objects;
mod error;

pub mod webhook;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{
    CheckoutSession,
    CustomerDetails,
    Expandable,
    HasId,
    LineItem,
    NewCheckoutSession,
    PaymentIntent,
    Price,
    Product,
    StripeEvent,
    StripeEventData,
    CHECKOUT_SESSION_COMPLETED,
    PAYMENT_INTENT_SUCCEEDED,
};
pub use error::{StripeApiError, WebhookError};
