//! # Ticket sales server
//! The HTTP face of the ticket sales gateway. It is responsible for:
//! * Serving the current phase, the phase list and coupon lookups to the public site.
//! * Opening checkout sessions (or issuing free tickets directly).
//! * Receiving Stripe webhooks, verifying their signatures and handing them to the reconciler.
//! * Reporting the outcome of a payment back to the buyer's browser.
//! * Mailing ticket confirmations once tickets are issued.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/v1/phases/current`, `/api/v1/phases`: phase information.
//! * `/api/v1/cupon`: coupon lookup.
//! * `/api/v1/create-checkout-session`: start a purchase.
//! * `/api/v1/webhooks/stripe`: Stripe event webhook.
//! * `/api/v1/payment-success`: payment status for the buyer's return page.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
