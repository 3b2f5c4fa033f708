//! Ticket Sales Engine
//!
//! The core of the ticket sales gateway: it prices tickets, keeps the coupon ledger, and reconciles payment provider
//! events into tickets exactly once per payment. It knows nothing about HTTP or about any particular payment provider.
//!
//! The library is divided into these sections:
//! 1. Storage ([`SqliteDatabase`] and the [`traits`] a backend must implement). The data types stored by a backend are
//!    defined in [`db_types`] and are public.
//! 2. The public API ([`CheckoutApi`], [`ReconciliationApi`], [`CuponLedgerApi`], [`TicketIssuer`], [`PhaseApi`],
//!    [`PaymentStatusApi`]).
//! 3. [`pricing`], a pure function from phase price and coupon to unit price.
//!
//! The engine publishes a [`events::TicketsIssuedEvent`] whenever tickets are created. Subscribers (such as the
//! confirmation mailer) hook into it through [`events::EventHooks`] and can never affect the outcome of a sale.
pub mod db_types;
pub mod events;
pub mod pricing;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;
mod tse_api;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use tse_api::{
    checkout_api::CheckoutApi,
    checkout_objects,
    cupon_api::CuponLedgerApi,
    errors::{CheckoutError, CuponError, PaymentStatusError, PhaseError, ReconciliationError},
    payment_status_api::PaymentStatusApi,
    phase_objects,
    phases_api::PhaseApi,
    reconciliation_api::{quantity_from_metadata, ReconciliationApi},
    reconciliation_objects,
    ticket_issuer::{IssueResult, TicketIssuer},
};
