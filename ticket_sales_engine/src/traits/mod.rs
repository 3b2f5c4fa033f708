//! # Backend and provider contracts
//!
//! The traits in this module define what the ticket sales engine needs from the outside world.
//!
//! * [`TicketSalesDatabase`] is the highest level of behaviour a storage backend must offer. Above all, it owns the
//!   atomic [`TicketSalesDatabase::fulfill`] operation that issues tickets exactly once per payment reference.
//! * [`PhaseManagement`] queries and maintains pricing phases, including the single-active-phase rule.
//! * [`CuponManagement`] looks up, creates and redeems coupons.
//! * [`CheckoutProvider`] is the seam to the hosted checkout provider. The server crate implements it on top of the
//!   Stripe client.
mod checkout_provider;
mod cupon_management;
mod data_objects;
mod phase_management;
mod ticket_sales_database;

pub use checkout_provider::{CheckoutProvider, ProviderError};
pub use cupon_management::CuponManagement;
pub use data_objects::{CheckoutSessionRequest, InsertFulfillmentResult, ProviderLineItem, ProviderSession};
pub use phase_management::PhaseManagement;
pub use ticket_sales_database::{TicketGatewayError, TicketSalesDatabase};
