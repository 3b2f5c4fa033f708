//! # Ticket sales engine public API
//!
//! The `tse_api` module exposes the programmatic API for the ticket sales engine. Each API is a small struct built
//! from a database backend (and, where needed, a checkout provider), so callers only depend on what they use.
//!
//! * [`checkout_api`] validates and prices purchase requests, and either issues free tickets immediately or opens a
//!   hosted checkout session.
//! * [`reconciliation_api`] turns payment provider events into tickets, exactly once per payment reference.
//! * [`cupon_api`] is the coupon ledger: availability checks, reservation and redemption.
//! * [`ticket_issuer`] persists tickets together with the fulfillment record and notifies subscribers.
//! * [`phases_api`] serves the phase catalogue and keeps a single phase active.
//! * [`payment_status_api`] reports the tickets created for a checkout session.
//!
//! # API usage
//!
//! ```rust,ignore
//! use ticket_sales_engine::{PhaseApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = PhaseApi::new(db);
//! let current = api.current_phase().await?;
//! ```
pub mod checkout_api;
pub mod checkout_objects;
pub mod cupon_api;
pub mod errors;
pub mod payment_status_api;
pub mod phase_objects;
pub mod phases_api;
pub mod reconciliation_api;
pub mod reconciliation_objects;
pub mod ticket_issuer;
