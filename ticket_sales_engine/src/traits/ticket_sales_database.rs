use thiserror::Error;

use crate::{
    db_types::{CuponId, Fulfillment, PaymentId, PhaseId, PhaseTicket, Ticket},
    traits::{CuponManagement, InsertFulfillmentResult, PhaseManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the ticket sales engine.
///
/// Beyond phase and coupon management, a backend is responsible for:
/// * Recording which payment references have already been turned into tickets
/// * Issuing tickets, recording the fulfillment and redeeming the coupon in one atomic step
/// * Querying the tickets issued for a payment
#[allow(async_fn_in_trait)]
pub trait TicketSalesDatabase: Clone + PhaseManagement + CuponManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Whether tickets have already been issued for the given payment reference.
    async fn payment_is_fulfilled(&self, payment_id: &PaymentId) -> Result<bool, TicketGatewayError>;

    /// In a single atomic transaction,
    /// * records the fulfillment marker for the payment reference. If one already exists, nothing further is done and
    ///   [`InsertFulfillmentResult::AlreadyFulfilled`] is returned.
    /// * creates `quantity` tickets for every line of the fulfillment
    /// * redeems the coupon (if any) for the total number of tickets, according to its redemption mode.
    ///
    /// Any failure rolls the whole operation back.
    async fn fulfill(&self, fulfillment: Fulfillment) -> Result<InsertFulfillmentResult, TicketGatewayError>;

    async fn fetch_tickets_for_payment(&self, payment_id: &PaymentId) -> Result<Vec<Ticket>, TicketGatewayError>;

    /// Tickets for the payment reference, each with the name of its phase.
    async fn fetch_phase_tickets_for_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Vec<PhaseTicket>, TicketGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), TicketGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum TicketGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested phase {0} does not exist")]
    PhaseNotFound(PhaseId),
    #[error("The requested cupon {0} does not exist")]
    CuponNotFound(CuponId),
    #[error("A cupon with the code {0} already exists")]
    CuponAlreadyExists(String),
    #[error("Cupon {cupon_id} has {available} uses left, but {requested} tickets were requested")]
    InsufficientCupons { cupon_id: CuponId, available: i64, requested: i64 },
    #[error("Cannot issue tickets for an empty fulfillment")]
    EmptyFulfillment,
}

impl From<sqlx::Error> for TicketGatewayError {
    fn from(e: sqlx::Error) -> Self {
        TicketGatewayError::DatabaseError(e.to_string())
    }
}
