use thiserror::Error;

use crate::{
    db_types::{CuponId, PhaseId},
    traits::TicketGatewayError,
};

#[derive(Debug, Clone, Error)]
pub enum CuponError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Cupon {cupon_id} has {available} uses left, but {requested} were requested")]
    InsufficientCupons { cupon_id: CuponId, available: i64, requested: i64 },
    #[error("The requested cupon {0} does not exist")]
    CuponNotFound(CuponId),
}

impl From<TicketGatewayError> for CuponError {
    fn from(e: TicketGatewayError) -> Self {
        match e {
            TicketGatewayError::InsufficientCupons { cupon_id, available, requested } => {
                CuponError::InsufficientCupons { cupon_id, available, requested }
            },
            TicketGatewayError::CuponNotFound(id) => CuponError::CuponNotFound(id),
            e => CuponError::DatabaseError(e.to_string()),
        }
    }
}

/// Why a checkout request was turned down. The `Display` text of every client-fault variant is safe to show to the
/// buyer.
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("No active phase found")]
    NoActivePhase,
    #[error("Customer email is required")]
    MissingEmail,
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("No more than {0} tickets can be bought in one order")]
    QuantityOverLimit(i64),
    #[error("There aren't enough available cupons")]
    InsufficientCupons,
    /// The provider's own message.
    #[error("{0}")]
    ProviderError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<TicketGatewayError> for CheckoutError {
    fn from(e: TicketGatewayError) -> Self {
        match e {
            TicketGatewayError::InsufficientCupons { .. } => CheckoutError::InsufficientCupons,
            e => CheckoutError::DatabaseError(e.to_string()),
        }
    }
}

impl From<CuponError> for CheckoutError {
    fn from(e: CuponError) -> Self {
        match e {
            CuponError::InsufficientCupons { .. } | CuponError::CuponNotFound(_) => CheckoutError::InsufficientCupons,
            CuponError::DatabaseError(s) => CheckoutError::DatabaseError(s),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("{0}")]
    InvalidEvent(String),
    #[error("Could not retrieve the purchased items from the payment provider: {0}")]
    ProviderError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<TicketGatewayError> for ReconciliationError {
    fn from(e: TicketGatewayError) -> Self {
        ReconciliationError::DatabaseError(e.to_string())
    }
}

impl From<CuponError> for ReconciliationError {
    fn from(e: CuponError) -> Self {
        ReconciliationError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentStatusError {
    #[error("No session ID provided")]
    MissingSessionId,
    #[error("Unable to verify payment: {0}")]
    ProviderError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<TicketGatewayError> for PaymentStatusError {
    fn from(e: TicketGatewayError) -> Self {
        PaymentStatusError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PhaseError {
    #[error("No active phase found")]
    NoActivePhase,
    #[error("The requested phase {0} does not exist")]
    PhaseNotFound(PhaseId),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<TicketGatewayError> for PhaseError {
    fn from(e: TicketGatewayError) -> Self {
        match e {
            TicketGatewayError::PhaseNotFound(id) => PhaseError::PhaseNotFound(id),
            e => PhaseError::DatabaseError(e.to_string()),
        }
    }
}
