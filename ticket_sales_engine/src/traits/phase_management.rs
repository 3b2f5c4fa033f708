use crate::{
    db_types::{NewPhase, Phase, PhaseId},
    traits::TicketGatewayError,
};

/// Queries and maintenance of pricing phases.
///
/// Backends must guarantee that at most one phase is active at any time.
#[allow(async_fn_in_trait)]
pub trait PhaseManagement {
    /// The phase currently on sale, if any.
    async fn fetch_active_phase(&self) -> Result<Option<Phase>, TicketGatewayError>;

    async fn fetch_phase(&self, id: &PhaseId) -> Result<Option<Phase>, TicketGatewayError>;

    /// Looks up an *active* phase by its exact name.
    async fn fetch_active_phase_by_name(&self, name: &str) -> Result<Option<Phase>, TicketGatewayError>;

    /// All phases, oldest first.
    async fn fetch_phases(&self) -> Result<Vec<Phase>, TicketGatewayError>;

    async fn count_tickets_for_phase(&self, id: &PhaseId) -> Result<i64, TicketGatewayError>;

    /// Stores a new phase. If the new phase is active, every other phase is deactivated in the same transaction.
    async fn create_phase(&self, phase: NewPhase) -> Result<Phase, TicketGatewayError>;

    /// Activates the given phase and deactivates all others atomically.
    async fn activate_phase(&self, id: &PhaseId) -> Result<Phase, TicketGatewayError>;
}
