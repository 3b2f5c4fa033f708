use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewPhase, Phase, PhaseId},
    traits::PhaseManagement,
    tse_api::{errors::PhaseError, phase_objects::CurrentPhase},
};

/// Read access to the phase catalogue, plus the administrative operations that keep a single phase active.
pub struct PhaseApi<B> {
    db: B,
}

impl<B> Debug for PhaseApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PhaseApi")
    }
}

impl<B> PhaseApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> PhaseApi<B>
where B: PhaseManagement
{
    /// The phase on sale right now, with the number of tickets still unsold.
    ///
    /// `tickets_left` is informational. Sales are not blocked when it reaches zero.
    pub async fn current_phase(&self) -> Result<Option<CurrentPhase>, PhaseError> {
        let Some(phase) = self.db.fetch_active_phase().await? else {
            return Ok(None);
        };
        let sold = self.db.count_tickets_for_phase(&phase.id).await?;
        Ok(Some(CurrentPhase {
            name: phase.name,
            price: phase.price,
            ticket_amount: phase.ticket_amount,
            tickets_left: phase.ticket_amount - sold,
        }))
    }

    /// Every phase, oldest first.
    pub async fn phases(&self) -> Result<Vec<Phase>, PhaseError> {
        let phases = self.db.fetch_phases().await?;
        Ok(phases)
    }

    pub async fn create_phase(&self, phase: NewPhase) -> Result<Phase, PhaseError> {
        let phase = self.db.create_phase(phase).await?;
        debug!("🎟️ Phase '{}' added to the catalogue", phase.name);
        Ok(phase)
    }

    /// Puts the given phase on sale, taking every other phase off sale in the same step.
    pub async fn activate_phase(&self, id: &PhaseId) -> Result<Phase, PhaseError> {
        let phase = self.db.activate_phase(id).await?;
        Ok(phase)
    }
}
