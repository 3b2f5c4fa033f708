//! `SqliteDatabase` is a concrete implementation of a ticket sales engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{cupons, db_url, fulfillments, new_pool, phases, tickets};
use crate::{
    db_types::{
        Cupon,
        CuponId,
        Fulfillment,
        NewCupon,
        NewPhase,
        PaymentId,
        Phase,
        PhaseId,
        PhaseTicket,
        RedemptionMode,
        Ticket,
    },
    traits::{CuponManagement, InsertFulfillmentResult, PhaseManagement, TicketGatewayError, TicketSalesDatabase},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl TicketSalesDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn payment_is_fulfilled(&self, payment_id: &PaymentId) -> Result<bool, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let exists = fulfillments::is_fulfilled(payment_id, &mut conn).await?;
        Ok(exists)
    }

    async fn fulfill(&self, fulfillment: Fulfillment) -> Result<InsertFulfillmentResult, TicketGatewayError> {
        if fulfillment.lines.is_empty() || fulfillment.lines.iter().any(|l| l.quantity < 1) {
            return Err(TicketGatewayError::EmptyFulfillment);
        }
        let count = fulfillment.ticket_count();
        let Fulfillment { payment_id, session_id, buyer, cupon, lines } = fulfillment;
        let mut tx = self.pool.begin().await?;
        if !fulfillments::insert_marker(&payment_id, session_id.as_deref(), count, &mut tx).await? {
            debug!("🗃️ Payment {payment_id} has already been fulfilled. Nothing to do.");
            return Ok(InsertFulfillmentResult::AlreadyFulfilled(payment_id));
        }
        let cupon_id = cupon.as_ref().map(|c| &c.cupon_id);
        let mut issued = Vec::new();
        for line in &lines {
            for _ in 0..line.quantity {
                let ticket =
                    tickets::insert_ticket(&line.phase_id, cupon_id, &buyer, &payment_id, line.unit_price, &mut tx)
                        .await?;
                issued.push(ticket);
            }
        }
        trace!("🗃️ {count} tickets inserted for payment {payment_id}");
        let redeemed = match cupon {
            Some(redemption) => {
                let id = &redemption.cupon_id;
                let updated = match redemption.mode {
                    RedemptionMode::Reserve => cupons::redeem_reserved(id, count, &mut tx).await?,
                    RedemptionMode::Clamp => cupons::redeem_clamped(id, count, &mut tx).await?,
                };
                match updated {
                    Some(c) => Some(c),
                    None => {
                        let err = match cupons::fetch_cupon(id, &mut tx).await? {
                            Some(c) => TicketGatewayError::InsufficientCupons {
                                cupon_id: id.clone(),
                                available: c.amount,
                                requested: count,
                            },
                            None => TicketGatewayError::CuponNotFound(id.clone()),
                        };
                        warn!("🗃️ Fulfillment of payment {payment_id} rolled back. {err}");
                        return Err(err);
                    },
                }
            },
            None => None,
        };
        tx.commit().await?;
        debug!("🗃️ Payment {payment_id} fulfilled with {count} tickets");
        Ok(InsertFulfillmentResult::Fulfilled { tickets: issued, cupon: redeemed })
    }

    async fn fetch_tickets_for_payment(&self, payment_id: &PaymentId) -> Result<Vec<Ticket>, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let tickets = tickets::fetch_tickets_for_payment(payment_id, &mut conn).await?;
        Ok(tickets)
    }

    async fn fetch_phase_tickets_for_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Vec<PhaseTicket>, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let tickets = tickets::fetch_phase_tickets_for_payment(payment_id, &mut conn).await?;
        Ok(tickets)
    }

    async fn close(&mut self) -> Result<(), TicketGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}

impl PhaseManagement for SqliteDatabase {
    async fn fetch_active_phase(&self) -> Result<Option<Phase>, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let phase = phases::fetch_active_phase(&mut conn).await?;
        Ok(phase)
    }

    async fn fetch_phase(&self, id: &PhaseId) -> Result<Option<Phase>, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let phase = phases::fetch_phase(id, &mut conn).await?;
        Ok(phase)
    }

    async fn fetch_active_phase_by_name(&self, name: &str) -> Result<Option<Phase>, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let phase = phases::fetch_active_phase_by_name(name, &mut conn).await?;
        Ok(phase)
    }

    async fn fetch_phases(&self) -> Result<Vec<Phase>, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let phases = phases::fetch_phases(&mut conn).await?;
        Ok(phases)
    }

    async fn count_tickets_for_phase(&self, id: &PhaseId) -> Result<i64, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let count = phases::count_tickets(id, &mut conn).await?;
        Ok(count)
    }

    async fn create_phase(&self, phase: NewPhase) -> Result<Phase, TicketGatewayError> {
        let mut tx = self.pool.begin().await?;
        if phase.active {
            phases::deactivate_others(None, &mut tx).await?;
        }
        let phase = phases::insert_phase(phase, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Phase '{}' created with id {} (active: {})", phase.name, phase.id, phase.active);
        Ok(phase)
    }

    async fn activate_phase(&self, id: &PhaseId) -> Result<Phase, TicketGatewayError> {
        let mut tx = self.pool.begin().await?;
        phases::deactivate_others(Some(id), &mut tx).await?;
        let phase =
            phases::set_active(id, &mut tx).await?.ok_or_else(|| TicketGatewayError::PhaseNotFound(id.clone()))?;
        tx.commit().await?;
        info!("🗃️ Phase '{}' is now the active phase", phase.name);
        Ok(phase)
    }
}

impl CuponManagement for SqliteDatabase {
    async fn fetch_active_cupon_by_code(&self, code: &str) -> Result<Option<Cupon>, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let cupon = cupons::fetch_active_cupon_by_code(code, &mut conn).await?;
        Ok(cupon)
    }

    async fn fetch_cupon(&self, id: &CuponId) -> Result<Option<Cupon>, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let cupon = cupons::fetch_cupon(id, &mut conn).await?;
        Ok(cupon)
    }

    async fn create_cupon(&self, cupon: NewCupon) -> Result<Cupon, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let cupon = cupons::insert_cupon(cupon, &mut conn).await?;
        debug!("🗃️ Cupon '{}' created with {} uses", cupon.name, cupon.amount);
        Ok(cupon)
    }

    async fn redeem_cupon(&self, id: &CuponId, quantity: i64) -> Result<Cupon, TicketGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let cupon = cupons::redeem_clamped(id, quantity, &mut conn).await?;
        cupon.ok_or_else(|| TicketGatewayError::CuponNotFound(id.clone()))
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `TSG_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, TicketGatewayError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, TicketGatewayError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), TicketGatewayError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TicketGatewayError::DatabaseError(format!("Migration failed: {e}")))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
