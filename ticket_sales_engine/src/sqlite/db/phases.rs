use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{NewPhase, Phase, PhaseId};

pub async fn fetch_active_phase(conn: &mut SqliteConnection) -> Result<Option<Phase>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM phases WHERE active = 1 LIMIT 1").fetch_optional(conn).await
}

pub async fn fetch_phase(id: &PhaseId, conn: &mut SqliteConnection) -> Result<Option<Phase>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM phases WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await
}

pub async fn fetch_active_phase_by_name(name: &str, conn: &mut SqliteConnection) -> Result<Option<Phase>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM phases WHERE name = $1 AND active = 1 LIMIT 1")
        .bind(name)
        .fetch_optional(conn)
        .await
}

/// All phases, in creation order.
pub async fn fetch_phases(conn: &mut SqliteConnection) -> Result<Vec<Phase>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM phases ORDER BY created_at ASC, rowid ASC").fetch_all(conn).await
}

pub async fn count_tickets(id: &PhaseId, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE phase_id = $1").bind(id.as_str()).fetch_one(conn).await
}

/// Deactivates every active phase other than `keep`. Returns the number of phases that were switched off.
pub async fn deactivate_others(keep: Option<&PhaseId>, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let keep = keep.map(|id| id.as_str()).unwrap_or_default();
    let result = sqlx::query(
        "UPDATE phases SET active = 0, updated_at = CURRENT_TIMESTAMP WHERE active = 1 AND id != $1",
    )
    .bind(keep)
    .execute(conn)
    .await?;
    trace!("🗃️ {} phases deactivated", result.rows_affected());
    Ok(result.rows_affected())
}

/// Inserts a new phase. This is not atomic with respect to other phases; call [`deactivate_others`] first in the same
/// transaction when inserting an active phase.
pub async fn insert_phase(phase: NewPhase, conn: &mut SqliteConnection) -> Result<Phase, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO phases (id, name, price, ticket_amount, active, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(PhaseId::random())
    .bind(phase.name)
    .bind(phase.price)
    .bind(phase.ticket_amount)
    .bind(phase.active)
    .bind(phase.start_date)
    .bind(phase.end_date)
    .fetch_one(conn)
    .await
}

pub async fn set_active(id: &PhaseId, conn: &mut SqliteConnection) -> Result<Option<Phase>, sqlx::Error> {
    sqlx::query_as("UPDATE phases SET active = 1, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *")
        .bind(id.as_str())
        .fetch_optional(conn)
        .await
}
