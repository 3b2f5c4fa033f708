use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Cupon, CuponId, NewCupon},
    traits::TicketGatewayError,
};

pub async fn fetch_active_cupon_by_code(code: &str, conn: &mut SqliteConnection) -> Result<Option<Cupon>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM cupons WHERE name = $1 AND active = 1").bind(code).fetch_optional(conn).await
}

pub async fn fetch_cupon(id: &CuponId, conn: &mut SqliteConnection) -> Result<Option<Cupon>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM cupons WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await
}

pub async fn insert_cupon(cupon: NewCupon, conn: &mut SqliteConnection) -> Result<Cupon, TicketGatewayError> {
    let name = cupon.name.clone();
    let result = sqlx::query_as(
        r#"
            INSERT INTO cupons (id, name, active, value, amount, percentage, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(CuponId::random())
    .bind(cupon.name)
    .bind(cupon.active)
    .bind(cupon.value)
    .bind(cupon.amount)
    .bind(cupon.percentage)
    .bind(cupon.end_date)
    .fetch_one(conn)
    .await;
    match result {
        Ok(cupon) => Ok(cupon),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(TicketGatewayError::CuponAlreadyExists(name)),
        Err(e) => Err(e.into()),
    }
}

/// Consumes `quantity` uses, stopping at zero. The coupon is deactivated when nothing remains.
///
/// Both columns are computed from the pre-update row in a single statement, so concurrent redemptions cannot lose an
/// update.
pub async fn redeem_clamped(
    id: &CuponId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Cupon>, sqlx::Error> {
    let cupon: Option<Cupon> = sqlx::query_as(
        r#"
            UPDATE cupons SET
                amount = MAX(amount - $1, 0),
                active = (MAX(amount - $1, 0) != 0),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(quantity)
    .bind(id.as_str())
    .fetch_optional(conn)
    .await?;
    if let Some(c) = &cupon {
        debug!("🗃️ Cupon '{}' redeemed {quantity} times. {} uses left", c.name, c.amount);
    }
    Ok(cupon)
}

/// Consumes `quantity` uses only if at least that many remain. Returns `None` if the coupon does not exist or has too
/// few uses left, in which case nothing is changed.
pub async fn redeem_reserved(
    id: &CuponId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Cupon>, sqlx::Error> {
    let cupon: Option<Cupon> = sqlx::query_as(
        r#"
            UPDATE cupons SET
                amount = amount - $1,
                active = (amount - $1 != 0),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND amount >= $1
            RETURNING *;
        "#,
    )
    .bind(quantity)
    .bind(id.as_str())
    .fetch_optional(conn)
    .await?;
    if let Some(c) = &cupon {
        debug!("🗃️ Cupon '{}' reserved for {quantity} tickets. {} uses left", c.name, c.amount);
    }
    Ok(cupon)
}
