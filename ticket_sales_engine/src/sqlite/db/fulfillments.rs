use sqlx::SqliteConnection;

use crate::db_types::PaymentId;

/// Records that the payment reference has been fulfilled. Returns `false` if a marker already existed.
///
/// Run this as the first statement of the fulfillment transaction so that the write lock is taken before anything is
/// read.
pub async fn insert_marker(
    payment_id: &PaymentId,
    session_id: Option<&str>,
    ticket_count: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("INSERT INTO fulfillments (payment_id, session_id, ticket_count) VALUES ($1, $2, $3)")
        .bind(payment_id.as_str())
        .bind(session_id)
        .bind(ticket_count)
        .execute(conn)
        .await;
    match result {
        Ok(_) => Ok(true),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(false),
        Err(e) => Err(e),
    }
}

/// True if the payment reference has a fulfillment marker, or any ticket carries it.
pub async fn is_fulfilled(payment_id: &PaymentId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let found: i64 = sqlx::query_scalar(
        r#"
            SELECT EXISTS (SELECT 1 FROM fulfillments WHERE payment_id = $1)
                OR EXISTS (SELECT 1 FROM tickets WHERE payment_id = $1)
        "#,
    )
    .bind(payment_id.as_str())
    .fetch_one(conn)
    .await?;
    Ok(found != 0)
}
