use sqlx::SqliteConnection;
use ticket_common::Cents;

use crate::db_types::{Buyer, CuponId, PaymentId, PhaseId, PhaseTicket, Ticket, TicketId};

/// Inserts a single ticket. Not atomic on its own: run it inside the fulfillment transaction.
pub async fn insert_ticket(
    phase_id: &PhaseId,
    cupon_id: Option<&CuponId>,
    buyer: &Buyer,
    payment_id: &PaymentId,
    price: Cents,
    conn: &mut SqliteConnection,
) -> Result<Ticket, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO tickets (id, phase_id, cupon_id, client_name, client_email, payment_id, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(TicketId::random())
    .bind(phase_id.as_str())
    .bind(cupon_id.map(|c| c.as_str()))
    .bind(buyer.name.as_deref())
    .bind(buyer.email.as_str())
    .bind(payment_id.as_str())
    .bind(price)
    .fetch_one(conn)
    .await
}

pub async fn fetch_tickets_for_payment(
    payment_id: &PaymentId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Ticket>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tickets WHERE payment_id = $1 ORDER BY created_at ASC, rowid ASC")
        .bind(payment_id.as_str())
        .fetch_all(conn)
        .await
}

pub async fn fetch_phase_tickets_for_payment(
    payment_id: &PaymentId,
    conn: &mut SqliteConnection,
) -> Result<Vec<PhaseTicket>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT t.id, p.name AS phase_name, t.client_name, t.client_email, t.price, t.created_at
            FROM tickets t JOIN phases p ON p.id = t.phase_id
            WHERE t.payment_id = $1
            ORDER BY t.created_at ASC, t.rowid ASC
        "#,
    )
    .bind(payment_id.as_str())
    .fetch_all(conn)
    .await
}
