use std::collections::BTreeMap;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use serde_json::{json, Value};
use stripe_tools::webhook::{sign_payload, SIGNATURE_HEADER};
use ticket_common::{Cents, Secret};
use ticket_sales_engine::{
    db_types::{PaymentId, Phase},
    events::EventProducers,
    reconciliation_objects::{ConfirmedPayment, PaymentEvent, ReconciliationOutcome},
    traits::{CuponManagement, ProviderError, ProviderSession, TicketSalesDatabase},
    PaymentStatusApi,
    ReconciliationApi,
    SqliteDatabase,
};

use super::{
    helpers::{active_phase, get_request, new_test_db, percentage_cupon, post_request},
    mocks::MockProvider,
};
use crate::{
    config::WebhookConfig,
    middleware::StripeSignatureMiddlewareFactory,
    routes::{PaymentSuccessRoute, StripeWebhookRoute},
};

const SECRET: &str = "whsec_test_secret";

fn webhook_config(signature_checks: bool) -> WebhookConfig {
    WebhookConfig { secret: Secret::new(SECRET.to_string()), signature_checks, tolerance_secs: 300 }
}

fn configure_webhook(db: SqliteDatabase, signature_checks: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        // every session carries its purchase metadata, so the provider is never consulted
        let api = ReconciliationApi::new(db, MockProvider::new(), EventProducers::default(), "Abyzma Ticket");
        cfg.service(
            web::scope("/webhooks")
                .wrap(StripeSignatureMiddlewareFactory::new(&webhook_config(signature_checks)))
                .service(StripeWebhookRoute::<SqliteDatabase, MockProvider>::new()),
        )
        .app_data(web::Data::new(api));
    }
}

fn completed_session(phase: &Phase, cupon_code: Option<&str>) -> String {
    let mut metadata = json!({
        "phase_id": phase.id.as_str(),
        "phase_name": phase.name,
        "quantity": "2",
        "buyer_email": "alice@example.com",
    });
    if let Some(code) = cupon_code {
        metadata["cupon_code"] = json!(code);
    }
    json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "created": Utc::now().timestamp(),
        "data": { "object": {
            "id": "cs_test_1",
            "payment_intent": "pi_test_1",
            "payment_status": "paid",
            "customer_details": { "email": "alice@example.com", "name": "Alice" },
            "metadata": metadata
        }}
    })
    .to_string()
}

async fn deliver(db: &SqliteDatabase, payload: &str, signature: Option<&str>) -> Result<(StatusCode, String), String> {
    let mut headers = vec![("Content-Type", "application/json")];
    if let Some(sig) = signature {
        headers.push((SIGNATURE_HEADER, sig));
    }
    post_request("/webhooks/stripe", payload, &headers, configure_webhook(db.clone(), true)).await
}

fn sign_now(payload: &str) -> String {
    sign_payload(payload.as_bytes(), SECRET, Utc::now().timestamp()).expect("Could not sign payload")
}

#[actix_web::test]
async fn signed_checkout_completion_issues_tickets_once() {
    let db = new_test_db().await;
    let phase = active_phase(&db, "Regular", 100).await;
    percentage_cupon(&db, "EARLY20", 20, 5).await;
    let payload = completed_session(&phase, Some("EARLY20"));
    let sig = sign_now(&payload);

    let (status, body) = deliver(&db, &payload, Some(&sig)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"success"}"#);
    let tickets = db.fetch_tickets_for_payment(&PaymentId::from("pi_test_1")).await.unwrap();
    assert_eq!(tickets.len(), 2);
    assert!(tickets.iter().all(|t| t.price == Cents::from(8_000)));
    assert!(tickets.iter().all(|t| t.client_email == "alice@example.com"));
    let cupon = db.fetch_active_cupon_by_code("EARLY20").await.unwrap().expect("cupon should still be active");
    assert_eq!(cupon.amount, 3);

    // Stripe redelivers the same event
    let (status, _) = deliver(&db, &payload, Some(&sig)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let tickets = db.fetch_tickets_for_payment(&PaymentId::from("pi_test_1")).await.unwrap();
    assert_eq!(tickets.len(), 2);
    let cupon = db.fetch_active_cupon_by_code("EARLY20").await.unwrap().unwrap();
    assert_eq!(cupon.amount, 3);
}

#[actix_web::test]
async fn unsigned_webhooks_are_rejected() {
    let db = new_test_db().await;
    let phase = active_phase(&db, "Regular", 100).await;
    let payload = completed_session(&phase, None);
    let err = deliver(&db, &payload, None).await.expect_err("Expected an error");
    assert_eq!(err, "Invalid signature");
    assert!(db.fetch_tickets_for_payment(&PaymentId::from("pi_test_1")).await.unwrap().is_empty());
}

#[actix_web::test]
async fn forged_webhooks_are_rejected() {
    let db = new_test_db().await;
    let phase = active_phase(&db, "Regular", 100).await;
    let payload = completed_session(&phase, None);
    let forged = sign_payload(payload.as_bytes(), "whsec_not_the_secret", Utc::now().timestamp()).unwrap();
    let err = deliver(&db, &payload, Some(&forged)).await.expect_err("Expected an error");
    assert_eq!(err, "Invalid signature");
    // a valid signature for a different body
    let sig = sign_now(&payload);
    let tampered = payload.replace("\"2\"", "\"20\"");
    let err = deliver(&db, &tampered, Some(&sig)).await.expect_err("Expected an error");
    assert_eq!(err, "Invalid signature");
    // a genuine signature that is too old
    let stale = sign_payload(payload.as_bytes(), SECRET, Utc::now().timestamp() - 3600).unwrap();
    let err = deliver(&db, &payload, Some(&stale)).await.expect_err("Expected an error");
    assert_eq!(err, "Invalid signature");
    assert!(db.fetch_tickets_for_payment(&PaymentId::from("pi_test_1")).await.unwrap().is_empty());
}

#[actix_web::test]
async fn signature_checks_can_be_disabled() {
    let db = new_test_db().await;
    let phase = active_phase(&db, "Regular", 100).await;
    let payload = completed_session(&phase, None);
    let headers = [("Content-Type", "application/json")];
    let (status, _) = post_request("/webhooks/stripe", &payload, &headers, configure_webhook(db.clone(), false))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let tickets = db.fetch_tickets_for_payment(&PaymentId::from("pi_test_1")).await.unwrap();
    assert_eq!(tickets.len(), 2);
    assert!(tickets.iter().all(|t| t.price == Cents::from(10_000)));
}

#[actix_web::test]
async fn unparseable_payloads() {
    let db = new_test_db().await;
    let payload = r#"{"id": "evt_1", "type": "checkout.session.completed""#;
    let (status, body) = deliver(&db, payload, Some(&sign_now(payload))).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Invalid payload"}"#);
}

#[actix_web::test]
async fn unhandled_and_unusable_events_are_acknowledged() {
    let db = new_test_db().await;
    let unhandled = json!({
        "id": "evt_2", "type": "customer.created", "data": { "object": { "id": "cus_1" } }
    })
    .to_string();
    let (status, body) = deliver(&db, &unhandled, Some(&sign_now(&unhandled))).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"success"}"#);
    // no email anywhere, so no tickets can be issued
    let anonymous = json!({
        "id": "evt_3", "type": "checkout.session.completed",
        "data": { "object": { "id": "cs_test_9", "payment_intent": "pi_test_9" } }
    })
    .to_string();
    let (status, _) = deliver(&db, &anonymous, Some(&sign_now(&anonymous))).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(db.fetch_tickets_for_payment(&PaymentId::from("pi_test_9")).await.unwrap().is_empty());
}

//----------------------------------------------   Payment success  ----------------------------------------------------
fn configure_status(db: SqliteDatabase, provider: MockProvider) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = PaymentStatusApi::new(db, provider);
        cfg.service(PaymentSuccessRoute::<SqliteDatabase, MockProvider>::new()).app_data(web::Data::new(api));
    }
}

#[actix_web::test]
async fn payment_success_requires_a_session_id() {
    let db = new_test_db().await;
    let (status, body) =
        get_request("/payment-success", configure_status(db, MockProvider::new())).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"No session ID provided"}"#);
}

#[actix_web::test]
async fn payment_success_with_an_unknown_session() {
    let db = new_test_db().await;
    let mut provider = MockProvider::new();
    provider
        .expect_fetch_checkout_session()
        .returning(|id| Err(ProviderError::Rejected(format!("No such checkout.session: '{id}'"))));
    let (status, body) = get_request("/payment-success?session_id=cs_nope", configure_status(db, provider))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Unable to verify payment: No such checkout.session: 'cs_nope'"}"#);
}

#[actix_web::test]
async fn payment_success_lists_issued_tickets() {
    let db = new_test_db().await;
    let phase = active_phase(&db, "Regular", 100).await;
    let mut metadata = BTreeMap::new();
    metadata.insert("phase_id".to_string(), phase.id.to_string());
    metadata.insert("quantity".to_string(), "2".to_string());
    metadata.insert("buyer_email".to_string(), "carol@example.com".to_string());
    let reconciler = ReconciliationApi::new(db.clone(), MockProvider::new(), EventProducers::default(), "");
    let event = PaymentEvent::PaymentConfirmed(ConfirmedPayment {
        payment_reference: "pi_test_7".to_string(),
        receipt_email: None,
        metadata,
    });
    let outcome = reconciler.process_event(event).await.expect("Reconciliation failed");
    assert!(matches!(outcome, ReconciliationOutcome::Fulfilled { .. }));

    let mut provider = MockProvider::new();
    provider.expect_fetch_checkout_session().withf(|id| id == "cs_test_7").returning(|id| {
        Ok(ProviderSession {
            id: id.to_string(),
            payment_reference: Some("pi_test_7".to_string()),
            payment_status: Some("paid".to_string()),
            ..Default::default()
        })
    });
    let (status, body) = get_request("/payment-success?session_id=cs_test_7", configure_status(db, provider))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Payment successful!"));
    assert_eq!(body["session_id"], json!("cs_test_7"));
    assert_eq!(body["tickets_created"], json!(2));
    let tickets = body["tickets"].as_array().unwrap();
    assert!(tickets.iter().all(|t| t["phase_name"] == json!("Regular") && t["price"] == json!(10_000)));
    assert!(tickets.iter().all(|t| t["client_email"] == json!("carol@example.com")));
}
