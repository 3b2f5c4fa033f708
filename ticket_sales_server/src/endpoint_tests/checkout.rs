use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::{json, Value};
use ticket_common::Cents;
use ticket_sales_engine::{
    checkout_objects::CheckoutConfig,
    events::EventProducers,
    traits::{ProviderError, ProviderSession},
    CheckoutApi,
    SqliteDatabase,
};

use super::{
    helpers::{active_phase, new_test_db, percentage_cupon, post_request},
    mocks::MockProvider,
};
use crate::routes::CreateCheckoutSessionRoute;

const JSON: [(&str, &str); 1] = [("Content-Type", "application/json")];
const NOT_ENOUGH_CUPONS: &str = "There aren't enough available cupons";
const TOO_MANY: &str = "No more than 100 tickets can be bought in one order";

fn configure(db: SqliteDatabase, provider: MockProvider) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = CheckoutApi::new(db, provider, EventProducers::default(), CheckoutConfig::default());
        cfg.service(CreateCheckoutSessionRoute::<SqliteDatabase, MockProvider>::new())
            .app_data(web::Data::new(api));
    }
}

fn checkout_session(id: &str) -> ProviderSession {
    ProviderSession {
        id: id.to_string(),
        url: Some(format!("https://checkout.stripe.com/c/pay/{id}")),
        ..Default::default()
    }
}

#[actix_web::test]
async fn paid_checkout_opens_a_session() {
    let db = new_test_db().await;
    active_phase(&db, "Regular", 100).await;
    percentage_cupon(&db, "EARLY20", 20, 5).await;
    let mut provider = MockProvider::new();
    provider
        .expect_create_checkout_session()
        .withf(|req| {
            req.unit_amount == Cents::from(8_000) &&
                req.quantity == 2 &&
                req.customer_email == "alice@example.com" &&
                req.product_name == "Abyzma Ticket Regular"
        })
        .times(1)
        .returning(|_| Ok(checkout_session("cs_test_1")));
    let body = r#"{"email": "alice@example.com", "name": "Alice", "quantity": "2", "cuponCode": "EARLY20"}"#;
    let (status, body) =
        post_request("/create-checkout-session", body, &JSON, configure(db, provider)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body,
        json!({"checkoutUrl": "https://checkout.stripe.com/c/pay/cs_test_1", "sessionId": "cs_test_1"})
    );
}

#[actix_web::test]
async fn free_checkout_issues_tickets_immediately() {
    let db = new_test_db().await;
    active_phase(&db, "Regular", 100).await;
    percentage_cupon(&db, "COMP", 100, 2).await;
    // No expectations: the provider must not be called
    let provider = MockProvider::new();
    let body = r#"{"email": "bob@example.com", "quantity": 2, "cuponCode": "COMP"}"#;
    let (status, body) =
        post_request("/create-checkout-session", body, &JSON, configure(db, provider)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Free tickets created successfully"));
    let tickets = body["tickets"].as_array().expect("tickets should be a list");
    assert_eq!(tickets.len(), 2);
    assert!(tickets.iter().all(|t| t["price"] == json!(0)));
    assert_ne!(tickets[0]["id"], tickets[1]["id"]);
}

#[actix_web::test]
async fn checkout_without_an_active_phase() {
    let db = new_test_db().await;
    let body = r#"{"email": "alice@example.com", "quantity": 1}"#;
    let (status, body) = post_request("/create-checkout-session", body, &JSON, configure(db, MockProvider::new()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"No active phase found"}"#);
}

#[actix_web::test]
async fn checkout_validation_errors() {
    let cases = [
        (r#"{"quantity": 1}"#, "Customer email is required"),
        (r#"{"email": "   ", "quantity": 1}"#, "Customer email is required"),
        (r#"{"email": "alice@example.com", "quantity": "lots"}"#, "Quantity must be at least 1"),
        (r#"{"email": "alice@example.com", "quantity": 0}"#, "Quantity must be at least 1"),
        (r#"{"email": "alice@example.com", "quantity": 9223372036854775807}"#, TOO_MANY),
        (r#"{"email": "alice@example.com", "quantity": "1000000000"}"#, TOO_MANY),
        (r#"{"email": "alice@example.com", "quantity": 3, "cuponCode": "ONE"}"#, NOT_ENOUGH_CUPONS),
        (r#"{"email": "alice@example.com", "cuponCode": "MISSING"}"#, NOT_ENOUGH_CUPONS),
    ];
    let db = new_test_db().await;
    active_phase(&db, "Regular", 100).await;
    percentage_cupon(&db, "ONE", 10, 1).await;
    for (body, expected) in cases {
        let (status, response) =
            post_request("/create-checkout-session", body, &JSON, configure(db.clone(), MockProvider::new()))
                .await
                .expect("Request failed");
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response, json!({ "error": expected }).to_string());
    }
}

#[actix_web::test]
async fn provider_rejections_are_passed_on() {
    let db = new_test_db().await;
    active_phase(&db, "Regular", 100).await;
    let mut provider = MockProvider::new();
    provider
        .expect_create_checkout_session()
        .returning(|_| Err(ProviderError::Rejected("Invalid email address: alice@".into())));
    let body = r#"{"email": "alice@", "quantity": 1}"#;
    let (status, body) =
        post_request("/create-checkout-session", body, &JSON, configure(db, provider)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Invalid email address: alice@"}"#);
}
