use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};
use ticket_sales_engine::{
    db_types::{Cupon, CuponId, Phase, PhaseId},
    traits::TicketGatewayError,
    CuponLedgerApi,
    PhaseApi,
};

use super::{
    helpers::get_request,
    mocks::{MockCuponManager, MockPhaseManager},
};
use crate::routes::{CuponRoute, CurrentPhaseRoute, PhasesRoute};

#[actix_web::test]
async fn current_phase() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut phases = MockPhaseManager::new();
        phases.expect_fetch_active_phase().returning(|| Ok(Some(phase("Early Bird", 100, true))));
        phases.expect_count_tickets_for_phase().returning(|_| Ok(3));
        cfg.service(CurrentPhaseRoute::<MockPhaseManager>::new()).app_data(web::Data::new(PhaseApi::new(phases)));
    };
    let (status, body) = get_request("/phases/current", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"name": "Early Bird", "price": 100, "ticket_amount": 50, "tickets_left": 47}));
}

#[actix_web::test]
async fn no_current_phase() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut phases = MockPhaseManager::new();
        phases.expect_fetch_active_phase().returning(|| Ok(None));
        cfg.service(CurrentPhaseRoute::<MockPhaseManager>::new()).app_data(web::Data::new(PhaseApi::new(phases)));
    };
    let (status, body) = get_request("/phases/current", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"No active phase found"}"#);
}

#[actix_web::test]
async fn database_errors_are_hidden() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut phases = MockPhaseManager::new();
        phases
            .expect_fetch_active_phase()
            .returning(|| Err(TicketGatewayError::DatabaseError("database is locked".into())));
        cfg.service(CurrentPhaseRoute::<MockPhaseManager>::new()).app_data(web::Data::new(PhaseApi::new(phases)));
    };
    let (status, body) = get_request("/phases/current", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"Internal server error"}"#);
}

#[actix_web::test]
async fn list_phases() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut phases = MockPhaseManager::new();
        phases
            .expect_fetch_phases()
            .returning(|| Ok(vec![phase("Early Bird", 80, false), phase("Regular", 100, true)]));
        cfg.service(PhasesRoute::<MockPhaseManager>::new()).app_data(web::Data::new(PhaseApi::new(phases)));
    };
    let (status, body) = get_request("/phases", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body,
        json!({"phases": [
            {"name": "Early Bird", "price": 80, "active": false},
            {"name": "Regular", "price": 100, "active": true}
        ]})
    );
}

#[actix_web::test]
async fn cupon_lookup() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/cupon?cupon_code=EARLY20", configure_cupons).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"name": "EARLY20", "amount": 5, "value": 20, "percentage": true}));
}

#[actix_web::test]
async fn cupon_code_is_required() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/cupon", configure_cupons).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Cupon code required"}"#);
    let (status, _) = get_request("/cupon?cupon_code=%20", configure_cupons).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_or_unavailable_cupons() {
    let _ = env_logger::try_init().ok();
    for code in ["NOPE", "EXPIRED", "USEDUP"] {
        let (status, body) =
            get_request(&format!("/cupon?cupon_code={code}"), configure_cupons).await.expect("Request failed");
        assert_eq!(status, StatusCode::NOT_FOUND, "{code}");
        assert_eq!(body, r#"{"error":"Cupon code not found"}"#);
    }
}

fn configure_cupons(cfg: &mut ServiceConfig) {
    let mut cupons = MockCuponManager::new();
    cupons.expect_fetch_active_cupon_by_code().returning(|code| {
        let far_future = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap();
        let long_ago = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let cupon = match code {
            "EARLY20" => Some(cupon("EARLY20", 5, far_future)),
            "EXPIRED" => Some(cupon("EXPIRED", 5, long_ago)),
            "USEDUP" => Some(cupon("USEDUP", 0, far_future)),
            _ => None,
        };
        Ok(cupon)
    });
    cfg.service(CuponRoute::<MockCuponManager>::new()).app_data(web::Data::new(CuponLedgerApi::new(cupons)));
}

fn phase(name: &str, price: i64, active: bool) -> Phase {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    Phase {
        id: PhaseId::from(name.to_lowercase()),
        name: name.to_string(),
        price,
        ticket_amount: 50,
        active,
        start_date: None,
        end_date: None,
        created_at: created,
        updated_at: created,
    }
}

fn cupon(name: &str, amount: i64, end_date: NaiveDate) -> Cupon {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    Cupon {
        id: CuponId::from(name.to_lowercase()),
        name: name.to_string(),
        active: true,
        value: 20,
        amount,
        percentage: true,
        end_date,
        created_at: created,
        updated_at: created,
    }
}
