use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{Days, NaiveDate, Utc};
use log::debug;
use ticket_sales_engine::{
    db_types::{Cupon, NewCupon, NewPhase, Phase},
    traits::{CuponManagement, PhaseManagement},
    SqliteDatabase,
};

pub async fn get_request<F>(path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let req = TestRequest::get().uri(path).to_request();
    send_request(req, configure).await
}

pub async fn post_request<F>(
    path: &str,
    body: &str,
    headers: &[(&str, &str)],
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req = TestRequest::post().uri(path).set_payload(body.to_string());
    for (name, value) in headers {
        req = req.insert_header((*name, *value));
    }
    send_request(req.to_request(), configure).await
}

async fn send_request<F>(req: actix_http::Request, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

/// A fresh, migrated database in the system temp directory.
pub async fn new_test_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    let path = std::env::temp_dir().join(format!("tsg_server_test_{}.db", uuid::Uuid::new_v4().simple()));
    let url = format!("sqlite://{}", path.display());
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating test database");
    db.migrate().await.expect("Error running migrations");
    db
}

pub async fn active_phase(db: &SqliteDatabase, name: &str, price: i64) -> Phase {
    let phase = db.create_phase(NewPhase::new(name, price, 100)).await.expect("Error creating phase");
    db.activate_phase(&phase.id).await.expect("Error activating phase")
}

pub async fn percentage_cupon(db: &SqliteDatabase, code: &str, value: i64, amount: i64) -> Cupon {
    db.create_cupon(NewCupon::percentage(code, value, amount, next_week())).await.expect("Error creating cupon")
}

pub fn next_week() -> NaiveDate {
    Utc::now().date_naive() + Days::new(7)
}
