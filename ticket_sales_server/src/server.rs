use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use stripe_tools::StripeApi;
use ticket_sales_engine::{
    events::EventProducers,
    CheckoutApi,
    CuponLedgerApi,
    PaymentStatusApi,
    PhaseApi,
    ReconciliationApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{mailer::create_mailer_event_handlers, stripe::StripeCheckoutProvider},
    middleware::StripeSignatureMiddlewareFactory,
    routes::{
        health,
        CreateCheckoutSessionRoute,
        CuponRoute,
        CurrentPhaseRoute,
        PaymentSuccessRoute,
        PhasesRoute,
        StripeWebhookRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let api = StripeApi::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let provider = StripeCheckoutProvider::new(api);
    let handlers = create_mailer_event_handlers(config.mail.clone())
        .map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, provider, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    provider: StripeCheckoutProvider,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let phase_api = PhaseApi::new(db.clone());
        let cupon_api = CuponLedgerApi::new(db.clone());
        let checkout_api =
            CheckoutApi::new(db.clone(), provider.clone(), producers.clone(), config.checkout.clone());
        let reconciliation_api = ReconciliationApi::new(
            db.clone(),
            provider.clone(),
            producers.clone(),
            config.checkout.product_prefix.clone(),
        );
        let payment_status_api = PaymentStatusApi::new(db.clone(), provider.clone());
        let webhook_scope = web::scope("/webhooks")
            .wrap(StripeSignatureMiddlewareFactory::new(&config.webhook))
            .service(StripeWebhookRoute::<SqliteDatabase, StripeCheckoutProvider>::new());
        let api_scope = web::scope("/api/v1")
            .service(CurrentPhaseRoute::<SqliteDatabase>::new())
            .service(PhasesRoute::<SqliteDatabase>::new())
            .service(CuponRoute::<SqliteDatabase>::new())
            .service(CreateCheckoutSessionRoute::<SqliteDatabase, StripeCheckoutProvider>::new())
            .service(PaymentSuccessRoute::<SqliteDatabase, StripeCheckoutProvider>::new())
            .service(webhook_scope);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("tsg::access_log"))
            .app_data(web::Data::new(phase_api))
            .app_data(web::Data::new(cupon_api))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(payment_status_api))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("🚀️ Server bound and listening");
    Ok(srv)
}
