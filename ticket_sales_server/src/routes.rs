//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Every handler is async. Database and Stripe calls are awaited, so a worker thread keeps serving other requests while
//! a handler waits on I/O. Never block inside a handler.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use serde_json::json;
use stripe_tools::StripeEvent;
use ticket_sales_engine::{
    checkout_objects::{CheckoutOutcome, IssuedTicket},
    reconciliation_objects::ReconciliationOutcome,
    traits::{CheckoutProvider, CuponManagement, PhaseManagement, TicketSalesDatabase},
    CheckoutApi,
    CuponLedgerApi,
    PaymentStatusApi,
    PhaseApi,
    ReconciliationApi,
    ReconciliationError,
};

use crate::{
    data_objects::{
        CheckoutRequest,
        CheckoutSessionResponse,
        CuponQuery,
        CuponSummary,
        FreeTicketsResponse,
        PaymentSuccessQuery,
        PaymentSuccessResponse,
        PhaseList,
        PhaseSummary,
    },
    errors::ServerError,
    integrations::stripe::payment_event_from_stripe,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Phases  ----------------------------------------------------
route!(current_phase => Get "/phases/current" impl PhaseManagement);
/// The active phase and how many of its tickets are left.
pub async fn current_phase<B: PhaseManagement>(api: web::Data<PhaseApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received current phase request");
    let phase = api
        .current_phase()
        .await?
        .ok_or_else(|| ServerError::NotFound("No active phase found".to_string()))?;
    Ok(HttpResponse::Ok().json(phase))
}

route!(phases => Get "/phases" impl PhaseManagement);
pub async fn phases<B: PhaseManagement>(api: web::Data<PhaseApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received phase list request");
    let phases = api.phases().await?.into_iter().map(PhaseSummary::from).collect();
    Ok(HttpResponse::Ok().json(PhaseList { phases }))
}

//----------------------------------------------   Cupons  ----------------------------------------------------
route!(cupon => Get "/cupon" impl CuponManagement);
/// Looks up a coupon by code so the site can show the discount before checkout. Expired and used up coupons are
/// reported as not found.
pub async fn cupon<B: CuponManagement>(
    query: web::Query<CuponQuery>,
    api: web::Data<CuponLedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let code = query.cupon_code.as_deref().map(str::trim).unwrap_or_default();
    trace!("💻️ Received cupon lookup request for '{code}'");
    if code.is_empty() {
        return Err(ServerError::BadRequest("Cupon code required".to_string()));
    }
    let cupon = api
        .find_available(code)
        .await?
        .ok_or_else(|| ServerError::NotFound("Cupon code not found".to_string()))?;
    Ok(HttpResponse::Ok().json(CuponSummary::from(cupon)))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(create_checkout_session => Post "/create-checkout-session" impl TicketSalesDatabase, CheckoutProvider);
/// Starts a purchase in the current phase.
///
/// Paid orders get a Stripe checkout session and the response carries `checkoutUrl` and `sessionId`. Orders that
/// cost nothing are fulfilled immediately and the response lists the new tickets.
pub async fn create_checkout_session<B, P>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: TicketSalesDatabase,
    P: CheckoutProvider,
{
    let request = body.into_inner();
    debug!("💻️ Received checkout request for {} tickets", request.quantity);
    match api.checkout(request.into()).await? {
        CheckoutOutcome::ProviderCheckout { checkout_url, session_id } => {
            Ok(HttpResponse::Ok().json(CheckoutSessionResponse { checkout_url, session_id }))
        },
        CheckoutOutcome::FreeTickets(tickets) => {
            let tickets = tickets.iter().map(IssuedTicket::from).collect();
            Ok(HttpResponse::Ok().json(FreeTicketsResponse::new(tickets)))
        },
    }
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(stripe_webhook => Post "/stripe" impl TicketSalesDatabase, CheckoutProvider);
/// Receives Stripe events. The signature has already been checked by the middleware wrapping this route.
///
/// Stripe redelivers anything that is not answered with a 2xx, so only failures that a retry might fix (database or
/// Stripe API trouble) produce a 500. Events we cannot act on are logged and acknowledged.
pub async fn stripe_webhook<B, P>(
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: TicketSalesDatabase,
    P: CheckoutProvider,
{
    let event = StripeEvent::from_payload(body.as_ref()).map_err(|e| {
        warn!("💻️ Could not parse Stripe webhook payload. {e}");
        ServerError::InvalidPayload
    })?;
    info!("💻️ Received Stripe event {} ({})", event.id, event.event_type);
    let event = payment_event_from_stripe(&event).map_err(|e| {
        warn!("💻️ Stripe event {} could not be decoded. {e}", event.id);
        ServerError::InvalidPayload
    })?;
    match api.process_event(event).await {
        Ok(ReconciliationOutcome::Fulfilled { payment_id, tickets }) => {
            info!("💻️ {} tickets issued for payment {payment_id}", tickets.len());
        },
        Ok(outcome) => debug!("💻️ Webhook processed. {outcome:?}"),
        Err(ReconciliationError::InvalidEvent(msg)) => warn!("💻️ Ignoring webhook. {msg}"),
        Err(e) => return Err(ServerError::BackendError(e.to_string())),
    }
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

//----------------------------------------------   Payment status  ----------------------------------------------------
route!(payment_success => Get "/payment-success" impl TicketSalesDatabase, CheckoutProvider);
/// Called by the return page after checkout. Lists the tickets issued for the session's payment so far. Tickets
/// appear once the webhook has been processed, so an empty list right after payment is normal.
pub async fn payment_success<B, P>(
    query: web::Query<PaymentSuccessQuery>,
    api: web::Data<PaymentStatusApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: TicketSalesDatabase,
    P: CheckoutProvider,
{
    let session_id = query.into_inner().session_id.unwrap_or_default();
    trace!("💻️ Received payment status request for session '{session_id}'");
    let status = api.status_for_session(&session_id).await?;
    Ok(HttpResponse::Ok().json(PaymentSuccessResponse::new(status.session_id, status.tickets)))
}
