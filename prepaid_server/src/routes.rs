//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, http::StatusCode, web, HttpResponse, Responder};
use log::*;
use prepaid_engine::{
    db_types::ReferenceId,
    traits::{OrderStore, PaymentProcessor},
    ApprovalApi,
    ApprovalRejection,
    CheckoutApi,
    LedgerApi,
};

use crate::{
    config::ServerOptions,
    data_objects::{
        CallbackResponse,
        CallbackStatus,
        CheckoutRequest,
        CheckoutResponse,
        CloseNotification,
        RefundRequest,
        RefundableResponse,
    },
    errors::ServerError,
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

//----------------------------------------------   PayPal callback  ----------------------------------------------------
route!(on_close => Post "/paypal/{instance_id}/onClose" impl OrderStore, PaymentProcessor);
/// Route handler for the buyer-side checkout callback.
///
/// The PayPal button on the checkout page posts a form here when it closes, with an `action` of `approve`, `cancel` or
/// `error`. Nothing in the form is trusted: an approval is only recorded once the engine has confirmed it with PayPal.
///
/// The response is always `{ "status", "message" }`, where `message` is a stable code the page can act on.
pub async fn on_close<B, P>(
    path: web::Path<String>,
    form: web::Form<CloseNotification>,
    api: web::Data<ApprovalApi<B, P>>,
    options: web::Data<ServerOptions>,
) -> HttpResponse
where
    B: OrderStore,
    P: PaymentProcessor,
{
    let instance_id = path.into_inner();
    let form = form.into_inner();
    trace!("💻️ Received onClose callback for instance {instance_id}: {form:?}");
    if instance_id != options.instance_id {
        warn!("💻️ onClose callback for unknown instance {instance_id}. Ignoring it.");
        return bad_request();
    }
    let reference = ReferenceId::from(form.ref_id.trim());
    if reference.is_empty() || form.action.is_empty() {
        return bad_request();
    }
    match form.action.as_str() {
        "approve" => match api.approve(form.order_id.trim(), &reference, form.capture_id.trim()).await {
            Ok(_) => callback_response(StatusCode::OK, CallbackStatus::Success, "PAYMENT_OK"),
            Err(rejection) => rejection_response(&rejection),
        },
        "cancel" => match api.cancel(&reference).await {
            Ok(_) => callback_response(StatusCode::OK, CallbackStatus::Canceled, "BUYER_PAYPAL_CANCEL"),
            Err(_) => bad_request(),
        },
        "error" => match api.error_reported(&reference).await {
            Ok(_) => callback_response(StatusCode::SERVICE_UNAVAILABLE, CallbackStatus::Error, "BUYER_PAYPAL_ERROR"),
            Err(_) => bad_request(),
        },
        other => {
            debug!("💻️ Unknown onClose action '{other}' for [{reference}]");
            bad_request()
        },
    }
}

fn rejection_response(rejection: &ApprovalRejection) -> HttpResponse {
    use ApprovalRejection::*;
    let (status, code) = match rejection {
        MissingReference | MissingOrderId | MissingCaptureId => return bad_request(),
        AuthFailure(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_PAYPAL_BAD_AUTH"),
        RemoteFetchFailure(_) | AmountUnparsable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_PAYPAL_BAD_ORDER"),
        BundlingUnsupported(_) | ReferenceMismatch { .. } | AmountMismatch { .. } => {
            (StatusCode::BAD_REQUEST, "SERVER_PAYPAL_BAD_ORDER")
        },
        LocalRecordUnavailable(_) | CommitFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_BAD_DATABASE"),
        NotYetPaid(_) => (StatusCode::CONFLICT, "PAYMENT_NOT_APPROVED"),
        ConcurrentCommitLost => {
            return callback_response(StatusCode::OK, CallbackStatus::Success, "PAYMENT_ALREADY_RECORDED")
        },
    };
    callback_response(status, CallbackStatus::Error, code)
}

fn bad_request() -> HttpResponse {
    callback_response(StatusCode::BAD_REQUEST, CallbackStatus::Error, "BAD_REQUEST")
}

fn callback_response(status: StatusCode, callback_status: CallbackStatus, code: &str) -> HttpResponse {
    HttpResponse::build(status).json(CallbackResponse::new(callback_status, code))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(open_checkout => Post "/checkout" impl OrderStore);
/// Opens a pending order and returns everything the merchant's checkout page needs to render the PayPal button.
pub async fn open_checkout<B: OrderStore>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let CheckoutRequest { reference, currency, amount } = body.into_inner();
    debug!("💻️ Checkout requested for [{reference}]: {amount} {currency}");
    let parameters = api.open_order(&reference, &currency, amount).await?;
    let sdk_url = options.sdk_url(&parameters.currency);
    Ok(HttpResponse::Ok().json(CheckoutResponse { parameters, sdk_url }))
}

//----------------------------------------------   Ledger  ----------------------------------------------------
route!(payment_status => Get "/payment/{reference}" impl OrderStore, PaymentProcessor);
pub async fn payment_status<B, P>(
    path: web::Path<ReferenceId>,
    api: web::Data<LedgerApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    P: PaymentProcessor,
{
    let reference = path.into_inner();
    trace!("💻️ Payment status requested for [{reference}]");
    let result = api.payment_result(&reference).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(refundable => Get "/refundable/{reference}" impl OrderStore, PaymentProcessor);
pub async fn refundable<B, P>(path: web::Path<ReferenceId>, api: web::Data<LedgerApi<B, P>>) -> HttpResponse
where
    B: OrderStore,
    P: PaymentProcessor,
{
    let reference = path.into_inner();
    let refundable = api.is_refundable(&reference).await;
    HttpResponse::Ok().json(RefundableResponse { reference, refundable })
}

route!(refund => Post "/refund" impl OrderStore, PaymentProcessor);
/// Refunds part or all of a captured payment. The amount is a decimal string, e.g. `"1.50"`.
pub async fn refund<B, P>(
    body: web::Json<RefundRequest>,
    api: web::Data<LedgerApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    P: PaymentProcessor,
{
    let RefundRequest { reference, currency, amount } = body.into_inner();
    info!("💻️ Refund of {amount} requested for [{reference}]");
    let outcome = api.refund(&reference, currency.as_deref(), amount).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

route!(order_record => Get "/order/{reference}" impl OrderStore, PaymentProcessor);
/// The local record for an order, including the processor's order snapshot taken when the payment was confirmed.
pub async fn order_record<B, P>(
    path: web::Path<ReferenceId>,
    api: web::Data<LedgerApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    P: PaymentProcessor,
{
    let reference = path.into_inner();
    match api.order_record(&reference).await? {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(ServerError::NoRecordFound(format!("No order exists for {reference}"))),
    }
}
