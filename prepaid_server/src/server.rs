use std::{future::ready, time::Duration};

use actix_web::{
    dev::{Server, Service},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use futures::future::Either;
use log::*;
use prepaid_engine::{events::EventHooks, ApprovalApi, CheckoutApi, LedgerApi, SqliteDatabase};

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    helpers::{get_remote_ip, is_whitelisted},
    integrations::{
        paypal::PayPalProcessor,
        status_relay::{create_status_relay, log_status_changes},
    },
    routes::{
        health,
        OnCloseRoute,
        OpenCheckoutRoute,
        OrderRecordRoute,
        PaymentStatusRoute,
        RefundRoute,
        RefundableRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let processor =
        PayPalProcessor::new(config.paypal.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let hooks = match &config.status_relay_url {
        Some(url) => {
            let relay = create_status_relay(url.clone(), config.remote_timeout)
                .map_err(|e| ServerError::InitializeError(e.to_string()))?;
            let mut hooks = EventHooks::default();
            hooks.publish_status_changes(relay.subscribe());
            tokio::spawn(relay.start_handler());
            hooks
        },
        None => log_status_changes(),
    };
    let srv = create_server_instance(config, db, processor, hooks)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    processor: PayPalProcessor,
    hooks: EventHooks,
) -> Result<Server, ServerError> {
    let engine_options = config.engine_options();
    // The approval API owns the change notifier, so every worker must share the same instance
    let approvals = web::Data::new(ApprovalApi::new(db.clone(), processor.clone(), engine_options.clone(), hooks));
    let ledger = web::Data::new(LedgerApi::new(db.clone(), processor, engine_options.clone()));
    let checkout = web::Data::new(CheckoutApi::new(db, engine_options));
    let options = web::Data::new(ServerOptions::from_config(&config));
    let whitelist = config.api_whitelist.clone();
    let srv = HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ppg::access_log"))
            .app_data(approvals.clone())
            .app_data(ledger.clone())
            .app_data(checkout.clone())
            .app_data(options.clone());
        let use_x_forwarded_for = options.use_x_forwarded_for;
        let use_forwarded = options.use_forwarded;
        let whitelist = whitelist.clone();
        let api_scope = web::scope("/api")
            .wrap_fn(move |req, srv| {
                let peer_ip = get_remote_ip(req.request(), use_x_forwarded_for, use_forwarded);
                if is_whitelisted(peer_ip, &whitelist) {
                    Either::Left(srv.call(req))
                } else {
                    let peer = peer_ip.map(|ip| ip.to_string()).unwrap_or_else(|| "an unknown address".into());
                    warn!("💻️ Denying /api access to {peer}");
                    Either::Right(ready(Err(ServerError::ForbiddenPeer(peer).into())))
                }
            })
            .service(OpenCheckoutRoute::<SqliteDatabase>::new())
            .service(PaymentStatusRoute::<SqliteDatabase, PayPalProcessor>::new())
            .service(RefundableRoute::<SqliteDatabase, PayPalProcessor>::new())
            .service(RefundRoute::<SqliteDatabase, PayPalProcessor>::new())
            .service(OrderRecordRoute::<SqliteDatabase, PayPalProcessor>::new());
        app.service(health).service(OnCloseRoute::<SqliteDatabase, PayPalProcessor>::new()).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!(
        "💻️ Listening on {}:{}. Checkout callbacks go to {}",
        config.host,
        config.port,
        config.engine_options().notify_url()
    );
    Ok(srv)
}
