// src/main.rs
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;

use ephone_billing_engine::api;
use ephone_billing_engine::config::Config;
use ephone_billing_engine::providers::{
    PaymentProvider, StripeClient, TelephonyProvider, TelnyxClient,
};
use ephone_billing_engine::services::{
    AccountLedger, CallLifecycleEngine, PaymentService, RatePlan, RefundReconciler,
};
use ephone_billing_engine::store::{AccountStore, CallStore, MemoryStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("🚀 Starting EPhone Billing Engine");

    // Provider credential misconfiguration is fatal at startup.
    let config = Config::from_env().expect("Failed to load configuration");
    info!("Environment: {}", config.environment);

    let store = Arc::new(MemoryStore::new());
    let accounts: Arc<dyn AccountStore> = store.clone();
    let calls: Arc<dyn CallStore> = store;

    let telephony: Arc<dyn TelephonyProvider> = Arc::new(
        TelnyxClient::new(
            &config.telnyx_api_url,
            &config.telnyx_api_key,
            &config.telnyx_connection_id,
            config.provider_timeout_ms,
        )
        .expect("Failed to create Telnyx client"),
    );

    let payments: Arc<dyn PaymentProvider> = Arc::new(
        StripeClient::new(
            &config.stripe_api_url,
            &config.stripe_secret_key,
            config.provider_timeout_ms,
        )
        .expect("Failed to create Stripe client"),
    );

    let ledger = Arc::new(AccountLedger::new(accounts, config.default_balance));

    let reconciler = Arc::new(RefundReconciler::new(
        calls.clone(),
        ledger.clone(),
        payments.clone(),
    ));

    let engine = Arc::new(CallLifecycleEngine::new(
        calls,
        ledger.clone(),
        telephony,
        reconciler.clone(),
        RatePlan::new(config.rate_per_second),
        config.telnyx_phone_number.clone(),
        config.webhook_url(),
    ));

    let payment_service = Arc::new(PaymentService::new(ledger, payments));

    info!(
        "✅ Engine ready: ${}/s, webhook at {}",
        config.rate_per_second,
        config.webhook_url()
    );

    let bind_address = format!("{}:{}", config.host, config.port);
    info!("🌐 Starting HTTP server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(engine.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(reconciler.clone()))
            .configure(api::routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
