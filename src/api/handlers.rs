// src/api/handlers.rs
use crate::error::BillingError;
use crate::models::{
    BalanceResponse, ConfirmPaymentRequest, HealthResponse, InitiateCallRequest,
    InitiateCallResponse, PaymentIntentRequest, PaymentIntentResponse, RefundCallRequest,
    WebhookAck,
};
use crate::services::{AccountResolution, CallLifecycleEngine, PaymentService, RefundReconciler};
use actix_web::{web, HttpResponse};
use std::sync::Arc;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "ephone-billing-engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn initiate_call(
    req: web::Json<InitiateCallRequest>,
    engine: web::Data<Arc<CallLifecycleEngine>>,
) -> Result<HttpResponse, BillingError> {
    let call = engine
        .initiate_call(&req, AccountResolution::Public)
        .await?;

    Ok(HttpResponse::Ok().json(InitiateCallResponse {
        call_control_id: call.call_control_id,
    }))
}

pub async fn call_webhook(
    payload: web::Json<serde_json::Value>,
    engine: web::Data<Arc<CallLifecycleEngine>>,
) -> Result<HttpResponse, BillingError> {
    engine.apply_event(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(WebhookAck { received: true }))
}

pub async fn end_call(
    path: web::Path<String>,
    engine: web::Data<Arc<CallLifecycleEngine>>,
) -> Result<HttpResponse, BillingError> {
    let summary = engine.end_call(&path).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn cancel_call(
    path: web::Path<String>,
    engine: web::Data<Arc<CallLifecycleEngine>>,
) -> Result<HttpResponse, BillingError> {
    let summary = engine.cancel_call(&path).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn call_status(
    path: web::Path<String>,
    engine: web::Data<Arc<CallLifecycleEngine>>,
) -> Result<HttpResponse, BillingError> {
    let call = engine.status(&path).await?;
    Ok(HttpResponse::Ok().json(call))
}

pub async fn create_payment_intent(
    req: web::Json<PaymentIntentRequest>,
    payments: web::Data<Arc<PaymentService>>,
) -> Result<HttpResponse, BillingError> {
    let intent = payments.create_intent(&req.email, req.amount).await?;
    Ok(HttpResponse::Ok().json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

pub async fn confirm_payment(
    req: web::Json<ConfirmPaymentRequest>,
    payments: web::Data<Arc<PaymentService>>,
) -> Result<HttpResponse, BillingError> {
    let balance = payments.confirm(&req.email, &req.payment_intent_id).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse {
        message: "Payment successful".to_string(),
        balance,
    }))
}

pub async fn refund_call(
    path: web::Path<String>,
    req: web::Json<RefundCallRequest>,
    reconciler: web::Data<Arc<RefundReconciler>>,
) -> Result<HttpResponse, BillingError> {
    let balance = reconciler.refund_call(&path, &req.email).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse {
        message: "Refund processed successfully".to_string(),
        balance,
    }))
}
