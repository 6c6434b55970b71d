// src/api/routes.rs
use crate::api::handlers;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .route("/calls/initiate", web::post().to(handlers::initiate_call))
            .route("/calls/webhook", web::post().to(handlers::call_webhook))
            .route("/calls/{call_control_id}/end", web::post().to(handlers::end_call))
            .route(
                "/calls/{call_control_id}/cancel",
                web::post().to(handlers::cancel_call),
            )
            .route("/calls/{call_control_id}", web::get().to(handlers::call_status))
            .route(
                "/payments/intent",
                web::post().to(handlers::create_payment_intent),
            )
            .route(
                "/payments/confirm",
                web::post().to(handlers::confirm_payment),
            )
            .route(
                "/payments/refund/{call_control_id}",
                web::post().to(handlers::refund_call),
            ),
    );
}
