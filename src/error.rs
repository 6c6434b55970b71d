// src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Call not found: {0}")]
    CallNotFound(String),

    #[error("Insufficient balance: available {available}")]
    InsufficientBalance { available: String },

    #[error("Call is already ended: {0}")]
    AlreadyEnded(String),

    #[error("Call is already refunded: {0}")]
    AlreadyRefunded(String),

    #[error("Telephony provider error: {0}")]
    Telephony(String),

    #[error("Payment provider error: {0}")]
    Payment(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for BillingError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.error_code(),
            "message": self.to_string(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            BillingError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            BillingError::CallNotFound(_) => StatusCode::NOT_FOUND,
            BillingError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            BillingError::AlreadyEnded(_) => StatusCode::CONFLICT,
            BillingError::AlreadyRefunded(_) => StatusCode::CONFLICT,
            BillingError::Telephony(_) => StatusCode::BAD_GATEWAY,
            BillingError::Payment(_) => StatusCode::BAD_GATEWAY,
            BillingError::Validation(_) => StatusCode::BAD_REQUEST,
            BillingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl BillingError {
    fn error_code(&self) -> &str {
        match self {
            BillingError::AccountNotFound(_) => "account_not_found",
            BillingError::CallNotFound(_) => "call_not_found",
            BillingError::InsufficientBalance { .. } => "insufficient_balance",
            BillingError::AlreadyEnded(_) => "call_already_ended",
            BillingError::AlreadyRefunded(_) => "call_already_refunded",
            BillingError::Telephony(_) => "telephony_provider_error",
            BillingError::Payment(_) => "payment_provider_error",
            BillingError::Validation(_) => "invalid_request",
            BillingError::Internal(_) => "internal_error",
        }
    }
}
