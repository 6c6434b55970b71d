// src/models/mod.rs
pub mod account;
pub mod call;
pub mod event;

pub use account::{Account, AccountKind};
pub use call::{Call, CallStatus};
pub use event::CallEvent;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==================== API DTOs ====================

#[derive(Debug, Deserialize)]
pub struct InitiateCallRequest {
    pub to_number: String,
    pub estimated_duration: i64,
    pub email: String,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitiateCallResponse {
    pub call_control_id: String,
}

/// Settlement summary returned by the end and cancel operations.
#[derive(Debug, Clone, Serialize)]
pub struct CallSummary {
    pub call_control_id: String,
    pub status: CallStatus,
    pub actual_duration: i64,
    pub actual_cost: Decimal,
    pub refund_amount: Decimal,
    pub remaining_balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    pub email: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub email: String,
    pub payment_intent_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RefundCallRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub message: String,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
