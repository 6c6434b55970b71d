// src/models/call.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    /// Provider-issued call-control id. Unique, immutable once assigned.
    pub call_control_id: String,
    pub account_email: String,
    pub from_number: String,
    pub to_number: String,
    pub status: CallStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Reported or derived duration in whole seconds.
    pub duration_secs: i64,
    /// Caller-supplied estimate used to pre-authorize payment.
    pub estimated_duration_secs: i64,
    /// Estimated minus actual. May be negative when the call overran.
    pub unused_duration_secs: i64,
    pub cost: Decimal,
    pub refund_amount: Decimal,
    pub payment_intent_id: Option<String>,
    pub refund_id: Option<String>,
    pub refunded: bool,
    /// Last raw provider notification, retained for audit.
    pub last_event: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Initiated,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl CallStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallStatus::Completed | CallStatus::Failed | CallStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            CallStatus::Initiated => "initiated",
            CallStatus::InProgress => "in_progress",
            CallStatus::Completed => "completed",
            CallStatus::Failed => "failed",
            CallStatus::Cancelled => "cancelled",
        }
    }
}

impl Call {
    pub fn new(
        call_control_id: String,
        account_email: String,
        from_number: String,
        to_number: String,
        estimated_duration_secs: i64,
        payment_intent_id: Option<String>,
    ) -> Self {
        Self {
            call_control_id,
            account_email,
            from_number,
            to_number,
            status: CallStatus::Initiated,
            start_time: Utc::now(),
            end_time: None,
            duration_secs: 0,
            estimated_duration_secs,
            unused_duration_secs: 0,
            cost: Decimal::ZERO,
            refund_amount: Decimal::ZERO,
            payment_intent_id,
            refund_id: None,
            refunded: false,
            last_event: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
