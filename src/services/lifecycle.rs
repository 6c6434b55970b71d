// src/services/lifecycle.rs
//! Call state machine.
//!
//! Owns every transition on a call record: admission and origination,
//! provider event notifications, and caller-initiated end/cancel with
//! settlement. Transitions on one call are serialized through the store's
//! per-call lock; the lock is never held across a provider round-trip.

use crate::error::BillingError;
use crate::models::{Call, CallEvent, CallStatus, CallSummary, InitiateCallRequest};
use crate::providers::TelephonyProvider;
use crate::services::{AccountLedger, AccountResolution, RatePlan, RefundReconciler};
use crate::store::CallStore;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Caller-initiated termination paths. Both settle actual usage; they
/// differ only in the refund baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettleMode {
    End,
    Cancel,
}

pub struct CallLifecycleEngine {
    calls: Arc<dyn CallStore>,
    ledger: Arc<AccountLedger>,
    telephony: Arc<dyn TelephonyProvider>,
    reconciler: Arc<RefundReconciler>,
    rate: RatePlan,
    from_number: String,
    webhook_url: String,
}

impl CallLifecycleEngine {
    pub fn new(
        calls: Arc<dyn CallStore>,
        ledger: Arc<AccountLedger>,
        telephony: Arc<dyn TelephonyProvider>,
        reconciler: Arc<RefundReconciler>,
        rate: RatePlan,
        from_number: String,
        webhook_url: String,
    ) -> Self {
        Self {
            calls,
            ledger,
            telephony,
            reconciler,
            rate,
            from_number,
            webhook_url,
        }
    }

    /// Admit, originate and record a new call.
    ///
    /// The balance check is the sole admission gate; it does not reserve
    /// funds. Origination failure aborts before any record is written.
    pub async fn initiate_call(
        &self,
        req: &InitiateCallRequest,
        resolution: AccountResolution,
    ) -> Result<Call, BillingError> {
        if req.to_number.trim().is_empty() {
            return Err(BillingError::Validation(
                "destination number is required".to_string(),
            ));
        }
        if req.estimated_duration < 0 {
            return Err(BillingError::Validation(
                "estimated duration must be non-negative".to_string(),
            ));
        }

        let account = self.ledger.resolve(&req.email, resolution).await?;
        if !account.has_sufficient_balance() {
            warn!(
                "❌ Call denied for {}: balance ${}",
                account.email, account.balance
            );
            return Err(BillingError::InsufficientBalance {
                available: account.balance.to_string(),
            });
        }

        let call_control_id = self
            .telephony
            .originate(&self.from_number, &req.to_number, &self.webhook_url)
            .await?;

        info!(
            "📞 Call initiated: {} - {} → {} (estimated {}s)",
            call_control_id, self.from_number, req.to_number, req.estimated_duration
        );

        let call = Call::new(
            call_control_id,
            account.email,
            self.from_number.clone(),
            req.to_number.trim().to_string(),
            req.estimated_duration,
            req.payment_intent_id.clone(),
        );

        self.calls.upsert(call).await
    }

    /// Apply a provider event notification.
    ///
    /// Notifications may arrive duplicated or out of order; applying one to
    /// a call that already reached a terminal state is a safe no-op. The
    /// webhook path never computes refunds — settlement belongs to the
    /// caller-initiated end/cancel operations.
    pub async fn apply_event(&self, payload: serde_json::Value) -> Result<(), BillingError> {
        let event = CallEvent::parse(&payload);
        let call_control_id = match event.call_control_id() {
            Some(id) => id.to_string(),
            None => {
                debug!("Ignoring provider event without a call id");
                return Ok(());
            }
        };

        let _guard = self.calls.lock(&call_control_id).await;

        let mut call = self
            .calls
            .get(&call_control_id)
            .await?
            .ok_or_else(|| BillingError::CallNotFound(call_control_id.clone()))?;

        if call.is_terminal() {
            debug!(
                "Event for terminal call {} ignored (status {})",
                call_control_id,
                call.status.as_str()
            );
            return Ok(());
        }

        match event {
            CallEvent::Initiated { .. } => {
                // State confirmation only.
            }
            CallEvent::Answered { .. } => {
                if call.status == CallStatus::Initiated {
                    info!("✅ Call answered: {}", call_control_id);
                    call.status = CallStatus::InProgress;
                }
            }
            CallEvent::Hangup { duration_secs, .. } => {
                let now = Utc::now();
                // Provider-reported duration wins over the local clock.
                let duration = duration_secs
                    .unwrap_or_else(|| (now - call.start_time).num_seconds())
                    .max(0);
                info!(
                    "📴 Call hangup: {} after {}s (provider observed)",
                    call_control_id, duration
                );
                call.status = CallStatus::Completed;
                call.end_time = Some(now);
                call.duration_secs = duration;
            }
            CallEvent::Failed { .. } => {
                warn!("❌ Call failed: {}", call_control_id);
                call.status = CallStatus::Failed;
                call.end_time = Some(Utc::now());
            }
            CallEvent::Unknown { .. } => {
                debug!("Unknown event kind for call {}", call_control_id);
            }
        }

        call.last_event = Some(payload);
        self.calls.upsert(call).await?;
        Ok(())
    }

    /// Caller-initiated end: terminate through the provider, settle actual
    /// usage and refund unused estimated time.
    pub async fn end_call(&self, call_control_id: &str) -> Result<CallSummary, BillingError> {
        self.settle(call_control_id, SettleMode::End).await
    }

    /// Caller-initiated cancel: same settlement, but refunds against the
    /// full estimate baseline. Overruns yield no refund.
    pub async fn cancel_call(&self, call_control_id: &str) -> Result<CallSummary, BillingError> {
        self.settle(call_control_id, SettleMode::Cancel).await
    }

    pub async fn status(&self, call_control_id: &str) -> Result<Call, BillingError> {
        self.calls
            .get(call_control_id)
            .await?
            .ok_or_else(|| BillingError::CallNotFound(call_control_id.to_string()))
    }

    async fn settle(
        &self,
        call_control_id: &str,
        mode: SettleMode,
    ) -> Result<CallSummary, BillingError> {
        let call = self
            .calls
            .get(call_control_id)
            .await?
            .ok_or_else(|| BillingError::CallNotFound(call_control_id.to_string()))?;

        if call.is_terminal() {
            return Err(BillingError::AlreadyEnded(call_control_id.to_string()));
        }

        // Provider teardown first, with no lock held. A failure here aborts
        // the transition: a call is never marked terminal without confirmed
        // provider termination.
        self.telephony.terminate(call_control_id).await?;

        let settled = {
            let _guard = self.calls.lock(call_control_id).await;

            let mut call = self
                .calls
                .get(call_control_id)
                .await?
                .ok_or_else(|| BillingError::CallNotFound(call_control_id.to_string()))?;

            // Re-check under the lock: a provider notification or a racing
            // request may have won the terminal transition meanwhile.
            if call.is_terminal() {
                return Err(BillingError::AlreadyEnded(call_control_id.to_string()));
            }

            let now = Utc::now();
            let actual_duration = (now - call.start_time).num_seconds().max(0);
            let actual_cost = self.rate.cost(actual_duration);
            let unused_duration = call.estimated_duration_secs - actual_duration;
            let refund_amount = match mode {
                SettleMode::End => self.rate.cost(unused_duration),
                SettleMode::Cancel => {
                    let estimated_cost = self.rate.cost(call.estimated_duration_secs);
                    (estimated_cost - actual_cost).max(Decimal::ZERO)
                }
            };

            call.status = match mode {
                SettleMode::End => CallStatus::Completed,
                SettleMode::Cancel => CallStatus::Cancelled,
            };
            call.end_time = Some(now);
            call.duration_secs = actual_duration;
            call.unused_duration_secs = unused_duration;
            call.cost = actual_cost;
            call.refund_amount = refund_amount;

            let call = self.calls.upsert(call).await?;
            self.ledger.debit(&call.account_email, actual_cost).await?;

            info!(
                "💰 Call {} {}: {}s used of {}s estimated, cost ${}, refund ${}",
                call_control_id,
                call.status.as_str(),
                actual_duration,
                call.estimated_duration_secs,
                actual_cost,
                refund_amount
            );

            call
        };

        // Refund settlement happens outside the lock and never blocks the
        // terminal transition.
        self.reconciler.reconcile(&settled).await;

        let remaining_balance = self.ledger.balance(&settled.account_email).await?;

        Ok(CallSummary {
            call_control_id: settled.call_control_id,
            status: settled.status,
            actual_duration: settled.duration_secs,
            actual_cost: settled.cost,
            refund_amount: settled.refund_amount,
            remaining_balance,
        })
    }
}
