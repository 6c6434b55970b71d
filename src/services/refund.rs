// src/services/refund.rs
use crate::error::BillingError;
use crate::models::Call;
use crate::providers::{to_cents, PaymentProvider};
use crate::services::AccountLedger;
use crate::store::CallStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Settles refunds against the payment provider after a call reaches a
/// terminal state.
///
/// The refund is a best-effort side effect: a provider failure is reported
/// and leaves the call terminal, the earlier debit in place and
/// `refunded == false`, so the operation can be retried independently.
pub struct RefundReconciler {
    calls: Arc<dyn CallStore>,
    ledger: Arc<AccountLedger>,
    payments: Arc<dyn PaymentProvider>,
}

impl RefundReconciler {
    pub fn new(
        calls: Arc<dyn CallStore>,
        ledger: Arc<AccountLedger>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            calls,
            ledger,
            payments,
        }
    }

    /// Refund a settled call's unused amount. Never fails the caller.
    pub async fn reconcile(&self, call: &Call) {
        if call.refund_amount <= Decimal::ZERO {
            debug!("No refund due for call {}", call.call_control_id);
            return;
        }

        let payment_intent_id = match call.payment_intent_id.as_deref() {
            Some(id) => id,
            None => {
                debug!(
                    "Call {} has no payment authorization, skipping refund",
                    call.call_control_id
                );
                return;
            }
        };

        if call.refunded {
            warn!("Call {} is already refunded", call.call_control_id);
            return;
        }

        match self
            .payments
            .refund(payment_intent_id, to_cents(call.refund_amount))
            .await
        {
            Ok(refund_id) => {
                if let Err(e) = self
                    .ledger
                    .credit(&call.account_email, call.refund_amount)
                    .await
                {
                    error!(
                        "Refund {} issued but crediting {} failed: {}",
                        refund_id, call.account_email, e
                    );
                    return;
                }

                self.mark_refunded(&call.call_control_id, &refund_id).await;

                info!(
                    "✅ Refunded ${} for call {} ({})",
                    call.refund_amount, call.call_control_id, refund_id
                );
            }
            Err(e) => {
                // The call is correctly ended regardless; only the refund
                // remains outstanding.
                error!(
                    "Refund of ${} failed for call {}: {}",
                    call.refund_amount, call.call_control_id, e
                );
            }
        }
    }

    /// Manual refund of a call's billed cost (support path). Unlike
    /// `reconcile`, provider failures surface to the caller.
    pub async fn refund_call(
        &self,
        call_control_id: &str,
        email: &str,
    ) -> Result<Decimal, BillingError> {
        let account = self.ledger.get_account(email).await?;

        let call = self
            .calls
            .get(call_control_id)
            .await?
            .ok_or_else(|| BillingError::CallNotFound(call_control_id.to_string()))?;

        if call.account_email != account.email {
            return Err(BillingError::CallNotFound(call_control_id.to_string()));
        }

        if call.refunded {
            return Err(BillingError::AlreadyRefunded(call_control_id.to_string()));
        }

        let payment_intent_id = call.payment_intent_id.as_deref().ok_or_else(|| {
            BillingError::Validation("call has no payment authorization".to_string())
        })?;

        if call.cost <= Decimal::ZERO {
            return Err(BillingError::Validation(
                "call has no billed cost to refund".to_string(),
            ));
        }

        let refund_id = self
            .payments
            .refund(payment_intent_id, to_cents(call.cost))
            .await?;

        let balance = self.ledger.credit(&account.email, call.cost).await?;
        self.mark_refunded(call_control_id, &refund_id).await;

        info!(
            "✅ Manually refunded ${} for call {} ({})",
            call.cost, call_control_id, refund_id
        );

        Ok(balance)
    }

    /// Record the refund outcome. Once `refunded` is set the refund fields
    /// are immutable, so a re-entrant outcome write is dropped.
    async fn mark_refunded(&self, call_control_id: &str, refund_id: &str) {
        let _guard = self.calls.lock(call_control_id).await;

        match self.calls.get(call_control_id).await {
            Ok(Some(mut call)) if !call.refunded => {
                call.refunded = true;
                call.refund_id = Some(refund_id.to_string());
                if let Err(e) = self.calls.upsert(call).await {
                    error!(
                        "Failed to record refund {} on call {}: {}",
                        refund_id, call_control_id, e
                    );
                }
            }
            Ok(Some(_)) => {
                warn!(
                    "Call {} already carries a refund outcome, keeping it",
                    call_control_id
                );
            }
            Ok(None) => {
                error!("Call {} vanished while recording refund", call_control_id);
            }
            Err(e) => {
                error!(
                    "Failed to load call {} while recording refund: {}",
                    call_control_id, e
                );
            }
        }
    }
}
