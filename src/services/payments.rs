// src/services/payments.rs
use crate::error::BillingError;
use crate::providers::{to_cents, PaymentIntent, PaymentProvider};
use crate::services::AccountLedger;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Balance top-up flow: payment intents are created against a lazily
/// provisioned provider customer, and a confirmed payment credits the
/// ledger.
pub struct PaymentService {
    ledger: Arc<AccountLedger>,
    payments: Arc<dyn PaymentProvider>,
}

impl PaymentService {
    pub fn new(ledger: Arc<AccountLedger>, payments: Arc<dyn PaymentProvider>) -> Self {
        Self { ledger, payments }
    }

    pub async fn create_intent(
        &self,
        email: &str,
        amount: Decimal,
    ) -> Result<PaymentIntent, BillingError> {
        if amount <= Decimal::ZERO {
            return Err(BillingError::Validation(
                "amount must be positive".to_string(),
            ));
        }

        let account = self.ledger.ensure_account(email).await?;

        let customer_id = match account.stripe_customer_id {
            Some(id) => id,
            None => {
                let id = self.payments.create_customer(&account.email).await?;
                self.ledger.attach_customer(&account.email, &id).await?;
                info!("Created payment customer {} for {}", id, account.email);
                id
            }
        };

        self.payments
            .create_payment_intent(to_cents(amount), &customer_id)
            .await
    }

    /// Verify a payment intent succeeded and credit its amount.
    pub async fn confirm(
        &self,
        email: &str,
        payment_intent_id: &str,
    ) -> Result<Decimal, BillingError> {
        let account = self.ledger.get_account(email).await?;

        let status = self.payments.payment_status(payment_intent_id).await?;
        if !status.is_succeeded() {
            return Err(BillingError::Validation(format!(
                "payment not successful: {}",
                status.status
            )));
        }

        let amount = Decimal::from(status.amount_cents) / Decimal::from(100);
        info!(
            "Payment {} confirmed for {}: crediting ${}",
            payment_intent_id, account.email, amount
        );
        self.ledger.credit(&account.email, amount).await
    }
}
