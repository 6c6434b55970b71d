// src/providers/payments.rs
//! Stripe client for payment authorization and refunds.
//!
//! The v1 API is form-encoded and amounts cross the wire in integer cents,
//! floored. Refunds are issued against a prior payment-intent reference.

use crate::error::BillingError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

/// Convert a decimal dollar amount to integer cents, flooring fractions of
/// a cent.
pub fn to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::from(100)).floor().to_i64().unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct PaymentIntentStatus {
    pub status: String,
    pub amount_cents: i64,
}

impl PaymentIntentStatus {
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

/// Payment capability consumed by the reconciler and the top-up flow.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a provider customer record for an account, returning its id.
    async fn create_customer(&self, email: &str) -> Result<String, BillingError>;

    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        customer_id: &str,
    ) -> Result<PaymentIntent, BillingError>;

    async fn payment_status(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntentStatus, BillingError>;

    /// Refund part of a prior authorization, returning the refund id.
    async fn refund(
        &self,
        payment_intent_id: &str,
        amount_cents: i64,
    ) -> Result<String, BillingError>;
}

pub struct StripeClient {
    http_client: Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentStatusResponse {
    status: String,
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    id: String,
}

impl StripeClient {
    pub fn new(base_url: &str, secret_key: &str, timeout_ms: u64) -> Result<Self, BillingError> {
        let http_client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| BillingError::Payment(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    async fn post_form<R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<R, BillingError> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .form(form)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::parse_response(path, response).await
    }

    async fn get_json<R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<R, BillingError> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::parse_response(path, response).await
    }

    async fn parse_response<R: serde::de::DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<R, BillingError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Stripe {} failed: status={}, body={}", path, status, body);
            return Err(BillingError::Payment(format!(
                "{} failed with status {}",
                path, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BillingError::Payment(format!("invalid response: {}", e)))
    }

    fn map_send_error(e: reqwest::Error) -> BillingError {
        if e.is_timeout() {
            BillingError::Payment("request timed out".to_string())
        } else {
            BillingError::Payment(e.to_string())
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_customer(&self, email: &str) -> Result<String, BillingError> {
        debug!("Stripe create customer: {}", email);

        let response: CustomerResponse = self
            .post_form("/v1/customers", &[("email", email.to_string())])
            .await?;

        Ok(response.id)
    }

    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        customer_id: &str,
    ) -> Result<PaymentIntent, BillingError> {
        debug!(
            "Stripe create payment intent: {} cents for {}",
            amount_cents, customer_id
        );

        let response: PaymentIntentResponse = self
            .post_form(
                "/v1/payment_intents",
                &[
                    ("amount", amount_cents.to_string()),
                    ("currency", "usd".to_string()),
                    ("customer", customer_id.to_string()),
                    ("automatic_payment_methods[enabled]", "true".to_string()),
                ],
            )
            .await?;

        Ok(PaymentIntent {
            id: response.id,
            client_secret: response.client_secret,
        })
    }

    async fn payment_status(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntentStatus, BillingError> {
        let response: PaymentIntentStatusResponse = self
            .get_json(&format!("/v1/payment_intents/{}", payment_intent_id))
            .await?;

        Ok(PaymentIntentStatus {
            status: response.status,
            amount_cents: response.amount,
        })
    }

    async fn refund(
        &self,
        payment_intent_id: &str,
        amount_cents: i64,
    ) -> Result<String, BillingError> {
        debug!(
            "Stripe refund: {} cents against {}",
            amount_cents, payment_intent_id
        );

        let response: RefundResponse = self
            .post_form(
                "/v1/refunds",
                &[
                    ("payment_intent", payment_intent_id.to_string()),
                    ("amount", amount_cents.to_string()),
                ],
            )
            .await?;

        Ok(response.id)
    }
}
