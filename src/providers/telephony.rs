// src/providers/telephony.rs
//! Telnyx Call Control client.
//!
//! Origination and termination go through the v2 REST API; call progress
//! comes back asynchronously on the webhook URL passed at origination.

use crate::error::BillingError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Outbound telephony capability consumed by the lifecycle engine.
#[async_trait]
pub trait TelephonyProvider: Send + Sync {
    /// Originate a call and return the provider call-control id.
    async fn originate(
        &self,
        from: &str,
        to: &str,
        webhook_url: &str,
    ) -> Result<String, BillingError>;

    /// Tear down a live call.
    async fn terminate(&self, call_control_id: &str) -> Result<(), BillingError>;
}

pub struct TelnyxClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    connection_id: String,
}

#[derive(Debug, Serialize)]
struct CreateCallRequest<'a> {
    connection_id: &'a str,
    to: &'a str,
    from: &'a str,
    webhook_url: &'a str,
    webhook_url_method: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateCallResponse {
    data: CreateCallData,
}

#[derive(Debug, Deserialize)]
struct CreateCallData {
    call_control_id: String,
}

impl TelnyxClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        connection_id: &str,
        timeout_ms: u64,
    ) -> Result<Self, BillingError> {
        let http_client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| BillingError::Telephony(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            connection_id: connection_id.to_string(),
        })
    }

    fn map_send_error(e: reqwest::Error) -> BillingError {
        if e.is_timeout() {
            BillingError::Telephony("request timed out".to_string())
        } else {
            BillingError::Telephony(e.to_string())
        }
    }
}

#[async_trait]
impl TelephonyProvider for TelnyxClient {
    async fn originate(
        &self,
        from: &str,
        to: &str,
        webhook_url: &str,
    ) -> Result<String, BillingError> {
        let request = CreateCallRequest {
            connection_id: &self.connection_id,
            to,
            from,
            webhook_url,
            webhook_url_method: "POST",
        };

        debug!("Telnyx originate: {} → {}", from, to);

        let response = self
            .http_client
            .post(format!("{}/v2/calls", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Telnyx originate failed: status={}, body={}", status, body);
            return Err(BillingError::Telephony(format!(
                "originate failed with status {}",
                status
            )));
        }

        let parsed: CreateCallResponse = response
            .json()
            .await
            .map_err(|e| BillingError::Telephony(format!("invalid response: {}", e)))?;

        Ok(parsed.data.call_control_id)
    }

    async fn terminate(&self, call_control_id: &str) -> Result<(), BillingError> {
        debug!("Telnyx hangup: {}", call_control_id);

        let response = self
            .http_client
            .post(format!(
                "{}/v2/calls/{}/actions/hangup",
                self.base_url, call_control_id
            ))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Telnyx hangup failed: status={}, body={}", status, body);
            return Err(BillingError::Telephony(format!(
                "hangup failed with status {}",
                status
            )));
        }

        Ok(())
    }
}
