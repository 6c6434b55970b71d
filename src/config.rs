// src/config.rs
use anyhow::Context;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL, used to build the webhook callback.
    pub public_url: String,
    pub rate_per_second: Decimal,
    pub default_balance: Decimal,
    pub telnyx_api_url: String,
    pub telnyx_api_key: String,
    pub telnyx_connection_id: String,
    pub telnyx_phone_number: String,
    pub stripe_api_url: String,
    pub stripe_secret_key: String,
    pub provider_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "9000".to_string())
            .parse()
            .context("Invalid PORT")?;

        Ok(Config {
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "production".to_string()),
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            rate_per_second: parse_decimal("RATE_PER_SECOND", "0.01")?,
            default_balance: parse_decimal("DEFAULT_BALANCE", "100.00")?,
            telnyx_api_url: env::var("TELNYX_API_URL")
                .unwrap_or_else(|_| "https://api.telnyx.com".to_string()),
            telnyx_api_key: env::var("TELNYX_API_KEY")
                .context("TELNYX_API_KEY not set")?,
            telnyx_connection_id: env::var("TELNYX_CONNECTION_ID")
                .context("TELNYX_CONNECTION_ID not set")?,
            telnyx_phone_number: env::var("TELNYX_PHONE_NUMBER")
                .context("TELNYX_PHONE_NUMBER not set")?,
            stripe_api_url: env::var("STRIPE_API_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .context("STRIPE_SECRET_KEY not set")?,
            provider_timeout_ms: env::var("PROVIDER_TIMEOUT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .context("Invalid PROVIDER_TIMEOUT_MS")?,
        })
    }

    pub fn webhook_url(&self) -> String {
        format!("{}/api/v1/calls/webhook", self.public_url.trim_end_matches('/'))
    }
}

fn parse_decimal(var: &str, default: &str) -> anyhow::Result<Decimal> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    Decimal::from_str(&raw).with_context(|| format!("Invalid {}", var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_url_strips_trailing_slash() {
        let config = Config {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 9000,
            public_url: "https://calls.example.com/".to_string(),
            rate_per_second: Decimal::new(1, 2),
            default_balance: Decimal::new(100, 0),
            telnyx_api_url: "https://api.telnyx.com".to_string(),
            telnyx_api_key: "key".to_string(),
            telnyx_connection_id: "conn".to_string(),
            telnyx_phone_number: "+15550001111".to_string(),
            stripe_api_url: "https://api.stripe.com".to_string(),
            stripe_secret_key: "sk_test".to_string(),
            provider_timeout_ms: 10_000,
        };

        assert_eq!(
            config.webhook_url(),
            "https://calls.example.com/api/v1/calls/webhook"
        );
    }
}
