// src/store/mod.rs
pub mod memory;

pub use memory::MemoryStore;

use crate::error::BillingError;
use crate::models::{Account, Call};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::OwnedMutexGuard;

/// Account persistence, keyed by email.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, email: &str) -> Result<Option<Account>, BillingError>;

    async fn upsert(&self, account: Account) -> Result<Account, BillingError>;

    /// Apply a signed balance delta atomically and return the new balance.
    async fn update_balance(&self, email: &str, delta: Decimal)
        -> Result<Decimal, BillingError>;
}

/// Call record persistence, keyed by the provider call-control id.
#[async_trait]
pub trait CallStore: Send + Sync {
    async fn get(&self, call_control_id: &str) -> Result<Option<Call>, BillingError>;

    async fn upsert(&self, call: Call) -> Result<Call, BillingError>;

    /// Serialize transitions per call id. Holders must release the guard
    /// before any provider round-trip; transitions on distinct calls do not
    /// contend.
    async fn lock(&self, call_control_id: &str) -> OwnedMutexGuard<()>;
}
