// src/store/memory.rs
use crate::error::BillingError;
use crate::models::{Account, Call};
use crate::store::{AccountStore, CallStore};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// In-process store backing both account and call records.
///
/// Balance deltas are applied under the map's write lock, and per-call
/// transition locks are handed out from a lazily grown registry, so the
/// atomicity the engine relies on holds without an external database.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<String, Account>>,
    calls: RwLock<HashMap<String, Call>>,
    call_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get(&self, email: &str) -> Result<Option<Account>, BillingError> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn upsert(&self, account: Account) -> Result<Account, BillingError> {
        self.accounts
            .write()
            .await
            .insert(account.email.clone(), account.clone());
        Ok(account)
    }

    async fn update_balance(
        &self,
        email: &str,
        delta: Decimal,
    ) -> Result<Decimal, BillingError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(email)
            .ok_or_else(|| BillingError::AccountNotFound(email.to_string()))?;
        account.balance += delta;
        Ok(account.balance)
    }
}

#[async_trait]
impl CallStore for MemoryStore {
    async fn get(&self, call_control_id: &str) -> Result<Option<Call>, BillingError> {
        Ok(self.calls.read().await.get(call_control_id).cloned())
    }

    async fn upsert(&self, call: Call) -> Result<Call, BillingError> {
        self.calls
            .write()
            .await
            .insert(call.call_control_id.clone(), call.clone());
        Ok(call)
    }

    async fn lock(&self, call_control_id: &str) -> OwnedMutexGuard<()> {
        let cell = {
            let mut locks = self.call_locks.lock().await;
            locks
                .entry(call_control_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        cell.lock_owned().await
    }
}
