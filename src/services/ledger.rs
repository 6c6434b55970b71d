// src/services/ledger.rs
use crate::error::BillingError;
use crate::models::{Account, AccountKind};
use crate::store::AccountStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// How call initiation maps an identity to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountResolution {
    /// Find or create on the fly with the configured default balance.
    Public,
    /// The account must already exist (pre-registered user).
    Registered,
}

/// Sole mutator of account balances.
///
/// Debits and credits take non-negative amounts; insufficiency is the
/// admission check's concern, not the debit's, because settlement happens
/// after the call already occurred.
pub struct AccountLedger {
    accounts: Arc<dyn AccountStore>,
    default_balance: Decimal,
}

impl AccountLedger {
    pub fn new(accounts: Arc<dyn AccountStore>, default_balance: Decimal) -> Self {
        Self {
            accounts,
            default_balance,
        }
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Find or create a public account. Idempotent by email.
    pub async fn ensure_account(&self, email: &str) -> Result<Account, BillingError> {
        let email = Self::normalize(email);
        if email.is_empty() {
            return Err(BillingError::Validation("email is required".to_string()));
        }

        if let Some(account) = self.accounts.get(&email).await? {
            return Ok(account);
        }

        let account = Account::new(email.clone(), AccountKind::Public, self.default_balance);
        info!(
            "Created account {} with starting balance ${}",
            email, self.default_balance
        );
        self.accounts.upsert(account).await
    }

    /// Provision a registered account. Starts at zero; funds arrive through
    /// top-ups.
    pub async fn register_account(&self, email: &str) -> Result<Account, BillingError> {
        let email = Self::normalize(email);
        if email.is_empty() {
            return Err(BillingError::Validation("email is required".to_string()));
        }

        if self.accounts.get(&email).await?.is_some() {
            return Err(BillingError::Validation(format!(
                "account already exists: {}",
                email
            )));
        }

        let account = Account::new(email.clone(), AccountKind::Registered, Decimal::ZERO);
        info!("Registered account {}", email);
        self.accounts.upsert(account).await
    }

    pub async fn get_account(&self, email: &str) -> Result<Account, BillingError> {
        let email = Self::normalize(email);
        self.accounts
            .get(&email)
            .await?
            .ok_or(BillingError::AccountNotFound(email))
    }

    pub async fn resolve(
        &self,
        email: &str,
        resolution: AccountResolution,
    ) -> Result<Account, BillingError> {
        match resolution {
            AccountResolution::Public => self.ensure_account(email).await,
            AccountResolution::Registered => self.get_account(email).await,
        }
    }

    /// Reduce the balance by `amount`. No floor is enforced here.
    pub async fn debit(&self, email: &str, amount: Decimal) -> Result<Decimal, BillingError> {
        if amount < Decimal::ZERO {
            return Err(BillingError::Validation(
                "debit amount must be non-negative".to_string(),
            ));
        }

        let email = Self::normalize(email);
        let balance = self.accounts.update_balance(&email, -amount).await?;
        info!("Debited ${} from {}, balance now ${}", amount, email, balance);
        if balance < Decimal::ZERO {
            warn!("Account {} balance is negative: ${}", email, balance);
        }
        Ok(balance)
    }

    /// Increase the balance by `amount`. Used for refunds and top-ups.
    pub async fn credit(&self, email: &str, amount: Decimal) -> Result<Decimal, BillingError> {
        if amount < Decimal::ZERO {
            return Err(BillingError::Validation(
                "credit amount must be non-negative".to_string(),
            ));
        }

        let email = Self::normalize(email);
        let balance = self.accounts.update_balance(&email, amount).await?;
        info!("Credited ${} to {}, balance now ${}", amount, email, balance);
        Ok(balance)
    }

    pub async fn balance(&self, email: &str) -> Result<Decimal, BillingError> {
        Ok(self.get_account(email).await?.balance)
    }

    /// Record the lazily created payment-provider customer id.
    pub async fn attach_customer(
        &self,
        email: &str,
        customer_id: &str,
    ) -> Result<Account, BillingError> {
        let mut account = self.get_account(email).await?;
        account.stripe_customer_id = Some(customer_id.to_string());
        self.accounts.upsert(account).await
    }
}
