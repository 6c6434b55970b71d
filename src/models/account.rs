// src/models/account.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Public,
    Registered,
}

impl AccountKind {
    pub fn as_str(&self) -> &str {
        match self {
            AccountKind::Public => "public",
            AccountKind::Registered => "registered",
        }
    }
}

impl Account {
    pub fn new(email: String, kind: AccountKind, balance: Decimal) -> Self {
        Self {
            email,
            kind,
            balance,
            stripe_customer_id: None,
            created_at: Utc::now(),
        }
    }

    /// Admission gate for new calls: a strictly positive balance. No funds
    /// are reserved; a call may run past zero and settle at termination.
    pub fn has_sufficient_balance(&self) -> bool {
        self.balance > Decimal::ZERO
    }
}
