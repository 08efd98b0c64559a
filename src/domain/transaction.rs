use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Cents};

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdraw => "Withdraw",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Deposit" => Some(TransactionKind::Deposit),
            "Withdraw" => Some(TransactionKind::Withdraw),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single balance movement. Transactions are immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub kind: TransactionKind,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_id: AccountId,
        kind: TransactionKind,
        amount_cents: Cents,
        timestamp: DateTime<Utc>,
    ) -> Self {
        assert!(amount_cents > 0, "Transaction amount must be positive");
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind,
            amount_cents,
            timestamp,
        }
    }

    pub fn deposit(account_id: AccountId, amount_cents: Cents, timestamp: DateTime<Utc>) -> Self {
        Self::new(account_id, TransactionKind::Deposit, amount_cents, timestamp)
    }

    pub fn withdrawal(
        account_id: AccountId,
        amount_cents: Cents,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(account_id, TransactionKind::Withdraw, amount_cents, timestamp)
    }
}
