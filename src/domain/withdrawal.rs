use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::{AccountId, AccountType, Cents};

/// Maximum amount each account type may withdraw per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyLimits {
    pub savings: Cents,
    pub current: Cents,
}

impl DailyLimits {
    pub fn new(savings: Cents, current: Cents) -> Self {
        Self { savings, current }
    }

    pub fn limit_for(&self, account_type: AccountType) -> Cents {
        match account_type {
            AccountType::Savings => self.savings,
            AccountType::Current => self.current,
        }
    }
}

impl Default for DailyLimits {
    /// 1,000.00 for Savings and 5,000.00 for Current.
    fn default() -> Self {
        Self {
            savings: 100_000,
            current: 500_000,
        }
    }
}

/// Running total of what an account withdrew on one calendar day.
/// Created lazily by the first withdrawal of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRecord {
    pub account_id: AccountId,
    pub day: NaiveDate,
    pub total_withdrawn: Cents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WithdrawalRecord {
    pub fn remaining(&self, limit: Cents) -> Cents {
        (limit - self.total_withdrawn).max(0)
    }
}

/// The calendar day an instant falls on, in the instant's own time zone.
/// Callers pass local time so the counter rolls over at local midnight.
pub fn calendar_day<Tz: TimeZone>(at: &DateTime<Tz>) -> NaiveDate {
    at.date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalDenial {
    InsufficientBalance {
        balance: Cents,
        requested: Cents,
    },
    LimitExceeded {
        limit: Cents,
        withdrawn_today: Cents,
        requested: Cents,
    },
}

/// Decide whether a withdrawal may proceed.
///
/// The balance is checked before the daily limit, so an empty account
/// reports insufficient funds even when the limit would also be hit.
/// Withdrawing exactly up to the limit is allowed.
pub fn check_withdrawal(
    balance: Cents,
    withdrawn_today: Cents,
    requested: Cents,
    limit: Cents,
) -> Result<(), WithdrawalDenial> {
    if requested > balance {
        return Err(WithdrawalDenial::InsufficientBalance { balance, requested });
    }
    if withdrawn_today + requested > limit {
        return Err(WithdrawalDenial::LimitExceeded {
            limit,
            withdrawn_today,
            requested,
        });
    }
    Ok(())
}
