use thiserror::Error;

use crate::domain::{Cents, ValidationError, WithdrawalDenial};

use super::AuthError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Login failed. Deliberately the same for unknown emails and wrong
    /// passwords.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error("Account not found")]
    AccountNotFound(String),

    #[error("Email already in use")]
    EmailInUse(String),

    #[error("Insufficient balance")]
    InsufficientBalance { balance: Cents, required: Cents },

    #[error("Daily withdrawal limit exceeded")]
    DailyLimitExceeded {
        limit: Cents,
        withdrawn_today: Cents,
        requested: Cents,
    },

    /// The deposit would take the balance past `MAX_BALANCE`.
    #[error("Deposit would exceed the maximum balance")]
    BalanceCeilingExceeded { balance: Cents, requested: Cents },

    #[error("No free account number after {0} attempts")]
    AccountNumberExhausted(usize),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<WithdrawalDenial> for AppError {
    fn from(denial: WithdrawalDenial) -> Self {
        match denial {
            WithdrawalDenial::InsufficientBalance { balance, requested } => {
                AppError::InsufficientBalance {
                    balance,
                    required: requested,
                }
            }
            WithdrawalDenial::LimitExceeded {
                limit,
                withdrawn_today,
                requested,
            } => AppError::DailyLimitExceeded {
                limit,
                withdrawn_today,
                requested,
            },
        }
    }
}
