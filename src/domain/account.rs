use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{

    Cents, MAX_BALANCE, ValidationError, check_new_password, parse_email, parse_holder_name,

};

pub type AccountId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Savings,
    Current,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "Savings",
            AccountType::Current => "Current",
        }
    }

    /// Exact, case-sensitive match on the wire names.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Savings" => Some(AccountType::Savings),
            "Current" => Some(AccountType::Current),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer account. The password is only ever held as a bcrypt hash.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub account_number: String,
    pub holder_name: String,
    pub email: String,
    pub password_hash: String,
    pub account_type: AccountType,
    pub balance: Cents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        account_number: String,
        holder_name: String,
        email: String,
        password_hash: String,
        account_type: AccountType,
        balance: Cents,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_number,
            holder_name,
            email,
            password_hash,
            account_type,
            balance,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            holder_name: self.holder_name.clone(),
            email: self.email.clone(),
            account_type: self.account_type,
            account_number: self.account_number.clone(),
            balance: self.balance,
        }
    }
}

/// Public view of an account; carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    pub holder_name: String,
    pub email: String,
    pub account_type: AccountType,
    pub account_number: String,
    pub balance: Cents,
}

/// A validated signup request.
#[derive(Clone)]
pub struct NewAccount {
    pub holder_name: String,
    pub email: String,
    pub password: String,
    pub account_type: AccountType,
    pub opening_balance: Cents,
}

impl NewAccount {
    pub fn new(
        holder_name: &str,
        email: &str,
        password: &str,
        account_type: AccountType,
        opening_balance: Cents,
    ) -> Result<Self, ValidationError> {
        let holder_name = parse_holder_name(holder_name)?;
        let email = parse_email(email)?;
        check_new_password(password)?;
        if !(0..=MAX_BALANCE).contains(&opening_balance) {
            return Err(ValidationError::InvalidBalance);
        }

        Ok(Self {
            holder_name,
            email,
            password: password.to_string(),
            account_type,
            opening_balance,
        })
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("holder_name", &self.holder_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("account_type", &self.account_type)
            .field("opening_balance", &self.opening_balance)
            .finish()
    }
}

/// A validated login request.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Result<Self, ValidationError> {
        let email = parse_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        Ok(Self {
            email,
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
