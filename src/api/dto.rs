//! Request and response bodies.
//!
//! Field names are camelCase on the wire. Monetary values travel as plain
//! JSON numbers in currency units: whole amounts as integers (`700`), others
//! as decimals (`12.5`).

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::domain::{

    AccountProfile, AccountType, Cents, Credentials, NewAccount, Transaction, ValidationError,

    cents_from_units, check_new_password, parse_email, parse_holder_name, units_from_cents,

};

/// Serialize cents as a JSON number of currency units.
pub fn serialize_units<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
    if cents % 100 == 0 {
        serializer.serialize_i64(cents / 100)
    } else {
        serializer.serialize_f64(units_from_cents(*cents))
    }
}

/// Read a JSON number as cents. Strings, booleans and nulls are not numbers.
fn number_to_cents(value: &Value) -> Option<Cents> {
    value.as_f64().and_then(cents_from_units)
}

// ========================
// Requests
// ========================

/// Body of `POST /api/signup`. Fields are optional here so missing ones are
/// reported with the same messages as empty ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub account_holder_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub account_type: Option<String>,
    pub balance: Option<Value>,
}

impl SignupRequest {
    /// Fields are checked in form order: name, email, password, account
    /// type, balance. The first failure is reported.
    pub fn validate(self) -> Result<NewAccount, ValidationError> {
        let holder_name = parse_holder_name(self.account_holder_name.as_deref().unwrap_or_default())?;
        let email = parse_email(self.email.as_deref().unwrap_or_default())?;
        let password = self.password.unwrap_or_default();
        check_new_password(&password)?;

        let account_type = self
            .account_type
            .as_deref()
            .and_then(AccountType::from_str)
            .ok_or(ValidationError::InvalidAccountType)?;

        let opening_balance = match &self.balance {
            None | Some(Value::Null) => 0,
            Some(value) => number_to_cents(value)
                .filter(|cents| *cents >= 0)
                .ok_or(ValidationError::InvalidBalance)?,
        };

        NewAccount::new(&holder_name, &email, &password, account_type, opening_balance)
    }
}

/// Body of `POST /api/login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(self) -> Result<Credentials, ValidationError> {
        Credentials::new(
            self.email.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        )
    }
}

/// Body of `POST /api/deposit` and `POST /api/withdraw`.
#[derive(Debug, Default, Deserialize)]
pub struct AmountRequest {
    pub amount: Option<Value>,
}

impl AmountRequest {
    /// The amount in cents. Must be a number that is positive once rounded
    /// to the cent; fractional amounts are accepted.
    pub fn cents(&self) -> Result<Cents, ValidationError> {
        self.amount
            .as_ref()
            .and_then(number_to_cents)
            .filter(|cents| *cents > 0)
            .ok_or(ValidationError::InvalidAmount)
    }
}

// ========================
// Responses
// ========================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub account_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    #[serde(serialize_with = "serialize_units")]
    pub balance: Cents,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoResponse {
    pub account_holder_name: String,
    pub email: String,
    pub account_type: AccountType,
    pub account_number: String,
    #[serde(serialize_with = "serialize_units")]
    pub balance: Cents,
}

impl From<AccountProfile> for AccountInfoResponse {
    fn from(profile: AccountProfile) -> Self {
        Self {
            account_holder_name: profile.holder_name,
            email: profile.email,
            account_type: profile.account_type,
            account_number: profile.account_number,
            balance: profile.balance,
        }
    }
}

/// Response to a deposit or withdrawal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResponse {
    pub message: String,
    #[serde(serialize_with = "serialize_units")]
    pub new_balance: Cents,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(serialize_with = "serialize_units")]
    pub amount: Cents,
    pub timestamp: String,
}

impl From<&Transaction> for TransactionResponse {
    fn from(transaction: &Transaction) -> Self {
        Self {
            kind: transaction.kind.as_str().to_string(),
            amount: transaction.amount_cents,
            timestamp: transaction
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
