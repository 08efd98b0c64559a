//! Runtime configuration, read from environment variables.
//!
//! `dotenvy` loads an optional `.env` file first (see the CLI entry point),
//! so every variable below may also live there.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_PATH` | `minibank.db` |
//! | `APP_HOST` | `0.0.0.0` |
//! | `PORT` | `5000` |
//! | `JWT_SECRET` | none, required to serve |
//! | `TOKEN_TTL_HOURS` | `24` |
//! | `BCRYPT_COST` | `10` |
//! | `DAILY_LIMIT_SAVINGS` | `1000` |
//! | `DAILY_LIMIT_CURRENT` | `5000` |

use std::env;

use thiserror::Error;

use crate::application::DEFAULT_PASSWORD_COST;
use crate::domain::{DailyLimits, format_cents, parse_cents};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub limits: DailyLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "minibank.db".to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
            jwt_secret: None,
            token_ttl_hours: 24,
            bcrypt_cost: DEFAULT_PASSWORD_COST,
            limits: DailyLimits::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token_ttl_hours = match get("TOKEN_TTL_HOURS") {
            Some(raw) => parse_number::<i64>("TOKEN_TTL_HOURS", &raw)?,
            None => defaults.token_ttl_hours,
        };
        if token_ttl_hours <= 0 {
            return Err(invalid("TOKEN_TTL_HOURS", "must be at least 1"));
        }

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(raw) => parse_number::<u32>("BCRYPT_COST", &raw)?,
            None => defaults.bcrypt_cost,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(invalid("BCRYPT_COST", "must be between 4 and 31"));
        }

        let savings = match get("DAILY_LIMIT_SAVINGS") {
            Some(raw) => parse_limit("DAILY_LIMIT_SAVINGS", &raw)?,
            None => defaults.limits.savings,
        };
        let current = match get("DAILY_LIMIT_CURRENT") {
            Some(raw) => parse_limit("DAILY_LIMIT_CURRENT", &raw)?,
            None => defaults.limits.current,
        };

        Ok(Self {
            database_path: get("DATABASE_PATH").unwrap_or(defaults.database_path),
            host: get("APP_HOST").unwrap_or(defaults.host),
            port: match get("PORT") {
                Some(raw) => parse_number::<u16>("PORT", &raw)?,
                None => defaults.port,
            },
            jwt_secret: get("JWT_SECRET"),
            token_ttl_hours,
            bcrypt_cost,
            limits: DailyLimits::new(savings, current),
        })
    }

    /// The signing secret, which only the server needs.
    pub fn require_jwt_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// One-line summary for startup logs. Never includes the secret.
    pub fn summary(&self) -> String {
        format!(
            "database={} bind={} token_ttl={}h limits(savings={}, current={})",
            self.database_path,
            self.bind_address(),
            self.token_ttl_hours,
            format_cents(self.limits.savings),
            format_cents(self.limits.current),
        )
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(key, format!("'{}' is not a valid number", raw)))
}

fn parse_limit(key: &str, raw: &str) -> Result<i64, ConfigError> {
    let cents = parse_cents(raw).map_err(|e| invalid(key, e.to_string()))?;
    if cents <= 0 {
        return Err(invalid(key, "must be positive"));
    }
    Ok(cents)
}
