// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use minibank::application::{BankService, TokenIssuer};
use minibank::domain::{Account, AccountType, Cents, DailyLimits, NewAccount};
use tempfile::TempDir;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "secret123";

/// Lowest bcrypt cost, keeps hashing fast in tests
pub const TEST_PASSWORD_COST: u32 = 4;

pub fn test_limits() -> DailyLimits {
    DailyLimits::new(100_000, 500_000)
}

pub fn test_tokens() -> TokenIssuer {
    TokenIssuer::new(TEST_SECRET, Duration::hours(1))
}

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BankService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BankService::init(db_path.to_str().unwrap(), test_tokens(), test_limits())
        .await?
        .with_password_cost(TEST_PASSWORD_COST);
    Ok((service, temp_dir))
}

/// Open an account for `email` with the given opening balance in cents.
pub async fn open_account(
    service: &BankService,
    email: &str,
    account_type: AccountType,
    balance: Cents,
) -> Result<Account> {
    let new_account = NewAccount::new("Test Holder", email, TEST_PASSWORD, account_type, balance)?;
    Ok(service.signup(new_account).await?)
}

/// Helper to build a local time on a given day
pub fn local_time(date_str: &str, hour: u32, minute: u32, second: u32) -> DateTime<Local> {
    let naive = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap();
    Local.from_local_datetime(&naive).earliest().unwrap()
}
