use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::{Account, AccountType, Cents, Transaction, TransactionKind, format_cents};
use crate::storage::Repository;

/// One line of an account statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount_cents: Cents,
    pub balance_after_cents: Cents,
}

/// Full statement for one account, as written by the JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub account_number: String,
    pub holder_name: String,
    pub account_type: AccountType,
    pub balance_cents: Cents,
    pub lines: Vec<StatementLine>,
}

/// Exporter for an account's transaction history
pub struct StatementExporter<'a> {
    repo: &'a Repository,
}

impl<'a> StatementExporter<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Build the statement for the account with the given number.
    pub async fn statement(&self, account_number: &str) -> Result<Statement> {
        let (account, transactions) = self
            .repo
            .get_account_history(account_number)
            .await?
            .with_context(|| format!("Account not found: {}", account_number))?;

        Ok(build_statement(&account, &transactions))
    }

    /// Export the history as CSV. Returns the number of rows written.
    pub async fn export_csv<W: Write>(&self, account_number: &str, writer: W) -> Result<usize> {
        let statement = self.statement(account_number).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["timestamp", "type", "amount", "balance_after"])?;

        for line in &statement.lines {
            csv_writer.write_record([
                line.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                line.kind.as_str().to_string(),
                format_cents(line.amount_cents),
                format_cents(line.balance_after_cents),
            ])?;
        }

        csv_writer.flush()?;
        Ok(statement.lines.len())
    }

    /// Export the statement as pretty-printed JSON
    pub async fn export_json<W: Write>(&self, account_number: &str, mut writer: W) -> Result<Statement> {
        let statement = self.statement(account_number).await?;

        let json = serde_json::to_string_pretty(&statement)?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(statement)
    }
}

/// Pair each transaction with the balance it left behind.
///
/// The opening balance given at signup is not a transaction, so running
/// balances are walked backwards from the current one.
pub fn build_statement(account: &Account, transactions: &[Transaction]) -> Statement {
    let mut balance = account.balance;
    let mut lines: Vec<StatementLine> = transactions
        .iter()
        .rev()
        .map(|transaction| {
            let line = StatementLine {
                timestamp: transaction.timestamp,
                kind: transaction.kind,
                amount_cents: transaction.amount_cents,
                balance_after_cents: balance,
            };
            balance -= match transaction.kind {
                TransactionKind::Deposit => transaction.amount_cents,
                TransactionKind::Withdraw => -transaction.amount_cents,
            };
            line
        })
        .collect();
    lines.reverse();

    Statement {
        version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: Utc::now(),
        account_number: account.account_number.clone(),
        holder_name: account.holder_name.clone(),
        account_type: account.account_type,
        balance_cents: account.balance,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn test_running_balances_walk_back_from_current() {
        let mut account = Account::new(
            "0123456789".into(),
            "Ada".into(),
            "ada@example.com".into(),
            "hash".into(),
            AccountType::Savings,
            50_000,
        );
        // 500.00 opening, +200.00, -100.00
        account.balance = 60_000;

        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let transactions = vec![
            Transaction::deposit(account.id, 20_000, t0),
            Transaction::withdrawal(account.id, 10_000, t0 + Duration::minutes(5)),
        ];

        let statement = build_statement(&account, &transactions);

        let balances: Vec<Cents> = statement
            .lines
            .iter()
            .map(|line| line.balance_after_cents)
            .collect();
        assert_eq!(balances, vec![70_000, 60_000]);
        assert_eq!(statement.lines[0].kind, TransactionKind::Deposit);
    }

    #[test]
    fn test_empty_history() {
        let account = Account::new(
            "0123456789".into(),
            "Ada".into(),
            "ada@example.com".into(),
            "hash".into(),
            AccountType::Current,
            0,
        );
        let statement = build_statement(&account, &[]);
        assert!(statement.lines.is_empty());
        assert_eq!(statement.balance_cents, 0);
    }
}
