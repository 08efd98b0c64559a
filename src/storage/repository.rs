use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{

    Account, AccountId, AccountType, Cents, MAX_BALANCE, Transaction, TransactionKind,

    WithdrawalRecord,

};

use super::MIGRATION_001_INITIAL;

const DAY_FORMAT: &str = "%Y-%m-%d";

const SELECT_ACCOUNT_BY_NUMBER: &str = r#"
    SELECT id, account_number, holder_name, email, password_hash, account_type, balance_cents, created_at, updated_at
    FROM accounts
    WHERE account_number = ?
"#;

const SELECT_TRANSACTIONS_BY_ACCOUNT: &str = r#"
    SELECT id, account_id, kind, amount_cents, timestamp
    FROM transactions
    WHERE account_id = ?
    ORDER BY rowid
"#;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of inserting a new account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateEmail,
    DuplicateAccountNumber,
}

/// Result of an attempted credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    Applied { balance: Cents },
    AccountMissing,
    /// Nothing was written: the balance would pass `MAX_BALANCE`.
    CeilingReached { balance: Cents },
}

/// Result of an attempted debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Balance debited, counter incremented and transaction recorded.
    Applied {
        balance: Cents,
        withdrawn_today: Cents,
    },
    AccountMissing,
    /// Nothing was written.
    InsufficientBalance { balance: Cents },
    /// Nothing was written.
    LimitReached { withdrawn_today: Cents },
}

/// Repository for persisting and querying accounts, transactions and
/// daily withdrawal counters.
///
/// Every balance change runs inside one SQL transaction together with its
/// transaction record. Writers are additionally serialized in-process,
/// SQLite being a single-writer database.
pub struct Repository {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Connect to a SQLite database at the given URL.
    /// `sqlite:path?mode=rwc` creates the file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a new account. Uniqueness of email and account number is
    /// enforced by the schema and reported as an outcome, not an error.
    pub async fn save_account(&self, account: &Account) -> Result<InsertOutcome> {
        let _guard = self.write_lock.lock().await;

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (id, account_number, holder_name, email, password_hash, account_type, balance_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(&account.account_number)
        .bind(&account.holder_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.account_type.as_str())
        .bind(account.balance)
        .bind(account.created_at.to_rfc3339())
        .bind(account.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                if db_err.message().contains("accounts.email") {
                    Ok(InsertOutcome::DuplicateEmail)
                } else if db_err.message().contains("accounts.account_number") {
                    Ok(InsertOutcome::DuplicateAccountNumber)
                } else {
                    Err(sqlx::Error::Database(db_err)).context("Failed to save account")
                }
            }
            Err(err) => Err(err).context("Failed to save account"),
        }
    }

    /// Get an account by its storage ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, account_number, holder_name, email, password_hash, account_type, balance_cents, created_at, updated_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// Get an account by (normalized) email.
    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, account_number, holder_name, email, password_hash, account_type, balance_cents, created_at, updated_at
            FROM accounts
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by email")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// Get an account by its public account number.
    pub async fn get_account_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        let row = sqlx::query(SELECT_ACCOUNT_BY_NUMBER)
            .bind(account_number)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch account by number")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// Check whether an account number is already taken.
    pub async fn account_number_exists(&self, account_number: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM accounts WHERE account_number = ?")
            .bind(account_number)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check account number")?;

        Ok(row.try_get::<i64, _>("count")? > 0)
    }

    /// Count all accounts.
    pub async fn count_accounts(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM accounts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count accounts")?;
        Ok(row.try_get("count")?)
    }

    fn row_to_account(row: &SqliteRow) -> Result<Account> {
        let id_str: String = row.try_get("id")?;
        let account_type_str: String = row.try_get("account_type")?;
        let created_at_str: String = row.try_get("created_at")?;
        let updated_at_str: String = row.try_get("updated_at")?;

        Ok(Account {
            id: Uuid::parse_str(&id_str).context("Invalid account ID")?,
            account_number: row.try_get("account_number")?,
            holder_name: row.try_get("holder_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            account_type: AccountType::from_str(&account_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid account type: {}", account_type_str))?,
            balance: row.try_get("balance_cents")?,
            created_at: parse_timestamp(&created_at_str).context("Invalid created_at")?,
            updated_at: parse_timestamp(&updated_at_str).context("Invalid updated_at")?,
        })
    }

    // ========================
    // Balance movements
    // ========================

    /// Credit an account and record the deposit in one unit.
    ///
    /// The balance is only raised while it stays within `MAX_BALANCE`; the
    /// database evaluates the ceiling, so nothing is written past it.
    pub async fn credit(&self, transaction: &Transaction) -> Result<CreditOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await.context("Failed to begin deposit")?;

        let account_id = transaction.account_id.to_string();
        let credited = sqlx::query(
            r#"
            UPDATE accounts
            SET balance_cents = balance_cents + ?, updated_at = ?
            WHERE id = ? AND balance_cents <= ? - ?
            "#,
        )
        .bind(transaction.amount_cents)
        .bind(transaction.timestamp.to_rfc3339())
        .bind(&account_id)
        .bind(MAX_BALANCE)
        .bind(transaction.amount_cents)
        .execute(&mut *tx)
        .await
        .context("Failed to credit account")?;

        if credited.rows_affected() == 0 {
            let balance = Self::read_balance(&mut tx, &account_id).await?;
            tx.rollback().await.context("Failed to roll back deposit")?;
            return Ok(match balance {
                Some(balance) => CreditOutcome::CeilingReached { balance },
                None => CreditOutcome::AccountMissing,
            });
        }

        Self::insert_transaction(&mut tx, transaction).await?;
        let balance = Self::read_balance(&mut tx, &account_id)
            .await?
            .context("Account vanished during deposit")?;

        tx.commit().await.context("Failed to commit deposit")?;
        Ok(CreditOutcome::Applied { balance })
    }

    /// Debit an account, bump its counter for `day`, and record the
    /// withdrawal, all in one unit.
    ///
    /// Both checks are conditional updates evaluated by the database, so the
    /// balance never goes negative and the counter never passes `limit`, even
    /// if the caller's earlier reads are stale.
    pub async fn debit(
        &self,
        transaction: &Transaction,
        day: NaiveDate,
        limit: Cents,
    ) -> Result<DebitOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await.context("Failed to begin withdrawal")?;

        let account_id = transaction.account_id.to_string();
        let amount = transaction.amount_cents;
        let now = transaction.timestamp.to_rfc3339();
        let day_str = day.format(DAY_FORMAT).to_string();

        let debited = sqlx::query(
            r#"
            UPDATE accounts
            SET balance_cents = balance_cents - ?, updated_at = ?
            WHERE id = ? AND balance_cents >= ?
            "#,
        )
        .bind(amount)
        .bind(&now)
        .bind(&account_id)
        .bind(amount)
        .execute(&mut *tx)
        .await
        .context("Failed to debit account")?;

        if debited.rows_affected() == 0 {
            let balance = Self::read_balance(&mut tx, &account_id).await?;
            tx.rollback().await.context("Failed to roll back withdrawal")?;
            return Ok(match balance {
                Some(balance) => DebitOutcome::InsufficientBalance { balance },
                None => DebitOutcome::AccountMissing,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO withdrawal_records (account_id, day, total_withdrawn_cents, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?)
            ON CONFLICT (account_id, day) DO NOTHING
            "#,
        )
        .bind(&account_id)
        .bind(&day_str)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Failed to create withdrawal record")?;

        let counted = sqlx::query(
            r#"
            UPDATE withdrawal_records
            SET total_withdrawn_cents = total_withdrawn_cents + ?, updated_at = ?
            WHERE account_id = ? AND day = ? AND total_withdrawn_cents + ? <= ?
            "#,
        )
        .bind(amount)
        .bind(&now)
        .bind(&account_id)
        .bind(&day_str)
        .bind(amount)
        .bind(limit)
        .execute(&mut *tx)
        .await
        .context("Failed to update withdrawal record")?;

        if counted.rows_affected() == 0 {
            let withdrawn_today = Self::read_withdrawn(&mut tx, &account_id, &day_str).await?;
            tx.rollback().await.context("Failed to roll back withdrawal")?;
            return Ok(DebitOutcome::LimitReached { withdrawn_today });
        }

        Self::insert_transaction(&mut tx, transaction).await?;
        let balance = Self::read_balance(&mut tx, &account_id)
            .await?
            .context("Account vanished during withdrawal")?;
        let withdrawn_today = Self::read_withdrawn(&mut tx, &account_id, &day_str).await?;

        tx.commit().await.context("Failed to commit withdrawal")?;
        Ok(DebitOutcome::Applied {
            balance,
            withdrawn_today,
        })
    }

    async fn read_balance(conn: &mut SqliteConnection, account_id: &str) -> Result<Option<Cents>> {
        let row = sqlx::query("SELECT balance_cents FROM accounts WHERE id = ?")
            .bind(account_id)
            .fetch_optional(&mut *conn)
            .await
            .context("Failed to read balance")?;
        row.map(|row| row.try_get::<Cents, _>("balance_cents"))
            .transpose()
            .context("Invalid balance")
    }

    async fn read_withdrawn(conn: &mut SqliteConnection, account_id: &str, day: &str) -> Result<Cents> {
        let row = sqlx::query(
            "SELECT total_withdrawn_cents FROM withdrawal_records WHERE account_id = ? AND day = ?",
        )
        .bind(account_id)
        .bind(day)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to read withdrawal total")?;
        Ok(row
            .map(|row| row.try_get::<Cents, _>("total_withdrawn_cents"))
            .transpose()
            .context("Invalid withdrawal total")?
            .unwrap_or(0))
    }

    // ========================
    // Withdrawal records
    // ========================

    /// Get the withdrawal counter of an account for one calendar day.
    pub async fn get_withdrawal_record(
        &self,
        account_id: AccountId,
        day: NaiveDate,
    ) -> Result<Option<WithdrawalRecord>> {
        let row = sqlx::query(
            r#"
            SELECT account_id, day, total_withdrawn_cents, created_at, updated_at
            FROM withdrawal_records
            WHERE account_id = ? AND day = ?
            "#,
        )
        .bind(account_id.to_string())
        .bind(day.format(DAY_FORMAT).to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch withdrawal record")?;

        row.as_ref().map(Self::row_to_withdrawal_record).transpose()
    }

    fn row_to_withdrawal_record(row: &SqliteRow) -> Result<WithdrawalRecord> {
        let account_id_str: String = row.try_get("account_id")?;
        let day_str: String = row.try_get("day")?;
        let created_at_str: String = row.try_get("created_at")?;
        let updated_at_str: String = row.try_get("updated_at")?;

        Ok(WithdrawalRecord {
            account_id: Uuid::parse_str(&account_id_str).context("Invalid account ID")?,
            day: NaiveDate::parse_from_str(&day_str, DAY_FORMAT).context("Invalid day")?,
            total_withdrawn: row.try_get("total_withdrawn_cents")?,
            created_at: parse_timestamp(&created_at_str).context("Invalid created_at")?,
            updated_at: parse_timestamp(&updated_at_str).context("Invalid updated_at")?,
        })
    }

    // ========================
    // Transactions
    // ========================

    async fn insert_transaction(conn: &mut SqliteConnection, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, account_id, kind, amount_cents, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(transaction.account_id.to_string())
        .bind(transaction.kind.as_str())
        .bind(transaction.amount_cents)
        .bind(transaction.timestamp.to_rfc3339())
        .execute(&mut *conn)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    /// List an account's transactions in the order they were recorded.
    pub async fn list_transactions(&self, account_id: AccountId) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(SELECT_TRANSACTIONS_BY_ACCOUNT)
            .bind(account_id.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// An account and its whole history, read inside one transaction so the
    /// balance and the transactions agree with each other.
    pub async fn get_account_history(
        &self,
        account_number: &str,
    ) -> Result<Option<(Account, Vec<Transaction>)>> {
        let mut tx = self.pool.begin().await.context("Failed to begin history read")?;

        let row = sqlx::query(SELECT_ACCOUNT_BY_NUMBER)
            .bind(account_number)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to fetch account by number")?;
        let Some(row) = row else {
            tx.rollback().await.context("Failed to end history read")?;
            return Ok(None);
        };
        let account = Self::row_to_account(&row)?;

        let rows = sqlx::query(SELECT_TRANSACTIONS_BY_ACCOUNT)
            .bind(account.id.to_string())
            .fetch_all(&mut *tx)
            .await
            .context("Failed to list transactions")?;
        tx.commit().await.context("Failed to end history read")?;

        let transactions = rows
            .iter()
            .map(Self::row_to_transaction)
            .collect::<Result<Vec<_>>>()?;
        Ok(Some((account, transactions)))
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let id_str: String = row.try_get("id")?;
        let account_id_str: String = row.try_get("account_id")?;
        let kind_str: String = row.try_get("kind")?;
        let timestamp_str: String = row.try_get("timestamp")?;

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            account_id: Uuid::parse_str(&account_id_str).context("Invalid account ID")?,
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            amount_cents: row.try_get("amount_cents")?,
            timestamp: parse_timestamp(&timestamp_str).context("Invalid timestamp")?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}
