use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

use crate::config::AppConfig;
use crate::domain::{
    Account, AccountId, AccountProfile, Cents, Credentials, DailyLimits, NewAccount, Transaction,
    ValidationError, calendar_day, check_withdrawal, generate_account_number,
};
use crate::storage::{CreditOutcome, DebitOutcome, InsertOutcome, Repository, database_url};

use super::{AppError, DEFAULT_PASSWORD_COST, TokenIssuer, hash_password, verify_password};

/// How many fresh account numbers signup tries before giving up.
pub const MAX_ACCOUNT_NUMBER_ATTEMPTS: usize = 16;

type AccountNumberSource = Box<dyn Fn() -> String + Send + Sync>;

/// Application service for the bank: signup, login and the ledger
/// operations. This is the interface the HTTP API and the CLI both use.
pub struct BankService {
    repo: Repository,
    tokens: TokenIssuer,
    limits: DailyLimits,
    password_cost: u32,
    account_numbers: AccountNumberSource,
}

/// Result of a deposit or withdrawal
#[derive(Debug, Clone)]
pub struct MovementResult {
    pub transaction: Transaction,
    pub new_balance: Cents,
}

impl BankService {
    /// Create a new service over the given repository.
    pub fn new(repo: Repository, tokens: TokenIssuer, limits: DailyLimits) -> Self {
        Self {
            repo,
            tokens,
            limits,
            password_cost: DEFAULT_PASSWORD_COST,
            account_numbers: Box::new(generate_account_number),
        }
    }

    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Replace the account number generator.
    pub fn with_account_numbers<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.account_numbers = Box::new(generator);
        self
    }

    /// Open (creating if needed) the database at the given path and run migrations.
    pub async fn init(
        database_path: &str,
        tokens: TokenIssuer,
        limits: DailyLimits,
    ) -> Result<Self, AppError> {
        let repo = Repository::init(&database_url(database_path)).await?;
        Ok(Self::new(repo, tokens, limits))
    }

    /// Build the service described by the configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.require_jwt_secret().map_err(anyhow::Error::from)?;
        let tokens = TokenIssuer::new(secret, Duration::hours(config.token_ttl_hours));
        let service = Self::init(&config.database_path, tokens, config.limits).await?;
        Ok(service.with_password_cost(config.bcrypt_cost))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn limits(&self) -> DailyLimits {
        self.limits
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    // ========================
    // Signup / login
    // ========================

    /// Open a new account and return it.
    pub async fn signup(&self, new_account: NewAccount) -> Result<Account, AppError> {
        if self
            .repo
            .get_account_by_email(&new_account.email)
            .await?
            .is_some()
        {
            return Err(AppError::EmailInUse(new_account.email));
        }

        let password_hash = hash_password(new_account.password.clone(), self.password_cost).await?;

        for attempt in 1..=MAX_ACCOUNT_NUMBER_ATTEMPTS {
            let account_number = (self.account_numbers)();
            if self.repo.account_number_exists(&account_number).await? {
                tracing::debug!(attempt, "account number collision, retrying");
                continue;
            }

            let account = Account::new(
                account_number,
                new_account.holder_name.clone(),
                new_account.email.clone(),
                password_hash.clone(),
                new_account.account_type,
                new_account.opening_balance,
            );

            match self.repo.save_account(&account).await? {
                InsertOutcome::Inserted => {
                    tracing::info!(
                        account_number = %account.account_number,
                        account_type = %account.account_type,
                        "account opened"
                    );
                    return Ok(account);
                }
                InsertOutcome::DuplicateAccountNumber => {
                    tracing::debug!(attempt, "account number taken at insert, retrying");
                }
                InsertOutcome::DuplicateEmail => {
                    return Err(AppError::EmailInUse(new_account.email));
                }
            }
        }

        Err(AppError::AccountNumberExhausted(MAX_ACCOUNT_NUMBER_ATTEMPTS))
    }

    /// Check credentials and issue an access token.
    pub async fn login(&self, credentials: Credentials) -> Result<String, AppError> {
        let Some(account) = self.repo.get_account_by_email(&credentials.email).await? else {
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(credentials.password, account.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.tokens.issue(account.id)
    }

    // ========================
    // Queries
    // ========================

    /// Get an account by its storage ID.
    pub async fn get_account(&self, account_id: AccountId) -> Result<Account, AppError> {
        self.repo
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))
    }

    /// Get an account by its public account number.
    pub async fn get_account_by_number(&self, account_number: &str) -> Result<Account, AppError> {
        self.repo
            .get_account_by_number(account_number)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_number.to_string()))
    }

    pub async fn balance(&self, account_id: AccountId) -> Result<Cents, AppError> {
        Ok(self.get_account(account_id).await?.balance)
    }

    pub async fn account_info(&self, account_id: AccountId) -> Result<AccountProfile, AppError> {
        Ok(self.get_account(account_id).await?.profile())
    }

    /// All transactions of an account, oldest first. An unknown account simply has none.
    pub async fn transactions(&self, account_id: AccountId) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions(account_id).await?)
    }

    /// Total withdrawn by an account on a given calendar day.
    pub async fn withdrawn_on(&self, account_id: AccountId, day: NaiveDate) -> Result<Cents, AppError> {
        Ok(self
            .repo
            .get_withdrawal_record(account_id, day)
            .await?
            .map(|record| record.total_withdrawn)
            .unwrap_or(0))
    }

    // ========================
    // Movements
    // ========================

    pub async fn deposit(&self, account_id: AccountId, amount: Cents) -> Result<MovementResult, AppError> {
        self.deposit_at(account_id, amount, Utc::now()).await
    }

    /// Credit an account and record the deposit at the given time.
    pub async fn deposit_at(
        &self,
        account_id: AccountId,
        amount: Cents,
        at: DateTime<Utc>,
    ) -> Result<MovementResult, AppError> {
        ensure_positive(amount)?;

        let transaction = Transaction::deposit(account_id, amount, at);
        match self.repo.credit(&transaction).await? {
            CreditOutcome::Applied {
                balance: new_balance,
            } => {
                tracing::info!(%account_id, amount, new_balance, "deposit recorded");
                Ok(MovementResult {
                    transaction,
                    new_balance,
                })
            }
            CreditOutcome::AccountMissing => Err(AppError::AccountNotFound(account_id.to_string())),
            CreditOutcome::CeilingReached { balance } => {
                tracing::info!(%account_id, amount, balance, "deposit refused at balance ceiling");
                Err(AppError::BalanceCeilingExceeded {
                    balance,
                    requested: amount,
                })
            }
        }
    }

    pub async fn withdraw(&self, account_id: AccountId, amount: Cents) -> Result<MovementResult, AppError> {
        self.withdraw_at(account_id, amount, Local::now()).await
    }

    /// Debit an account at the given local time, enforcing the balance and
    /// the daily limit of the account's type for that calendar day.
    pub async fn withdraw_at(
        &self,
        account_id: AccountId,
        amount: Cents,
        at: DateTime<Local>,
    ) -> Result<MovementResult, AppError> {
        ensure_positive(amount)?;

        let account = self.get_account(account_id).await?;
        let day = calendar_day(&at);
        let limit = self.limits.limit_for(account.account_type);
        let record = self.repo.get_withdrawal_record(account.id, day).await?;
        let withdrawn_today = record.as_ref().map_or(0, |record| record.total_withdrawn);

        if let Err(denial) = check_withdrawal(account.balance, withdrawn_today, amount, limit) {
            let remaining_today = record.map_or(limit, |record| record.remaining(limit));
            tracing::info!(%account_id, amount, remaining_today, ?denial, "withdrawal refused");
            return Err(denial.into());
        }

        let transaction = Transaction::withdrawal(account.id, amount, at.with_timezone(&Utc));

        // The repository re-checks both conditions atomically; a concurrent
        // request may have moved the numbers since they were read above.
        match self.repo.debit(&transaction, day, limit).await? {
            DebitOutcome::Applied {
                balance,
                withdrawn_today,
            } => {
                tracing::info!(
                    %account_id,
                    amount,
                    new_balance = balance,
                    withdrawn_today,
                    "withdrawal recorded"
                );
                Ok(MovementResult {
                    transaction,
                    new_balance: balance,
                })
            }
            DebitOutcome::AccountMissing => Err(AppError::AccountNotFound(account_id.to_string())),
            DebitOutcome::InsufficientBalance { balance } => Err(AppError::InsufficientBalance {
                balance,
                required: amount,
            }),
            DebitOutcome::LimitReached { withdrawn_today } => Err(AppError::DailyLimitExceeded {
                limit,
                withdrawn_today,
                requested: amount,
            }),
        }
    }
}

fn ensure_positive(amount: Cents) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(ValidationError::InvalidAmount.into());
    }
    Ok(())
}
