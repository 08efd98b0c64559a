mod common;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use common::{local_time, open_account, test_service};
use minibank::application::AppError;
use minibank::domain::{AccountType, MAX_BALANCE, TransactionKind, ValidationError, calendar_day};
use uuid::Uuid;

#[tokio::test]
async fn test_deposit_credits_and_records() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_account(&service, "ada@example.com", AccountType::Savings, 50_000).await?;

    let result = service.deposit(account.id, 20_000).await?;

    assert_eq!(result.new_balance, 70_000);
    assert_eq!(service.balance(account.id).await?, 70_000);

    let transactions = service.transactions(account.id).await?;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].kind, TransactionKind::Deposit);
    assert_eq!(transactions[0].amount_cents, 20_000);

    Ok(())
}

#[tokio::test]
async fn test_non_positive_amounts_are_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_account(&service, "ada@example.com", AccountType::Current, 10_000).await?;

    for amount in [0, -500] {
        let deposit = service.deposit(account.id, amount).await;
        assert!(matches!(
            deposit,
            Err(AppError::Validation(ValidationError::InvalidAmount))
        ));
        let withdrawal = service.withdraw(account.id, amount).await;
        assert!(matches!(
            withdrawal,
            Err(AppError::Validation(ValidationError::InvalidAmount))
        ));
    }

    assert_eq!(service.balance(account.id).await?, 10_000);
    assert!(service.transactions(account.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_movements_on_unknown_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.deposit(missing, 100).await,
        Err(AppError::AccountNotFound(_))
    ));
    assert!(matches!(
        service.withdraw(missing, 100).await,
        Err(AppError::AccountNotFound(_))
    ));
    assert!(matches!(
        service.balance(missing).await,
        Err(AppError::AccountNotFound(_))
    ));
    assert!(service.transactions(missing).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_deposit_up_to_balance_ceiling() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account =
        open_account(&service, "ada@example.com", AccountType::Current, MAX_BALANCE - 100).await?;

    let result = service.deposit(account.id, 100).await?;
    assert_eq!(result.new_balance, MAX_BALANCE);

    let over = service.deposit(account.id, 1).await;
    assert!(matches!(
        over,
        Err(AppError::BalanceCeilingExceeded {
            balance: MAX_BALANCE,
            requested: 1
        })
    ));

    assert_eq!(service.balance(account.id).await?, MAX_BALANCE);
    assert_eq!(service.transactions(account.id).await?.len(), 1);

    // The account stays fully usable at the ceiling
    let withdrawn = service.withdraw(account.id, 100).await?;
    assert_eq!(withdrawn.new_balance, MAX_BALANCE - 100);

    Ok(())
}

#[tokio::test]
async fn test_repeated_largest_deposits_stop_at_ceiling() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_account(&service, "ada@example.com", AccountType::Savings, 0).await?;

    // The largest single deposit accepted over the API is the ceiling itself
    service.deposit(account.id, MAX_BALANCE).await?;
    for _ in 0..3 {
        let again = service.deposit(account.id, MAX_BALANCE).await;
        assert!(matches!(again, Err(AppError::BalanceCeilingExceeded { .. })));
    }

    let reloaded = service.get_account(account.id).await?;
    assert_eq!(reloaded.balance, MAX_BALANCE);
    assert_eq!(service.transactions(account.id).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_withdraw_more_than_balance_changes_nothing() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_account(&service, "ada@example.com", AccountType::Current, 30_000).await?;

    let result = service.withdraw(account.id, 30_001).await;

    assert!(matches!(
        result,
        Err(AppError::InsufficientBalance {
            balance: 30_000,
            required: 30_001
        })
    ));
    assert_eq!(service.balance(account.id).await?, 30_000);
    assert!(service.transactions(account.id).await?.is_empty());
    assert_eq!(
        service
            .withdrawn_on(account.id, calendar_day(&chrono::Local::now()))
            .await?,
        0
    );

    Ok(())
}

#[tokio::test]
async fn test_daily_limit_boundary() -> Result<()> {
    let (service, _temp) = test_service().await?;
    // Savings limit in tests is 1000.00
    let account = open_account(&service, "ada@example.com", AccountType::Savings, 500_000).await?;
    let morning = local_time("2024-03-10", 9, 0, 0);

    service.withdraw_at(account.id, 60_000, morning).await?;
    let result = service.withdraw_at(account.id, 40_000, morning).await?;
    assert_eq!(result.new_balance, 400_000);
    assert_eq!(service.withdrawn_on(account.id, calendar_day(&morning)).await?, 100_000);

    let over = service.withdraw_at(account.id, 1, morning).await;
    assert!(matches!(
        over,
        Err(AppError::DailyLimitExceeded {
            limit: 100_000,
            withdrawn_today: 100_000,
            requested: 1
        })
    ));
    assert_eq!(service.balance(account.id).await?, 400_000);

    Ok(())
}

#[tokio::test]
async fn test_current_accounts_have_higher_limit() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_account(&service, "ada@example.com", AccountType::Current, 1_000_000).await?;
    let noon = local_time("2024-03-10", 12, 0, 0);

    service.withdraw_at(account.id, 300_000, noon).await?;
    service.withdraw_at(account.id, 200_000, noon).await?;
    let over = service.withdraw_at(account.id, 100, noon).await;

    assert!(matches!(over, Err(AppError::DailyLimitExceeded { limit: 500_000, .. })));
    assert_eq!(service.balance(account.id).await?, 500_000);

    Ok(())
}

#[tokio::test]
async fn test_limit_resets_at_local_midnight() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_account(&service, "ada@example.com", AccountType::Savings, 500_000).await?;

    let late = local_time("2024-03-10", 23, 59, 59);
    service.withdraw_at(account.id, 100_000, late).await?;
    assert!(service.withdraw_at(account.id, 100, late).await.is_err());

    let midnight = local_time("2024-03-11", 0, 0, 0);
    let result = service.withdraw_at(account.id, 100_000, midnight).await?;

    assert_eq!(result.new_balance, 300_000);
    assert_eq!(service.withdrawn_on(account.id, calendar_day(&late)).await?, 100_000);
    assert_eq!(service.withdrawn_on(account.id, calendar_day(&midnight)).await?, 100_000);

    Ok(())
}

#[tokio::test]
async fn test_savings_walkthrough() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_account(&service, "ada@example.com", AccountType::Savings, 50_000).await?;
    let now = local_time("2024-06-01", 10, 0, 0);
    let today = calendar_day(&now);

    let deposit = service
        .deposit_at(account.id, 20_000, now.with_timezone(&Utc))
        .await?;
    assert_eq!(deposit.new_balance, 70_000);

    let too_much = service.withdraw_at(account.id, 80_000, now).await;
    assert!(matches!(too_much, Err(AppError::InsufficientBalance { .. })));
    assert_eq!(service.balance(account.id).await?, 70_000);

    let emptied = service.withdraw_at(account.id, 70_000, now).await?;
    assert_eq!(emptied.new_balance, 0);
    assert_eq!(service.withdrawn_on(account.id, today).await?, 70_000);

    // Still under the limit, so the balance is what stops it
    let one_more = service.withdraw_at(account.id, 100, now).await;
    assert!(matches!(
        one_more,
        Err(AppError::InsufficientBalance {
            balance: 0,
            required: 100
        })
    ));
    assert_eq!(service.withdrawn_on(account.id, today).await?, 70_000);

    let kinds: Vec<TransactionKind> = service
        .transactions(account.id)
        .await?
        .iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(kinds, vec![TransactionKind::Deposit, TransactionKind::Withdraw]);

    Ok(())
}

#[tokio::test]
async fn test_transactions_are_per_account_and_ordered() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let ada = open_account(&service, "ada@example.com", AccountType::Current, 0).await?;
    let bob = open_account(&service, "bob@example.com", AccountType::Current, 0).await?;

    service.deposit(ada.id, 1_000).await?;
    service.deposit(bob.id, 5_000).await?;
    service.deposit(ada.id, 2_000).await?;
    service.withdraw(ada.id, 500).await?;

    let amounts: Vec<i64> = service
        .transactions(ada.id)
        .await?
        .iter()
        .map(|t| t.amount_cents)
        .collect();
    assert_eq!(amounts, vec![1_000, 2_000, 500]);
    assert_eq!(service.transactions(bob.id).await?.len(), 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_respect_limit() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let service = Arc::new(service);
    let account = open_account(&service, "ada@example.com", AccountType::Savings, 1_000_000).await?;
    let account_id = account.id;
    let now = local_time("2024-06-01", 10, 0, 0);

    // Ten withdrawals of 300.00 against a 1000.00 limit: at most three fit
    let handles: Vec<_> = (0..10)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.withdraw_at(account_id, 30_000, now).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => succeeded += 1,
            Err(AppError::DailyLimitExceeded { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(service.balance(account.id).await?, 910_000);
    assert_eq!(service.withdrawn_on(account.id, calendar_day(&now)).await?, 90_000);
    assert_eq!(service.transactions(account.id).await?.len(), 3);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_never_overdraw() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let service = Arc::new(service);
    let account = open_account(&service, "ada@example.com", AccountType::Current, 50_000).await?;
    let account_id = account.id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.withdraw(account_id, 20_000).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        if handle.await?.is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 2);
    assert_eq!(service.balance(account.id).await?, 10_000);

    Ok(())
}
