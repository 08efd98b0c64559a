//! Axum handlers. Each one maps a request onto a single service call.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use super::AppState;
use super::auth::AuthenticatedAccount;
use super::dto::{
    AccountInfoResponse, AmountRequest, BalanceResponse, HealthResponse, LoginRequest,
    LoginResponse, MovementResponse, SignupRequest, SignupResponse, TransactionResponse,
};
use super::error::ApiErrorResponse;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// POST /api/signup
///
/// - `201 Created` with the new account number
/// - `400 Bad Request` on invalid input or an email already in use
pub async fn signup(
    State(service): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let Json(request) = payload?;
    let new_account = request.validate()?;
    let account = service.signup(new_account).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Signup successful".to_string(),
            account_number: account.account_number,
        }),
    ))
}

/// POST /api/login
///
/// Unknown email and wrong password give the same `400 Invalid credentials`.
pub async fn login(
    State(service): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    let credentials = request.validate()?;
    let token = service.login(credentials).await?;
    Ok(Json(LoginResponse { token }))
}

/// GET /api/balance
pub async fn balance(
    State(service): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
) -> ApiResult<Json<BalanceResponse>> {
    let balance = service.balance(account_id).await?;
    Ok(Json(BalanceResponse { balance }))
}

/// GET /api/account-info
pub async fn account_info(
    State(service): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
) -> ApiResult<Json<AccountInfoResponse>> {
    let profile = service.account_info(account_id).await?;
    Ok(Json(profile.into()))
}

/// POST /api/deposit
pub async fn deposit(
    State(service): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> ApiResult<Json<MovementResponse>> {
    let Json(request) = payload?;
    let amount = request.cents()?;
    let result = service.deposit(account_id, amount).await?;

    Ok(Json(MovementResponse {
        message: "Deposit successful".to_string(),
        new_balance: result.new_balance,
    }))
}

/// POST /api/withdraw
///
/// `400` when the amount is invalid, exceeds the balance, or would take the
/// day's withdrawals past the account type's limit.
pub async fn withdraw(
    State(service): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> ApiResult<Json<MovementResponse>> {
    let Json(request) = payload?;
    let amount = request.cents()?;
    let result = service.withdraw(account_id, amount).await?;

    Ok(Json(MovementResponse {
        message: "Withdrawal successful".to_string(),
        new_balance: result.new_balance,
    }))
}

/// GET /api/transactions
pub async fn transactions(
    State(service): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let transactions = service.transactions(account_id).await?;
    Ok(Json(
        transactions.iter().map(TransactionResponse::from).collect(),
    ))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn not_found() -> ApiErrorResponse {
    ApiErrorResponse::not_found("Not found")
}
