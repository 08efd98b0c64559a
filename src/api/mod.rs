//! HTTP API.
//!
//! Handlers are thin: they validate the request shape, call one
//! [`BankService`] operation and serialize the result. Errors are mapped to
//! status codes in [`error`].
//!
//! # Routes
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | POST | /api/signup | - |
//! | POST | /api/login | - |
//! | GET | /api/balance | bearer |
//! | GET | /api/account-info | bearer |
//! | POST | /api/deposit | bearer |
//! | POST | /api/withdraw | bearer |
//! | GET | /api/transactions | bearer |
//! | GET | /health | - |

use std::sync::Arc;

use crate::application::BankService;

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use routes::create_router;

/// State shared by every handler.
pub type AppState = Arc<BankService>;
