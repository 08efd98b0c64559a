// Application layer - use cases and orchestration.
// Handlers and CLI commands go through `BankService`; they never touch the
// repository for writes.

pub mod auth;
pub mod error;
pub mod service;

pub use auth::*;
pub use error::*;
pub use service::*;
