mod account;
mod account_number;
mod money;
mod transaction;
mod validation;
mod withdrawal;

pub use account::*;
pub use account_number::*;
pub use money::*;
pub use transaction::*;
pub use validation::*;
pub use withdrawal::*;
