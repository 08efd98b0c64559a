// Export of account data for offline use.

mod statement;

pub use statement::*;
