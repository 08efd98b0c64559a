mod repository;

pub use repository::*;

/// SQL migration for the initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// SQLite URL for a database file, creating the file if it doesn't exist.
pub fn database_url(path: &str) -> String {
    format!("sqlite:{}?mode=rwc", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url() {
        assert_eq!(database_url("bank.db"), "sqlite:bank.db?mode=rwc");
    }
}
