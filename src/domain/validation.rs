use thiserror::Error;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Rejections for malformed, missing or out-of-range input.
/// The display text is what clients see in the `error` field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Invalid account type")]
    InvalidAccountType,

    #[error("Balance must be a non-negative number")]
    InvalidBalance,

    #[error("Amount must be a positive number")]
    InvalidAmount,

    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}

/// Trim and lowercase an email address, the form in which emails are stored
/// and looked up.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Structural email check: one `@`, a non-empty local part, and a dotted
/// domain without empty labels. No whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// Trimmed account holder name; blank names are rejected.
pub fn parse_holder_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(name.to_string())
}

/// Length rule for new passwords. Counted in characters, not bytes.
pub fn check_new_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validate and normalize an email address.
pub fn parse_email(email: &str) -> Result<String, ValidationError> {
    let email = normalize_email(email);
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("alice@example.com")]
    #[case("a.b+tag@mail.example.org")]
    #[case("x@y.io")]
    fn test_valid_emails(#[case] email: &str) {
        assert!(is_valid_email(email));
    }

    #[rstest]
    #[case("")]
    #[case("alice")]
    #[case("@example.com")]
    #[case("alice@")]
    #[case("alice@example")]
    #[case("alice@@example.com")]
    #[case("alice@example..com")]
    #[case("al ice@example.com")]
    fn test_invalid_emails(#[case] email: &str) {
        assert!(!is_valid_email(email));
    }

    #[test]
    fn test_parse_email_normalizes() {
        assert_eq!(
            parse_email("  Alice@Example.COM "),
            Ok("alice@example.com".to_string())
        );
    }

    #[test]
    fn test_holder_name_and_password_rules() {
        assert_eq!(parse_holder_name("  Ada "), Ok("Ada".to_string()));
        assert_eq!(parse_holder_name(" \t"), Err(ValidationError::NameRequired));
        assert_eq!(check_new_password("123456"), Ok(()));
        assert_eq!(check_new_password("ééééé"), Err(ValidationError::PasswordTooShort));
    }

    #[test]
    fn test_messages_match_client_contract() {
        assert_eq!(ValidationError::NameRequired.to_string(), "Name is required");
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            ValidationError::InvalidAmount.to_string(),
            "Amount must be a positive number"
        );
    }
}
