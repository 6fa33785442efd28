//! Credential validation.
//!
//! Every username/password pair must pass the non-empty floor. Registration
//! and password changes also apply the optional length rules from
//! [`ValidationConfig`].

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::config::ValidationConfig;
use crate::envelope::MessageKey;

/// Username/password pair submitted for registration or login.
#[derive(Clone, Default, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "PasswordRequired"))]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Username must contain something other than whitespace.
fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("UsernameRequired")
            .with_message("Username is required".into()));
    }
    Ok(())
}

/// A single rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldViolation {
    pub field: &'static str,
    pub code: MessageKey,
}

impl FieldViolation {
    pub fn new(field: &'static str, code: MessageKey) -> Self {
        Self { field, code }
    }
}

/// Structural validation of credential input.
#[derive(Debug, Clone, Default)]
pub struct CredentialValidator {
    rules: ValidationConfig,
}

impl CredentialValidator {
    /// Validator applying only the non-empty floor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator with additional registration rules.
    pub fn with_rules(rules: ValidationConfig) -> Self {
        Self { rules }
    }

    /// Check login input. Only the non-empty floor applies.
    pub fn validate_login(&self, credentials: &Credentials) -> Vec<FieldViolation> {
        floor_violations(credentials)
    }

    /// Check registration input against the floor and configured rules.
    pub fn validate_registration(&self, credentials: &Credentials) -> Vec<FieldViolation> {
        let mut violations = floor_violations(credentials);

        if !credentials.username.trim().is_empty() {
            let len = credentials.username.chars().count();
            if self.rules.min_username_length.is_some_and(|min| len < min) {
                violations.push(FieldViolation::new("username", MessageKey::UsernameTooShort));
            }
            if self.rules.max_username_length.is_some_and(|max| len > max) {
                violations.push(FieldViolation::new("username", MessageKey::UsernameTooLong));
            }
        }
        violations.extend(self.new_password_violations("password", &credentials.password));

        violations.sort();
        violations
    }

    /// Check a password change. The current password only needs to be
    /// present; the new one must satisfy the registration rules.
    pub fn validate_password_change(&self, current: &str, new: &str) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        if current.is_empty() {
            violations.push(FieldViolation::new(
                "current_password",
                MessageKey::PasswordRequired,
            ));
        }
        if new.is_empty() {
            violations.push(FieldViolation::new("new_password", MessageKey::PasswordRequired));
        }
        violations.extend(self.new_password_violations("new_password", new));
        violations.sort();
        violations
    }

    fn new_password_violations(&self, field: &'static str, password: &str) -> Vec<FieldViolation> {
        if password.is_empty() {
            return Vec::new();
        }
        match self.rules.min_password_length {
            Some(min) if password.chars().count() < min => {
                vec![FieldViolation::new(field, MessageKey::PasswordTooShort)]
            }
            _ => Vec::new(),
        }
    }
}

fn floor_violations(credentials: &Credentials) -> Vec<FieldViolation> {
    match credentials.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => {
            let mut violations = to_violations(&errors);
            violations.sort();
            violations
        }
    }
}

fn to_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        let field: &str = &field;
        let field = match field {
            "username" => "username",
            _ => "password",
        };
        for error in field_errors.iter() {
            let code = match &*error.code {
                "UsernameRequired" => MessageKey::UsernameRequired,
                "PasswordRequired" => MessageKey::PasswordRequired,
                _ => MessageKey::ValidationFailed,
            };
            violations.push(FieldViolation::new(field, code));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict_rules() -> ValidationConfig {
        ValidationConfig {
            min_username_length: Some(3),
            max_username_length: Some(8),
            min_password_length: Some(6),
        }
    }

    #[test]
    fn test_valid_credentials() {
        let validator = CredentialValidator::new();
        let creds = Credentials::new("alice", "Secret123!");
        assert!(validator.validate_login(&creds).is_empty());
        assert!(validator.validate_registration(&creds).is_empty());
    }

    #[test]
    fn test_empty_username() {
        let violations = CredentialValidator::new().validate_login(&Credentials::new("", "pw"));
        assert_eq!(
            violations,
            vec![FieldViolation::new("username", MessageKey::UsernameRequired)]
        );
    }

    #[test]
    fn test_whitespace_username() {
        let violations =
            CredentialValidator::new().validate_registration(&Credentials::new("   ", "pw"));
        assert_eq!(
            violations,
            vec![FieldViolation::new("username", MessageKey::UsernameRequired)]
        );
    }

    #[test]
    fn test_empty_password() {
        let violations = CredentialValidator::new().validate_login(&Credentials::new("alice", ""));
        assert_eq!(
            violations,
            vec![FieldViolation::new("password", MessageKey::PasswordRequired)]
        );
    }

    #[test]
    fn test_both_empty() {
        let violations = CredentialValidator::new().validate_registration(&Credentials::default());
        assert_eq!(violations.len(), 2);
        assert!(violations.contains(&FieldViolation::new("username", MessageKey::UsernameRequired)));
        assert!(violations.contains(&FieldViolation::new("password", MessageKey::PasswordRequired)));
    }

    #[test]
    fn test_whitespace_password_is_present() {
        let violations = CredentialValidator::new().validate_login(&Credentials::new("alice", " "));
        assert!(violations.is_empty());
    }

    #[test]
    fn test_rules_off_by_default() {
        let validator = CredentialValidator::new();
        let creds = Credentials::new("a", "b");
        assert!(validator.validate_registration(&creds).is_empty());
    }

    #[test]
    fn test_username_too_short() {
        let validator = CredentialValidator::with_rules(strict_rules());
        let violations = validator.validate_registration(&Credentials::new("ab", "secret1"));
        assert_eq!(
            violations,
            vec![FieldViolation::new("username", MessageKey::UsernameTooShort)]
        );
    }

    #[test]
    fn test_username_too_long() {
        let validator = CredentialValidator::with_rules(strict_rules());
        let violations = validator.validate_registration(&Credentials::new("abcdefghi", "secret1"));
        assert_eq!(
            violations,
            vec![FieldViolation::new("username", MessageKey::UsernameTooLong)]
        );
    }

    #[test]
    fn test_username_length_counts_characters() {
        let validator = CredentialValidator::with_rules(strict_rules());
        // Three characters, nine bytes.
        let violations = validator.validate_registration(&Credentials::new("たろう", "secret1"));
        assert!(violations.is_empty());
    }

    #[test]
    fn test_password_too_short() {
        let validator = CredentialValidator::with_rules(strict_rules());
        let violations = validator.validate_registration(&Credentials::new("alice", "12345"));
        assert_eq!(
            violations,
            vec![FieldViolation::new("password", MessageKey::PasswordTooShort)]
        );
    }

    #[test]
    fn test_login_ignores_registration_rules() {
        let validator = CredentialValidator::with_rules(strict_rules());
        assert!(validator
            .validate_login(&Credentials::new("ab", "1"))
            .is_empty());
    }

    #[test]
    fn test_password_change_rules() {
        let validator = CredentialValidator::with_rules(strict_rules());
        assert!(validator.validate_password_change("old", "newsecret").is_empty());
        assert_eq!(
            validator.validate_password_change("", "newsecret"),
            vec![FieldViolation::new("current_password", MessageKey::PasswordRequired)]
        );
        assert_eq!(
            validator.validate_password_change("old", "new"),
            vec![FieldViolation::new("new_password", MessageKey::PasswordTooShort)]
        );
        assert_eq!(
            validator.validate_password_change("old", ""),
            vec![FieldViolation::new("new_password", MessageKey::PasswordRequired)]
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("alice", "Secret123!");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("Secret123!"));
    }
}
