use crate::error::{AppError, Result};
use crate::models::UserResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xss_guard::{sanitize_field, SanitizeStrings};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl SanitizeStrings for LoginRequest {
    fn sanitize_strings(&mut self) {
        sanitize_field(&mut self.username);
        // Passwords are verified against a hash, never rendered; encoding
        // them would lock out users whose password contains '<' or '&'.
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Account-creation policy: a non-blank username and a password of at
    /// least eight characters drawing on all four character classes
    /// (upper, lower, digit, other).
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(AppError::BadRequest("username must not be empty".into()));
        }

        let password = &self.password;
        let classes_covered = password.chars().any(char::is_uppercase)
            && password.chars().any(char::is_lowercase)
            && password.chars().any(|c| c.is_ascii_digit())
            && password.chars().any(|c| !c.is_alphanumeric());

        if password.len() < MIN_PASSWORD_LEN || !classes_covered {
            return Err(AppError::WeakPassword);
        }
        Ok(())
    }
}

impl SanitizeStrings for RegisterRequest {
    fn sanitize_strings(&mut self) {
        sanitize_field(&mut self.username);
        sanitize_field(&mut self.email);
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

impl LogoutResponse {
    pub fn ok() -> Self {
        Self {
            message: "Logged out successfully".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: "user@example.com".into(),
            password: password.into(),
        }
    }

    #[test]
    fn strong_password_is_accepted() {
        assert!(request("alice", "Tr0ub4dor&3").validate().is_ok());
    }

    #[test]
    fn short_password_is_weak() {
        assert!(matches!(
            request("alice", "Ab1!").validate(),
            Err(AppError::WeakPassword)
        ));
    }

    #[test]
    fn password_missing_a_character_class_is_weak() {
        for password in ["tr0ub4dor&3", "TR0UB4DOR&3", "Troubador&x", "Tr0ub4dor3"] {
            assert!(
                matches!(request("alice", password).validate(), Err(AppError::WeakPassword)),
                "accepted {password:?}"
            );
        }
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(matches!(
            request("   ", "Tr0ub4dor&3").validate(),
            Err(AppError::BadRequest(_))
        ));
    }
}
