//! Caller identity.
//!
//! The search endpoint only needs one answer from this module: does a token
//! belong to a signed-in user? Signed-in callers get live fares, everyone
//! else gets mock offers.

use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod store;

pub use store::InMemoryUserStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Always lowercase.
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A user plus a freshly issued session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("User already exists")]
    UserExists,

    #[error("Invalid email or password")]
    UnknownUser,

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

/// Users and their session tokens.
pub trait UserStore: Send + Sync {
    /// Register a new user. Emails are compared case-insensitively.
    fn create_user(&self, email: &str, name: Option<&str>) -> Result<User, StoreError>;

    fn lookup_user_by_email(&self, email: &str) -> Option<User>;

    /// Issue a new token for an existing user id, replacing any earlier one.
    fn issue_token(&self, user_id: &str) -> Result<String, StoreError>;

    fn resolve_token(&self, token: &str) -> Option<User>;

    /// Forget `token`. Returns whether it was live.
    fn revoke_token(&self, token: &str) -> bool;

    /// Start a session for an existing user.
    fn login(&self, email: &str) -> Result<Session, StoreError> {
        let user = self.lookup_user_by_email(email).ok_or(StoreError::UnknownUser)?;
        let token = self.issue_token(&user.id)?;
        Ok(Session { user, token })
    }

    /// Start a session, registering the user first if needed.
    fn login_or_register(&self, email: &str) -> Result<Session, StoreError> {
        match self.login(email) {
            Err(StoreError::UnknownUser) => {
                let user = self.create_user(email, None)?;
                let token = self.issue_token(&user.id)?;
                Ok(Session { user, token })
            }
            other => other,
        }
    }

    fn is_authenticated(&self, token: Option<&str>) -> bool {
        token
            .filter(|t| !t.is_empty())
            .and_then(|t| self.resolve_token(t))
            .is_some()
    }
}

/// Lowercased, trimmed email if it looks like `local@domain`.
pub fn normalize_email(email: &str) -> Result<String, StoreError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(email),
        _ => Err(StoreError::InvalidEmail(email)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
    }

    #[test]
    fn normalize_email_rejects_malformed() {
        for bad in ["", "ada", "@example.com", "ada@", "a@b@c"] {
            assert!(matches!(normalize_email(bad), Err(StoreError::InvalidEmail(_))), "{bad}");
        }
    }
}
