//! Process-local user store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::debug;

use crate::auth::{StoreError, User, UserStore, normalize_email};

const TOKEN_LEN: usize = 32;

/// Volatile `UserStore`: everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
    tokens: RwLock<HashMap<String, String>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

impl UserStore for InMemoryUserStore {
    fn create_user(&self, email: &str, name: Option<&str>) -> Result<User, StoreError> {
        let email = normalize_email(email)?;
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::UserExists);
        }

        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => n.to_string(),
            None => email.split('@').next().unwrap_or_default().to_string(),
        };
        let user = User {
            id: random_token(),
            email,
            name,
            created_at: Utc::now(),
        };
        users.insert(user.id.clone(), user.clone());
        debug!(user_id = %user.id, "registered user");
        Ok(user)
    }

    fn lookup_user_by_email(&self, email: &str) -> Option<User> {
        let email = email.trim().to_lowercase();
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    fn issue_token(&self, user_id: &str) -> Result<String, StoreError> {
        if !self.users.read().unwrap_or_else(PoisonError::into_inner).contains_key(user_id) {
            return Err(StoreError::UnknownUser);
        }
        let token = random_token();
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        // One live session per user.
        tokens.retain(|_, owner| owner != user_id);
        tokens.insert(token.clone(), user_id.to_string());
        Ok(token)
    }

    fn resolve_token(&self, token: &str) -> Option<User> {
        let user_id = self
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()?;
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned()
    }

    fn revoke_token(&self, token: &str) -> bool {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_case_insensitive_and_unique() {
        let store = InMemoryUserStore::new();
        let user = store.create_user("Ada@Example.com", None).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "ada");

        assert_eq!(store.create_user("ADA@example.COM", None), Err(StoreError::UserExists));
        assert_eq!(store.lookup_user_by_email("ada@EXAMPLE.com").unwrap().id, user.id);
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn login_issues_fresh_resolvable_tokens() {
        let store = InMemoryUserStore::new();
        store.create_user("grace@example.com", Some("Grace")).unwrap();

        let session = store.login("grace@example.com").unwrap();
        assert_eq!(session.token.len(), TOKEN_LEN);
        assert_eq!(store.resolve_token(&session.token).unwrap().name, "Grace");
        assert!(store.is_authenticated(Some(&session.token)));
    }

    #[test]
    fn relogin_replaces_earlier_token() {
        let store = InMemoryUserStore::new();
        store.create_user("grace@example.com", None).unwrap();
        store.create_user("alan@example.com", None).unwrap();
        let other = store.login("alan@example.com").unwrap();

        let first = store.login("grace@example.com").unwrap();
        let mut latest = first.clone();
        for _ in 0..5 {
            latest = store.login("grace@example.com").unwrap();
        }

        assert_ne!(first.token, latest.token);
        assert!(store.resolve_token(&first.token).is_none());
        assert!(store.is_authenticated(Some(&latest.token)));
        assert!(store.is_authenticated(Some(&other.token)));
        assert_eq!(store.token_count(), 2);
    }

    #[test]
    fn revoked_tokens_stop_resolving() {
        let store = InMemoryUserStore::new();
        let session = store.login_or_register("ada@example.com").unwrap();

        assert!(store.revoke_token(&session.token));
        assert!(!store.revoke_token(&session.token));
        assert!(!store.is_authenticated(Some(&session.token)));
        assert_eq!(store.token_count(), 0);
    }

    #[test]
    fn unknown_users_and_tokens() {
        let store = InMemoryUserStore::new();
        assert!(matches!(store.login("nobody@example.com"), Err(StoreError::UnknownUser)));
        assert_eq!(store.issue_token("missing"), Err(StoreError::UnknownUser));
        assert!(store.resolve_token("bogus").is_none());
        assert!(!store.is_authenticated(None));
        assert!(!store.is_authenticated(Some("")));
        assert!(!store.is_authenticated(Some("bogus")));
    }

    #[test]
    fn login_or_register_creates_once() {
        let store = InMemoryUserStore::new();
        let a = store.login_or_register("linus@example.com").unwrap();
        let b = store.login_or_register("LINUS@example.com").unwrap();
        assert_eq!(a.user.id, b.user.id);
        assert_eq!(store.user_count(), 1);
    }
}
