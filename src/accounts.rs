use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::errors::{PayoffError, Result};
use crate::types::OwnerId;

pub const MIN_PASSWORD_LEN: usize = 10;

/// password hashing collaborator supplied by the application
pub trait CredentialHasher {
    fn hash(&self, password: &str) -> String;

    fn verify(&self, hash: &str, password: &str) -> bool;
}

/// registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: OwnerId,
    pub name: String,
    pub username: String,
    password_hash: String,
}

/// raw sign-up form fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpForm {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm: Option<String>,
}

/// raw log-in form fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogInForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn sign_up_error(reason: &'static str) -> PayoffError {
    PayoffError::SignUp { reason }
}

fn log_in_error(reason: &'static str) -> PayoffError {
    PayoffError::LogIn { reason }
}

/// in-memory user table
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: BTreeMap<OwnerId, User>,
    next_id: OwnerId,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, id: OwnerId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn sign_up(&mut self, form: &SignUpForm, hasher: &dyn CredentialHasher) -> Result<User> {
        let (Some(name), Some(username), Some(password), Some(confirm)) = (
            present(&form.name),
            present(&form.username),
            present(&form.password),
            present(&form.confirm),
        ) else {
            return Err(sign_up_error("Please enter all fields"));
        };

        if username.contains(' ') {
            return Err(sign_up_error("Spaces not allowed in username"));
        }
        if password.contains(' ') {
            return Err(sign_up_error("Spaces not allowed in password"));
        }
        if password != confirm {
            return Err(sign_up_error("Passwords don't match"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(sign_up_error("Password length must be 10+"));
        }
        if self.users.values().any(|u| u.username == username) {
            return Err(sign_up_error("Username already exists, try logging in instead"));
        }

        let id = self.next_id.max(1);
        self.next_id = id + 1;
        let user = User {
            id,
            name: name.to_string(),
            username: username.to_string(),
            password_hash: hasher.hash(password),
        };
        self.users.insert(id, user.clone());
        info!(user_id = id, username, "user registered");
        Ok(user)
    }

    /// check credentials and return the owner id to scope later calls
    pub fn log_in(&self, form: &LogInForm, hasher: &dyn CredentialHasher) -> Result<OwnerId> {
        let username = present(&form.username).ok_or_else(|| log_in_error("Enter username"))?;
        let password = present(&form.password).ok_or_else(|| log_in_error("Enter password"))?;

        let mut matches = self.users.values().filter(|u| u.username == username);
        let user = matches.next().ok_or_else(|| log_in_error("Username doesn't exist"))?;
        if matches.next().is_some() || !hasher.verify(&user.password_hash, password) {
            debug!(username, "log in rejected");
            return Err(log_in_error("Password incorrect"));
        }
        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// reversible stand-in for a real password hasher
    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, password: &str) -> String {
            format!("plain${}", password)
        }

        fn verify(&self, hash: &str, password: &str) -> bool {
            hash == self.hash(password)
        }
    }

    fn form(name: &str, username: &str, password: &str, confirm: &str) -> SignUpForm {
        SignUpForm {
            name: Some(name.to_string()),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            confirm: Some(confirm.to_string()),
        }
    }

    fn reason(err: PayoffError) -> String {
        err.user_message()
    }

    #[test]
    fn test_sign_up_and_log_in() {
        let mut registry = UserRegistry::new();
        let user = registry
            .sign_up(&form("Ada", "ada", "correcthorse", "correcthorse"), &PlainHasher)
            .unwrap();
        assert_eq!(user.id, 1);
        assert_ne!(user.password_hash, "correcthorse");

        let login = LogInForm {
            username: Some("ada".to_string()),
            password: Some("correcthorse".to_string()),
        };
        assert_eq!(registry.log_in(&login, &PlainHasher).unwrap(), 1);
    }

    #[test]
    fn test_sign_up_rules() {
        let mut registry = UserRegistry::new();
        let hasher = PlainHasher;

        let missing = SignUpForm {
            confirm: None,
            ..form("Ada", "ada", "correcthorse", "correcthorse")
        };
        assert_eq!(reason(registry.sign_up(&missing, &hasher).unwrap_err()), "Please enter all fields");
        assert_eq!(
            reason(registry.sign_up(&form("Ada", "a da", "correcthorse", "correcthorse"), &hasher).unwrap_err()),
            "Spaces not allowed in username"
        );
        assert_eq!(
            reason(registry.sign_up(&form("Ada", "ada", "correct horse", "correct horse"), &hasher).unwrap_err()),
            "Spaces not allowed in password"
        );
        assert_eq!(
            reason(registry.sign_up(&form("Ada", "ada", "correcthorse", "correcthorses"), &hasher).unwrap_err()),
            "Passwords don't match"
        );
        assert_eq!(
            reason(registry.sign_up(&form("Ada", "ada", "short", "short"), &hasher).unwrap_err()),
            "Password length must be 10+"
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_username() {
        let mut registry = UserRegistry::new();
        registry
            .sign_up(&form("Ada", "ada", "correcthorse", "correcthorse"), &PlainHasher)
            .unwrap();

        let err = registry
            .sign_up(&form("Other Ada", "ada", "batterystaple", "batterystaple"), &PlainHasher)
            .unwrap_err();
        assert_eq!(reason(err), "Username already exists, try logging in instead");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_log_in_failures() {
        let mut registry = UserRegistry::new();
        registry
            .sign_up(&form("Ada", "ada", "correcthorse", "correcthorse"), &PlainHasher)
            .unwrap();

        let attempt = |username: Option<&str>, password: Option<&str>| {
            let form = LogInForm {
                username: username.map(str::to_string),
                password: password.map(str::to_string),
            };
            reason(registry.log_in(&form, &PlainHasher).unwrap_err())
        };

        assert_eq!(attempt(None, Some("x")), "Enter username");
        assert_eq!(attempt(Some("ada"), None), "Enter password");
        assert_eq!(attempt(Some("bob"), Some("correcthorse")), "Username doesn't exist");
        assert_eq!(attempt(Some("ada"), Some("wronghorse!")), "Password incorrect");
    }
}
