use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::info;

use crate::store::{StoreError, User, UserStore};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("username already exists")]
    DuplicateUsername,

    // Covers both unknown username and wrong password; callers surface a
    // single generic message for either.
    #[error("incorrect username and/or password")]
    InvalidCredentials,

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registration and credential verification over the user store.
pub struct IdentityService {
    users: UserStore,
}

impl IdentityService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserStore::new(pool),
        }
    }

    /// Create a new account. The username is case-folded before any lookup
    /// or write; a case-folded match with an existing account fails without
    /// writing anything.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, IdentityError> {
        let username = normalize_username(username)?;
        validate_password(password)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(IdentityError::DuplicateUsername);
        }

        let hash = hash_password(password)?;
        let user = match self.users.insert(&username, &hash).await {
            // Lost a race with a concurrent registration of the same name.
            Err(StoreError::Duplicate(_)) => return Err(IdentityError::DuplicateUsername),
            other => other?,
        };

        info!(user = %user.username, "registered new account");
        Ok(user)
    }

    /// Verify credentials for login. Absent users and failed hash checks are
    /// indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, IdentityError> {
        let username = username.trim().to_lowercase();

        let user = match self.users.find_by_username(&username).await? {
            Some(user) => user,
            None => return Err(IdentityError::InvalidCredentials),
        };

        if !verify_password(password, &user.password_hash) {
            return Err(IdentityError::InvalidCredentials);
        }

        info!(user = %user.username, "login succeeded");
        Ok(user)
    }
}

fn normalize_username(username: &str) -> Result<String, IdentityError> {
    let username = username.trim().to_lowercase();

    let valid_shape = username.len() >= USERNAME_MIN
        && username.len() <= USERNAME_MAX
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if !valid_shape {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "username".to_string(),
            format!(
                "Username must be {}-{} characters of letters, numbers, '_' or '-'",
                USERNAME_MIN, USERNAME_MAX
            ),
        );
        return Err(IdentityError::Validation {
            message: "Invalid username".to_string(),
            field_errors,
        });
    }

    Ok(username)
}

fn validate_password(password: &str) -> Result<(), IdentityError> {
    if password.len() < PASSWORD_MIN {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "password".to_string(),
            format!("Password must be at least {} characters", PASSWORD_MIN),
        );
        return Err(IdentityError::Validation {
            message: "Invalid password".to_string(),
            field_errors,
        });
    }

    Ok(())
}

/// Salted one-way hash in PHC string form. A fresh salt is drawn per hash.
fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| IdentityError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Constant-time verification against a stored PHC hash. An unparseable
/// stored hash verifies as false rather than erroring.
fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_pool;

    #[tokio::test]
    async fn register_then_login_round_trip() {
        let service = IdentityService::new(test_pool().await);

        let registered = service.register("Alice", "secret-pass-1").await.expect("register");
        assert_eq!(registered.username, "alice");

        let logged_in = service.login("alice", "secret-pass-1").await.expect("login");
        assert_eq!(logged_in.id, registered.id);

        // Login also case-folds, so the original casing works too.
        let folded = service.login("ALICE", "secret-pass-1").await.expect("login");
        assert_eq!(folded.id, registered.id);
    }

    #[tokio::test]
    async fn duplicate_registration_fails_and_writes_nothing() {
        let service = IdentityService::new(test_pool().await);

        service.register("alice", "secret-pass-1").await.expect("register");
        let err = service
            .register("ALICE", "other-pass-2")
            .await
            .expect_err("duplicate");
        assert!(matches!(err, IdentityError::DuplicateUsername));

        // The original credentials still stand.
        assert!(service.login("alice", "secret-pass-1").await.is_ok());
        assert!(matches!(
            service.login("alice", "other-pass-2").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let service = IdentityService::new(test_pool().await);

        service.register("alice", "secret-pass-1").await.expect("register");

        let wrong_password = service.login("alice", "bad-password").await.expect_err("wrong");
        let unknown_user = service.login("nobody", "bad-password").await.expect_err("absent");

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn stored_hashes_are_salted_and_never_plaintext() {
        let service = IdentityService::new(test_pool().await);

        let a = service.register("alice", "same-password").await.expect("register");
        let b = service.register("bob", "same-password").await.expect("register");

        assert_ne!(a.password_hash, "same-password");
        assert_ne!(b.password_hash, "same-password");
        // Same password, different salt, different hash.
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[tokio::test]
    async fn malformed_usernames_and_short_passwords_are_rejected() {
        let service = IdentityService::new(test_pool().await);

        assert!(matches!(
            service.register("a", "secret-pass-1").await,
            Err(IdentityError::Validation { .. })
        ));
        assert!(matches!(
            service.register("has spaces", "secret-pass-1").await,
            Err(IdentityError::Validation { .. })
        ));
        assert!(matches!(
            service.register("alice", "short").await,
            Err(IdentityError::Validation { .. })
        ));
    }

    #[test]
    fn verify_rejects_garbage_stored_hashes() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
