use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::store::models::User;
use crate::store::StoreError;

/// Repository over the `users` collection. Owns user documents exclusively;
/// usernames are stored case-folded and kept unique by the store.
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new user record. The caller supplies an already case-folded
    /// username and an argon2 hash, never a plaintext password.
    pub async fn insert(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                    StoreError::Duplicate(format!("username already exists: {}", user.username))
                } else {
                    StoreError::Sqlx(e)
                }
            })?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user not found: {}", username)))
    }
}
