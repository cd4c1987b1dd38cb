use sqlx::SqlitePool;
use uuid::Uuid;

use crate::store::models::{TaxonomyEntry, TaxonomyKind};
use crate::store::StoreError;

/// Repository over the per-kind taxonomy collections. Every operation is
/// parameterized by `TaxonomyKind`; the collection name comes from the kind
/// enum, so request input never reaches the SQL text.
///
/// Values are not kept unique. Articles copy values rather than referencing
/// entries, so duplicate labels are allowed and harmless.
pub struct TaxonomyStore {
    pool: SqlitePool,
}

impl TaxonomyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All entries of a kind, ascending by value.
    pub async fn list(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyEntry>, StoreError> {
        let sql = format!(
            "SELECT id, value FROM {} ORDER BY value ASC",
            kind.collection()
        );
        let entries = sqlx::query_as::<_, TaxonomyEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    pub async fn get(&self, kind: TaxonomyKind, id: &str) -> Result<TaxonomyEntry, StoreError> {
        let sql = format!("SELECT id, value FROM {} WHERE id = ?1", kind.collection());
        sqlx::query_as::<_, TaxonomyEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{} not found: {}", kind.label(), id)))
    }

    /// Append a new entry. No uniqueness check on the value.
    pub async fn add(&self, kind: TaxonomyKind, value: &str) -> Result<TaxonomyEntry, StoreError> {
        let entry = TaxonomyEntry {
            id: Uuid::new_v4().to_string(),
            value: value.to_string(),
        };

        let sql = format!("INSERT INTO {} (id, value) VALUES (?1, ?2)", kind.collection());
        sqlx::query(&sql)
            .bind(&entry.id)
            .bind(&entry.value)
            .execute(&self.pool)
            .await?;

        Ok(entry)
    }

    /// Replace the value of an existing entry in place.
    pub async fn update(&self, kind: TaxonomyKind, id: &str, value: &str) -> Result<(), StoreError> {
        let sql = format!("UPDATE {} SET value = ?1 WHERE id = ?2", kind.collection());
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "{} not found: {}",
                kind.label(),
                id
            )));
        }

        Ok(())
    }

    /// Delete an entry. Articles that copied its value are left untouched.
    pub async fn remove(&self, kind: TaxonomyKind, id: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", kind.collection());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "{} not found: {}",
                kind.label(),
                id
            )));
        }

        Ok(())
    }
}
