use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::store::models::{Article, ArticleFields};
use crate::store::StoreError;

const SELECT_COLUMNS: &str =
    "id, title, author, layout, page_count, description, editor, month, year, created_at, updated_at";

/// Repository over the `articles` collection and its companion full-text
/// index. Articles copy taxonomy values at write time; nothing here checks
/// those values against the taxonomy collections, and taxonomy edits never
/// reach back into existing articles.
pub struct ArticleStore {
    pool: SqlitePool,
}

impl ArticleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All articles in the store's natural order.
    pub async fn list_all(&self) -> Result<Vec<Article>, StoreError> {
        let sql = format!("SELECT {} FROM articles", SELECT_COLUMNS);
        let articles = sqlx::query_as::<_, Article>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(articles)
    }

    /// The edit-flow listing, ascending by title.
    pub async fn list_by_title(&self) -> Result<Vec<Article>, StoreError> {
        let sql = format!("SELECT {} FROM articles ORDER BY title ASC", SELECT_COLUMNS);
        let articles = sqlx::query_as::<_, Article>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(articles)
    }

    pub async fn get(&self, id: &str) -> Result<Article, StoreError> {
        let sql = format!("SELECT {} FROM articles WHERE id = ?1", SELECT_COLUMNS);
        sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("article not found: {}", id)))
    }

    /// Persist a new article and index its searchable text.
    pub async fn create(&self, fields: &ArticleFields) -> Result<Article, StoreError> {
        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4().to_string(),
            title: fields.title.clone(),
            author: fields.author.clone(),
            layout: fields.layout.clone(),
            page_count: fields.page_count,
            description: fields.description.clone(),
            editor: fields.editor.clone(),
            month: fields.month.clone(),
            year: fields.year.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO articles
                (id, title, author, layout, page_count, description, editor, month, year, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&article.id)
        .bind(&article.title)
        .bind(&article.author)
        .bind(&article.layout)
        .bind(article.page_count)
        .bind(&article.description)
        .bind(&article.editor)
        .bind(&article.month)
        .bind(&article.year)
        .bind(article.created_at)
        .bind(article.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO articles_fts (id, title, author, description) VALUES (?1, ?2, ?3, ?4)")
            .bind(&article.id)
            .bind(&article.title)
            .bind(&article.author)
            .bind(&article.description)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(article)
    }

    /// Replace every editable field of an existing article and reindex it.
    /// This is a full replace, not a merge; callers send the complete set.
    pub async fn update(&self, id: &str, fields: &ArticleFields) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE articles
             SET title = ?1, author = ?2, layout = ?3, page_count = ?4, description = ?5,
                 editor = ?6, month = ?7, year = ?8, updated_at = ?9
             WHERE id = ?10",
        )
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(&fields.layout)
        .bind(fields.page_count)
        .bind(&fields.description)
        .bind(&fields.editor)
        .bind(&fields.month)
        .bind(&fields.year)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("article not found: {}", id)));
        }

        sqlx::query("DELETE FROM articles_fts WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO articles_fts (id, title, author, description) VALUES (?1, ?2, ?3, ?4)")
            .bind(id)
            .bind(&fields.title)
            .bind(&fields.author)
            .bind(&fields.description)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Full-text search across title, author and description, best matches
    /// first. A query with no indexable terms (empty, whitespace or pure
    /// punctuation) falls back to the full natural-order listing; that is
    /// the documented empty-query behavior and it never errors.
    pub async fn search(&self, query: &str) -> Result<Vec<Article>, StoreError> {
        let expr = match match_expression(query) {
            Some(expr) => expr,
            None => return self.list_all().await,
        };

        let sql = "SELECT a.* FROM articles_fts
             JOIN articles a ON a.id = articles_fts.id
             WHERE articles_fts MATCH ?1
             ORDER BY rank";

        let articles = sqlx::query_as::<_, Article>(sql)
            .bind(expr)
            .fetch_all(&self.pool)
            .await?;

        Ok(articles)
    }
}

/// Build an FTS match expression from free-form user input. Terms are the
/// alphanumeric runs of the query, each quoted so FTS operator syntax in the
/// input cannot change the query shape; any term may match.
fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t))
        .collect();

    if terms.is_empty() {
        return None;
    }

    Some(terms.join(" OR "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_pool;

    fn fields(title: &str, author: &str, description: &str) -> ArticleFields {
        ArticleFields {
            title: title.to_string(),
            author: author.to_string(),
            layout: "Feature".to_string(),
            page_count: 4,
            description: description.to_string(),
            editor: "Jane Doe".to_string(),
            month: "June".to_string(),
            year: "2021".to_string(),
        }
    }

    #[test]
    fn match_expression_quotes_terms() {
        assert_eq!(
            match_expression("night market"),
            Some("\"night\" OR \"market\"".to_string())
        );
        assert_eq!(match_expression("c++ (beta)"), Some("\"c\" OR \"beta\"".to_string()));
        assert_eq!(match_expression(""), None);
        assert_eq!(match_expression("  ...  "), None);
    }

    #[tokio::test]
    async fn create_get_round_trip() {
        let store = ArticleStore::new(test_pool().await);

        let created = store
            .create(&fields("Issue 1", "Sam Hart", "City nights"))
            .await
            .expect("create");
        let fetched = store.get(&created.id).await.expect("get");

        assert_eq!(fetched.title, "Issue 1");
        assert_eq!(fetched.page_count, 4);
        assert_eq!(fetched.editor, "Jane Doe");
    }

    #[tokio::test]
    async fn get_reports_not_found() {
        let store = ArticleStore::new(test_pool().await);

        let err = store.get("missing").await.expect_err("absent");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_replaces_all_editable_fields() {
        let store = ArticleStore::new(test_pool().await);

        let created = store
            .create(&fields("Issue 1", "Sam Hart", "City nights"))
            .await
            .expect("create");
        let baseline = store.get(&created.id).await.expect("get");

        let mut replacement = fields("Issue 1 revised", "Ana Reyes", "Harbor mornings");
        replacement.page_count = 12;
        store.update(&created.id, &replacement).await.expect("update");

        let stored = store.get(&created.id).await.expect("get");
        assert_eq!(stored.title, "Issue 1 revised");
        assert_eq!(stored.author, "Ana Reyes");
        assert_eq!(stored.page_count, 12);
        assert_eq!(stored.created_at, baseline.created_at);
    }

    #[tokio::test]
    async fn update_reports_not_found_without_writing() {
        let store = ArticleStore::new(test_pool().await);

        let err = store
            .update("missing", &fields("X", "Y", "Z"))
            .await
            .expect_err("absent");
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn list_by_title_sorts_ascending() {
        let store = ArticleStore::new(test_pool().await);

        store.create(&fields("Winter", "A", "d")).await.expect("create");
        store.create(&fields("Autumn", "B", "d")).await.expect("create");
        store.create(&fields("Spring", "C", "d")).await.expect("create");

        let titles: Vec<String> = store
            .list_by_title()
            .await
            .expect("list")
            .into_iter()
            .map(|a| a.title)
            .collect();

        assert_eq!(titles, vec!["Autumn", "Spring", "Winter"]);
    }

    #[tokio::test]
    async fn search_matches_title_author_and_description() {
        let store = ArticleStore::new(test_pool().await);

        store
            .create(&fields("Night Markets", "Sam Hart", "Street food after dark"))
            .await
            .expect("create");
        store
            .create(&fields("Harbor Walks", "June Mills", "Quiet mornings by the water"))
            .await
            .expect("create");

        let by_title = store.search("markets").await.expect("search");
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Night Markets");

        let by_author = store.search("mills").await.expect("search");
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].author, "June Mills");

        let by_description = store.search("mornings").await.expect("search");
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].title, "Harbor Walks");

        assert!(store.search("volcano").await.expect("search").is_empty());
    }

    #[tokio::test]
    async fn search_reflects_updates() {
        let store = ArticleStore::new(test_pool().await);

        let created = store
            .create(&fields("Night Markets", "Sam Hart", "Street food"))
            .await
            .expect("create");

        store
            .update(&created.id, &fields("Day Fairs", "Sam Hart", "Street food"))
            .await
            .expect("update");

        assert!(store.search("night").await.expect("search").is_empty());
        let hits = store.search("fairs").await.expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, created.id);
    }

    #[tokio::test]
    async fn empty_query_returns_full_listing() {
        let store = ArticleStore::new(test_pool().await);

        store.create(&fields("One", "A", "d")).await.expect("create");
        store.create(&fields("Two", "B", "d")).await.expect("create");

        assert_eq!(store.search("").await.expect("search").len(), 2);
        assert_eq!(store.search("  !!  ").await.expect("search").len(), 2);
    }
}
