use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::info;

use crate::middleware::AuthUser;
use crate::store::{
    Article, ArticleFields, ArticleStore, StoreError, TaxonomyEntry, TaxonomyKind, TaxonomyStore,
};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An article as submitted by the compose/edit form. Every field arrives as
/// text; `page_count` and `year` are parsed into their semantic types before
/// anything is written. Updates must resend the complete set, a missing
/// field is a validation error rather than a silent drop.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub page_count: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub editor: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub year: String,
}

/// The taxonomy collections a compose form is populated from.
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub editors: Vec<TaxonomyEntry>,
    pub authors: Vec<TaxonomyEntry>,
    pub months: Vec<TaxonomyEntry>,
    pub years: Vec<TaxonomyEntry>,
    pub sections: Vec<TaxonomyEntry>,
}

/// Orchestrates catalog mutations over the article and taxonomy
/// repositories. Mutating operations take the authenticated identity as an
/// explicit parameter; handlers only reach this service after the session
/// middleware has admitted the request.
pub struct ContentService {
    articles: ArticleStore,
    taxonomy: TaxonomyStore,
}

impl ContentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            articles: ArticleStore::new(pool.clone()),
            taxonomy: TaxonomyStore::new(pool),
        }
    }

    pub async fn list_articles(&self) -> Result<Vec<Article>, ContentError> {
        Ok(self.articles.list_all().await?)
    }

    pub async fn list_articles_by_title(&self) -> Result<Vec<Article>, ContentError> {
        Ok(self.articles.list_by_title().await?)
    }

    pub async fn get_article(&self, id: &str) -> Result<Article, ContentError> {
        Ok(self.articles.get(id).await?)
    }

    pub async fn search_articles(&self, query: &str) -> Result<Vec<Article>, ContentError> {
        Ok(self.articles.search(query).await?)
    }

    /// Validates the draft and persists a new article. Submitted taxonomy
    /// values are copied as-is; they are not checked against the taxonomy
    /// collections.
    pub async fn add_article(
        &self,
        auth: &AuthUser,
        draft: &ArticleDraft,
    ) -> Result<Article, ContentError> {
        let fields = validate_draft(draft)?;
        let article = self.articles.create(&fields).await?;

        info!(user = %auth.username, article = %article.id, "article created");
        Ok(article)
    }

    /// Full replace of an existing article's editable fields.
    pub async fn edit_article(
        &self,
        auth: &AuthUser,
        id: &str,
        draft: &ArticleDraft,
    ) -> Result<(), ContentError> {
        let fields = validate_draft(draft)?;
        self.articles.update(id, &fields).await?;

        info!(user = %auth.username, article = %id, "article updated");
        Ok(())
    }

    pub async fn form_options(&self) -> Result<FormOptions, ContentError> {
        Ok(FormOptions {
            editors: self.taxonomy.list(TaxonomyKind::Editor).await?,
            authors: self.taxonomy.list(TaxonomyKind::Author).await?,
            months: self.taxonomy.list(TaxonomyKind::Month).await?,
            years: self.taxonomy.list(TaxonomyKind::Year).await?,
            sections: self.taxonomy.list(TaxonomyKind::Section).await?,
        })
    }

    pub async fn list_taxonomy(
        &self,
        kind: TaxonomyKind,
    ) -> Result<Vec<TaxonomyEntry>, ContentError> {
        Ok(self.taxonomy.list(kind).await?)
    }

    pub async fn get_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: &str,
    ) -> Result<TaxonomyEntry, ContentError> {
        Ok(self.taxonomy.get(kind, id).await?)
    }

    pub async fn add_taxonomy(
        &self,
        auth: &AuthUser,
        kind: TaxonomyKind,
        value: &str,
    ) -> Result<TaxonomyEntry, ContentError> {
        let value = required_value(kind, value)?;
        let entry = self.taxonomy.add(kind, &value).await?;

        info!(user = %auth.username, kind = kind.label(), entry = %entry.id, "taxonomy entry added");
        Ok(entry)
    }

    pub async fn edit_taxonomy(
        &self,
        auth: &AuthUser,
        kind: TaxonomyKind,
        id: &str,
        value: &str,
    ) -> Result<(), ContentError> {
        let value = required_value(kind, value)?;
        self.taxonomy.update(kind, id, &value).await?;

        info!(user = %auth.username, kind = kind.label(), entry = %id, "taxonomy entry updated");
        Ok(())
    }

    /// Removes a taxonomy entry. Articles that copied its value keep it.
    pub async fn delete_taxonomy(
        &self,
        auth: &AuthUser,
        kind: TaxonomyKind,
        id: &str,
    ) -> Result<(), ContentError> {
        self.taxonomy.remove(kind, id).await?;

        info!(user = %auth.username, kind = kind.label(), entry = %id, "taxonomy entry deleted");
        Ok(())
    }
}

/// Reject incomplete or malformed drafts before any write is attempted.
fn validate_draft(draft: &ArticleDraft) -> Result<ArticleFields, ContentError> {
    let mut field_errors = HashMap::new();

    let text_fields = [
        ("title", draft.title.trim()),
        ("author", draft.author.trim()),
        ("layout", draft.layout.trim()),
        ("description", draft.description.trim()),
        ("editor", draft.editor.trim()),
        ("month", draft.month.trim()),
        ("year", draft.year.trim()),
    ];
    for (name, value) in text_fields {
        if value.is_empty() {
            field_errors.insert(name.to_string(), "This field is required".to_string());
        }
    }

    let page_count = draft.page_count.trim();
    let page_count = if page_count.is_empty() {
        field_errors.insert(
            "page_count".to_string(),
            "This field is required".to_string(),
        );
        0
    } else {
        match page_count.parse::<i64>() {
            Ok(n) if n > 0 => n,
            _ => {
                field_errors.insert(
                    "page_count".to_string(),
                    "Page count must be a positive whole number".to_string(),
                );
                0
            }
        }
    };

    let year = draft.year.trim();
    if !year.is_empty() && !(year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())) {
        field_errors.insert(
            "year".to_string(),
            "Year must be a four digit year".to_string(),
        );
    }

    if !field_errors.is_empty() {
        return Err(ContentError::Validation {
            message: "Missing or invalid article fields".to_string(),
            field_errors,
        });
    }

    Ok(ArticleFields {
        title: draft.title.trim().to_string(),
        author: draft.author.trim().to_string(),
        layout: draft.layout.trim().to_string(),
        page_count,
        description: draft.description.trim().to_string(),
        editor: draft.editor.trim().to_string(),
        month: draft.month.trim().to_string(),
        year: year.to_string(),
    })
}

fn required_value(kind: TaxonomyKind, value: &str) -> Result<String, ContentError> {
    let value = value.trim();
    if value.is_empty() {
        let mut field_errors = HashMap::new();
        field_errors.insert("value".to_string(), "This field is required".to_string());
        return Err(ContentError::Validation {
            message: format!("Missing {} value", kind.label()),
            field_errors,
        });
    }

    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_pool;

    fn auth() -> AuthUser {
        AuthUser {
            user_id: "user-1".to_string(),
            username: "alice".to_string(),
        }
    }

    fn draft() -> ArticleDraft {
        ArticleDraft {
            title: "Issue 1".to_string(),
            author: "Sam Hart".to_string(),
            layout: "Feature".to_string(),
            page_count: "6".to_string(),
            description: "City nights".to_string(),
            editor: "Jane Doe".to_string(),
            month: "June".to_string(),
            year: "2021".to_string(),
        }
    }

    #[test]
    fn validate_draft_parses_semantic_fields() {
        let fields = validate_draft(&draft()).expect("valid");
        assert_eq!(fields.page_count, 6);
        assert_eq!(fields.year, "2021");
    }

    #[test]
    fn validate_draft_collects_all_field_errors() {
        let bad = ArticleDraft {
            page_count: "minus two".to_string(),
            year: "21".to_string(),
            ..ArticleDraft::default()
        };

        let err = validate_draft(&bad).expect_err("invalid");
        let ContentError::Validation { field_errors, .. } = err else {
            panic!("expected validation error");
        };

        assert!(field_errors.contains_key("title"));
        assert!(field_errors.contains_key("page_count"));
        assert!(field_errors.contains_key("year"));
    }

    #[test]
    fn validate_draft_rejects_zero_page_count() {
        let mut bad = draft();
        bad.page_count = "0".to_string();
        assert!(validate_draft(&bad).is_err());
    }

    #[tokio::test]
    async fn invalid_draft_writes_nothing() {
        let service = ContentService::new(test_pool().await);

        let err = service
            .add_article(&auth(), &ArticleDraft::default())
            .await
            .expect_err("invalid");
        assert!(matches!(err, ContentError::Validation { .. }));
        assert!(service.list_articles().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn taxonomy_edits_never_touch_existing_articles() {
        let service = ContentService::new(test_pool().await);
        let auth = auth();

        let editor = service
            .add_taxonomy(&auth, TaxonomyKind::Editor, "Jane Doe")
            .await
            .expect("add editor");
        let article = service.add_article(&auth, &draft()).await.expect("add article");

        service
            .edit_taxonomy(&auth, TaxonomyKind::Editor, &editor.id, "Janet Doe")
            .await
            .expect("edit editor");
        assert_eq!(
            service.get_article(&article.id).await.expect("get").editor,
            "Jane Doe"
        );

        service
            .delete_taxonomy(&auth, TaxonomyKind::Editor, &editor.id)
            .await
            .expect("delete editor");
        assert_eq!(
            service.get_article(&article.id).await.expect("get").editor,
            "Jane Doe"
        );
    }

    #[tokio::test]
    async fn form_options_cover_every_kind() {
        let service = ContentService::new(test_pool().await);
        let auth = auth();

        for kind in TaxonomyKind::ALL {
            service
                .add_taxonomy(&auth, kind, &format!("{} value", kind.label()))
                .await
                .expect("add");
        }

        let options = service.form_options().await.expect("options");
        assert_eq!(options.editors.len(), 1);
        assert_eq!(options.authors.len(), 1);
        assert_eq!(options.months.len(), 1);
        assert_eq!(options.years.len(), 1);
        assert_eq!(options.sections.len(), 1);
    }
}
