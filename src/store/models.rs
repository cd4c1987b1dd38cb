use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A registered editor account. The password is only ever held as a salted
/// argon2 hash and is never serialized into responses.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A catalog entry for one magazine article. The `author`, `editor`, `month`
/// and `year` fields hold taxonomy *values* copied at write time, not
/// references; later taxonomy edits do not touch existing articles.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub author: String,
    pub layout: String,
    pub page_count: i64,
    pub description: String,
    pub editor: String,
    pub month: String,
    pub year: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The editable field set of an article, validated by the content service
/// before it reaches the store. Updates replace all of these wholesale.
#[derive(Debug, Clone)]
pub struct ArticleFields {
    pub title: String,
    pub author: String,
    pub layout: String,
    pub page_count: i64,
    pub description: String,
    pub editor: String,
    pub month: String,
    pub year: String,
}

/// One reusable reference value within a taxonomy collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TaxonomyEntry {
    pub id: String,
    pub value: String,
}

/// The taxonomy collections the catalog classifies articles by. Each kind is
/// stored independently; the table name is derived from the kind and never
/// from request input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    Editor,
    Author,
    Month,
    Year,
    Section,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 5] = [
        TaxonomyKind::Editor,
        TaxonomyKind::Author,
        TaxonomyKind::Month,
        TaxonomyKind::Year,
        TaxonomyKind::Section,
    ];

    /// Collection (table) name, also the URL segment for this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            TaxonomyKind::Editor => "editors",
            TaxonomyKind::Author => "authors",
            TaxonomyKind::Month => "months",
            TaxonomyKind::Year => "years",
            TaxonomyKind::Section => "sections",
        }
    }

    /// Singular label used in user-visible messages.
    pub fn label(&self) -> &'static str {
        match self {
            TaxonomyKind::Editor => "editor",
            TaxonomyKind::Author => "author",
            TaxonomyKind::Month => "month",
            TaxonomyKind::Year => "year",
            TaxonomyKind::Section => "section",
        }
    }

    pub fn from_collection(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection() == segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_collection_name() {
        for kind in TaxonomyKind::ALL {
            assert_eq!(TaxonomyKind::from_collection(kind.collection()), Some(kind));
        }
    }

    #[test]
    fn unknown_collection_is_rejected() {
        assert_eq!(TaxonomyKind::from_collection("articles"), None);
        assert_eq!(TaxonomyKind::from_collection("editor"), None);
        assert_eq!(TaxonomyKind::from_collection(""), None);
    }

    #[test]
    fn user_serialization_omits_password_hash() {
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            password_hash: "$argon2id$...".to_string(),
            created_at: chrono::Utc::now(),
        };
        let value = serde_json::to_value(&user).expect("serialize");
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["username"], "alice");
    }
}
