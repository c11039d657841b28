use serde::Deserialize;
use time::OffsetDateTime;

use super::document::Document;

/// Article as returned by the content store: metadata plus its body document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub title: String,
    pub slug: String,
    pub category_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub body: Document,
}
