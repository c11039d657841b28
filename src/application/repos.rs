//! Content-store seam. The store is remote and asynchronous; the renderer never
//! talks to it directly.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{articles::ArticleRecord, categories::CategoryMap, error::DocumentError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content store unavailable: {0}")]
    Unavailable(String),
    #[error("failed to decode `{resource}`: {message}")]
    Decode { resource: String, message: String },
    #[error("invalid document in `{resource}`: {source}")]
    Document {
        resource: String,
        #[source]
        source: DocumentError,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl StoreError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }

    pub fn decode(resource: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            resource: resource.into(),
            message: err.to_string(),
        }
    }

    pub fn document(resource: impl Into<String>, source: DocumentError) -> Self {
        Self::Document {
            resource: resource.into(),
            source,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every category keyed by id.
    async fn fetch_category_mapping(&self) -> Result<CategoryMap, StoreError>;

    /// The article filed under `category_slug`, or `None` when it does not exist.
    async fn fetch_article_document(
        &self,
        category_slug: &str,
        article_slug: &str,
    ) -> Result<Option<ArticleRecord>, StoreError>;
}
