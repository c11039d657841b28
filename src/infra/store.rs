//! Filesystem-backed content store.
//!
//! Layout under the root directory:
//!
//! ```text
//! categories.json                         array of category links
//! articles/<category-slug>/<slug>.json    article record with its body document
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::application::repos::{ContentStore, StoreError};
use crate::domain::{articles::ArticleRecord, categories::CategoryMap, document::Document};

const CATEGORIES_FILE: &str = "categories.json";
const ARTICLES_DIR: &str = "articles";

#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn article_path(&self, category_slug: &str, article_slug: &str) -> Result<PathBuf, StoreError> {
        validate_slug(category_slug)?;
        validate_slug(article_slug)?;
        Ok(self
            .root
            .join(ARTICLES_DIR)
            .join(category_slug)
            .join(format!("{article_slug}.json")))
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn fetch_category_mapping(&self) -> Result<CategoryMap, StoreError> {
        load_categories(&self.root.join(CATEGORIES_FILE)).await
    }

    async fn fetch_article_document(
        &self,
        category_slug: &str,
        article_slug: &str,
    ) -> Result<Option<ArticleRecord>, StoreError> {
        let path = self.article_path(category_slug, article_slug)?;
        load_article(&path).await
    }
}

/// Read a category list (array of category links) from any path.
pub async fn load_categories(path: &Path) -> Result<CategoryMap, StoreError> {
    let bytes = fs::read(path).await.map_err(StoreError::unavailable)?;
    let categories: CategoryMap = serde_json::from_slice(&bytes)
        .map_err(|err| StoreError::decode(path.display().to_string(), err))?;

    debug!(
        target = "infra::store",
        path = %path.display(),
        categories = categories.len(),
        "category mapping loaded"
    );
    Ok(categories)
}

/// Read a body document from a file holding either a full article record or a
/// bare `document` node.
pub async fn load_document(path: &Path) -> Result<Document, StoreError> {
    let resource = path.display().to_string();
    let bytes = fs::read(path).await.map_err(StoreError::unavailable)?;
    let mut value: Value =
        serde_json::from_slice(&bytes).map_err(|err| StoreError::decode(&resource, err))?;

    let document = if value.get("body").is_some() {
        value["body"].take()
    } else {
        value
    };
    Document::from_value(document).map_err(|err| StoreError::document(resource, err))
}

async fn load_article(path: &Path) -> Result<Option<ArticleRecord>, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::unavailable(err)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| StoreError::decode(path.display().to_string(), err))
}

fn validate_slug(slug: &str) -> Result<(), StoreError> {
    let valid = !slug.is_empty()
        && !slug.starts_with('.')
        && slug
            .chars()
            .all(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::invalid_input(format!("invalid slug `{slug}`")))
    }
}
