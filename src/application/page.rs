use std::{sync::Arc, time::Instant};

use metrics::{counter, histogram};
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::application::render::{RenderOutput, RenderRequest, RenderService, TableOfContents};
use crate::application::repos::{ContentStore, StoreError};
use crate::domain::{
    articles::ArticleRecord,
    categories::{CategoryLink, CategoryMap},
};

const SOURCE: &str = "application::page::ArticlePageService";

pub const METRIC_PAGE_RENDERED_TOTAL: &str = "quire_page_rendered_total";
pub const METRIC_PAGE_NOT_FOUND_TOTAL: &str = "quire_page_not_found_total";
pub const METRIC_PAGE_RENDER_MS: &str = "quire_page_render_ms";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("{entity} `{slug}` not found")]
    NotFound { entity: &'static str, slug: String },
    #[error("{operation} failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl PageError {
    fn not_found(entity: &'static str, slug: &str) -> Self {
        Self::NotFound {
            entity,
            slug: slug.to_string(),
        }
    }
}

/// Rendered article ready for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub title: String,
    pub slug: String,
    pub category: CategoryLink,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(flatten)]
    pub output: RenderOutput,
}

impl ArticlePage {
    pub fn html(&self) -> String {
        self.output.html()
    }
}

/// Composes content-store lookups with the rendering pipeline.
#[derive(Clone)]
pub struct ArticlePageService {
    store: Arc<dyn ContentStore>,
    renderer: Arc<dyn RenderService>,
}

impl ArticlePageService {
    pub fn new(store: Arc<dyn ContentStore>, renderer: Arc<dyn RenderService>) -> Self {
        Self { store, renderer }
    }

    pub async fn article_page(
        &self,
        category_slug: &str,
        article_slug: &str,
    ) -> Result<ArticlePage, PageError> {
        let (categories, category, article) =
            self.fetch_article(category_slug, article_slug).await?;

        let started_at = Instant::now();
        let output = self
            .renderer
            .render(&RenderRequest::new(&article.body, &categories));
        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        histogram!(METRIC_PAGE_RENDER_MS).record(elapsed_ms);
        counter!(METRIC_PAGE_RENDERED_TOTAL).increment(1);

        info!(
            target = SOURCE,
            category = category_slug,
            article = article_slug,
            top_level_nodes = output.nodes.len(),
            toc_entries = output.toc.len(),
            elapsed_ms,
            "article rendered"
        );

        Ok(ArticlePage {
            title: article.title,
            slug: article.slug,
            category,
            created_at: article.created_at,
            output,
        })
    }

    /// Table of contents for an article. The node tree is not rendered.
    pub async fn table_of_contents(
        &self,
        category_slug: &str,
        article_slug: &str,
    ) -> Result<TableOfContents, PageError> {
        let (_, _, article) = self.fetch_article(category_slug, article_slug).await?;
        let toc = self.renderer.table_of_contents(&article.body);

        debug!(
            target = SOURCE,
            category = category_slug,
            article = article_slug,
            toc_entries = toc.len(),
            "table of contents extracted"
        );
        Ok(toc)
    }

    async fn fetch_article(
        &self,
        category_slug: &str,
        article_slug: &str,
    ) -> Result<(CategoryMap, CategoryLink, ArticleRecord), PageError> {
        let (categories, article) = futures::try_join!(
            async {
                self.store
                    .fetch_category_mapping()
                    .await
                    .map_err(|source| store_failure("fetch_category_mapping", source))
            },
            async {
                self.store
                    .fetch_article_document(category_slug, article_slug)
                    .await
                    .map_err(|source| store_failure("fetch_article_document", source))
            },
        )?;

        let Some(category) = categories.find_by_slug(category_slug).cloned() else {
            return Err(not_found("category", category_slug));
        };
        let Some(article) = article else {
            return Err(not_found("article", article_slug));
        };
        if article.category_id != category.id {
            debug!(
                target = SOURCE,
                category = %category.id,
                article_category = %article.category_id,
                "article filed under a different category"
            );
            return Err(not_found("article", article_slug));
        }

        Ok((categories, category, article))
    }
}

fn store_failure(operation: &'static str, source: StoreError) -> PageError {
    PageError::Store { operation, source }
}

fn not_found(entity: &'static str, slug: &str) -> PageError {
    counter!(METRIC_PAGE_NOT_FOUND_TOTAL).increment(1);
    PageError::not_found(entity, slug)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use time::macros::datetime;

    use super::*;
    use crate::application::render::{OutputNode, StructuredRenderService, anchor};
    use crate::domain::document::{ArticleSummary, Document, HeadingLevel, Node};

    #[derive(Default)]
    struct MemoryStore {
        categories: Vec<CategoryLink>,
        articles: HashMap<(String, String), ArticleRecord>,
        unavailable: bool,
    }

    #[async_trait]
    impl ContentStore for MemoryStore {
        async fn fetch_category_mapping(&self) -> Result<CategoryMap, StoreError> {
            if self.unavailable {
                return Err(StoreError::unavailable("connection refused"));
            }
            Ok(self.categories.iter().cloned().collect())
        }

        async fn fetch_article_document(
            &self,
            category_slug: &str,
            article_slug: &str,
        ) -> Result<Option<ArticleRecord>, StoreError> {
            Ok(self
                .articles
                .get(&(category_slug.to_string(), article_slug.to_string()))
                .cloned())
        }
    }

    fn tech() -> CategoryLink {
        CategoryLink {
            id: "cat1".to_string(),
            path: "/tech".to_string(),
            title: "Tech".to_string(),
            linked_article_count: 1,
        }
    }

    fn article(category_id: &str) -> ArticleRecord {
        ArticleRecord {
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            category_id: category_id.to_string(),
            created_at: datetime!(2024-03-05 10:00 UTC),
            body: Document::new(vec![
                Node::heading(HeadingLevel::H2, vec![Node::text("Intro")]),
                Node::EmbeddedEntryBlock(ArticleSummary {
                    title: Some("Other".to_string()),
                    slug: "other".to_string(),
                    category_id: "cat1".to_string(),
                    created_at: datetime!(2024-01-02 08:00 UTC),
                }),
            ]),
        }
    }

    fn service(store: MemoryStore) -> ArticlePageService {
        ArticlePageService::new(
            Arc::new(store),
            Arc::new(StructuredRenderService::default()),
        )
    }

    fn store_with_article(category_id: &str) -> MemoryStore {
        let mut store = MemoryStore {
            categories: vec![tech()],
            ..MemoryStore::default()
        };
        store.articles.insert(
            ("tech".to_string(), "hello".to_string()),
            article(category_id),
        );
        store
    }

    #[tokio::test]
    async fn renders_existing_article() {
        let page = service(store_with_article("cat1"))
            .article_page("tech", "hello")
            .await
            .expect("page");

        assert_eq!(page.title, "Hello");
        assert_eq!(page.category.path, "/tech");
        assert_eq!(page.output.toc.entries()[0].anchor, anchor("Intro"));
        assert_eq!(
            page.output.nodes[1],
            OutputNode::SummaryCard {
                title: "Other".to_string(),
                href: "/tech/other".to_string(),
                date: "January 2, 2024".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn table_of_contents_uses_fetched_article() {
        let toc = service(store_with_article("cat1"))
            .table_of_contents("tech", "hello")
            .await
            .expect("toc");

        assert_eq!(toc.len(), 1);
        assert_eq!(toc.entries()[0].anchor, anchor("Intro"));
    }

    #[tokio::test]
    async fn missing_article_is_not_found() {
        let err = service(store_with_article("cat1"))
            .article_page("tech", "missing")
            .await
            .expect_err("not found");
        assert!(matches!(err, PageError::NotFound { entity: "article", .. }));
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let err = service(store_with_article("cat1"))
            .table_of_contents("life", "hello")
            .await
            .expect_err("not found");
        assert!(matches!(err, PageError::NotFound { entity: "category", .. }));
    }

    #[tokio::test]
    async fn article_in_other_category_is_not_found() {
        let err = service(store_with_article("cat2"))
            .article_page("tech", "hello")
            .await
            .expect_err("not found");
        assert!(matches!(err, PageError::NotFound { entity: "article", .. }));
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let store = MemoryStore {
            unavailable: true,
            ..MemoryStore::default()
        };
        let err = service(store)
            .article_page("tech", "hello")
            .await
            .expect_err("store failure");
        assert!(matches!(
            err,
            PageError::Store {
                operation: "fetch_category_mapping",
                ..
            }
        ));
    }
}
