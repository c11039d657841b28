use std::sync::Arc;

use chrono_tz::Tz;
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::debug;

use crate::{
    domain::document::{Document, HeadingLevel},
    util::timezone::{DEFAULT_DATE_PATTERN, DateFormatError, DateFormatter, ZonedDateFormatter},
};

use super::{
    nodes::{RenderContext, render_document},
    toc::{TableOfContents, TocOptions, extract},
    types::{RenderOutput, RenderRequest, RenderService},
};

pub const DEFAULT_ASSET_SCHEME: &str = "https";

#[derive(Debug, Clone)]
pub struct RenderPipelineConfig {
    pub date_pattern: String,
    pub timezone: Tz,
    /// Scheme for scheme-relative asset URLs, without the colon.
    pub asset_scheme: String,
    pub toc_levels: Vec<HeadingLevel>,
}

impl Default for RenderPipelineConfig {
    fn default() -> Self {
        Self {
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            timezone: Tz::UTC,
            asset_scheme: DEFAULT_ASSET_SCHEME.to_string(),
            toc_levels: HeadingLevel::ALL.to_vec(),
        }
    }
}

impl From<&crate::config::RenderSettings> for RenderPipelineConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            date_pattern: settings.date_pattern.clone(),
            timezone: settings.timezone,
            asset_scheme: settings.asset_scheme.clone(),
            toc_levels: settings.toc_levels.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderConfigError {
    #[error("render service already configured")]
    AlreadyConfigured,
    #[error(transparent)]
    DatePattern(#[from] DateFormatError),
    #[error("asset scheme `{scheme}` is not a valid URL scheme")]
    AssetScheme { scheme: String },
}

/// Default rendering pipeline: node renderer table plus table of contents.
pub struct StructuredRenderService {
    dates: Arc<dyn DateFormatter>,
    asset_scheme: String,
    toc: TocOptions,
}

impl StructuredRenderService {
    pub fn new(config: RenderPipelineConfig) -> Result<Self, RenderConfigError> {
        let dates = ZonedDateFormatter::new(&config.date_pattern, config.timezone)?;
        Self::with_date_formatter(config, Arc::new(dates))
    }

    /// Build a pipeline around a caller-supplied date formatter.
    pub fn with_date_formatter(
        config: RenderPipelineConfig,
        dates: Arc<dyn DateFormatter>,
    ) -> Result<Self, RenderConfigError> {
        let asset_scheme = normalize_scheme(&config.asset_scheme)?;
        Ok(Self {
            dates,
            asset_scheme,
            toc: TocOptions::with_levels(config.toc_levels),
        })
    }
}

impl Default for StructuredRenderService {
    fn default() -> Self {
        Self {
            dates: Arc::new(ZonedDateFormatter::default()),
            asset_scheme: DEFAULT_ASSET_SCHEME.to_string(),
            toc: TocOptions::default(),
        }
    }
}

impl RenderService for StructuredRenderService {
    fn render(&self, request: &RenderRequest<'_>) -> RenderOutput {
        let ctx = RenderContext::new(request.categories, self.dates.as_ref())
            .with_asset_scheme(&self.asset_scheme);

        let nodes = render_document(request.document, &ctx);
        let toc = extract(request.document, &self.toc);

        debug!(
            target = "application::render::service",
            top_level_nodes = nodes.len(),
            toc_entries = toc.len(),
            "document rendered"
        );

        RenderOutput { nodes, toc }
    }

    fn table_of_contents(&self, document: &Document) -> TableOfContents {
        extract(document, &self.toc)
    }
}

fn normalize_scheme(raw: &str) -> Result<String, RenderConfigError> {
    let scheme = raw.trim().trim_end_matches(':').to_ascii_lowercase();
    let valid = scheme
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'));
    if valid {
        Ok(scheme)
    } else {
        Err(RenderConfigError::AssetScheme {
            scheme: raw.to_string(),
        })
    }
}

static RENDER_SERVICE: OnceCell<Arc<StructuredRenderService>> = OnceCell::new();

/// Install the process-wide pipeline. Must run before the first [`render_service`] call.
pub fn configure_render_service(config: RenderPipelineConfig) -> Result<(), RenderConfigError> {
    let service = StructuredRenderService::new(config)?;
    RENDER_SERVICE
        .set(Arc::new(service))
        .map_err(|_| RenderConfigError::AlreadyConfigured)
}

/// Access the shared render service, falling back to defaults when unconfigured.
pub fn render_service() -> Arc<StructuredRenderService> {
    Arc::clone(RENDER_SERVICE.get_or_init(|| Arc::new(StructuredRenderService::default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::render::{OutputNode, anchor},
        domain::{
            categories::CategoryMap,
            document::{Asset, Document, Node},
        },
    };

    #[test]
    fn renderer_and_toc_share_anchors() {
        let document = Document::new(vec![
            Node::heading(HeadingLevel::H2, vec![Node::text("Intro")]),
            Node::heading(HeadingLevel::H3, vec![Node::text("Setup")]),
        ]);
        let categories = CategoryMap::new();
        let service = StructuredRenderService::default();

        let output = service.render(&RenderRequest::new(&document, &categories));

        let rendered_ids: Vec<_> = output
            .nodes
            .iter()
            .filter_map(|node| match node {
                OutputNode::Heading { id, .. } => id.clone(),
                _ => None,
            })
            .collect();
        let toc_ids: Vec<_> = output.toc.entries().iter().map(|e| e.anchor.clone()).collect();

        assert_eq!(rendered_ids, toc_ids);
        assert_eq!(toc_ids[0], anchor("Intro"));
    }

    #[test]
    fn configured_levels_limit_toc_only() {
        let document = Document::new(vec![
            Node::heading(HeadingLevel::H2, vec![Node::text("Intro")]),
            Node::heading(HeadingLevel::H4, vec![Node::text("Deep")]),
        ]);
        let categories = CategoryMap::new();
        let config = RenderPipelineConfig {
            toc_levels: vec![HeadingLevel::H2, HeadingLevel::H3],
            ..RenderPipelineConfig::default()
        };
        let service = StructuredRenderService::new(config).expect("valid config");

        let output = service.render(&RenderRequest::new(&document, &categories));

        assert_eq!(output.nodes.len(), 2);
        assert_eq!(output.toc.len(), 1);
    }

    #[test]
    fn standalone_toc_matches_rendered_toc() {
        let document = Document::new(vec![
            Node::heading(HeadingLevel::H2, vec![Node::text("Overview")]),
            Node::paragraph(vec![Node::text("body")]),
            Node::heading(HeadingLevel::H3, vec![Node::text("Setup")]),
        ]);
        let categories = CategoryMap::new();
        let service = StructuredRenderService::default();

        let toc = service.table_of_contents(&document);

        assert_eq!(toc, service.render(&RenderRequest::new(&document, &categories)).toc);
        assert_eq!(toc.len(), 2);
    }

    #[test]
    fn asset_scheme_accepts_trailing_colon() {
        let document = Document::new(vec![Node::EmbeddedAsset(Asset {
            url: "//img.example.net/a.png".to_string(),
            width: 1,
            height: 1,
            title: String::new(),
            description: String::new(),
        })]);
        let categories = CategoryMap::new();
        let config = RenderPipelineConfig {
            asset_scheme: "HTTP:".to_string(),
            ..RenderPipelineConfig::default()
        };
        let service = StructuredRenderService::new(config).expect("valid config");

        let output = service.render(&RenderRequest::new(&document, &categories));

        assert!(matches!(
            &output.nodes[0],
            OutputNode::ImageEmbed { src, .. } if src == "http://img.example.net/a.png"
        ));
    }

    #[test]
    fn rejects_invalid_configuration() {
        let bad_pattern = RenderPipelineConfig {
            date_pattern: "[unterminated".to_string(),
            ..RenderPipelineConfig::default()
        };
        assert!(matches!(
            StructuredRenderService::new(bad_pattern),
            Err(RenderConfigError::DatePattern(_))
        ));

        let bad_scheme = RenderPipelineConfig {
            asset_scheme: "ht tp".to_string(),
            ..RenderPipelineConfig::default()
        };
        assert!(matches!(
            StructuredRenderService::new(bad_scheme),
            Err(RenderConfigError::AssetScheme { .. })
        ));
    }
}
