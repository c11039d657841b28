//! Node renderer table: one handler per node type.
//!
//! The walk is a plain depth-first recursion over borrowed input; every handler
//! is total over the typed node model, so rendering never fails.

use tracing::debug_span;

use crate::{
    domain::{
        categories::CategoryMap,
        document::{ArticleSummary, Asset, Document, HeadingLevel, Node, TextRun},
    },
    util::timezone::DateFormatter,
};

use super::{
    anchor::heading_anchor,
    links::{LinkKind, classify},
    references::entry_href,
    types::{OutputNode, TextVariant},
};

/// Read-only inputs shared by every handler during one render.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub categories: &'a CategoryMap,
    pub dates: &'a dyn DateFormatter,
    /// Scheme prefixed to scheme-relative asset URLs, without the colon.
    pub asset_scheme: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(categories: &'a CategoryMap, dates: &'a dyn DateFormatter) -> Self {
        Self {
            categories,
            dates,
            asset_scheme: "https",
        }
    }

    pub fn with_asset_scheme(mut self, scheme: &'a str) -> Self {
        self.asset_scheme = scheme;
        self
    }
}

/// How a paragraph is presented, decided by its first child alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    Code,
    Prose,
    Generic,
}

pub fn classify_paragraph(content: &[Node]) -> ParagraphKind {
    match content.first().and_then(Node::as_text) {
        Some(run) if run.is_code() => ParagraphKind::Code,
        Some(_) => ParagraphKind::Prose,
        None => ParagraphKind::Generic,
    }
}

/// Render every top-level node of a document.
pub fn render_document(document: &Document, ctx: &RenderContext<'_>) -> Vec<OutputNode> {
    let span = debug_span!(
        target: "application::render::nodes",
        "render_document",
        top_level_nodes = document.content.len()
    );
    let _guard = span.enter();
    render_children(&document.content, ctx)
}

pub fn render_node(node: &Node, ctx: &RenderContext<'_>) -> OutputNode {
    match node {
        Node::Heading { level, content } => render_heading(*level, content, ctx),
        Node::Paragraph { content } => render_paragraph(content, ctx),
        Node::EmbeddedAsset(asset) => render_asset(asset, ctx),
        Node::EmbeddedEntryBlock(entry) => render_entry_block(entry, ctx),
        Node::EmbeddedEntryInline(entry) => render_entry_inline(entry, ctx),
        Node::Hyperlink { uri, content } => render_hyperlink(uri.as_deref(), content, ctx),
        Node::Text(run) => render_text(run),
        Node::Container { content, .. } => OutputNode::Fragment {
            children: render_children(content, ctx),
        },
    }
}

fn render_children(nodes: &[Node], ctx: &RenderContext<'_>) -> Vec<OutputNode> {
    nodes.iter().map(|node| render_node(node, ctx)).collect()
}

fn render_heading(level: HeadingLevel, content: &[Node], ctx: &RenderContext<'_>) -> OutputNode {
    OutputNode::Heading {
        level: level.get(),
        id: heading_anchor(content),
        children: render_children(content, ctx),
    }
}

fn render_paragraph(content: &[Node], ctx: &RenderContext<'_>) -> OutputNode {
    let children = render_children(content, ctx);
    match classify_paragraph(content) {
        ParagraphKind::Code => OutputNode::CodeBlock { children },
        ParagraphKind::Prose => OutputNode::Prose {
            variant: TextVariant::Body,
            children,
        },
        ParagraphKind::Generic => OutputNode::Block { children },
    }
}

fn render_asset(asset: &Asset, ctx: &RenderContext<'_>) -> OutputNode {
    let caption = (!asset.description.is_empty()).then(|| asset.description.clone());
    OutputNode::ImageEmbed {
        src: asset_src(&asset.url, ctx.asset_scheme),
        width: asset.width,
        height: asset.height,
        title: asset.title.clone(),
        caption,
    }
}

fn asset_src(url: &str, scheme: &str) -> String {
    if url.starts_with("//") {
        format!("{scheme}:{url}")
    } else {
        url.to_string()
    }
}

fn render_entry_block(entry: &ArticleSummary, ctx: &RenderContext<'_>) -> OutputNode {
    OutputNode::SummaryCard {
        title: entry.title.clone().unwrap_or_default(),
        href: entry_href(entry, ctx.categories),
        date: ctx.dates.format(entry.created_at),
    }
}

fn render_entry_inline(entry: &ArticleSummary, ctx: &RenderContext<'_>) -> OutputNode {
    OutputNode::EntryLink {
        label: entry.title.clone().unwrap_or_default(),
        href: entry_href(entry, ctx.categories),
    }
}

fn render_hyperlink(uri: Option<&str>, content: &[Node], ctx: &RenderContext<'_>) -> OutputNode {
    let Some(uri) = uri else {
        return OutputNode::Fragment {
            children: render_children(content, ctx),
        };
    };

    match classify(uri) {
        LinkKind::Video { video_id } => OutputNode::VideoEmbed { video_id },
        LinkKind::Generic => {
            let label = content
                .iter()
                .find_map(Node::as_text)
                .map_or_else(|| uri.to_string(), |run| run.value.clone());
            OutputNode::ExternalLink {
                href: uri.to_string(),
                label,
            }
        }
    }
}

fn render_text(run: &TextRun) -> OutputNode {
    OutputNode::Text {
        value: run.value.clone(),
        marks: run.marks.clone(),
    }
}
