use serde::Serialize;

use crate::domain::{categories::CategoryMap, document::Document, document::Mark};

use super::{anchor::Anchor, toc::TableOfContents};

/// Typography variant applied to prose paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextVariant {
    Body,
}

/// Presentation-ready node emitted by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OutputNode {
    /// Children rendered without a wrapping element.
    Fragment { children: Vec<OutputNode> },
    Heading {
        level: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Anchor>,
        children: Vec<OutputNode>,
    },
    Prose {
        variant: TextVariant,
        children: Vec<OutputNode>,
    },
    CodeBlock { children: Vec<OutputNode> },
    /// Paragraph container without text styling.
    Block { children: Vec<OutputNode> },
    ImageEmbed {
        src: String,
        width: u32,
        height: u32,
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    SummaryCard {
        title: String,
        href: String,
        date: String,
    },
    EntryLink { label: String, href: String },
    VideoEmbed { video_id: String },
    ExternalLink { href: String, label: String },
    Text { value: String, marks: Vec<Mark> },
}

impl OutputNode {
    pub fn children(&self) -> &[OutputNode] {
        match self {
            Self::Fragment { children }
            | Self::Heading { children, .. }
            | Self::Prose { children, .. }
            | Self::CodeBlock { children }
            | Self::Block { children } => children,
            Self::ImageEmbed { .. }
            | Self::SummaryCard { .. }
            | Self::EntryLink { .. }
            | Self::VideoEmbed { .. }
            | Self::ExternalLink { .. }
            | Self::Text { .. } => &[],
        }
    }

    /// Concatenated text of every text node beneath this node.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(self, &mut buffer);
        buffer
    }
}

fn collect_text(node: &OutputNode, buffer: &mut String) {
    match node {
        OutputNode::Text { value, .. } => buffer.push_str(value),
        OutputNode::ExternalLink { label, .. } | OutputNode::EntryLink { label, .. } => {
            buffer.push_str(label)
        }
        _ => {
            for child in node.children() {
                collect_text(child, buffer);
            }
        }
    }
}

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub document: &'a Document,
    /// Category lookup used to build embedded-entry hrefs. Never mutated.
    pub categories: &'a CategoryMap,
}

impl<'a> RenderRequest<'a> {
    pub fn new(document: &'a Document, categories: &'a CategoryMap) -> Self {
        Self {
            document,
            categories,
        }
    }
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    /// Top-level output nodes in document order.
    pub nodes: Vec<OutputNode>,
    pub toc: TableOfContents,
}

impl RenderOutput {
    pub fn html(&self) -> String {
        super::html::to_html(&self.nodes)
    }
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: the same request always yields the same output.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest<'_>) -> RenderOutput;

    /// Table of contents alone, without rendering the node tree.
    fn table_of_contents(&self, document: &Document) -> TableOfContents;
}
