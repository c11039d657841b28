//! Typed document model and the JSON ingestion boundary.
//!
//! Content-store payloads are loosely typed (`nodeType` tags with free-form `data`
//! objects). They are validated exactly once here; the renderer and the table of
//! contents extractor only ever see the typed [`Node`] tree.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::error::DocumentError;

const TAG_DOCUMENT: &str = "document";
const TAG_PARAGRAPH: &str = "paragraph";
const TAG_TEXT: &str = "text";
const TAG_HYPERLINK: &str = "hyperlink";
const TAG_ASSET_BLOCK: &str = "embedded-asset-block";
const TAG_ENTRY_BLOCK: &str = "embedded-entry-block";
const TAG_ENTRY_INLINE: &str = "embedded-entry-inline";

/// Root of one article body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub content: Vec<Node>,
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Self { content }
    }

    /// Parse and validate a wire-format document.
    pub fn from_json(input: &str) -> Result<Self, DocumentError> {
        let value: Value =
            serde_json::from_str(input).map_err(|err| DocumentError::malformed(err.to_string()))?;
        Self::from_value(value)
    }

    /// Validate an already-decoded wire-format document.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let raw: RawNode =
            serde_json::from_value(value).map_err(|err| DocumentError::shape(err.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawNode) -> Result<Self, DocumentError> {
        if raw.node_type != TAG_DOCUMENT {
            return Err(DocumentError::UnexpectedRoot {
                found: raw.node_type,
            });
        }
        Ok(Self {
            content: ingest_children(raw.content)?,
        })
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawNode::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

/// Heading levels that carry presentation semantics. `heading-1` is reserved for
/// the page title and is treated as a plain container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeadingLevel {
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 5] = [Self::H2, Self::H3, Self::H4, Self::H5, Self::H6];

    pub fn from_u8(level: u8) -> Option<Self> {
        match level {
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            4 => Some(Self::H4),
            5 => Some(Self::H5),
            6 => Some(Self::H6),
            _ => None,
        }
    }

    pub fn get(self) -> u8 {
        match self {
            Self::H2 => 2,
            Self::H3 => 3,
            Self::H4 => 4,
            Self::H5 => 5,
            Self::H6 => 6,
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        tag.strip_prefix("heading-")
            .and_then(|value| value.parse::<u8>().ok())
            .and_then(Self::from_u8)
    }
}

/// Style tag attached to a text run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
    Superscript,
    Subscript,
    Other(String),
}

impl Mark {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "code" => Self::Code,
            "superscript" => Self::Superscript,
            "subscript" => Self::Subscript,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Code => "code",
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

impl serde::Serialize for Mark {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub value: String,
    /// Distinct marks in payload order.
    pub marks: Vec<Mark>,
}

impl TextRun {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            marks: Vec::new(),
        }
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        if !self.marks.contains(&mark) {
            self.marks.push(mark);
        }
        self
    }

    pub fn has_mark(&self, mark: &Mark) -> bool {
        self.marks.contains(mark)
    }

    pub fn is_code(&self) -> bool {
        self.has_mark(&Mark::Code)
    }
}

/// Media file referenced by an embedded-asset block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// File URL; the content store serves these scheme-relative (`//host/path`).
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Empty when the author left no description.
    pub description: String,
}

/// Lightweight article reference carried by embedded entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    pub title: Option<String>,
    pub slug: String,
    pub category_id: String,
    pub created_at: OffsetDateTime,
}

/// Node types rendered by identity pass-through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    Heading1,
    UnorderedList,
    OrderedList,
    ListItem,
    Blockquote,
    HorizontalRule,
    Table,
    TableRow,
    TableCell,
    TableHeaderCell,
    EntryHyperlink,
    AssetHyperlink,
    Other(String),
}

impl ContainerKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "heading-1" => Self::Heading1,
            "unordered-list" => Self::UnorderedList,
            "ordered-list" => Self::OrderedList,
            "list-item" => Self::ListItem,
            "blockquote" => Self::Blockquote,
            "hr" => Self::HorizontalRule,
            "table" => Self::Table,
            "table-row" => Self::TableRow,
            "table-cell" => Self::TableCell,
            "table-header-cell" => Self::TableHeaderCell,
            "entry-hyperlink" => Self::EntryHyperlink,
            "asset-hyperlink" => Self::AssetHyperlink,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Heading1 => "heading-1",
            Self::UnorderedList => "unordered-list",
            Self::OrderedList => "ordered-list",
            Self::ListItem => "list-item",
            Self::Blockquote => "blockquote",
            Self::HorizontalRule => "hr",
            Self::Table => "table",
            Self::TableRow => "table-row",
            Self::TableCell => "table-cell",
            Self::TableHeaderCell => "table-header-cell",
            Self::EntryHyperlink => "entry-hyperlink",
            Self::AssetHyperlink => "asset-hyperlink",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading {
        level: HeadingLevel,
        content: Vec<Node>,
    },
    Paragraph {
        content: Vec<Node>,
    },
    EmbeddedAsset(Asset),
    EmbeddedEntryBlock(ArticleSummary),
    EmbeddedEntryInline(ArticleSummary),
    /// `uri` is `None` when the payload carried no usable link target.
    Hyperlink {
        uri: Option<String>,
        content: Vec<Node>,
    },
    Text(TextRun),
    Container {
        kind: ContainerKind,
        content: Vec<Node>,
    },
}

impl Node {
    pub fn heading(level: HeadingLevel, content: Vec<Node>) -> Self {
        Self::Heading { level, content }
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Self::Paragraph { content }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(TextRun::new(value))
    }

    pub fn hyperlink(uri: impl Into<String>, content: Vec<Node>) -> Self {
        Self::Hyperlink {
            uri: Some(uri.into()),
            content,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Self::Heading { content, .. }
            | Self::Paragraph { content }
            | Self::Hyperlink { content, .. }
            | Self::Container { content, .. } => content,
            Self::EmbeddedAsset(_)
            | Self::EmbeddedEntryBlock(_)
            | Self::EmbeddedEntryInline(_)
            | Self::Text(_) => &[],
        }
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Self::Text(run) => Some(run),
            _ => None,
        }
    }

    /// Concatenated value of every text run beneath this node.
    pub fn plain_text(&self) -> String {
        let mut buffer = String::new();
        collect_text(self, &mut buffer);
        buffer
    }
}

fn collect_text(node: &Node, buffer: &mut String) {
    if let Node::Text(run) = node {
        buffer.push_str(&run.value);
        return;
    }
    for child in node.children() {
        collect_text(child, buffer);
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    node_type: String,
    #[serde(default)]
    content: Vec<RawNode>,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    marks: Vec<RawMark>,
}

#[derive(Debug, Deserialize)]
struct RawMark {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(default)]
    title: Option<String>,
    slug: Option<String>,
    category_id: Option<String>,
    created_at: Option<String>,
}

fn ingest_children(raw: Vec<RawNode>) -> Result<Vec<Node>, DocumentError> {
    raw.into_iter().map(ingest_node).collect()
}

fn ingest_node(raw: RawNode) -> Result<Node, DocumentError> {
    let RawNode {
        node_type,
        content,
        data,
        value,
        marks,
    } = raw;

    if let Some(level) = HeadingLevel::from_tag(&node_type) {
        return Ok(Node::Heading {
            level,
            content: ingest_children(content)?,
        });
    }

    match node_type.as_str() {
        TAG_PARAGRAPH => Ok(Node::Paragraph {
            content: ingest_children(content)?,
        }),
        TAG_TEXT => {
            let value = value.ok_or_else(|| DocumentError::missing(TAG_TEXT, "value"))?;
            let run = marks
                .into_iter()
                .fold(TextRun::new(value), |run, mark| {
                    run.with_mark(Mark::from_tag(&mark.kind))
                });
            Ok(Node::Text(run))
        }
        TAG_HYPERLINK => Ok(Node::Hyperlink {
            uri: data
                .get("uri")
                .and_then(Value::as_str)
                .map(str::to_string),
            content: ingest_children(content)?,
        }),
        TAG_ASSET_BLOCK => ingest_asset(&data).map(Node::EmbeddedAsset),
        TAG_ENTRY_BLOCK => ingest_entry(TAG_ENTRY_BLOCK, &data).map(Node::EmbeddedEntryBlock),
        TAG_ENTRY_INLINE => ingest_entry(TAG_ENTRY_INLINE, &data).map(Node::EmbeddedEntryInline),
        other => Ok(Node::Container {
            kind: ContainerKind::from_tag(other),
            content: ingest_children(content)?,
        }),
    }
}

fn target<'a>(node_type: &'static str, data: &'a Value) -> Result<&'a Value, DocumentError> {
    data.get("target")
        .filter(|target| target.is_object())
        .ok_or_else(|| DocumentError::missing(node_type, "target"))
}

fn ingest_asset(data: &Value) -> Result<Asset, DocumentError> {
    let raw: RawAsset = serde_json::from_value(target(TAG_ASSET_BLOCK, data)?.clone())
        .map_err(|err| DocumentError::invalid(TAG_ASSET_BLOCK, "target", err.to_string()))?;

    let url = raw
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| DocumentError::missing(TAG_ASSET_BLOCK, "url"))?;
    let width = raw
        .width
        .ok_or_else(|| DocumentError::missing(TAG_ASSET_BLOCK, "width"))?;
    let height = raw
        .height
        .ok_or_else(|| DocumentError::missing(TAG_ASSET_BLOCK, "height"))?;

    Ok(Asset {
        url,
        width,
        height,
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
    })
}

fn ingest_entry(node_type: &'static str, data: &Value) -> Result<ArticleSummary, DocumentError> {
    let raw: RawEntry = serde_json::from_value(target(node_type, data)?.clone())
        .map_err(|err| DocumentError::invalid(node_type, "target", err.to_string()))?;

    let slug = raw
        .slug
        .ok_or_else(|| DocumentError::missing(node_type, "slug"))?;
    let category_id = raw
        .category_id
        .ok_or_else(|| DocumentError::missing(node_type, "categoryId"))?;
    let created_at = raw
        .created_at
        .ok_or_else(|| DocumentError::missing(node_type, "createdAt"))?;
    let created_at = OffsetDateTime::parse(&created_at, &Rfc3339)
        .map_err(|err| DocumentError::invalid(node_type, "createdAt", err.to_string()))?;

    Ok(ArticleSummary {
        title: raw.title,
        slug,
        category_id,
        created_at,
    })
}
