//! Structured-document rendering engine.
//!
//! The pipeline is pure: it borrows a typed document and a category mapping,
//! produces a fresh output tree plus table of contents, and never fails. Fetching
//! documents and composing pages happen in the caller.

pub mod anchor;
pub mod html;
pub mod links;
pub mod nodes;
pub mod references;
mod service;
pub mod toc;
mod types;

pub use anchor::{Anchor, anchor, heading_anchor};
pub use links::{LinkKind, classify};
pub use nodes::{ParagraphKind, RenderContext, classify_paragraph, render_document, render_node};
pub use references::{UNRESOLVED_PATH, entry_href, resolve};
pub use service::{
    RenderConfigError, RenderPipelineConfig, StructuredRenderService, configure_render_service,
    render_service,
};
pub use toc::{TableOfContents, TocEntry, TocNode, TocOptions, extract};
pub use types::{OutputNode, RenderOutput, RenderRequest, RenderService, TextVariant};
