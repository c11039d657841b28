//! Rendering engine for structured rich-text article documents.
//!
//! Documents enter through [`domain::document::Document::from_json`], are rendered by
//! [`application::render`] into an output tree, and are indexed by the table of
//! contents extractor that shares the same heading anchors.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
