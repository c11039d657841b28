//! Content-addressed heading anchors.
//!
//! The renderer and the table of contents extractor both go through
//! [`heading_anchor`], so a heading and its navigation entry always agree. Two
//! headings that start with the same text run share an anchor.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::document::Node;

/// Deep-link identifier attached to a heading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Anchor(String);

impl Anchor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase hex SHA-256 of the exact input bytes.
pub fn anchor(text: &str) -> Anchor {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    Anchor(hex::encode(hasher.finalize()))
}

/// Anchor for a heading with the given children, or `None` when the first child
/// is not a text run.
pub fn heading_anchor(content: &[Node]) -> Option<Anchor> {
    content
        .first()
        .and_then(Node::as_text)
        .map(|run| anchor(&run.value))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::domain::document::{ArticleSummary, Mark, TextRun};

    #[test]
    fn anchor_is_sha256_hex() {
        assert_eq!(
            anchor("Intro").as_str(),
            "24601bcaae6e170b381367ec4f4475786c6dbef5e8332f8903779c76d298d304"
        );
    }

    #[test]
    fn anchor_is_deterministic() {
        for text in ["Overview", "Getting started", "深入理解", " padded "] {
            assert_eq!(anchor(text), anchor(text));
        }
        assert_ne!(anchor("Padded"), anchor(" Padded"));
    }

    #[test]
    fn heading_anchor_uses_first_text_run_only() {
        let content = vec![
            Node::Text(TextRun::new("Setup").with_mark(Mark::Bold)),
            Node::text(" and more"),
        ];
        assert_eq!(heading_anchor(&content), Some(anchor("Setup")));
    }

    #[test]
    fn heading_anchor_is_absent_without_leading_text() {
        let entry = Node::EmbeddedEntryInline(ArticleSummary {
            title: Some("Other".to_string()),
            slug: "other".to_string(),
            category_id: "cat1".to_string(),
            created_at: datetime!(2024-01-01 0:00 UTC),
        });

        assert_eq!(heading_anchor(&[entry, Node::text("Setup")]), None);
        assert_eq!(heading_anchor(&[]), None);
    }
}
