//! Table of contents extraction.
//!
//! Runs independently of the renderer over the same document. Headings without a
//! leading text run have no anchor and are left out of the list, matching the
//! renderer, which emits them without an id.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::document::{Document, HeadingLevel, Node};

use super::anchor::{Anchor, heading_anchor};

/// Which heading levels the extractor collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocOptions {
    levels: BTreeSet<HeadingLevel>,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            levels: HeadingLevel::ALL.into_iter().collect(),
        }
    }
}

impl TocOptions {
    pub fn with_levels(levels: impl IntoIterator<Item = HeadingLevel>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }

    pub fn includes(&self, level: HeadingLevel) -> bool {
        self.levels.contains(&level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub anchor: Anchor,
}

/// Entry together with the headings nested beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocNode {
    #[serde(flatten)]
    pub entry: TocEntry,
    pub children: Vec<TocNode>,
}

/// Headings in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TableOfContents {
    entries: Vec<TocEntry>,
}

impl TableOfContents {
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Nest entries under the closest preceding entry with a lower level.
    pub fn nested(&self) -> Vec<TocNode> {
        let parents = compute_parent_indices(&self.entries);
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.entries.len()];
        let mut roots = Vec::new();

        for (idx, parent) in parents.into_iter().enumerate() {
            match parent {
                Some(parent) => children[parent].push(idx),
                None => roots.push(idx),
            }
        }

        roots
            .into_iter()
            .map(|idx| self.build_node(idx, &children))
            .collect()
    }

    fn build_node(&self, idx: usize, children: &[Vec<usize>]) -> TocNode {
        TocNode {
            entry: self.entries[idx].clone(),
            children: children[idx]
                .iter()
                .map(|&child| self.build_node(child, children))
                .collect(),
        }
    }
}

/// Collect anchored headings from anywhere in the document.
pub fn extract(document: &Document, options: &TocOptions) -> TableOfContents {
    let mut entries = Vec::new();
    for node in &document.content {
        collect(node, options, &mut entries);
    }
    TableOfContents { entries }
}

fn collect(node: &Node, options: &TocOptions, entries: &mut Vec<TocEntry>) {
    if let Node::Heading { level, content } = node {
        if options.includes(*level)
            && let Some(anchor) = heading_anchor(content)
        {
            entries.push(TocEntry {
                level: level.get(),
                text: node.plain_text(),
                anchor,
            });
        }
        return;
    }

    for child in node.children() {
        collect(child, options, entries);
    }
}

fn compute_parent_indices(entries: &[TocEntry]) -> Vec<Option<usize>> {
    let mut parent_indices = vec![None; entries.len()];
    let mut stack: Vec<(u8, usize)> = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        while let Some(&(level, _)) = stack.last() {
            if level < entry.level {
                break;
            }
            stack.pop();
        }
        parent_indices[idx] = stack.last().map(|&(_, parent_idx)| parent_idx);
        stack.push((entry.level, idx));
    }

    parent_indices
}
