//! Category metadata supplied by the content store.
//!
//! The renderer only ever reads from a [`CategoryMap`]; it is built once per page
//! build and shared across concurrent renders.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Navigation metadata for a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLink {
    pub id: String,
    /// Site-relative path such as `/tech`, computed by the caller.
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub linked_article_count: u32,
}

/// Read-only lookup from category id to its [`CategoryLink`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    links: HashMap<String, CategoryLink>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&CategoryLink> {
        self.links.get(id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Find a category by the last segment of its path (`/tech` → `tech`).
    pub fn find_by_slug(&self, slug: &str) -> Option<&CategoryLink> {
        self.links
            .values()
            .find(|link| link.path.trim_matches('/') == slug)
    }
}

impl FromIterator<CategoryLink> for CategoryMap {
    fn from_iter<T: IntoIterator<Item = CategoryLink>>(iter: T) -> Self {
        let links = iter
            .into_iter()
            .map(|link| (link.id.clone(), link))
            .collect();
        Self { links }
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let links = Vec::<CategoryLink>::deserialize(deserializer)?;
        Ok(links.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(id: &str, path: &str) -> CategoryLink {
        CategoryLink {
            id: id.to_string(),
            path: path.to_string(),
            title: id.to_uppercase(),
            linked_article_count: 0,
        }
    }

    #[test]
    fn deserializes_from_link_array() {
        let json = r#"[
            {"id": "cat1", "path": "/tech", "title": "Tech", "linkedArticleCount": 3},
            {"id": "cat2", "path": "/life", "title": "Life"}
        ]"#;

        let map: CategoryMap = serde_json::from_str(json).expect("category map");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("cat1").map(|l| l.linked_article_count), Some(3));
        assert_eq!(map.get("cat2").map(|l| l.path.as_str()), Some("/life"));
    }

    #[test]
    fn find_by_slug_ignores_slashes() {
        let map: CategoryMap = [link("cat1", "/tech/"), link("cat2", "/life")]
            .into_iter()
            .collect();

        assert_eq!(map.find_by_slug("tech").map(|l| l.id.as_str()), Some("cat1"));
        assert!(map.find_by_slug("missing").is_none());
    }
}
