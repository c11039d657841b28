//! Category lookup for embedded-entry hrefs.

use tracing::warn;

use crate::domain::{categories::CategoryMap, document::ArticleSummary};

/// Path segment used when an entry's category is not in the mapping. The
/// resulting href (`undefined/<slug>`) is non-functional but renders.
pub const UNRESOLVED_PATH: &str = "undefined";

/// Look up the path for a category id.
pub fn resolve<'a>(category_id: &str, categories: &'a CategoryMap) -> Option<&'a str> {
    categories.get(category_id).map(|link| link.path.as_str())
}

/// Href for an embedded article: `<category path>/<slug>`.
pub fn entry_href(entry: &ArticleSummary, categories: &CategoryMap) -> String {
    let path = resolve(&entry.category_id, categories).unwrap_or_else(|| {
        warn!(
            target = "application::render::references",
            category_id = %entry.category_id,
            slug = %entry.slug,
            "category not found for embedded entry"
        );
        UNRESOLVED_PATH
    });
    format!("{path}/{}", entry.slug)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::domain::categories::CategoryLink;

    fn categories() -> CategoryMap {
        [CategoryLink {
            id: "cat1".to_string(),
            path: "/tech".to_string(),
            title: "Tech".to_string(),
            linked_article_count: 1,
        }]
        .into_iter()
        .collect()
    }

    fn entry(category_id: &str) -> ArticleSummary {
        ArticleSummary {
            title: None,
            slug: "foo".to_string(),
            category_id: category_id.to_string(),
            created_at: datetime!(2024-01-01 0:00 UTC),
        }
    }

    #[test]
    fn resolves_known_category() {
        let categories = categories();
        assert_eq!(resolve("cat1", &categories), Some("/tech"));
        assert_eq!(entry_href(&entry("cat1"), &categories), "/tech/foo");
    }

    #[test]
    fn missing_category_uses_marker() {
        let categories = categories();
        assert_eq!(resolve("missing", &categories), None);
        assert_eq!(entry_href(&entry("missing"), &categories), "undefined/foo");
        assert_eq!(categories.len(), 1);
    }
}
