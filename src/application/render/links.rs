//! Hyperlink target classification: embedded video or plain external link.

use url::Url;

const VIDEO_SHORT_LINK_HOSTS: &[&str] = &["youtu.be", "www.youtu.be"];

/// How a hyperlink target should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// Short link to a hosted video; rendered as an embedded player.
    Video { video_id: String },
    Generic,
}

/// Classify a hyperlink target. Every input maps to exactly one kind.
///
/// A video link is an `http(s)` URL on the short-link host whose path is a single
/// non-empty segment, e.g. `https://youtu.be/abc123?t=42`.
pub fn classify(uri: &str) -> LinkKind {
    let Ok(parsed) = Url::parse(uri.trim()) else {
        return LinkKind::Generic;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return LinkKind::Generic;
    }

    let is_short_link_host = parsed
        .host_str()
        .is_some_and(|host| VIDEO_SHORT_LINK_HOSTS.contains(&host));
    if !is_short_link_host {
        return LinkKind::Generic;
    }

    let mut segments = match parsed.path_segments() {
        Some(segments) => segments.filter(|segment| !segment.is_empty()),
        None => return LinkKind::Generic,
    };

    match (segments.next(), segments.next()) {
        (Some(video_id), None) => LinkKind::Video {
            video_id: video_id.to_string(),
        },
        _ => LinkKind::Generic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str) -> LinkKind {
        LinkKind::Video {
            video_id: id.to_string(),
        }
    }

    #[test]
    fn short_links_are_videos() {
        assert_eq!(classify("https://youtu.be/abc123"), video("abc123"));
        assert_eq!(classify("http://youtu.be/xyz/"), video("xyz"));
        assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ?t=42"), video("dQw4w9WgXcQ"));
    }

    #[test]
    fn other_links_are_generic() {
        for uri in [
            "https://example.com/page",
            "https://youtu.be/",
            "https://youtu.be/a/b",
            "https://notyoutu.be/abc",
            "ftp://youtu.be/abc",
            "youtu.be/abc",
            "",
            "not a url",
        ] {
            assert_eq!(classify(uri), LinkKind::Generic, "{uri}");
        }
    }
}
