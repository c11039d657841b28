//! HTML serialisation of the output tree.

use crate::domain::document::Mark;

use super::types::OutputNode;

const VIDEO_EMBED_BASE: &str = "https://www.youtube.com/embed/";

pub fn to_html(nodes: &[OutputNode]) -> String {
    let mut writer = HtmlWriter::default();
    for node in nodes {
        writer.write_node(node);
    }
    writer.out
}

#[derive(Default)]
struct HtmlWriter {
    out: String,
    in_code_block: bool,
}

impl HtmlWriter {
    fn write_node(&mut self, node: &OutputNode) {
        match node {
            OutputNode::Fragment { children } => self.write_children(children),
            OutputNode::Heading {
                level,
                id,
                children,
            } => {
                self.out.push_str(&format!("<h{level}"));
                if let Some(id) = id {
                    self.push_attr("id", id.as_str());
                }
                self.out.push('>');
                self.write_children(children);
                self.out.push_str(&format!("</h{level}>"));
            }
            OutputNode::Prose { children, .. } => {
                self.out.push_str("<p data-variant=\"body\">");
                self.write_children(children);
                self.out.push_str("</p>");
            }
            OutputNode::CodeBlock { children } => {
                self.out.push_str("<pre><code>");
                let previous = std::mem::replace(&mut self.in_code_block, true);
                self.write_children(children);
                self.in_code_block = previous;
                self.out.push_str("</code></pre>");
            }
            OutputNode::Block { children } => {
                self.out.push_str("<p>");
                self.write_children(children);
                self.out.push_str("</p>");
            }
            OutputNode::ImageEmbed {
                src,
                width,
                height,
                title,
                caption,
            } => {
                self.out.push_str("<figure data-role=\"image-embed\"><img");
                self.push_attr("src", src);
                self.push_attr("width", &width.to_string());
                self.push_attr("height", &height.to_string());
                self.push_attr("alt", title);
                self.push_attr("title", title);
                self.out.push_str(" loading=\"lazy\">");
                if let Some(caption) = caption {
                    self.out.push_str("<figcaption>");
                    self.push_text(caption);
                    self.out.push_str("</figcaption>");
                }
                self.out.push_str("</figure>");
            }
            OutputNode::SummaryCard { title, href, date } => {
                self.out.push_str("<article data-role=\"summary-card\"><a");
                self.push_attr("href", href);
                self.out.push('>');
                self.push_text(title);
                self.out.push_str("</a><time>");
                self.push_text(date);
                self.out.push_str("</time></article>");
            }
            OutputNode::EntryLink { label, href } => {
                self.out.push_str("<a");
                self.push_attr("href", href);
                self.out.push_str(" data-link-kind=\"entry\">");
                self.push_text(label);
                self.out.push_str("</a>");
            }
            OutputNode::VideoEmbed { video_id } => {
                self.out.push_str("<div data-role=\"video-embed\"><iframe");
                self.push_attr("src", &format!("{VIDEO_EMBED_BASE}{video_id}"));
                self.out
                    .push_str(" loading=\"lazy\" allowfullscreen></iframe></div>");
            }
            OutputNode::ExternalLink { href, label } => {
                self.out.push_str("<a");
                self.push_attr("href", href);
                self.out
                    .push_str(" rel=\"noopener noreferrer\" data-link-kind=\"external\">");
                self.push_text(label);
                self.out.push_str("</a>");
            }
            OutputNode::Text { value, marks } => self.write_text(value, marks),
        }
    }

    fn write_children(&mut self, children: &[OutputNode]) {
        for child in children {
            self.write_node(child);
        }
    }

    fn write_text(&mut self, value: &str, marks: &[Mark]) {
        let tags: Vec<&str> = marks
            .iter()
            .filter_map(|mark| self.mark_tag(mark))
            .collect();
        for tag in &tags {
            self.out.push_str(&format!("<{tag}>"));
        }
        self.push_text(value);
        for tag in tags.iter().rev() {
            self.out.push_str(&format!("</{tag}>"));
        }
    }

    fn mark_tag(&self, mark: &Mark) -> Option<&'static str> {
        match mark {
            Mark::Bold => Some("strong"),
            Mark::Italic => Some("em"),
            Mark::Underline => Some("u"),
            Mark::Code if self.in_code_block => None,
            Mark::Code => Some("code"),
            Mark::Superscript => Some("sup"),
            Mark::Subscript => Some("sub"),
            Mark::Other(_) => None,
        }
    }

    fn push_attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        escape_into(&mut self.out, value);
        self.out.push('"');
    }

    fn push_text(&mut self, value: &str) {
        escape_into(&mut self.out, value);
    }
}

fn escape_into(buffer: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => buffer.push_str("&amp;"),
            '<' => buffer.push_str("&lt;"),
            '>' => buffer.push_str("&gt;"),
            '"' => buffer.push_str("&quot;"),
            '\'' => buffer.push_str("&#39;"),
            other => buffer.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render::{anchor::anchor, types::TextVariant};

    fn text(value: &str, marks: Vec<Mark>) -> OutputNode {
        OutputNode::Text {
            value: value.to_string(),
            marks,
        }
    }

    #[test]
    fn heading_carries_anchor_id() {
        let html = to_html(&[OutputNode::Heading {
            level: 2,
            id: Some(anchor("Intro")),
            children: vec![text("Intro", Vec::new())],
        }]);
        insta::assert_snapshot!(
            html,
            @r#"<h2 id="24601bcaae6e170b381367ec4f4475786c6dbef5e8332f8903779c76d298d304">Intro</h2>"#
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let html = to_html(&[OutputNode::ExternalLink {
            href: "https://example.com/?a=1&b=\"2\"".to_string(),
            label: "<script>".to_string(),
        }]);
        assert_eq!(
            html,
            "<a href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\" rel=\"noopener noreferrer\" \
             data-link-kind=\"external\">&lt;script&gt;</a>"
        );
    }

    #[test]
    fn marks_nest_in_order() {
        let html = to_html(&[OutputNode::Prose {
            variant: TextVariant::Body,
            children: vec![text("hi", vec![Mark::Bold, Mark::Italic])],
        }]);
        assert_eq!(html, "<p data-variant=\"body\"><strong><em>hi</em></strong></p>");
    }

    #[test]
    fn code_block_does_not_repeat_code_tag() {
        let html = to_html(&[OutputNode::CodeBlock {
            children: vec![text("a < b", vec![Mark::Code])],
        }]);
        assert_eq!(html, "<pre><code>a &lt; b</code></pre>");
    }

    #[test]
    fn caption_is_optional() {
        let image = |caption: Option<&str>| OutputNode::ImageEmbed {
            src: "https://img/a.png".to_string(),
            width: 4,
            height: 3,
            title: "A".to_string(),
            caption: caption.map(str::to_string),
        };

        assert!(!to_html(&[image(None)]).contains("figcaption"));
        assert!(to_html(&[image(Some("A photo"))]).contains("<figcaption>A photo</figcaption>"));
    }

    #[test]
    fn video_embed_uses_player_url() {
        let html = to_html(&[OutputNode::VideoEmbed {
            video_id: "xyz".to_string(),
        }]);
        insta::assert_snapshot!(
            html,
            @r#"<div data-role="video-embed"><iframe src="https://www.youtube.com/embed/xyz" loading="lazy" allowfullscreen></iframe></div>"#
        );
    }
}
