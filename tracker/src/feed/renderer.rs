//! Content tree renderer
//!
//! Flattens an article's content tree into HTML for the feed body. Pure and
//! total: malformed or unsupported nodes render to nothing rather than
//! failing.

use crate::domain::entities::site::resolve_media_src;
use crate::domain::entities::{ContentNode, EntryDetail, SectionImage};

const LINE_BREAK: &str = "<br/>";
const DEFAULT_ALT: &str = "Article Image";

/// Render a full entry body.
///
/// The subtitle (if any) leads, followed by the rendered content tree.
/// Falls back to the title when there is no content tree or it renders empty.
pub fn render_body(detail: &EntryDetail, fallback_title: &str) -> String {
    let title = if detail.title.is_empty() {
        fallback_title
    } else {
        detail.title.as_str()
    };

    let Some(content) = &detail.content else {
        return title.to_string();
    };

    let mut html = String::new();
    if let Some(subtitle) = detail.subtitle.as_deref().filter(|s| !s.is_empty()) {
        html.push_str(&format!("<h3><strong>{}</strong></h3>{}", subtitle, LINE_BREAK));
    }
    html.push_str(&render(content));

    if html.is_empty() {
        title.to_string()
    } else {
        html
    }
}

/// Render one node, depth first
pub fn render(node: &ContentNode) -> String {
    match node {
        ContentNode::List(children) => children.iter().map(render).collect(),
        ContentNode::SectionWithImages {
            images,
            title,
            content,
        } => {
            let mut html: String = images.iter().filter_map(render_image).collect();
            if let Some(title) = title {
                html.push_str(&format!("<h2><strong>{}</strong></h2>", title));
            }
            if let Some(content) = content {
                html.push_str(&render(content));
            }
            html.push_str(LINE_BREAK);
            html
        }
        ContentNode::GridContainer { content } | ContentNode::Unknown { content } => {
            content.as_deref().map(render).unwrap_or_default()
        }
        ContentNode::RawHtml { markup } => format!("{}{}", markup, LINE_BREAK),
        // Video players have no feed representation
        ContentNode::VideoEmbed => String::new(),
    }
}

fn render_image(image: &SectionImage) -> Option<String> {
    let src = image.src.as_deref().filter(|s| !s.is_empty())?;
    let alt = image.alt.as_deref().unwrap_or(DEFAULT_ALT);
    Some(format!(
        "<img src=\"{}\" alt=\"{}\" />{}",
        escape_attr(&resolve_media_src(src)),
        escape_attr(alt),
        LINE_BREAK
    ))
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
