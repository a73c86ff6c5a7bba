//! Article content trees
//!
//! The detail API returns a loosely structured tree of template-tagged
//! objects. It is converted once, on deserialization, into a closed set of
//! variants so rendering can be an exhaustive match.

use serde::Deserialize;
use serde_json::Value;

const SECTION_TEMPLATES: &[&str] = &["EventInfo", "FeaturedEventInfo"];
const GRID_TEMPLATE: &str = "Grid";
const HTML_TEMPLATE: &str = "HTMLElement";
const VIDEO_TEMPLATE: &str = "RockstarVideoPlayer";

/// A node of an article body
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ContentNode {
    /// Sibling nodes, rendered back to back
    List(Vec<ContentNode>),
    /// Images, an optional heading, then nested content
    SectionWithImages {
        images: Vec<SectionImage>,
        title: Option<String>,
        content: Option<Box<ContentNode>>,
    },
    /// Layout wrapper; only its content matters
    GridContainer { content: Option<Box<ContentNode>> },
    /// Markup emitted verbatim
    RawHtml { markup: String },
    /// Embedded video player, not representable in a feed
    VideoEmbed,
    /// Anything else; only nested content (if any) is kept
    Unknown { content: Option<Box<ContentNode>> },
}

/// An image attached to a section
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionImage {
    /// Desktop source, falling back to mobile; may be root-relative
    pub src: Option<String>,
    pub alt: Option<String>,
}

impl ContentNode {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => ContentNode::List(items.iter().map(Self::from_value).collect()),
            Value::Object(_) => Self::from_object(value),
            _ => ContentNode::Unknown { content: None },
        }
    }

    fn from_object(node: &Value) -> Self {
        let template = node.get("_template").and_then(Value::as_str);
        let content = nested_content(node);

        match template {
            Some(t) if SECTION_TEMPLATES.contains(&t) => ContentNode::SectionWithImages {
                images: node
                    .get("images")
                    .and_then(Value::as_array)
                    .map(|images| images.iter().map(SectionImage::from_value).collect())
                    .unwrap_or_default(),
                title: memoq_str(node, "title"),
                content,
            },
            Some(GRID_TEMPLATE) => ContentNode::GridContainer { content },
            Some(HTML_TEMPLATE) => match memoq_str(node, "content") {
                Some(markup) => ContentNode::RawHtml { markup },
                None => ContentNode::Unknown { content },
            },
            Some(VIDEO_TEMPLATE) => ContentNode::VideoEmbed,
            _ => ContentNode::Unknown { content },
        }
    }
}

impl From<Value> for ContentNode {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl SectionImage {
    fn from_value(entry: &Value) -> Self {
        let image = entry.get("image");
        let sources = image
            .and_then(|i| i.get("sources"))
            .and_then(|s| s.get("en_us"));
        let src = ["desktop", "mobile"].iter().find_map(|key| {
            sources
                .and_then(|s| s.get(*key))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        });
        let alt = image.and_then(|i| memoq_str(i, "alt"));

        SectionImage { src, alt }
    }
}

fn nested_content(node: &Value) -> Option<Box<ContentNode>> {
    match node.get("content") {
        None | Some(Value::Null) => None,
        Some(content) => Some(Box::new(ContentNode::from_value(content))),
    }
}

fn memoq_str(node: &Value, key: &str) -> Option<String> {
    node.get("_memoq")
        .and_then(|m| m.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn section_templates_map_to_section() {
        for template in ["EventInfo", "FeaturedEventInfo"] {
            let node = ContentNode::from_value(&json!({
                "_template": template,
                "_memoq": { "title": "Bonuses" },
                "images": [
                    { "image": { "sources": { "en_us": { "desktop": "/a.jpg" } }, "_memoq": { "alt": "A" } } }
                ]
            }));

            assert_eq!(
                node,
                ContentNode::SectionWithImages {
                    images: vec![SectionImage {
                        src: Some("/a.jpg".to_string()),
                        alt: Some("A".to_string()),
                    }],
                    title: Some("Bonuses".to_string()),
                    content: None,
                }
            );
        }
    }

    #[test]
    fn image_falls_back_to_mobile_source() {
        let node = ContentNode::from_value(&json!({
            "_template": "EventInfo",
            "images": [ { "image": { "sources": { "en_us": { "desktop": "", "mobile": "/m.jpg" } } } } ]
        }));

        match node {
            ContentNode::SectionWithImages { images, .. } => {
                assert_eq!(images[0].src.as_deref(), Some("/m.jpg"));
                assert!(images[0].alt.is_none());
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn html_element_without_markup_is_unknown() {
        let node = ContentNode::from_value(&json!({
            "_template": "HTMLElement",
            "content": [{ "_template": "HTMLElement", "_memoq": { "content": "<p>x</p>" } }]
        }));

        assert_eq!(
            node,
            ContentNode::Unknown {
                content: Some(Box::new(ContentNode::List(vec![ContentNode::RawHtml {
                    markup: "<p>x</p>".to_string()
                }])))
            }
        );
    }

    #[test]
    fn video_player_is_video_embed() {
        let node = ContentNode::from_value(&json!({ "_template": "RockstarVideoPlayer", "content": [] }));
        assert_eq!(node, ContentNode::VideoEmbed);
    }

    #[test]
    fn scalars_are_unknown_without_content() {
        assert_eq!(
            ContentNode::from_value(&json!("text")),
            ContentNode::Unknown { content: None }
        );
    }

    #[test]
    fn deserializes_via_serde() {
        let node: ContentNode =
            serde_json::from_str(r#"[{"_template":"Grid","content":null}]"#).unwrap();
        assert_eq!(
            node,
            ContentNode::List(vec![ContentNode::GridContainer { content: None }])
        );
    }
}
