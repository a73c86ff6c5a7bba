//! RSS 2.0 serialisation of feed documents

use std::collections::BTreeMap;

use rss::{ChannelBuilder, EnclosureBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};

use crate::domain::entities::{FeedDocument, FeedItem};

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

/// Serialise a document as an RSS 2.0 channel
pub fn to_rss(doc: &FeedDocument) -> String {
    let mut namespaces = BTreeMap::new();
    namespaces.insert("content".to_string(), CONTENT_NAMESPACE.to_string());

    let image = ImageBuilder::default()
        .url(doc.image.clone())
        .title(doc.title.clone())
        .link(doc.link.clone())
        .build();

    let channel = ChannelBuilder::default()
        .namespaces(namespaces)
        .title(doc.title.clone())
        .link(doc.link.clone())
        .description(doc.description.clone())
        .language(Some(doc.language.clone()))
        .copyright(Some(doc.copyright.clone()))
        .generator(Some(doc.generator.clone()))
        .last_build_date(Some(doc.updated.to_rfc2822()))
        .image(Some(image))
        .items(doc.items.iter().map(to_item).collect::<Vec<_>>())
        .build();

    channel.to_string()
}

fn to_item(item: &FeedItem) -> Item {
    let guid = GuidBuilder::default()
        .value(item.id.clone())
        .permalink(false)
        .build();

    let enclosure = item.image.as_ref().filter(|url| !url.is_empty()).map(|url| {
        EnclosureBuilder::default()
            .url(url.clone())
            .mime_type(image_mime_type(url).to_string())
            .length("0".to_string())
            .build()
    });

    ItemBuilder::default()
        .title(Some(item.title.clone()))
        .link(Some(item.link.clone()))
        .guid(Some(guid))
        .description(Some(item.description.clone()))
        .content(Some(item.content.clone()))
        .author(Some(item.author.clone()))
        .pub_date(item.published.map(|ts| ts.to_rfc2822()))
        .enclosure(enclosure)
        .build()
}

fn image_mime_type(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}
