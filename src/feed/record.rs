//! Canonical feed records, shaped after JSON Feed version 1.
//!
//! Every format handler builds these structs directly; serializing a
//! [`Feed`] with `serde_json` yields the normalized document.

use serde::{Deserialize, Serialize};

/// Value of [`Feed::version`] for every record this crate produces.
pub const JSONFEED_1: &str = "https://jsonfeed.org/version/1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hubs: Vec<Hub>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            version: JSONFEED_1.to_string(),
            title: None,
            description: None,
            home_page_url: None,
            feed_url: None,
            author: None,
            hubs: Vec::new(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Author {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: None,
        }
    }
}

/// A subscription endpoint advertised by the feed (WebSub hub or rssCloud).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hub {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(rename = "_rsscloud", default, skip_serializing_if = "Option::is_none")]
    pub rss_cloud: Option<RssCloud>,
}

impl Hub {
    pub fn websub(url: impl Into<String>) -> Self {
        Self {
            kind: "WebSub".to_string(),
            url: url.into(),
            rss_cloud: None,
        }
    }
}

/// rssCloud registration details that do not fit the hub URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RssCloud {
    pub protocol: String,
    pub procedure: String,
}

/// Body of an item. JSON Feed allows either a plain-text or an HTML body;
/// flattening this enum writes exactly one of `content_text` and
/// `content_html`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    #[serde(rename = "content_text")]
    Text(String),
    #[serde(rename = "content_html")]
    Html(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(rename = "_fp_item_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ItemSource>,
}

impl Item {
    pub fn content_text(&self) -> Option<&str> {
        match &self.content {
            Some(Content::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn content_html(&self) -> Option<&str> {
        match &self.content {
            Some(Content::Html(html)) => Some(html),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_bytes: Option<u64>,
}

/// Feed-level metadata of the feed an aggregated item originally came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}
