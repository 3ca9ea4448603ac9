//! RSS 2.0 handlers.

mod item;

pub use item::RssItemHandler;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::chardata::Chardata;
use super::dispatcher::{Handler, HandlerResult, ResultReceiver, Signal};
use super::error::ParseError;
use super::format::{link_rel, ns, Fragment};
use super::record::{Author, Feed, Hub, RssCloud};
use super::token::{Attributes, QName};
use crate::util::leading_integer;

/// Numeric zone offset written with a colon, e.g. `-03:00`.
static COLON_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]\d{2}):(\d{2})\s*$").expect("valid regex"));

/// Leading day name, e.g. `Tue, `. Never checked against the date.
static LEADING_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun),\s*").expect("valid regex")
});

/// Root handler for `<rss version="2.0">`.
#[derive(Debug, Default)]
pub struct RssHandler {
    feed: Feed,
    text: Chardata,
    atom_link_seen: bool,
}

impl RssHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_handle_start(name: &QName, attributes: &Attributes) -> bool {
        name.is_unqualified("rss") && attributes.get("version") == Some("2.0")
    }

    fn handle_atom_link(&mut self, attributes: &Attributes) {
        self.atom_link_seen = true;
        let Some(href) = attributes.get("href") else {
            return;
        };
        match link_rel(attributes) {
            "alternate" => self.feed.home_page_url = Some(href.to_owned()),
            "self" => self.feed.feed_url = Some(href.to_owned()),
            _ => {}
        }
    }

    fn handle_cloud(&mut self, attributes: &Attributes) {
        let Some(domain) = attributes.get("domain") else {
            tracing::debug!("Ignoring rssCloud element without domain");
            return;
        };
        let port = attributes.get("port").map(leading_integer).unwrap_or(80);
        let scheme = if port == 443 { "https" } else { "http" };
        let path = attributes.get("path").unwrap_or_default();

        self.feed.hubs.push(Hub {
            kind: "rssCloud".to_string(),
            url: format!("{scheme}://{domain}:{port}{path}"),
            rss_cloud: Some(RssCloud {
                protocol: attributes.get("protocol").unwrap_or_default().to_owned(),
                procedure: attributes
                    .get("registerProcedure")
                    .unwrap_or_default()
                    .to_owned(),
            }),
        });
    }
}

impl Handler<Fragment> for RssHandler {
    fn element_start(&mut self, name: &QName, attributes: &Attributes) -> HandlerResult<Fragment> {
        self.text.flush();

        if name.is(ns::ATOM, "link") {
            self.handle_atom_link(attributes);
        } else if name.is_unqualified("item") {
            return Ok(Signal::Delegate(Box::new(RssItemHandler::new())));
        } else if name.is_unqualified("cloud") {
            self.handle_cloud(attributes);
        }
        Ok(Signal::Continue)
    }

    fn element_end(&mut self, name: &QName) -> HandlerResult<Fragment> {
        if name.is(ns::DUBLIN_CORE, "creator") {
            self.feed.author = Some(Author {
                name: self.text.flush(),
                url: None,
            });
            return Ok(Signal::Continue);
        }
        if name.namespace.is_some() {
            return Ok(Signal::Continue);
        }

        match name.local.as_str() {
            "title" => self.feed.title = self.text.flush(),
            "description" => self.feed.description = self.text.flush(),
            "link" => {
                if !self.atom_link_seen || self.feed.home_page_url.is_none() {
                    self.feed.home_page_url = self.text.flush();
                }
            }
            "rss" => return Ok(Signal::Finished(Fragment::Feed(std::mem::take(&mut self.feed)))),
            _ => {}
        }
        Ok(Signal::Continue)
    }

    fn text(&mut self, chunk: &str) -> HandlerResult<Fragment> {
        self.text.push(chunk);
        Ok(Signal::Continue)
    }

    fn as_receiver(&mut self) -> Option<&mut dyn ResultReceiver<Fragment>> {
        Some(self)
    }
}

impl ResultReceiver<Fragment> for RssHandler {
    fn receive_result(&mut self, result: Fragment) -> Result<(), ParseError> {
        match result {
            Fragment::Item(item) => self.feed.items.push(item),
            other => tracing::debug!(fragment = ?other, "Ignoring unexpected fragment in RSS feed"),
        }
        Ok(())
    }
}

/// Parses an RFC 2822 `pubDate` and renders it in UTC as
/// `YYYY-MM-DDTHH:MM:SSZ`.
///
/// A colon inside the numeric zone offset (`-03:00`) is tolerated, and the
/// day name is ignored.
pub fn parse_pub_date(raw: &str) -> Result<String, ParseError> {
    let without_weekday = LEADING_WEEKDAY.replace(raw.trim(), "");
    let normalized = COLON_OFFSET.replace(&without_weekday, "$1$2");
    let parsed = DateTime::parse_from_rfc2822(&normalized)
        .map_err(|_| ParseError::MalformedDate(raw.to_owned()))?;
    Ok(parsed
        .with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string())
}
