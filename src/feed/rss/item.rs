use super::parse_pub_date;
use crate::feed::chardata::Chardata;
use crate::feed::dispatcher::{Handler, HandlerResult, Signal};
use crate::feed::format::{link_rel, ns, Fragment};
use crate::feed::record::{Attachment, Author, Content, Item, ItemSource};
use crate::feed::token::{Attributes, QName};
use crate::util::{leading_integer, looks_like_html};

/// Handles one `<item>` of an RSS channel.
#[derive(Debug)]
pub struct RssItemHandler {
    item: Item,
    text: Chardata,
    category_domain: Option<String>,
    atom_link_seen: bool,
    has_content_encoded: bool,
    guid_is_permalink: bool,
}

impl Default for RssItemHandler {
    fn default() -> Self {
        Self {
            item: Item::default(),
            text: Chardata::new(),
            category_domain: None,
            atom_link_seen: false,
            has_content_encoded: false,
            guid_is_permalink: true,
        }
    }
}

impl RssItemHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_atom_link(&mut self, attributes: &Attributes) {
        self.atom_link_seen = true;
        let Some(href) = attributes.get("href") else {
            return;
        };
        match link_rel(attributes) {
            "alternate" => self.item.url = Some(href.to_owned()),
            "related" => self.item.external_url = Some(href.to_owned()),
            _ => {}
        }
    }

    fn handle_enclosure(&mut self, attributes: &Attributes) {
        let Some(url) = attributes.get("url") else {
            tracing::debug!("Ignoring enclosure without url");
            return;
        };
        self.item.attachments.push(Attachment {
            url: url.to_owned(),
            mime_type: attributes.get("type").map(str::to_owned),
            size_in_bytes: attributes.get("length").map(leading_integer),
        });
    }

    fn content_encoded_end(&mut self) {
        let body = match self.text.flush() {
            Some(body) if !body.trim().is_empty() => body,
            // present but empty; fall back to <description>
            _ => {
                self.has_content_encoded = false;
                return;
            }
        };
        if let Some(Content::Text(text)) = self.item.content.take() {
            self.item.summary = Some(text);
        }
        self.item.content = Some(Content::Html(body));
    }

    fn description_end(&mut self) {
        let description = self.text.flush();
        if self.has_content_encoded {
            self.item.summary = description;
        } else {
            self.item.content = description.map(|d| {
                if looks_like_html(&d) {
                    Content::Html(d)
                } else {
                    Content::Text(d)
                }
            });
        }
    }

    fn category_end(&mut self) {
        let text = self.text.flush().unwrap_or_default();
        let domain = self.category_domain.take();
        for segment in text.split('/') {
            let tag = match &domain {
                Some(domain) => format!("{domain}/{segment}"),
                None => segment.to_owned(),
            };
            self.item.tags.push(tag);
        }
    }

    fn guid_end(&mut self) {
        let guid = self.text.flush();
        if self.guid_is_permalink && !self.atom_link_seen && self.item.url.is_none() {
            self.item.url = guid.clone();
        }
        self.item.id = guid;
        self.guid_is_permalink = true;
    }
}

impl Handler<Fragment> for RssItemHandler {
    fn element_start(&mut self, name: &QName, attributes: &Attributes) -> HandlerResult<Fragment> {
        self.text.flush();

        if name.is(ns::ATOM, "link") {
            self.handle_atom_link(attributes);
            return Ok(Signal::Continue);
        }
        if name.is(ns::RSS_CONTENT, "encoded") {
            self.has_content_encoded = true;
            return Ok(Signal::Continue);
        }
        if name.namespace.is_some() {
            return Ok(Signal::Continue);
        }

        match name.local.as_str() {
            "source" => {
                self.item.source = Some(ItemSource {
                    feed_url: attributes.get("url").map(str::to_owned),
                    ..Default::default()
                });
            }
            "enclosure" => self.handle_enclosure(attributes),
            "category" => {
                if let Some(domain) = attributes.get("domain") {
                    self.category_domain = Some(domain.to_owned());
                }
            }
            "guid" => {
                self.guid_is_permalink = attributes.get("isPermaLink").unwrap_or("true") == "true";
            }
            _ => {}
        }
        Ok(Signal::Continue)
    }

    fn element_end(&mut self, name: &QName) -> HandlerResult<Fragment> {
        if name.is(ns::RSS_CONTENT, "encoded") {
            self.content_encoded_end();
            return Ok(Signal::Continue);
        }
        if name.is(ns::DUBLIN_CORE, "creator") {
            let author = self.item.author.get_or_insert_with(Author::default);
            author.name = self.text.flush();
            return Ok(Signal::Continue);
        }
        if name.namespace.is_some() {
            return Ok(Signal::Continue);
        }

        match name.local.as_str() {
            "title" => self.item.title = self.text.flush(),
            "description" => self.description_end(),
            "link" => {
                if !self.atom_link_seen {
                    self.item.url = self.text.flush();
                }
            }
            "source" => {
                let title = self.text.flush();
                self.item.source.get_or_insert_with(ItemSource::default).title = title;
            }
            "category" => self.category_end(),
            "guid" => self.guid_end(),
            "pubDate" => {
                let raw = self.text.flush().unwrap_or_default();
                self.item.date_published = Some(parse_pub_date(&raw)?);
            }
            "item" => return Ok(Signal::Finished(Fragment::Item(std::mem::take(&mut self.item)))),
            _ => {}
        }
        Ok(Signal::Continue)
    }

    fn text(&mut self, chunk: &str) -> HandlerResult<Fragment> {
        self.text.push(chunk);
        Ok(Signal::Continue)
    }
}
