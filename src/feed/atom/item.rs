use super::xhtml::XhtmlHandler;
use crate::feed::chardata::Chardata;
use crate::feed::dispatcher::{Handler, HandlerResult, ResultReceiver, Signal};
use crate::feed::error::ParseError;
use crate::feed::format::{link_rel, ns, Fragment};
use crate::feed::record::{Attachment, Author, Content, Item, ItemSource};
use crate::feed::token::{Attributes, QName};
use crate::util::leading_integer;

/// How the text of a pending `<content>` element will be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Text,
    Html,
}

impl ContentKind {
    fn wrap(self, body: String) -> Content {
        match self {
            ContentKind::Text => Content::Text(body),
            ContentKind::Html => Content::Html(body),
        }
    }
}

/// Handles one `<entry>` of an Atom feed.
///
/// `author` and `source` double as state: while either is `Some`, the
/// handler is inside that element.
#[derive(Debug, Default)]
pub struct AtomItemHandler {
    item: Item,
    text: Chardata,
    author: Option<Author>,
    source: Option<ItemSource>,
    content_kind: Option<ContentKind>,
}

impl AtomItemHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_link(&mut self, attributes: &Attributes) {
        let Some(href) = attributes.get("href") else {
            tracing::debug!("Ignoring entry link without href");
            return;
        };
        match link_rel(attributes) {
            "alternate" => self.item.url = Some(href.to_owned()),
            "related" => self.item.external_url = Some(href.to_owned()),
            "enclosure" => self.item.attachments.push(Attachment {
                url: href.to_owned(),
                mime_type: attributes.get("type").map(str::to_owned),
                size_in_bytes: attributes.get("length").map(leading_integer),
            }),
            _ => {}
        }
    }

    fn handle_source_link(source: &mut ItemSource, attributes: &Attributes) {
        let Some(href) = attributes.get("href") else {
            return;
        };
        match link_rel(attributes) {
            "alternate" => source.home_page_url = Some(href.to_owned()),
            "self" => source.feed_url = Some(href.to_owned()),
            _ => {}
        }
    }

    fn handle_category(&mut self, attributes: &Attributes) {
        let Some(term) = attributes.get("term") else {
            tracing::debug!("Ignoring category without term");
            return;
        };
        let tag = match attributes.get("scheme") {
            Some(scheme) => format!("{scheme},{term}"),
            None => term.to_owned(),
        };
        self.item.tags.push(tag);
    }

    fn handle_content_start(&mut self, attributes: &Attributes) -> HandlerResult<Fragment> {
        let kind = match attributes.get("type").unwrap_or("text") {
            "text" | "text/plain" => ContentKind::Text,
            "html" | "text/html" => ContentKind::Html,
            "xhtml" => {
                self.content_kind = Some(ContentKind::Html);
                return Ok(Signal::Delegate(Box::new(XhtmlHandler::new())));
            }
            other => return Err(ParseError::UnsupportedContentType(other.to_owned())),
        };
        self.content_kind = Some(kind);
        Ok(Signal::Continue)
    }

    fn author_end(&mut self, local: &str) {
        if local != "author" {
            if let Some(author) = self.author.as_mut() {
                super::author_element_end(author, local, &mut self.text);
            }
            return;
        }

        let Some(author) = self.author.take() else {
            return;
        };
        match self.source.as_mut() {
            Some(source) => {
                source.author = Some(author.clone());
                self.item.author.get_or_insert(author);
            }
            None => self.item.author = Some(author),
        }
    }

    fn source_end(&mut self, local: &str) {
        match local {
            "title" => {
                let title = self.text.flush();
                if let Some(source) = self.source.as_mut() {
                    source.title = title;
                }
            }
            "subtitle" => {
                let description = self.text.flush();
                if let Some(source) = self.source.as_mut() {
                    source.description = description;
                }
            }
            "source" => self.item.source = self.source.take(),
            _ => {}
        }
    }
}

impl Handler<Fragment> for AtomItemHandler {
    fn element_start(&mut self, name: &QName, attributes: &Attributes) -> HandlerResult<Fragment> {
        self.text.flush();

        let Some(local) = name.local_in(ns::ATOM) else {
            return Ok(Signal::Continue);
        };

        if let (Some(source), "link") = (self.source.as_mut(), local) {
            Self::handle_source_link(source, attributes);
            return Ok(Signal::Continue);
        }

        match local {
            "content" => return self.handle_content_start(attributes),
            "author" => self.author = Some(Author::default()),
            "link" => self.handle_link(attributes),
            "category" => self.handle_category(attributes),
            "source" => self.source = Some(ItemSource::default()),
            _ => {}
        }
        Ok(Signal::Continue)
    }

    fn element_end(&mut self, name: &QName) -> HandlerResult<Fragment> {
        let Some(local) = name.local_in(ns::ATOM) else {
            return Ok(Signal::Continue);
        };

        if self.author.is_some() {
            self.author_end(local);
            return Ok(Signal::Continue);
        }
        if self.source.is_some() {
            self.source_end(local);
            return Ok(Signal::Continue);
        }

        match local {
            "id" => self.item.id = self.text.flush(),
            "title" => {
                if let Some(title) = self.text.flush().filter(|t| !t.trim().is_empty()) {
                    self.item.title = Some(title);
                }
            }
            "summary" => self.item.summary = self.text.flush(),
            "content" => {
                let kind = self.content_kind.take().ok_or_else(|| {
                    ParseError::InternalConsistency("content ended without a content type".into())
                })?;
                self.item.content = self.text.flush().map(|body| kind.wrap(body));
            }
            "updated" => self.item.date_modified = self.text.flush(),
            "published" => self.item.date_published = self.text.flush(),
            "entry" => return Ok(Signal::Finished(Fragment::Item(std::mem::take(&mut self.item)))),
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

impl ResultReceiver<Fragment> for AtomItemHandler {
    fn receive_result(&mut self, result: Fragment) -> Result<(), ParseError> {
        match result {
            Fragment::Html(html) => {
                self.text.replace(html);
                Ok(())
            }
            other => Err(ParseError::InternalConsistency(format!(
                "entry received unexpected fragment: {other:?}"
            ))),
        }
    }
}
