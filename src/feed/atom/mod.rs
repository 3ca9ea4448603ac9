//! Atom (RFC 4287) handlers.

mod item;
mod xhtml;

pub use item::AtomItemHandler;
pub use xhtml::XhtmlHandler;

use super::chardata::Chardata;
use super::dispatcher::{Handler, HandlerResult, ResultReceiver, Signal};
use super::error::ParseError;
use super::format::{link_rel, ns, Fragment};
use super::record::{Author, Feed, Hub};
use super::token::{Attributes, QName};

/// Root handler for `<feed xmlns="http://www.w3.org/2005/Atom">`.
#[derive(Debug, Default)]
pub struct AtomHandler {
    feed: Feed,
    text: Chardata,
    in_author: bool,
}

impl AtomHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_handle_start(name: &QName, _attributes: &Attributes) -> bool {
        name.is(ns::ATOM, "feed")
    }

    fn handle_link(&mut self, attributes: &Attributes) {
        let Some(href) = attributes.get("href") else {
            tracing::debug!("Ignoring feed link without href");
            return;
        };
        match link_rel(attributes) {
            "alternate" => self.feed.home_page_url = Some(href.to_owned()),
            "self" => self.feed.feed_url = Some(href.to_owned()),
            "hub" => self.feed.hubs.push(Hub::websub(href)),
            _ => {}
        }
    }
}

impl Handler<Fragment> for AtomHandler {
    fn element_start(&mut self, name: &QName, attributes: &Attributes) -> HandlerResult<Fragment> {
        // drop insignificant whitespace
        self.text.flush();

        match name.local_in(ns::ATOM) {
            Some("link") => self.handle_link(attributes),
            Some("author") => {
                self.feed.author.get_or_insert_with(Author::default);
                self.in_author = true;
            }
            Some("entry") => return Ok(Signal::Delegate(Box::new(AtomItemHandler::new()))),
            _ => {}
        }
        Ok(Signal::Continue)
    }

    fn element_end(&mut self, name: &QName) -> HandlerResult<Fragment> {
        let Some(local) = name.local_in(ns::ATOM) else {
            return Ok(Signal::Continue);
        };

        if self.in_author {
            if local == "author" {
                self.in_author = false;
            } else {
                let author = self.feed.author.get_or_insert_with(Author::default);
                author_element_end(author, local, &mut self.text);
            }
            return Ok(Signal::Continue);
        }

        match local {
            "title" => self.feed.title = self.text.flush(),
            "subtitle" => self.feed.description = self.text.flush(),
            "feed" => return Ok(Signal::Finished(Fragment::Feed(std::mem::take(&mut self.feed)))),
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

impl ResultReceiver<Fragment> for AtomHandler {
    fn receive_result(&mut self, result: Fragment) -> Result<(), ParseError> {
        match result {
            Fragment::Item(item) => self.feed.items.push(item),
            other => tracing::debug!(fragment = ?other, "Ignoring unexpected fragment in Atom feed"),
        }
        Ok(())
    }
}

/// Applies the end of a person construct child (`name`, `uri`, `email`).
///
/// An `email` only becomes the URL when no `uri` was seen first.
pub(crate) fn author_element_end(author: &mut Author, local: &str, text: &mut Chardata) {
    match local {
        "name" => author.name = text.flush(),
        "uri" => author.url = text.flush(),
        "email" if author.url.is_none() => {
            author.url = Some(format!("mailto:{}", text.flush().unwrap_or_default()));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::dispatcher::Dispatcher;
    use crate::feed::token::Token;
    use pretty_assertions::assert_eq;

    fn atom(local: &str) -> QName {
        QName::qualified(ns::ATOM, local)
    }

    fn element(local: &str, attrs: &[(&str, &str)], text: Option<&str>) -> Vec<Token> {
        let mut tokens = vec![Token::start(atom(local), attrs.iter().copied().collect())];
        if let Some(text) = text {
            tokens.push(Token::text(text));
        }
        tokens.push(Token::end(atom(local)));
        tokens
    }

    fn run(body: Vec<Vec<Token>>) -> Feed {
        let mut dispatcher = Dispatcher::new(Vec::new());
        dispatcher.push_handler(Box::new(AtomHandler::new()));
        dispatcher
            .handle_event(Token::start(atom("feed"), Attributes::new()))
            .unwrap();
        for token in body.into_iter().flatten() {
            dispatcher.handle_event(token).unwrap();
        }
        dispatcher.handle_event(Token::end(atom("feed"))).unwrap();

        match dispatcher.into_result() {
            Some(Fragment::Feed(feed)) => feed,
            other => panic!("expected a feed, got {other:?}"),
        }
    }

    fn author(children: &[(&str, &str)]) -> Vec<Token> {
        let mut tokens = vec![Token::start(atom("author"), Attributes::new())];
        for (local, text) in children {
            tokens.extend(element(local, &[], Some(text)));
        }
        tokens.push(Token::end(atom("author")));
        tokens
    }

    #[test]
    fn test_can_handle_start() {
        assert!(AtomHandler::can_handle_start(&atom("feed"), &Attributes::new()));
        let rss: Attributes = [("version", "2.0")].into_iter().collect();
        assert!(!AtomHandler::can_handle_start(&QName::local("rss"), &rss));
    }

    #[test]
    fn test_feedwide_link_mapping() {
        let feed = run(vec![
            element("link", &[("rel", "alternate"), ("href", "https://example.com")], None),
            element("link", &[("rel", "self"), ("href", "https://example.com/feed.xml")], None),
            element(
                "link",
                &[("rel", "hub"), ("href", "https://websub.example.com/subscribe")],
                None,
            ),
        ]);

        assert_eq!(feed.home_page_url.as_deref(), Some("https://example.com"));
        assert_eq!(feed.feed_url.as_deref(), Some("https://example.com/feed.xml"));
        assert_eq!(feed.hubs, vec![Hub::websub("https://websub.example.com/subscribe")]);
        assert!(feed.items.is_empty());
    }

    #[test]
    fn test_link_without_rel_is_alternate() {
        let feed = run(vec![element("link", &[("href", "https://example.com")], None)]);
        assert_eq!(feed.home_page_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_feed_attribute_mapping() {
        let feed = run(vec![
            element("title", &[], Some("Sample Feed")),
            element("subtitle", &[], Some("whatever")),
        ]);
        assert_eq!(feed.title.as_deref(), Some("Sample Feed"));
        assert_eq!(feed.description.as_deref(), Some("whatever"));
    }

    #[test]
    fn test_uri_wins_over_email() {
        let expected = Some(Author {
            name: Some("John Appleseed".into()),
            url: Some("https://example.com".into()),
        });

        let feed = run(vec![author(&[
            ("name", "John Appleseed"),
            ("uri", "https://example.com"),
        ])]);
        assert_eq!(feed.author, expected);

        let feed = run(vec![author(&[
            ("name", "John Appleseed"),
            ("email", "john@example.com"),
            ("uri", "https://example.com"),
        ])]);
        assert_eq!(feed.author, expected);
    }

    #[test]
    fn test_email_becomes_mailto_url() {
        let feed = run(vec![author(&[
            ("name", "John Appleseed"),
            ("email", "john@example.com"),
        ])]);
        assert_eq!(
            feed.author,
            Some(Author {
                name: Some("John Appleseed".into()),
                url: Some("mailto:john@example.com".into()),
            })
        );
    }

    #[test]
    fn test_author_title_does_not_leak_into_feed_title() {
        let feed = run(vec![
            element("title", &[], Some("Feed")),
            author(&[("name", "Someone"), ("title", "Not the feed")]),
        ]);
        assert_eq!(feed.title.as_deref(), Some("Feed"));
    }

    #[test]
    fn test_foreign_elements_are_ignored() {
        let foreign = QName::qualified("http://example.com/ext", "title");
        let feed = run(vec![
            element("title", &[], Some("Feed")),
            vec![
                Token::start(foreign.clone(), Attributes::new()),
                Token::text("Other"),
                Token::end(foreign),
            ],
        ]);
        assert_eq!(feed.title.as_deref(), Some("Feed"));
    }

    #[test]
    fn test_entries_are_collected_in_order() {
        let mut entries = Vec::new();
        for id in ["urn:1", "urn:2"] {
            entries.push(vec![Token::start(atom("entry"), Attributes::new())]);
            entries.push(element("id", &[], Some(id)));
            entries.push(vec![Token::end(atom("entry"))]);
        }
        let feed = run(entries);

        let ids: Vec<_> = feed.items.iter().map(|i| i.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("urn:1"), Some("urn:2")]);
    }
}
