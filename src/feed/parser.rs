use std::io::Read;

use super::dispatcher::Dispatcher;
use super::error::ParseError;
use super::format::{default_candidates, Fragment};
use super::record::Feed;
use super::tokenizer::Tokenizer;

/// Default cap on documents read through [`Parser::parse_reader`].
pub const DEFAULT_MAX_SIZE: usize = 10 * 1024 * 1024;

/// Turns a complete Atom or RSS 2.0 document into a [`Feed`].
///
/// The format is detected from the root element.
#[derive(Debug, Clone)]
pub struct Parser {
    max_size: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the number of bytes accepted by [`parse_bytes`](Self::parse_bytes)
    /// and [`parse_reader`](Self::parse_reader).
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn parse_str(&self, input: &str) -> Result<Feed, ParseError> {
        self.parse_bytes(input.as_bytes())
    }

    pub fn parse_bytes(&self, input: &[u8]) -> Result<Feed, ParseError> {
        if input.len() > self.max_size {
            return Err(ParseError::TooLarge(self.max_size));
        }

        let mut dispatcher = Dispatcher::new(default_candidates());
        for token in Tokenizer::new(input) {
            dispatcher.handle_event(token?)?;
        }

        match dispatcher.into_result() {
            Some(Fragment::Feed(feed)) => {
                tracing::debug!(
                    title = feed.title.as_deref().unwrap_or_default(),
                    items = feed.items.len(),
                    "Parsed feed"
                );
                Ok(feed)
            }
            Some(other) => Err(ParseError::InternalConsistency(format!(
                "root handler produced {other:?} instead of a feed"
            ))),
            None => Err(ParseError::IncompleteDocument),
        }
    }

    /// Reads `reader` to the end, then parses it.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Feed, ParseError> {
        let limit = u64::try_from(self.max_size)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        let mut buf = Vec::new();
        reader.take(limit).read_to_end(&mut buf)?;
        self.parse_bytes(&buf)
    }
}

/// Parses a complete document with the default limits.
///
/// # Examples
///
/// ```
/// let xml = r#"<rss version="2.0"><channel><title>Hi</title></channel></rss>"#;
/// let feed = feedparse::parse_feed(xml.as_bytes()).unwrap();
/// assert_eq!(feed.title.as_deref(), Some("Hi"));
/// ```
pub fn parse_feed(input: &[u8]) -> Result<Feed, ParseError> {
    Parser::new().parse_bytes(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Feed</title>
  <link href="http://example.org/"/>
  <entry>
    <title>Atom-Powered Robots Run Amok</title>
    <link href="http://example.org/2003/12/13/atom03"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <updated>2003-12-13T18:30:02Z</updated>
    <summary>Some text.</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_str_detects_atom() {
        let feed = Parser::new().parse_str(ATOM).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Example Feed"));
        assert_eq!(feed.home_page_url.as_deref(), Some("http://example.org/"));
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].summary.as_deref(), Some("Some text."));
    }

    #[test]
    fn test_parse_reader_matches_parse_bytes() {
        let from_reader = Parser::new().parse_reader(ATOM.as_bytes()).unwrap();
        assert_eq!(from_reader, parse_feed(ATOM.as_bytes()).unwrap());
    }

    #[test]
    fn test_size_limit() {
        let parser = Parser::new().with_max_size(16);
        assert!(matches!(parser.parse_str(ATOM), Err(ParseError::TooLarge(16))));
        assert!(matches!(
            parser.parse_reader(ATOM.as_bytes()),
            Err(ParseError::TooLarge(16))
        ));
    }

    #[test]
    fn test_unrecognized_root() {
        let err = parse_feed(b"<html><body/></html>").unwrap_err();
        assert!(matches!(err, ParseError::UnrecognizedRootElement(ref n) if n == "html"));
    }

    #[test]
    fn test_not_xml() {
        let err = parse_feed(b"not really xml").unwrap_err();
        assert!(matches!(err, ParseError::Tokenizer { .. }));
        assert!(err.to_string().starts_with("XML error: "));
    }
}
