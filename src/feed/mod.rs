//! Atom and RSS 2.0 normalization into JSON Feed shaped records.
//!
//! # Architecture
//!
//! A document flows through four layers:
//!
//! - [`Tokenizer`] turns XML into flat [`Token`]s with namespace-resolved names
//! - [`Dispatcher`] routes each token to the handler on top of its stack
//! - the format handlers (Atom feed/entry/XHTML, RSS channel/item) build the
//!   records, delegating nested scopes to new handlers instead of recursing
//! - [`Parser`] ties the above together and returns the finished [`Feed`]
//!
//! [`fetch_feed`] adds HTTP retrieval on top of the parser.
//!
//! # Example
//!
//! ```
//! use feedparse::feed::Parser;
//!
//! let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
//!   <title>Example</title>
//!   <entry><id>urn:1</id><title>First</title></entry>
//! </feed>"#;
//!
//! let feed = Parser::new().parse_str(xml).unwrap();
//! assert_eq!(feed.items[0].title.as_deref(), Some("First"));
//! ```

mod atom;
mod chardata;
mod dispatcher;
mod error;
mod fetcher;
mod format;
mod parser;
mod record;
mod rss;
mod token;
mod tokenizer;

pub use atom::{AtomHandler, AtomItemHandler, XhtmlHandler};
pub use chardata::Chardata;
pub use dispatcher::{Candidate, Dispatcher, Handler, HandlerResult, ResultReceiver, Signal};
pub use error::ParseError;
pub use fetcher::{build_client, fetch_feed, FetchError, FetchOptions};
pub use format::{default_candidates, ns, FeedFormat, Fragment};
pub use parser::{parse_feed, Parser, DEFAULT_MAX_SIZE};
pub use record::{Attachment, Author, Content, Feed, Hub, Item, ItemSource, RssCloud, JSONFEED_1};
pub use rss::{parse_pub_date, RssHandler, RssItemHandler};
pub use token::{Attributes, QName, Token};
pub use tokenizer::{tokenize, Tokenizer};
