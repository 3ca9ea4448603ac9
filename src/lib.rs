//! Normalizes Atom and RSS 2.0 feeds into JSON Feed version 1 records.
//!
//! ```
//! let xml = br#"<rss version="2.0"><channel>
//!   <title>Example</title>
//!   <item><title>Hello</title><description>World</description></item>
//! </channel></rss>"#;
//!
//! let feed = feedparse::parse_feed(xml).unwrap();
//! let json = serde_json::to_value(&feed).unwrap();
//! assert_eq!(json["items"][0]["content_text"], "World");
//! ```

pub mod config;
pub mod feed;
pub mod util;

pub use feed::{parse_feed, Feed, Item, ParseError, Parser};
