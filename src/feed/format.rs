use super::atom::AtomHandler;
use super::dispatcher::Candidate;
use super::record::{Feed, Item};
use super::rss::RssHandler;
use super::token::Attributes;

/// Namespace URIs the format handlers understand.
pub mod ns {
    pub const ATOM: &str = "http://www.w3.org/2005/Atom";
    pub const DUBLIN_CORE: &str = "http://purl.org/dc/elements/1.1/";
    pub const RSS_CONTENT: &str = "http://purl.org/rss/1.0/modules/content/";
    pub const XHTML: &str = "http://www.w3.org/1999/xhtml";
}

/// Result carried by [`Signal::Finished`](super::dispatcher::Signal) between
/// the feed handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Feed(Feed),
    Item(Item),
    Html(String),
}

/// The syndication formats this crate can normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Atom,
    Rss,
}

impl FeedFormat {
    /// Detection order.
    pub const ALL: [FeedFormat; 2] = [FeedFormat::Atom, FeedFormat::Rss];

    pub fn name(self) -> &'static str {
        match self {
            FeedFormat::Atom => "atom",
            FeedFormat::Rss => "rss",
        }
    }

    pub fn candidate(self) -> Candidate<Fragment> {
        match self {
            FeedFormat::Atom => Candidate {
                name: self.name(),
                can_handle_start: AtomHandler::can_handle_start,
                build: || Box::new(AtomHandler::new()),
            },
            FeedFormat::Rss => Candidate {
                name: self.name(),
                can_handle_start: RssHandler::can_handle_start,
                build: || Box::new(RssHandler::new()),
            },
        }
    }
}

/// Registry used by the dispatcher when no root handler is pre-seeded.
pub fn default_candidates() -> Vec<Candidate<Fragment>> {
    FeedFormat::ALL.into_iter().map(FeedFormat::candidate).collect()
}

/// `rel` of an Atom link, which defaults to `alternate`.
pub(crate) fn link_rel(attributes: &Attributes) -> &str {
    attributes.get("rel").unwrap_or("alternate")
}
