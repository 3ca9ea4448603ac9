use thiserror::Error;

/// Errors that abort a feed parse.
///
/// None of these are recovered from internally: the first error ends the
/// parse and no partial record is produced.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input is not well-formed XML.
    #[error("XML error: {message} (at {line}:{column}, byte {offset})")]
    Tokenizer {
        message: String,
        line: u64,
        column: u64,
        offset: u64,
    },

    /// No registered format accepts the document's root element.
    #[error("Unrecognized start element: {0}")]
    UnrecognizedRootElement(String),

    /// An event arrived after every handler had finished.
    #[error("Document is not finished but no handler is present")]
    HandlerStackDesync,

    /// Atom `<content>` with a `type` other than text, html or xhtml.
    #[error("Unrecognized content type: {0}")]
    UnsupportedContentType(String),

    /// RSS `<pubDate>` that is not an RFC 2822 date.
    #[error("Bad date format: {0}")]
    MalformedDate(String),

    /// A handler reached a state its own bookkeeping should rule out.
    #[error("Logic error: {0}")]
    InternalConsistency(String),

    /// The document ended before the root handler produced a record.
    #[error("Document ended before the feed was complete")]
    IncompleteDocument,

    #[error("Failed to read feed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Feed document exceeds {0} bytes")]
    TooLarge(usize),
}
