//! Small helpers shared by the feed handlers and the command-line front end.
//!
//! - **Text heuristics**: HTML detection for RSS descriptions and lenient
//!   integer parsing for attribute values
//! - **URL validation**: refuses non-HTTP and private-network feed URLs
//!   before they are fetched

mod text;
mod url_validator;

pub use text::{leading_integer, looks_like_html};
pub use url_validator::{validate_url, UrlValidationError};
