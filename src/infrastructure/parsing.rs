//! Feed parsing architecture: the event-driven XML parser and its
//! feed-level error types.

pub mod error;
pub mod feed_parser;

pub use error::{FeedError, ParseResult};
pub use feed_parser::{FeedParser, ParsedFeed, DEFAULT_PRODUCT_SELECTOR};
