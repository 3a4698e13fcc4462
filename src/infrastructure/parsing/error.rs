//! Feed-level parsing errors.
//!
//! Both variants abort the whole feed; per-node problems never surface here,
//! they are logged and skipped inside the parser.

use thiserror::Error;

pub type ParseResult<T> = Result<T, FeedError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The document does not parse as XML at all. No partial results are
    /// produced for such a feed.
    #[error("malformed XML input: {message}")]
    MalformedInput { message: String },

    /// The root element is missing its `date` attribute, or the value does
    /// not match `YYYY-MM-DD`.
    #[error("invalid or missing 'date' attribute on feed root (got {value:?}), expected YYYY-MM-DD")]
    InvalidDateFormat { value: Option<String> },
}

impl FeedError {
    pub(crate) fn malformed(message: impl std::fmt::Display) -> Self {
        Self::MalformedInput {
            message: message.to_string(),
        }
    }
}
