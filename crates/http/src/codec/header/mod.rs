//! Start line and header block parsing.
//!
//! [`Head`] abstracts over the two grammars: a request line for [`Request`](crate::protocol::Request)
//! and a status line for [`Response`](crate::protocol::Response). Both parse with `httparse` into a
//! [`HeadIndex`] and materialize from the frozen head bytes.

mod head_index;
mod request_head;
mod response_head;

pub use head_index::HeadIndex;
pub(crate) use head_index::span_of;

use bytes::Bytes;
use httparse::Error;

use crate::protocol::ParseError;

/// the max number of header lines scanned before a head is rejected
pub const MAX_SCAN_FIELDS: usize = 128;

/// the max size in bytes of a start line plus header block
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// A message head the incremental parser can produce.
pub trait Head: Clone {
    /// used in logs
    const KIND: &'static str;

    /// Parses a start line and header block from the front of `src` into `index`.
    ///
    /// Returns `Ok(None)` when `src` holds only a prefix of the head, otherwise the head length.
    fn parse_head(src: &[u8], index: &mut HeadIndex) -> Result<Option<usize>, ParseError>;

    /// Builds the message from `bytes`, which starts at the front the index was recorded against.
    fn from_index(index: &HeadIndex, bytes: &Bytes) -> Self;

    fn set_content(&mut self, content: Bytes);
}

fn map_parse_error(e: Error) -> ParseError {
    match e {
        Error::TooManyHeaders => ParseError::too_many_headers(MAX_SCAN_FIELDS),
        Error::Version => ParseError::InvalidVersion(None),
        e => ParseError::invalid_header(e.to_string()),
    }
}

fn check_version(version: Option<u8>) -> Result<u8, ParseError> {
    match version {
        Some(minor @ (0 | 1)) => Ok(minor),
        // HTTP/2 and HTTP/3 are not spoken here
        v => Err(ParseError::InvalidVersion(v)),
    }
}
