//! Body framing.
//!
//! A message body is either delimited by `Content-Length` or sent with chunked transfer
//! coding. [`body_length`] picks the framing from the head, [`parse_chunk`] reads one chunk
//! frame at an offset of the receive buffer without consuming it.

mod chunked;

pub(crate) use chunked::{ChunkFrame, parse_chunk};

use crate::codec::header::HeadIndex;
use crate::protocol::ParseError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BodyLength {
    /// content length in bytes, zero when absent
    Length(usize),
    Chunked,
}

/// Picks the body framing of a parsed head.
///
/// A `Transfer-Encoding` whose last coding is `chunked` wins over `Content-Length`.
pub(crate) fn body_length(index: &HeadIndex, src: &[u8]) -> Result<BodyLength, ParseError> {
    // refer: https://www.rfc-editor.org/rfc/rfc9112.html#name-message-body-length
    if index.lookup(src, "Transfer-Encoding").is_some_and(is_chunked) {
        return Ok(BodyLength::Chunked);
    }

    let Some(value) = index.lookup(src, "Content-Length") else {
        return Ok(BodyLength::Length(0));
    };

    let cl_str = std::str::from_utf8(value).map_err(|_| ParseError::invalid_content_length("value is not utf8"))?;
    let length = cl_str
        .trim()
        .parse::<usize>()
        .map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not a decimal integer")))?;

    Ok(BodyLength::Length(length))
}

/// chunked must be the last coding when present
fn is_chunked(value: &[u8]) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    value.rsplit(|b| *b == b',').next().is_some_and(|coding| coding.trim_ascii().eq_ignore_ascii_case(CHUNKED))
}
