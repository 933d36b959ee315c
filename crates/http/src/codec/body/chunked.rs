use httparse::Status;

use crate::ensure;
use crate::protocol::{ParseError, Span};

/// the max number of trailer fields skipped after the last chunk
const MAX_TRAILER_FIELDS: usize = 32;

/// One chunk frame located in the receive buffer, offsets relative to its front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChunkFrame {
    /// a non empty chunk, `frame_end` is just past the CRLF that follows the payload
    Data { payload: Span, frame_end: usize },
    /// the zero size chunk and any trailer fields, `frame_end` is the end of the message
    Last { frame_end: usize },
}

/// Reads the chunk frame that starts at `start` in `src`.
///
/// Returns `Ok(None)` while the frame is incomplete.
pub(crate) fn parse_chunk(src: &[u8], start: usize) -> Result<Option<ChunkFrame>, ParseError> {
    let (size_line_len, size) = match httparse::parse_chunk_size(&src[start..]) {
        Ok(Status::Complete(parsed)) => parsed,
        Ok(Status::Partial) => return Ok(None),
        Err(_) => return Err(ParseError::invalid_chunk("invalid chunk size line")),
    };

    let payload_begin = start + size_line_len;
    if size == 0 {
        return Ok(trailer_len(&src[payload_begin..])?.map(|len| ChunkFrame::Last { frame_end: payload_begin + len }));
    }

    let size = usize::try_from(size).map_err(|_| ParseError::invalid_chunk(format!("chunk size {size} overflow")))?;
    let payload_end = payload_begin.checked_add(size).ok_or_else(|| ParseError::invalid_chunk("chunk size overflow"))?;
    let frame_end = payload_end.checked_add(2).ok_or_else(|| ParseError::invalid_chunk("chunk size overflow"))?;

    if src.len() < frame_end {
        return Ok(None);
    }
    ensure!(&src[payload_end..frame_end] == b"\r\n", ParseError::invalid_chunk("missing CRLF after chunk data"));

    Ok(Some(ChunkFrame::Data { payload: Span::new(payload_begin, payload_end), frame_end }))
}

/// Length of the trailer section after the zero size chunk line, blank line included.
fn trailer_len(src: &[u8]) -> Result<Option<usize>, ParseError> {
    if src.starts_with(b"\r\n") {
        return Ok(Some(2));
    }
    if src.len() < 2 {
        return Ok(None);
    }

    let mut trailers = [httparse::EMPTY_HEADER; MAX_TRAILER_FIELDS];
    match httparse::parse_headers(src, &mut trailers) {
        Ok(Status::Complete((len, _))) => Ok(Some(len)),
        Ok(Status::Partial) => Ok(None),
        Err(e) => Err(ParseError::invalid_chunk(format!("invalid trailer: {e}"))),
    }
}
