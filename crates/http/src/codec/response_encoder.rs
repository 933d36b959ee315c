use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::{FastWrite, INIT_HEAD_SIZE, write_fields};
use crate::protocol::{Response, SendError};

/// Serializes a response as `HTTP/1.1 status reason`, a `Content-Length` field, the fields in
/// order, a blank line and the content.
///
/// `Content-Length` always reflects the content, fields of that name are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseEncoder;

impl Encoder<&Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: &Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEAD_SIZE + response.content().len());

        write!(FastWrite(dst), "HTTP/1.1 {} ", response.status())?;
        dst.put_slice(response.reason());
        write!(FastWrite(dst), "\r\nContent-Length: {}\r\n", response.content().len())?;

        write_fields(response.fields(), &["Content-Length"], dst);
        dst.put_slice(b"\r\n");
        dst.put_slice(response.content());

        trace!(status = response.status(), len = dst.len(), "encoded response");
        Ok(())
    }
}
