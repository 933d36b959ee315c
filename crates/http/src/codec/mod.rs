//! HTTP/1.1 wire codec.
//!
//! - [`MessageDecoder`] is the incremental parser, one state machine for both grammars, with
//!   [`RequestDecoder`] and [`ResponseDecoder`] as the two instances
//! - [`RequestEncoder`] and [`ResponseEncoder`] serialize outbound messages
//! - head parsing lives in [`header`], body framing in `body`
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use reactor_http::codec::{ResponseDecoder, ResponseEncoder};
//! use reactor_http::protocol::{Delivery, Message, Response};
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut buf = BytesMut::new();
//! ResponseEncoder.encode(&Response::new(200, "hi"), &mut buf).unwrap();
//!
//! let mut decoder = ResponseDecoder::new(Delivery::Whole);
//! let Some(Message::Complete(response)) = decoder.decode(&mut buf).unwrap() else { unreachable!() };
//! assert_eq!(response.content(), "hi");
//! ```

mod body;
pub mod header;
mod message_decoder;
mod request_encoder;
mod response_encoder;

pub use message_decoder::MessageDecoder;
pub use message_decoder::RequestDecoder;
pub use message_decoder::ResponseDecoder;
pub use message_decoder::Window;
pub use request_encoder::RequestEncoder;
pub use response_encoder::ResponseEncoder;

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};

use crate::protocol::Field;

/// Initial buffer size reserved for a serialized head
const INIT_HEAD_SIZE: usize = 512;

/// Writes the fields that are present, skipping those `skip` rejects.
fn write_fields<'a>(fields: impl IntoIterator<Item = &'a Field>, skip: &[&str], dst: &mut BytesMut) {
    for field in fields {
        if !field.is_present() || skip.iter().any(|name| field.name().eq_ignore_ascii_case(name.as_bytes())) {
            continue;
        }
        dst.put_slice(field.name());
        dst.put_slice(b": ");
        dst.put_slice(field.value());
        dst.put_slice(b"\r\n");
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
