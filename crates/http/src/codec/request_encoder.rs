use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::{FastWrite, INIT_HEAD_SIZE, write_fields};
use crate::protocol::{Request, SendError, is_default_service};

/// Serializes a request as `METHOD /path HTTP/1.1`, a `Host` field, the fields in order, a
/// blank line and the content.
///
/// The `Host` field comes from the request's host and service, the service is left out when it
/// is the default http port. Fields named `Host` are then skipped. A request without a host
/// (one that was parsed rather than built from a url) keeps its own `Host` fields instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestEncoder;

impl Encoder<&Request> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, request: &Request, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEAD_SIZE + request.content().len());

        dst.put_slice(request.method());
        dst.put_u8(b' ');
        if !request.path().starts_with(b"/") {
            dst.put_u8(b'/');
        }
        dst.put_slice(request.path());
        write!(FastWrite(dst), " HTTP/1.{}\r\n", request.minor_version().min(1))?;

        let skip: &[&str] = match request.host() {
            Some(host) => {
                dst.put_slice(b"Host: ");
                dst.put_slice(host);
                if let Some(service) = request.service().filter(|service| !is_default_service(service)) {
                    dst.put_u8(b':');
                    dst.put_slice(service);
                }
                dst.put_slice(b"\r\n");
                &["Host"]
            }
            None => &[],
        };

        write_fields(request.fields(), skip, dst);
        dst.put_slice(b"\r\n");
        dst.put_slice(request.content());

        trace!(len = dst.len(), "encoded request");
        Ok(())
    }
}
