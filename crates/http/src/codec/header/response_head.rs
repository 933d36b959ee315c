use bytes::Bytes;
use httparse::Status;
use tracing::trace;

use super::{Head, HeadIndex, MAX_HEAD_BYTES, MAX_SCAN_FIELDS, check_version, map_parse_error, span_of};
use crate::ensure;
use crate::protocol::{ParseError, Response};

impl Head for Response {
    const KIND: &'static str = "response";

    fn parse_head(src: &[u8], index: &mut HeadIndex) -> Result<Option<usize>, ParseError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_SCAN_FIELDS];
        let mut res = httparse::Response::new(&mut headers);

        match res.parse(src).map_err(map_parse_error)? {
            Status::Complete(head_len) => {
                trace!(head_len, field_count = res.headers.len(), "parsed response head");
                ensure!(head_len <= MAX_HEAD_BYTES, ParseError::too_large_header(head_len, MAX_HEAD_BYTES));

                index.clear();
                index.minor_version = check_version(res.version)?;
                index.status = res.code.unwrap_or_default();
                index.reason = span_of(src, res.reason.unwrap_or_default().as_bytes());
                index.record_fields(src, res.headers);
                Ok(Some(head_len))
            }
            Status::Partial => {
                ensure!(src.len() <= MAX_HEAD_BYTES, ParseError::too_large_header(src.len(), MAX_HEAD_BYTES));
                Ok(None)
            }
        }
    }

    fn from_index(index: &HeadIndex, bytes: &Bytes) -> Self {
        Response::from_parts(index.status, index.reason.slice_of(bytes), index.minor_version, index.fields(bytes))
    }

    fn set_content(&mut self, content: Bytes) {
        Response::set_content(self, content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(str: &str) -> Result<Option<Response>, ParseError> {
        let bytes = Bytes::copy_from_slice(str.as_bytes());
        let mut index = HeadIndex::new();
        Ok(Response::parse_head(&bytes, &mut index)?.map(|_| Response::from_index(&index, &bytes)))
    }

    #[test]
    fn test_status_line() {
        let str = indoc! {r##"
        HTTP/1.1 404 Not Found
        Content-Type: text/html
        Content-Length: 0

        "##};

        let response = parse(str).unwrap().unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.reason(), b"Not Found");
        assert_eq!(response.minor_version(), 1);
        assert_eq!(response.lookup("content-type"), Some(&b"text/html"[..]));
    }

    #[test]
    fn test_reason_is_kept_verbatim() {
        let response = parse("HTTP/1.0 200 Fine By Me\r\n\r\n").unwrap().unwrap();
        assert_eq!(response.reason(), b"Fine By Me");
        assert_eq!(response.minor_version(), 0);
    }

    #[test]
    fn test_invalid_status_line() {
        assert!(parse("HTTP/1.1 abc OK\r\n\r\n").is_err());
        assert!(parse("HTTP/1.1 200").unwrap().is_none());
    }
}
