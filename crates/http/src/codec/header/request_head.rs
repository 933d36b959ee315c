use bytes::Bytes;
use httparse::Status;
use tracing::trace;

use super::{Head, HeadIndex, MAX_HEAD_BYTES, MAX_SCAN_FIELDS, check_version, map_parse_error, span_of};
use crate::ensure;
use crate::protocol::{ParseError, Request};

impl Head for Request {
    const KIND: &'static str = "request";

    fn parse_head(src: &[u8], index: &mut HeadIndex) -> Result<Option<usize>, ParseError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_SCAN_FIELDS];
        let mut req = httparse::Request::new(&mut headers);

        match req.parse(src).map_err(map_parse_error)? {
            Status::Complete(head_len) => {
                trace!(head_len, field_count = req.headers.len(), "parsed request head");
                ensure!(head_len <= MAX_HEAD_BYTES, ParseError::too_large_header(head_len, MAX_HEAD_BYTES));

                index.clear();
                index.minor_version = check_version(req.version)?;
                index.method = span_of(src, req.method.unwrap_or_default().as_bytes());
                index.path = span_of(src, req.path.unwrap_or_default().as_bytes());
                index.record_fields(src, req.headers);
                Ok(Some(head_len))
            }
            Status::Partial => {
                ensure!(src.len() <= MAX_HEAD_BYTES, ParseError::too_large_header(src.len(), MAX_HEAD_BYTES));
                Ok(None)
            }
        }
    }

    fn from_index(index: &HeadIndex, bytes: &Bytes) -> Self {
        Request::from_parts(index.method.slice_of(bytes), index.path.slice_of(bytes), index.minor_version, index.fields(bytes))
    }

    fn set_content(&mut self, content: Bytes) {
        Request::set_content(self, content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(str: &str) -> Result<Option<(Request, usize)>, ParseError> {
        let bytes = Bytes::copy_from_slice(str.as_bytes());
        let mut index = HeadIndex::new();
        Ok(Request::parse_head(&bytes, &mut index)?.map(|head_len| (Request::from_index(&index, &bytes), head_len)))
    }

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        123"##};

        let (request, head_len) = parse(str).unwrap().unwrap();

        assert_eq!(head_len, str.len() - 3);
        assert_eq!(request.method(), b"GET");
        assert_eq!(request.path(), b"/index.html");
        assert_eq!(request.minor_version(), 1);
        assert_eq!(request.fields().len(), 3);
        assert_eq!(request.lookup("host"), Some(&b"127.0.0.1:8080"[..]));
        assert_eq!(request.lookup("USER-AGENT"), Some(&b"curl/7.79.1"[..]));
        assert_eq!(request.lookup("accept"), Some(&b"*/*"[..]));
        assert!(request.content().is_empty());
    }

    #[test]
    fn test_http_10() {
        let (request, _) = parse("GET / HTTP/1.0\r\n\r\n").unwrap().unwrap();
        assert_eq!(request.minor_version(), 0);
        assert!(request.fields().is_empty());
    }

    #[test]
    fn test_partial() {
        assert!(parse("GET /index.html HTTP/1.1\r\nHost: 127").unwrap().is_none());
        assert!(parse("").unwrap().is_none());
    }

    #[test]
    fn test_empty_value() {
        let (request, _) = parse("GET / HTTP/1.1\r\nX-Empty:\r\nHost: a\r\n\r\n").unwrap().unwrap();
        assert_eq!(request.lookup("x-empty"), Some(&b""[..]));
        assert_eq!(request.lookup("host"), Some(&b"a"[..]));
    }

    #[test]
    fn test_invalid_request_line() {
        assert!(matches!(parse("GET\x01 / HTTP/1.1\r\n\r\n"), Err(ParseError::InvalidHeader { .. })));
        assert!(matches!(parse("GET / HTTP/2.0\r\n\r\n"), Err(ParseError::InvalidVersion(_))));
    }

    #[test]
    fn test_too_large_head() {
        let mut str = String::from("GET / HTTP/1.1\r\nX-Large: ");
        str.push_str(&"a".repeat(MAX_HEAD_BYTES));
        assert!(matches!(parse(&str), Err(ParseError::TooLargeHeader { .. })));
    }

    #[test]
    fn test_too_many_lines() {
        let mut str = String::from("GET / HTTP/1.1\r\n");
        for i in 0..=MAX_SCAN_FIELDS {
            str.push_str(&format!("X-{i}: {i}\r\n"));
        }
        str.push_str("\r\n");
        assert!(matches!(parse(&str), Err(ParseError::TooManyHeaders { .. })));
    }
}
