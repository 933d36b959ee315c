//! HTTP request message.
//!
//! A [`Request`] is both what the server side parser hands to a handler and what the client side
//! sends. Parsed requests keep their parts as [`Bytes`] views of the buffer they were read from.

use bytes::Bytes;
use http::{Method, Uri, Version};

use crate::protocol::{Field, FieldTable, Url};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: Bytes,
    path: Bytes,
    minor_version: u8,
    host: Option<Bytes>,
    service: Option<Bytes>,
    fields: FieldTable,
    content: Bytes,
}

impl Request {
    /// Creates an HTTP/1.1 request without content.
    pub fn new(method: impl Into<Bytes>, path: impl Into<Bytes>) -> Self {
        Self { method: method.into(), path: path.into(), minor_version: 1, ..Self::default() }
    }

    /// Creates the outbound request addressed by `url`.
    pub fn outbound(method: impl Into<Bytes>, url: Url, content: impl Into<Bytes>) -> Self {
        let (host, service, path) = url.into_parts();
        Self {
            method: method.into(),
            path,
            minor_version: 1,
            host: Some(host),
            service: Some(service),
            fields: FieldTable::new(),
            content: content.into(),
        }
    }

    pub(crate) fn from_parts(method: Bytes, path: Bytes, minor_version: u8, fields: FieldTable) -> Self {
        Self { method, path, minor_version, host: None, service: None, fields, content: Bytes::new() }
    }

    pub fn method(&self) -> &[u8] {
        &self.method
    }

    pub fn path(&self) -> &[u8] {
        &self.path
    }

    pub fn minor_version(&self) -> u8 {
        self.minor_version
    }

    /// the host this request is sent to, only set for outbound requests
    pub fn host(&self) -> Option<&[u8]> {
        self.host.as_deref()
    }

    pub fn service(&self) -> Option<&[u8]> {
        self.service.as_deref()
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldTable {
        &mut self.fields
    }

    pub fn add_header_field(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.fields.add_header_field(name, value);
    }

    pub fn lookup(&self, name: &str) -> Option<&[u8]> {
        self.fields.lookup(name)
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<Bytes>) {
        self.content = content.into();
    }

    /// Whether the peer asked to close the connection after this request.
    pub fn is_close_requested(&self) -> bool {
        self.lookup("Connection")
            .is_some_and(|value| value.split(|b| *b == b',').any(|token| token.trim_ascii().eq_ignore_ascii_case(b"close")))
    }
}

impl TryFrom<Request> for http::Request<Bytes> {
    type Error = http::Error;

    fn try_from(request: Request) -> Result<Self, Self::Error> {
        let uri = if request.path.starts_with(b"/") {
            Uri::try_from(request.path.as_ref())?
        } else {
            let mut target = Vec::with_capacity(request.path.len() + 1);
            target.push(b'/');
            target.extend_from_slice(&request.path);
            Uri::try_from(target)?
        };

        let mut builder = http::Request::builder()
            .method(Method::from_bytes(&request.method)?)
            .uri(uri)
            .version(version(request.minor_version));

        for field in request.fields.iter().filter(|field| field.is_present()) {
            builder = builder.header(field.name(), field.value());
        }
        builder.body(request.content)
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        let (parts, content) = request.into_parts();
        let path = parts.uri.path_and_query().map_or("/", |path| path.as_str());
        let fields = parts
            .headers
            .iter()
            .map(|(name, value)| Field::new(Bytes::copy_from_slice(name.as_str().as_bytes()), Bytes::copy_from_slice(value.as_bytes())))
            .collect();

        let mut converted = Request::from_parts(
            Bytes::copy_from_slice(parts.method.as_str().as_bytes()),
            Bytes::copy_from_slice(path.as_bytes()),
            minor_version(parts.version),
            fields,
        );
        converted.content = content;
        converted
    }
}

pub(crate) fn version(minor_version: u8) -> Version {
    if minor_version == 0 { Version::HTTP_10 } else { Version::HTTP_11 }
}

pub(crate) fn minor_version(version: Version) -> u8 {
    u8::from(version != Version::HTTP_10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::split_url;

    #[test]
    fn test_outbound() {
        let url = split_url("http://example.com:8080/index.html").unwrap();
        let request = Request::outbound("POST", url, "hello");

        assert_eq!(request.method(), b"POST");
        assert_eq!(request.path(), b"index.html");
        assert_eq!(request.host(), Some(&b"example.com"[..]));
        assert_eq!(request.service(), Some(&b"8080"[..]));
        assert_eq!(request.content(), "hello");
        assert_eq!(request.minor_version(), 1);
    }

    #[test]
    fn test_close_requested() {
        let mut request = Request::new("GET", "/");
        assert!(!request.is_close_requested());

        request.add_header_field("connection", "keep-alive, Close");
        assert!(request.is_close_requested());
    }

    #[test]
    fn test_into_http_request() {
        let url = split_url("http://example.com/a?b=1").unwrap();
        let mut request = Request::outbound("GET", url, Bytes::new());
        request.add_header_field("Accept", "*/*");
        request.add_header_field("X-Empty", "");

        let request: http::Request<Bytes> = request.try_into().unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), "/a");
        assert_eq!(request.uri().query(), Some("b=1"));
        assert_eq!(request.headers().get(http::header::ACCEPT).unwrap(), "*/*");
        assert_eq!(request.headers().get("x-empty").unwrap(), "");
    }

    #[test]
    fn test_from_http_request() {
        let request = http::Request::builder()
            .method(Method::PUT)
            .uri("/upload")
            .header("Content-Type", "text/plain")
            .body(Bytes::from_static(b"data"))
            .unwrap();

        let request = Request::from(request);
        assert_eq!(request.method(), b"PUT");
        assert_eq!(request.path(), b"/upload");
        assert_eq!(request.lookup("content-type"), Some(&b"text/plain"[..]));
        assert_eq!(request.content(), "data");
    }
}
