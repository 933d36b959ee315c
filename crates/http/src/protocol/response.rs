//! HTTP response message.

use bytes::Bytes;
use http::StatusCode;

use crate::protocol::request::{minor_version, version};
use crate::protocol::{Field, FieldTable, reason_phrase};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    status: u16,
    reason: Bytes,
    minor_version: u8,
    fields: FieldTable,
    content: Bytes,
}

impl Response {
    /// Creates an HTTP/1.1 response whose reason phrase comes from the status table.
    pub fn new(status: u16, content: impl Into<Bytes>) -> Self {
        Self::with_reason(status, reason_phrase(status), content)
    }

    pub fn with_reason(status: u16, reason: impl Into<Bytes>, content: impl Into<Bytes>) -> Self {
        Self { status, reason: reason.into(), minor_version: 1, fields: FieldTable::new(), content: content.into() }
    }

    pub(crate) fn from_parts(status: u16, reason: Bytes, minor_version: u8, fields: FieldTable) -> Self {
        Self { status, reason, minor_version, fields, content: Bytes::new() }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &[u8] {
        &self.reason
    }

    pub fn minor_version(&self) -> u8 {
        self.minor_version
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
}

impl TryFrom<Response> for http::Response<Bytes> {
    type Error = http::Error;

    fn try_from(response: Response) -> Result<Self, Self::Error> {
        let mut builder = http::Response::builder()
            .status(StatusCode::from_u16(response.status)?)
            .version(version(response.minor_version));

        for field in response.fields.iter().filter(|field| field.is_present()) {
            builder = builder.header(field.name(), field.value());
        }
        builder.body(response.content)
    }
}

impl From<http::Response<Bytes>> for Response {
    fn from(response: http::Response<Bytes>) -> Self {
        let (parts, content) = response.into_parts();
        let reason = Bytes::from_static(reason_phrase(parts.status.as_u16()).as_bytes());

        let fields = parts
            .headers
            .iter()
            .map(|(name, value)| Field::new(Bytes::copy_from_slice(name.as_str().as_bytes()), Bytes::copy_from_slice(value.as_bytes())))
            .collect();

        let mut converted = Response::from_parts(parts.status.as_u16(), reason, minor_version(parts.version), fields);
        converted.content = content;
        converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_from_table() {
        assert_eq!(Response::new(404, "").reason(), b"Not Found");
        assert_eq!(Response::new(299, "").reason(), b"Undefined");
        assert_eq!(Response::with_reason(200, "Fine", "").reason(), b"Fine");
    }

    #[test]
    fn test_into_http_response() {
        let mut response = Response::new(201, "created");
        response.add_header_field("Location", "/items/1");

        let response: http::Response<Bytes> = response.try_into().unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(http::header::LOCATION).unwrap(), "/items/1");
        assert_eq!(response.body(), "created");
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        let response = Response::new(1000, "");
        assert!(http::Response::<Bytes>::try_from(response).is_err());
    }

    #[test]
    fn test_from_http_response() {
        let response = http::Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header("ETag", "\"abc\"")
            .body(Bytes::new())
            .unwrap();

        let response = Response::from(response);
        assert_eq!(response.status(), 304);
        assert_eq!(response.reason(), b"Not Modified");
        assert_eq!(response.lookup("etag"), Some(&b"\"abc\""[..]));
    }
}
