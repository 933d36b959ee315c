//! Message model shared by the client and the server.
//!
//! - [`Request`] and [`Response`] carry a start line, a [`FieldTable`] and content, all held as
//!   [`bytes::Bytes`] so parsed messages stay views of the buffer they came from
//! - [`Span`] records where a parsed part lives in the receive buffer
//! - [`Message`] is the event the parser yields, [`Delivery`] picks whole or streaming content
//! - [`Url`] splits `http://host[:service][/path]`
//! - [`Observer`] is how sessions notify their owner
//! - the error types, with [`HttpError`] on top

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::TransportError;
pub use error::UsageError;

mod field;
pub use field::Field;
pub use field::FieldTable;
pub use field::MAX_FIELDS;

mod message;
pub use message::Delivery;
pub use message::Message;

mod observer;
pub use observer::Observer;

mod request;
pub use request::Request;

mod response;
pub use response::Response;

mod span;
pub use span::Span;

mod status;
pub use status::reason_phrase;

mod url;
pub(crate) use url::is_default_service;
pub use url::Url;
pub use url::split_url;
