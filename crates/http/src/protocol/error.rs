use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("parse error: {source}")]
    ParseError {
        #[from]
        source: ParseError,
    },

    #[error("send error: {source}")]
    SendError {
        #[from]
        source: SendError,
    },

    #[error("transport error: {source}")]
    TransportError {
        #[from]
        source: TransportError,
    },

    #[error("usage error: {source}")]
    UsageError {
        #[from]
        source: UsageError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid chunk: {reason}")]
    InvalidChunk { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn invalid_chunk<S: ToString>(str: S) -> Self {
        Self::InvalidChunk { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Failures reported by the transport a session runs on.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("can't connect to {host}:{service}, cause: {source}")]
    Connect { host: String, service: String, source: io::Error },

    #[error("invalid service: {service}")]
    InvalidService { service: String },

    #[error("connection closed before the message completed")]
    UnexpectedEof,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl TransportError {
    pub fn connect<H: ToString, S: ToString>(host: H, service: S, source: io::Error) -> Self {
        Self::Connect { host: host.to_string(), service: service.to_string(), source }
    }

    pub fn invalid_service<S: ToString>(service: S) -> Self {
        Self::InvalidService { service: service.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors returned synchronously when an operation is called in a state that does not allow it.
///
/// A usage error never changes the state of the object it was returned from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("session is not closed")]
    NotClosed,

    #[error("listener is already open")]
    AlreadyOpen,

    #[error("invalid url: {url}, only http://host[:service][/path] is supported")]
    InvalidUrl { url: String },
}

impl UsageError {
    pub fn invalid_url<S: ToString>(url: S) -> Self {
        Self::InvalidUrl { url: url.to_string() }
    }
}
