use crate::protocol::UsageError;
use bytes::Bytes;

const SCHEME: &str = "http://";
const DEFAULT_HOST: &[u8] = b"localhost";
const DEFAULT_SERVICE: &[u8] = b"80";

/// The parts of an `http://host[:service][/path]` url.
///
/// The url text is copied once; host, service and path are views into that copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    host: Bytes,
    service: Bytes,
    path: Bytes,
}

impl Url {
    /// Splits `url` into host, service and path.
    ///
    /// Missing parts take defaults: host `localhost`, service `80`, empty path. The path is
    /// everything after the first `/` following the authority; a query or fragment directly
    /// after the host leaves the path empty, and so does an empty service as in `http://h:/x`.
    pub fn parse(url: &str) -> Result<Self, UsageError> {
        let Some(rest) = url.strip_prefix(SCHEME) else {
            return Err(UsageError::invalid_url(url));
        };
        let text = Bytes::copy_from_slice(url.as_bytes());
        let base = SCHEME.len();

        let host_len = rest.find(['/', '?', '#', ':']).unwrap_or(rest.len());
        let host = part_or(&text, base, base + host_len, DEFAULT_HOST);

        let mut cursor = host_len;
        let mut service = Bytes::from_static(DEFAULT_SERVICE);
        if rest[cursor..].starts_with(':') {
            let begin = cursor + 1;
            let service_len = rest[begin..].find('/').unwrap_or(rest.len() - begin);
            // an empty service ends the url, nothing after it is taken as the path
            if service_len == 0 {
                return Ok(Self { host, service, path: Bytes::new() });
            }
            service = text.slice(base + begin..base + begin + service_len);
            cursor = begin + service_len;
        }

        let path = if rest[cursor..].starts_with('/') { text.slice(base + cursor + 1..) } else { Bytes::new() };

        Ok(Self { host, service, path })
    }

    pub fn host(&self) -> &str {
        as_str(&self.host)
    }

    pub fn service(&self) -> &str {
        as_str(&self.service)
    }

    /// the path without its leading `/`
    pub fn path(&self) -> &str {
        as_str(&self.path)
    }

    pub(crate) fn into_parts(self) -> (Bytes, Bytes, Bytes) {
        (self.host, self.service, self.path)
    }
}

/// Splits `url`, see [`Url::parse`].
pub fn split_url(url: &str) -> Result<Url, UsageError> {
    Url::parse(url)
}

/// Whether `service` names the port the `Host` field can leave out.
pub(crate) fn is_default_service(service: &[u8]) -> bool {
    service == DEFAULT_SERVICE || service.eq_ignore_ascii_case(b"http")
}

fn part_or(text: &Bytes, begin: usize, end: usize, default: &'static [u8]) -> Bytes {
    if begin == end { Bytes::from_static(default) } else { text.slice(begin..end) }
}

// parts are cut at ascii delimiters of a `&str`, so they are always valid utf8
fn as_str(bytes: &Bytes) -> &str {
    std::str::from_utf8(bytes).unwrap_or_default()
}
