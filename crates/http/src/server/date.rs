//! Cached `Date` header value.
//!
//! Formatting an RFC 1123 date per response is wasted work when thousands of responses share the
//! same second, so the listener keeps one formatted value and refreshes it on each timer tick.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;

/// The current HTTP date, shared by the listener and every session it accepted.
#[derive(Clone)]
pub struct DateCache {
    current: Arc<ArcSwap<Bytes>>,
}

impl DateCache {
    pub fn new() -> Self {
        Self { current: Arc::new(ArcSwap::from_pointee(http_date())) }
    }

    /// Formats the current time again.
    pub fn refresh(&self) {
        self.current.store(Arc::new(http_date()));
    }

    /// Returns the cached value, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
    pub fn load(&self) -> Bytes {
        self.current.load().as_ref().clone()
    }
}

impl Default for DateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateCache").field("current", &self.load()).finish()
    }
}

fn http_date() -> Bytes {
    let mut buf = faf_http_date::get_date_buff_no_key();
    faf_http_date::get_date_no_key(&mut buf);
    Bytes::from_owner(buf)
}
