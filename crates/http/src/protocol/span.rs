use bytes::Bytes;
use std::ops::Range;

/// A half open byte range `[start, end)` measured from the front of a receive buffer.
///
/// Parsed messages record the location of their parts as spans instead of pointers, so a
/// buffer that is compacted or relocated only needs the spans shifted by [`Span::rebase`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub const EMPTY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is after end {end}");
        Self { start, end }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Shifts both ends by `delta`.
    ///
    /// Offsets that would move before the front of the buffer are clamped to zero.
    pub fn rebase(&mut self, delta: isize) {
        self.start = self.start.saturating_add_signed(delta);
        self.end = self.end.saturating_add_signed(delta);
    }

    /// Returns the bytes this span covers in `bytes` without copying.
    ///
    /// An empty span always yields empty bytes.
    pub fn slice_of(&self, bytes: &Bytes) -> Bytes {
        if self.is_empty() {
            return Bytes::new();
        }
        bytes.slice(self.range())
    }
}
