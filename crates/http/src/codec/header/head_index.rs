use bytes::Bytes;

use crate::protocol::{Field, FieldTable, MAX_FIELDS, Span};

/// Offsets of the parts of a parsed head within the buffer it was parsed from.
///
/// Offsets are relative to the front of the message, which stays the front of the buffer for as
/// long as the index is held. Recording offsets instead of slices keeps the index valid while the
/// buffer grows or relocates, and lets the message be materialized as views of the frozen head
/// bytes once they are split off.
#[derive(Debug, Clone, Default)]
pub struct HeadIndex {
    pub(crate) method: Span,
    pub(crate) path: Span,
    pub(crate) reason: Span,
    pub(crate) status: u16,
    pub(crate) minor_version: u8,
    fields: Vec<FieldIndex>,
}

#[derive(Debug, Clone, Copy, Default)]
struct FieldIndex {
    name: Span,
    value: Span,
}

impl HeadIndex {
    pub fn new() -> Self {
        Self { fields: Vec::with_capacity(MAX_FIELDS), ..Self::default() }
    }

    /// Records at most [`MAX_FIELDS`] fields, the remaining ones are dropped.
    pub(crate) fn record_fields(&mut self, base: &[u8], headers: &[httparse::Header<'_>]) {
        self.fields.clear();
        self.fields.extend(
            headers
                .iter()
                .take(MAX_FIELDS)
                .map(|header| FieldIndex { name: span_of(base, header.name.as_bytes()), value: span_of(base, header.value) }),
        );
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Looks up a field by name ignoring case, reading from the buffer the head was parsed from.
    pub fn lookup<'b>(&self, base: &'b [u8], name: &str) -> Option<&'b [u8]> {
        self.fields
            .iter()
            .find(|index| base[index.name.range()].eq_ignore_ascii_case(name.as_bytes()))
            .map(|index| &base[index.value.range()])
    }

    /// Builds the field table as views of `bytes`, which must start at the same front as the
    /// buffer the head was parsed from.
    pub(crate) fn fields(&self, bytes: &Bytes) -> FieldTable {
        let mut table = FieldTable::with_capacity(self.fields.len());
        for index in &self.fields {
            table.push(Field::new(index.name.slice_of(bytes), index.value.slice_of(bytes)));
        }
        table
    }

    pub fn clear(&mut self) {
        self.method = Span::EMPTY;
        self.path = Span::EMPTY;
        self.reason = Span::EMPTY;
        self.status = 0;
        self.minor_version = 0;
        self.fields.clear();
    }
}

/// Span of `part` inside `base`, `part` must be a sub slice of `base` or empty.
pub(crate) fn span_of(base: &[u8], part: &[u8]) -> Span {
    if part.is_empty() {
        return Span::EMPTY;
    }
    let start = part.as_ptr() as usize - base.as_ptr() as usize;
    Span::new(start, start + part.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_of() {
        let base = b"Host: example.com";
        assert_eq!(span_of(base, &base[6..]), Span::new(6, 17));
        assert_eq!(span_of(base, b""), Span::EMPTY);
    }

    #[test]
    fn test_record_keeps_first_fields() {
        let mut src = Vec::new();
        for i in 0..40 {
            src.extend_from_slice(format!("X-{i}: {i}\r\n").as_bytes());
        }
        src.extend_from_slice(b"\r\n");

        let mut headers = [httparse::EMPTY_HEADER; 64];
        let httparse::Status::Complete((_, parsed)) = httparse::parse_headers(&src, &mut headers).unwrap() else {
            panic!("headers should be complete");
        };

        let mut index = HeadIndex::new();
        index.record_fields(&src, parsed);

        assert_eq!(index.field_count(), MAX_FIELDS);
        assert_eq!(index.lookup(&src, "x-0"), Some(&b"0"[..]));
        assert_eq!(index.lookup(&src, "X-31"), Some(&b"31"[..]));
        assert_eq!(index.lookup(&src, "X-32"), None);
    }

    #[test]
    fn test_materialize_fields() {
        let src = b"A: 1\r\nB: 2\r\n\r\n";
        let mut headers = [httparse::EMPTY_HEADER; 4];
        let httparse::Status::Complete((_, parsed)) = httparse::parse_headers(src, &mut headers).unwrap() else {
            panic!("headers should be complete");
        };
        let mut index = HeadIndex::new();
        index.record_fields(src, parsed);

        assert_eq!(index.lookup(src, "b"), Some(&b"2"[..]));

        let fields = index.fields(&Bytes::from_static(src));
        assert_eq!(fields.lookup("a"), Some(&b"1"[..]));
    }
}
