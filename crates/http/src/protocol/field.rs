use bytes::Bytes;

/// the max number of fields a parsed message keeps, the rest is dropped
pub const MAX_FIELDS: usize = 32;

/// One `name: value` header field.
///
/// Both parts are raw bytes; names compare case-insensitively on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    name: Bytes,
    value: Bytes,
}

impl Field {
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    #[inline]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// a field without a name is never written on the wire, an empty value is
    #[inline]
    pub fn is_present(&self) -> bool {
        !self.name.is_empty()
    }
}

/// An ordered table of header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTable {
    fields: Vec<Field>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Vec::with_capacity(capacity) }
    }

    pub fn add_header_field(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.fields.push(Field::new(name, value));
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Returns the value of the first field whose name equals `name` ignoring ASCII case.
    pub fn lookup(&self, name: &str) -> Option<&[u8]> {
        self.fields.iter().find(|field| field.name.eq_ignore_ascii_case(name.as_bytes())).map(Field::value)
    }

    /// Same as [`FieldTable::lookup`], but only returns values that are valid utf8.
    pub fn lookup_str(&self, name: &str) -> Option<&str> {
        self.lookup(name).and_then(|value| std::str::from_utf8(value).ok())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl<'a> IntoIterator for &'a FieldTable {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<Field> for FieldTable {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

impl Extend<Field> for FieldTable {
    fn extend<T: IntoIterator<Item = Field>>(&mut self, iter: T) {
        self.fields.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut fields = FieldTable::new();
        fields.add_header_field("Content-Type", "text/plain");
        fields.add_header_field("X-Trace", "1");
        fields.add_header_field("x-trace", "2");

        assert_eq!(fields.lookup("content-type"), Some(&b"text/plain"[..]));
        assert_eq!(fields.lookup_str("X-TRACE"), Some("1"));
        assert_eq!(fields.lookup("Accept"), None);
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_presence() {
        assert!(Field::new("Server", "reactor").is_present());
        assert!(Field::new("X-Empty", "").is_present());
        assert!(!Field::new("", "reactor").is_present());
    }

    #[test]
    fn test_clear() {
        let mut fields: FieldTable = [Field::new("A", "1"), Field::new("B", "2")].into_iter().collect();
        assert_eq!(fields.iter().map(Field::name).collect::<Vec<_>>(), vec![&b"A"[..], &b"B"[..]]);

        fields.clear();
        assert!(fields.is_empty());
    }
}
