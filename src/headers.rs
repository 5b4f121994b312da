//! Caller-supplied request headers.

use http::{HeaderMap, HeaderName, HeaderValue};

/// A single header line attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// The header name, e.g. `Content-Type`.
    pub key: String,
    /// The header value.
    pub value: String,
}

impl Header {
    /// Creates a new header entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K, V> From<(K, V)> for Header
where
    K: Into<String>,
    V: Into<String>,
{
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// An ordered collection of headers.
///
/// Keys need not be unique: each entry becomes its own header line on the
/// wire, in insertion order.
///
/// # Examples
///
/// ```
/// use restline::HeaderSet;
///
/// let headers = HeaderSet::new()
///     .with("Content-Type", "application/json")
///     .with("Authorization", "Bearer TOKEN");
///
/// assert_eq!(headers.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<Header>,
}

impl HeaderSet {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Header::new(key, value));
    }

    /// Appends a header, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.entries.iter()
    }

    /// Returns the headers as a slice, the form [`Client::request`](crate::Client::request) takes.
    pub fn as_slice(&self) -> &[Header] {
        &self.entries
    }
}

impl AsRef<[Header]> for HeaderSet {
    fn as_ref(&self) -> &[Header] {
        &self.entries
    }
}

impl<H: Into<Header>> FromIterator<H> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = H>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Copies caller headers into a `HeaderMap`, keeping duplicates as separate lines.
///
/// # Errors
///
/// Returns an error if a header name or value is not valid HTTP.
pub(crate) fn to_header_map(headers: &[Header]) -> crate::Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for header in headers {
        let name = HeaderName::try_from(header.key.as_str()).map_err(|e| {
            crate::Error::ConfigurationError(format!("Invalid header name {:?}: {}", header.key, e))
        })?;
        let value = HeaderValue::try_from(header.value.as_str()).map_err(|e| {
            crate::Error::ConfigurationError(format!("Invalid header value for {}: {}", header.key, e))
        })?;
        map.append(name, value);
    }
    Ok(map)
}
