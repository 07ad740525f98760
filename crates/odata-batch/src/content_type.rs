//! `Content-Type` values (RFC 2045) and multipart boundaries (RFC 2046).

use crate::{encoding::BatchEncoding, error::FormatError};

/// Checks if a byte is valid in an RFC 2045 token.
#[inline]
#[must_use]
pub fn is_token_char(c: u8) -> bool {
    matches!(c,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'{' | b'|' | b'}' | b'~'
    )
}

#[must_use]
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// Checks if a byte is valid in a MIME boundary (`bcharsnospace`).
#[inline]
#[must_use]
pub fn is_boundary_char(c: u8) -> bool {
    matches!(c,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
        b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' |
        b'/' | b':' | b'=' | b'?'
    )
}

/// 1-70 boundary characters; spaces are allowed except in last position.
#[must_use]
pub fn is_valid_boundary(boundary: &str) -> bool {
    let b = boundary.as_bytes();
    let Some((&last, init)) = b.split_last() else {
        return false;
    };
    b.len() <= 70 && is_boundary_char(last) && init.iter().all(|&c| c == b' ' || is_boundary_char(c))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    primary_type: String,
    sub_type: String,
    /// In order of appearance; names as written.
    parameters: Vec<(String, String)>,
}

impl ContentType {
    #[must_use]
    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    #[must_use]
    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    #[must_use]
    pub fn is_mime_type(&self, primary: &str, sub: &str) -> bool {
        self.primary_type.eq_ignore_ascii_case(primary) && self.sub_type.eq_ignore_ascii_case(sub)
    }

    /// All values of parameter `name` (case-insensitive), in order.
    pub fn parameters<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.parameters
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The first value of parameter `name`.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters(name).next()
    }

    /// The boundary of a multipart type: present exactly once and valid.
    pub fn boundary(&self) -> Result<&str, FormatError> {
        let mut values = self.parameters("boundary");
        let boundary = values.next().ok_or(FormatError::MissingBoundary)?;
        if values.next().is_some() {
            return Err(FormatError::DuplicateBoundary);
        }
        if !is_valid_boundary(boundary) {
            return Err(FormatError::InvalidBoundary(boundary.to_string()));
        }
        Ok(boundary)
    }
}

/// Parses a `Content-Type` header value. `None` if it is malformed.
#[must_use]
pub fn parse_content_type(value: &str) -> Option<ContentType> {
    let value = value.trim();
    let (type_part, params_part) = match value.split_once(';') {
        Some((a, b)) => (a.trim(), b),
        None => (value, ""),
    };
    let (primary, sub) = type_part.split_once('/')?;
    let (primary, sub) = (primary.trim(), sub.trim());
    if !is_token(primary) || !is_token(sub) {
        return None;
    }
    Some(ContentType {
        primary_type: primary.to_string(),
        sub_type: sub.to_string(),
        parameters: parse_parameter_list(params_part)?,
    })
}

/// Parses `name=value; name="quoted value"`. `None` if any parameter is
/// malformed.
fn parse_parameter_list(params_part: &str) -> Option<Vec<(String, String)>> {
    let bytes = params_part.as_bytes();
    let len = bytes.len();
    let mut parameters = Vec::new();
    let mut pos = 0;

    while pos < len {
        while pos < len && (bytes[pos] == b';' || bytes[pos].is_ascii_whitespace()) {
            pos += 1;
        }
        if pos >= len {
            break;
        }
        let eq = pos + bytes[pos..].iter().position(|&b| b == b'=')?;
        let name = params_part[pos..eq].trim();
        if !is_token(name) {
            return None;
        }
        pos = eq + 1;
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let value = if pos < len && bytes[pos] == b'"' {
            pos += 1;
            let mut v = String::new();
            let mut closed = false;
            let mut chars = params_part[pos..].char_indices();
            while let Some((i, c)) = chars.next() {
                match c {
                    '\\' => {
                        if let Some((_, escaped)) = chars.next() {
                            v.push(escaped);
                        }
                    }
                    '"' => {
                        pos += i + 1;
                        closed = true;
                        break;
                    }
                    _ => v.push(c),
                }
            }
            if !closed {
                return None;
            }
            v
        } else {
            let end = bytes[pos..]
                .iter()
                .position(|&b| b == b';')
                .map_or(len, |i| pos + i);
            let v = params_part[pos..end].trim();
            pos = end;
            if !is_token(v) {
                return None;
            }
            v.to_string()
        };
        parameters.push((name.to_string(), value));
    }
    Some(parameters)
}

/// The outer `multipart/mixed` content type of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchContentType {
    pub boundary: String,
    pub encoding: BatchEncoding,
}

impl BatchContentType {
    /// A batch with the given boundary and UTF-8 text.
    pub fn new(boundary: impl Into<String>) -> Result<Self, FormatError> {
        let boundary = boundary.into();
        if !is_valid_boundary(&boundary) {
            return Err(FormatError::InvalidBoundary(boundary));
        }
        Ok(Self {
            boundary,
            encoding: BatchEncoding::Utf8,
        })
    }

    /// Parses `multipart/mixed; boundary=...[; charset=...]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use odata_batch::{BatchContentType, BatchEncoding};
    ///
    /// let ct = BatchContentType::parse("multipart/mixed; boundary=batch_1").unwrap();
    /// assert_eq!(ct.boundary, "batch_1");
    /// assert_eq!(ct.encoding, BatchEncoding::Utf8);
    /// ```
    pub fn parse(value: &str) -> Result<Self, FormatError> {
        let content_type = parse_content_type(value)
            .filter(|ct| ct.is_mime_type("multipart", "mixed"))
            .ok_or_else(|| FormatError::InvalidContentType(value.to_string()))?;
        let boundary = content_type.boundary()?.to_string();
        let encoding = match content_type.parameter("charset") {
            Some(charset) => BatchEncoding::from_charset(charset)?,
            None => BatchEncoding::Utf8,
        };
        Ok(Self { boundary, encoding })
    }
}
