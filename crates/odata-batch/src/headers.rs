use crate::error::FormatError;

/// Headers of one MIME part or embedded HTTP message, in insertion order.
///
/// Lookup prefers an exact (case-sensitive) name match. Without one, a single
/// case-insensitive match is accepted; several are ambiguous and an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartHeaders {
    entries: Vec<(String, String)>,
}

impl PartHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header. Repeating an exact name is an error; names differing
    /// only in case are kept side by side.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), FormatError> {
        let name = name.into();
        if self.entries.iter().any(|(n, _)| *n == name) {
            return Err(FormatError::DuplicateHeader(name));
        }
        self.entries.push((name, value.into()));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Option<&str>, FormatError> {
        if let Some((_, v)) = self.entries.iter().find(|(n, _)| n == name) {
            return Ok(Some(v.as_str()));
        }
        let mut matches = self
            .entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name));
        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some((_, v)), None) => Ok(Some(v.as_str())),
            (Some(_), Some(_)) => Err(FormatError::AmbiguousHeader(name.to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> Result<bool, FormatError> {
        self.get(name).map(|v| v.is_some())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}
