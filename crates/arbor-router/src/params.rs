//! Route parameters extracted from matched paths.

use std::collections::HashMap;

use arbor_trie::{split_pattern, PatternSegment};

/// Parameters bound while matching a concrete path against a registered
/// template.
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    params: HashMap<String, String>,
}

impl PathParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Gets a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Gets a parameter value or returns an error naming the missing key.
    pub fn require(&self, key: &str) -> Result<&str, String> {
        self.get(key)
            .ok_or_else(|| format!("missing route parameter: {key}"))
    }

    /// Parses a parameter as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns `true` when no parameters are bound.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Removes all bound parameters, keeping allocated capacity.
    pub fn clear(&mut self) {
        self.params.clear();
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Walks a registered template in lockstep with the concrete path tokens
/// and binds parameter and wildcard names.
///
/// A trailing wildcard captures the remaining tokens joined with `/`. An
/// unnamed wildcard binds nothing; its suffix is discarded.
pub(crate) fn bind_params(pattern: &str, parts: &[&str]) -> PathParams {
    let mut params = PathParams::new();
    for (i, token) in split_pattern(pattern).iter().enumerate() {
        match PatternSegment::parse(token) {
            PatternSegment::Param(name) => {
                if let Some(value) = parts.get(i) {
                    params.insert(name, *value);
                }
            }
            PatternSegment::Wildcard(Some(name)) => {
                let suffix = parts.get(i..).unwrap_or(&[]).join("/");
                params.insert(name, suffix);
            }
            PatternSegment::Static(_) | PatternSegment::Wildcard(None) => {}
        }
    }
    params
}
