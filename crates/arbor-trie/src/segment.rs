//! Pattern tokenizing.

/// One `/`-delimited token of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// A literal segment, matched verbatim.
    Static(String),
    /// A named parameter segment (e.g. `:id`), matching one path token.
    Param(String),
    /// A trailing wildcard segment (e.g. `*file` or bare `*`), matching
    /// the remainder of the path. `None` if unnamed.
    Wildcard(Option<String>),
}

impl PatternSegment {
    /// Classifies a raw token by its leading marker.
    pub fn parse(token: &str) -> Self {
        if let Some(name) = token.strip_prefix(':') {
            Self::Param(name.to_string())
        } else if let Some(name) = token.strip_prefix('*') {
            if name.is_empty() {
                Self::Wildcard(None)
            } else {
                Self::Wildcard(Some(name.to_string()))
            }
        } else {
            Self::Static(token.to_string())
        }
    }

    /// Returns `true` for parameter segments.
    pub fn is_param(&self) -> bool {
        matches!(self, Self::Param(_))
    }

    /// Returns `true` for wildcard segments.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard(_))
    }
}

/// Splits a pattern or concrete path into its non-empty tokens.
///
/// Empty tokens are dropped, so a trailing slash does not change the
/// result. Tokenizing stops after the first wildcard token: a wildcard
/// absorbs the rest of the path, so later tokens can never match.
pub fn split_pattern(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for part in pattern.split('/') {
        if part.is_empty() {
            continue;
        }
        parts.push(part);
        if part.starts_with('*') {
            break;
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pattern() {
        assert_eq!(split_pattern("/p/:name"), vec!["p", ":name"]);
        assert_eq!(split_pattern("/p/*"), vec!["p", "*"]);
        assert_eq!(split_pattern("/p/*name/*"), vec!["p", "*name"]);
        assert_eq!(split_pattern("/"), Vec::<&str>::new());
        assert_eq!(split_pattern("/a//b/"), vec!["a", "b"]);
    }

    #[test]
    fn test_segment_classification() {
        assert_eq!(
            PatternSegment::parse("users"),
            PatternSegment::Static("users".to_string())
        );
        assert_eq!(
            PatternSegment::parse(":id"),
            PatternSegment::Param("id".to_string())
        );
        assert_eq!(
            PatternSegment::parse("*file"),
            PatternSegment::Wildcard(Some("file".to_string()))
        );
        assert_eq!(PatternSegment::parse("*"), PatternSegment::Wildcard(None));
    }
}
