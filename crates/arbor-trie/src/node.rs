//! Radix tree nodes.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::segment::PatternSegment;

/// Fatal registration conflicts.
///
/// Conflicts that the tree can resolve on its own (a wildcard replacing
/// its siblings, an unnamed wildcard) are reported as warnings instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InsertError {
    /// A concrete segment cannot coexist with a wildcard sibling: the
    /// wildcard already absorbs everything at this position.
    #[error("cannot register {path}: position is already covered by a wildcard pattern")]
    WildcardConflict {
        /// Full path of the rejected segment.
        path: String,
    },

    /// Only one parameter child is allowed per node.
    #[error("cannot register {path}: a parameter pattern already exists at this position")]
    DuplicateParam {
        /// Full path of the rejected segment.
        path: String,
    },
}

/// One segment position in the compressed trie.
///
/// The root node carries an empty literal and the path `/`. Every other
/// node is created during registration and never mutated once lookups
/// begin, which is what makes lock-free concurrent matching sound.
#[derive(Debug, Clone)]
pub struct RadixNode {
    /// Raw segment token (`users`, `:id`, `*file`).
    literal: String,
    /// Full path from the root, the canonical registered-route identity.
    path: String,
    is_param: bool,
    is_wildcard: bool,
    children: Vec<RadixNode>,
    has_param_child: bool,
    has_wildcard_child: bool,
}

impl RadixNode {
    /// Creates the root node.
    pub fn root() -> Self {
        Self {
            literal: String::new(),
            path: "/".to_string(),
            is_param: false,
            is_wildcard: false,
            children: Vec::new(),
            has_param_child: false,
            has_wildcard_child: false,
        }
    }

    /// Returns the full path from the root to this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw segment token of this node.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Returns `true` if this node is a parameter segment.
    pub fn is_param(&self) -> bool {
        self.is_param
    }

    /// Returns `true` if this node is a wildcard segment.
    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard
    }

    /// Inserts a tokenized pattern, creating nodes for the segments that
    /// do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError`] when the pattern conflicts with an already
    /// registered sibling (duplicate parameter, or any concrete segment
    /// under an existing wildcard).
    pub fn insert(&mut self, parts: &[&str]) -> Result<(), InsertError> {
        self.insert_at(parts, 0)
    }

    fn insert_at(&mut self, parts: &[&str], height: usize) -> Result<(), InsertError> {
        if height == parts.len() {
            return Ok(());
        }

        let part = parts[height];
        let idx = match self.children.iter().position(|c| c.literal == part) {
            Some(idx) => idx,
            None => self.add_child(parts, height)?,
        };
        self.children[idx].insert_at(parts, height + 1)
    }

    /// Creates a child for `parts[height]` and returns its index.
    fn add_child(&mut self, parts: &[&str], height: usize) -> Result<usize, InsertError> {
        let part = parts[height];
        let path = format!("/{}", parts[..=height].join("/"));
        let segment = PatternSegment::parse(part);

        if !segment.is_wildcard() && self.has_wildcard_child {
            return Err(InsertError::WildcardConflict { path });
        }
        if segment.is_param() && self.has_param_child {
            return Err(InsertError::DuplicateParam { path });
        }

        let child = Self {
            literal: part.to_string(),
            path,
            is_param: segment.is_param(),
            is_wildcard: segment.is_wildcard(),
            children: Vec::new(),
            has_param_child: false,
            has_wildcard_child: false,
        };

        let idx = if child.is_wildcard {
            if matches!(segment, PatternSegment::Wildcard(None)) {
                warn!(pattern = %child.path, "unnamed wildcard, captured suffix will not be bound");
            }
            if self.children.is_empty() {
                self.children.push(child);
            } else if self.has_wildcard_child {
                // Wildcard children are always alone, see the conflict
                // check above.
                warn!(
                    pattern = %child.path,
                    replaces = %self.children[0].path,
                    "wildcard pattern replaces an existing wildcard subtree"
                );
                self.children[0] = child;
            } else {
                warn!(
                    pattern = %child.path,
                    under = %self.path,
                    "wildcard pattern replaces all sibling patterns"
                );
                self.children.clear();
                self.has_param_child = false;
                self.children.push(child);
            }
            self.has_wildcard_child = true;
            0
        } else if child.is_param {
            self.children.push(child);
            self.has_param_child = true;
            self.children.len() - 1
        } else {
            // Static children sit at the front of the list so lookups
            // visit them before parameter and wildcard siblings.
            self.children.insert(0, child);
            0
        };

        Ok(idx)
    }

    /// Looks up a tokenized concrete path.
    ///
    /// Descends into the first qualifying child at each depth; because
    /// static children are kept at the front of the child list, a static
    /// match wins over a parameter or wildcard sibling. There is no
    /// backtracking: once a branch is chosen, a deeper mismatch makes the
    /// whole lookup miss rather than trying the next sibling.
    pub fn find(&self, parts: &[&str]) -> Option<&Self> {
        self.find_at(parts, 0)
    }

    fn find_at(&self, parts: &[&str], height: usize) -> Option<&Self> {
        if height == parts.len() || self.is_wildcard {
            return Some(self);
        }

        let part = parts[height];
        self.children
            .iter()
            .find(|child| {
                child.literal == part || child.is_param || child.is_wildcard || part.starts_with('*')
            })
            .and_then(|child| child.find_at(parts, height + 1))
    }

    /// Collects this node and all descendants in pre-order.
    pub fn walk<'a>(&'a self, out: &mut Vec<&'a Self>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

impl fmt::Display for RadixNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "literal: {}, path: {}, is_param: {}, is_wildcard: {}, children: {}",
            self.literal,
            self.path,
            self.is_param,
            self.is_wildcard,
            self.children.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::split_pattern;

    fn build(patterns: &[&str]) -> RadixNode {
        let mut root = RadixNode::root();
        for pattern in patterns {
            root.insert(&split_pattern(pattern)).unwrap();
        }
        root
    }

    #[test]
    fn test_insert_and_walk() {
        let root = build(&[
            "/",
            "/:user",
            "/:user/profile",
            "/:user/viewcount",
            "/admin",
            "/view",
            "/view/:id",
            "/view/:id/:user",
            "/static/*css",
        ]);

        let mut nodes = Vec::new();
        root.walk(&mut nodes);
        // Root plus one node per distinct segment position.
        assert_eq!(nodes.len(), 10);
    }

    #[test]
    fn test_find_matches_registered_patterns() {
        let root = build(&[
            "/",
            "/:user",
            "/:user/profile",
            "/:user/viewcount",
            "/admin",
            "/view",
            "/view/:id",
            "/view/:id/:user",
            "/static/*css",
        ]);

        let cases = [
            ("/", "/"),
            ("/abc", "/:user"),
            ("/abc/profile", "/:user/profile"),
            ("/abc/viewcount", "/:user/viewcount"),
            ("/admin", "/admin"),
            ("/view", "/view"),
            ("/view/123", "/view/:id"),
            ("/view/456/abc", "/view/:id/:user"),
            ("/static/js", "/static/*css"),
            ("/static/css/abc.css", "/static/*css"),
        ];

        for (path, expected) in cases {
            let node = root.find(&split_pattern(path)).expect(path);
            assert_eq!(node.path(), expected, "lookup of {path}");
        }
    }

    #[test]
    fn test_static_wins_over_param() {
        let root = build(&["/users/:id", "/users/admin"]);
        let node = root.find(&split_pattern("/users/admin")).unwrap();
        assert_eq!(node.path(), "/users/admin");
        let node = root.find(&split_pattern("/users/42")).unwrap();
        assert_eq!(node.path(), "/users/:id");
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let mut root = build(&["/a/:x"]);
        let err = root.insert(&split_pattern("/a/:y")).unwrap_err();
        assert_eq!(
            err,
            InsertError::DuplicateParam {
                path: "/a/:y".to_string()
            }
        );
    }

    #[test]
    fn test_concrete_sibling_under_wildcard_rejected() {
        let mut root = build(&["/static/*file"]);
        let err = root.insert(&split_pattern("/static/a")).unwrap_err();
        assert_eq!(
            err,
            InsertError::WildcardConflict {
                path: "/static/a".to_string()
            }
        );
        let err = root.insert(&split_pattern("/static/:name")).unwrap_err();
        assert!(matches!(err, InsertError::WildcardConflict { .. }));
    }

    #[test]
    fn test_wildcard_absorbs_existing_siblings() {
        let root = build(&["/static/a", "/static/b", "/static/*file"]);

        let node = root.find(&split_pattern("/static/a")).unwrap();
        assert_eq!(node.path(), "/static/*file");
        let node = root.find(&split_pattern("/static/b")).unwrap();
        assert_eq!(node.path(), "/static/*file");
    }

    #[test]
    fn test_wildcard_replaces_existing_wildcard() {
        let root = build(&["/files/*old", "/files/*new"]);
        let node = root.find(&split_pattern("/files/a/b")).unwrap();
        assert_eq!(node.path(), "/files/*new");
    }

    #[test]
    fn test_no_backtracking_on_deeper_mismatch() {
        let root = build(&["/a/b/c", "/a/:x/d"]);
        // "/a/b" is taken first (static precedence); its subtree has no
        // "d", and the lookup does not retry the parameter sibling.
        assert!(root.find(&split_pattern("/a/b/d")).is_none());
        // The parameter branch is still reachable for other tokens.
        let node = root.find(&split_pattern("/a/z/d")).unwrap();
        assert_eq!(node.path(), "/a/:x/d");
    }

    #[test]
    fn test_miss_on_unregistered_path() {
        let root = build(&["/admin"]);
        assert!(root.find(&split_pattern("/admin/settings")).is_none());
        assert!(root.find(&split_pattern("/other")).is_none());
    }
}
