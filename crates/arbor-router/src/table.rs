//! Route table: one trie per method plus handler-chain storage.

use std::collections::HashMap;

use arbor_trie::{split_pattern, RadixNode};
use tracing::{debug, info};

use crate::context::Handler;
use crate::error::{Result, RouterError};
use crate::method::Method;
use crate::params::{bind_params, PathParams};

/// Identification of a registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// HTTP method.
    pub method: Method,
    /// Canonical registered pattern.
    pub pattern: String,
}

/// A successful resolution of (method, path) against the table.
pub struct RouteMatch {
    /// The registered template that matched.
    pub pattern: String,
    /// Parameters extracted from the concrete path.
    pub params: PathParams,
    /// The handler chain stored for the template.
    pub chain: Vec<Handler>,
}

/// Maps (method, pattern) to handler chains, backed by one radix tree per
/// method.
///
/// Registration is a single-threaded configuration phase; once the table
/// is sealed it is read-only, so concurrent lookups need no locking.
#[derive(Default)]
pub struct RouteTable {
    trees: HashMap<Method, RadixNode>,
    chains: HashMap<(Method, String), Vec<Handler>>,
    sealed: bool,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler chain for (method, pattern).
    ///
    /// The stored pattern is canonicalized from its segments, so trailing
    /// slashes are neutral. Re-registering an identical route replaces
    /// its chain.
    ///
    /// # Errors
    ///
    /// Fails on an empty pattern, a pattern without a leading `/`, an
    /// empty chain, a sealed table, or a trie conflict.
    pub fn register(&mut self, method: Method, pattern: &str, chain: Vec<Handler>) -> Result<()> {
        if self.sealed {
            return Err(RouterError::Sealed);
        }
        if pattern.is_empty() {
            return Err(RouterError::EmptyPattern);
        }
        if !pattern.starts_with('/') {
            return Err(RouterError::InvalidPattern(pattern.to_string()));
        }
        if chain.is_empty() {
            return Err(RouterError::EmptyChain(pattern.to_string()));
        }

        let parts = split_pattern(pattern);
        let canonical = canonical_pattern(&parts);

        let tree = self.trees.entry(method).or_insert_with(RadixNode::root);
        tree.insert(&parts)?;

        info!(method = %method, pattern = %canonical, "route registered");
        self.chains.insert((method, canonical), chain);
        Ok(())
    }

    /// Resolves a concrete path, returning the matched template, its
    /// bound parameters and a copy of its handler chain.
    ///
    /// `None` covers an unregistered method, a trie miss, and a trie node
    /// with no chain of its own (an intermediate segment) — never a
    /// partial match.
    pub fn resolve(&self, method: Method, path: &str) -> Option<RouteMatch> {
        let tree = self.trees.get(&method)?;
        let parts = split_pattern(path);
        let node = tree.find(&parts)?;

        let pattern = node.path().to_string();
        let chain = self.chains.get(&(method, pattern.clone()))?.clone();
        let params = bind_params(&pattern, &parts);

        Some(RouteMatch {
            pattern,
            params,
            chain,
        })
    }

    /// Prepends `middlewares` to every registered chain whose pattern
    /// starts with `prefix`.
    ///
    /// This only touches chains that already exist: middleware must be
    /// applied once, after all routes are registered and before serving.
    ///
    /// # Errors
    ///
    /// Fails once the table is sealed.
    pub fn attach_middleware(&mut self, prefix: &str, middlewares: &[Handler]) -> Result<()> {
        if self.sealed {
            return Err(RouterError::Sealed);
        }
        if middlewares.is_empty() {
            return Ok(());
        }

        for ((method, pattern), chain) in &mut self.chains {
            if pattern.starts_with(prefix) {
                debug!(method = %method, pattern = %pattern, count = middlewares.len(), "middleware attached");
                let mut combined = middlewares.to_vec();
                combined.append(chain);
                *chain = combined;
            }
        }
        Ok(())
    }

    /// Flips the table read-only. Registration and middleware attachment
    /// are rejected afterwards.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Returns `true` once the table has been sealed for serving.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Lists every registered route.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.chains
            .keys()
            .map(|(method, pattern)| RouteInfo {
                method: *method,
                pattern: pattern.clone(),
            })
            .collect()
    }
}

fn canonical_pattern(parts: &[&str]) -> String {
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}
