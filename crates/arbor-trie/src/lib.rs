//! # arbor-trie
//!
//! A compressed path-segment trie for URL route matching.
//!
//! This crate provides:
//! - Pattern tokenizing with static, `:param` and `*wildcard` segments
//! - A per-method radix tree with conflict-checked insertion
//! - First-match lookup with static-over-dynamic precedence
//!
//! ## Quick Start
//!
//! ```
//! use arbor_trie::{split_pattern, RadixNode};
//!
//! let mut root = RadixNode::root();
//! root.insert(&split_pattern("/users/:id")).unwrap();
//! root.insert(&split_pattern("/users/admin")).unwrap();
//!
//! let node = root.find(&split_pattern("/users/admin")).unwrap();
//! assert_eq!(node.path(), "/users/admin");
//!
//! let node = root.find(&split_pattern("/users/42")).unwrap();
//! assert_eq!(node.path(), "/users/:id");
//! ```
//!
//! ## Pattern syntax
//!
//! - `/users` — static segments, matched verbatim
//! - `/users/:id` — a parameter segment, matching exactly one path token
//! - `/files/*path` — a trailing wildcard, greedily matching the remainder
//!
//! A wildcard terminates its pattern; anything written after it is dropped
//! by [`split_pattern`].

mod node;
mod segment;

pub use node::{InsertError, RadixNode};
pub use segment::{split_pattern, PatternSegment};
