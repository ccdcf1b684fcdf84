//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
///
/// All of these are configuration-time failures: they are returned from
/// registration and never reach request-handling code.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route pattern was empty.
    #[error("route pattern cannot be empty")]
    EmptyPattern,

    /// A route pattern did not begin with the path separator.
    #[error("route pattern must begin with '/': {0}")]
    InvalidPattern(String),

    /// A route was registered without any handlers.
    #[error("route {0} has no handlers")]
    EmptyChain(String),

    /// The route table was already sealed for serving.
    #[error("route table is sealed: routes and middleware must be configured before serving")]
    Sealed,

    /// The pattern conflicts with an already registered sibling.
    #[error(transparent)]
    Conflict(#[from] arbor_trie::InsertError),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
