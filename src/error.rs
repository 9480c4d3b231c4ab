//! Error types.
//!
//! Conformance failure is data, not an error (spec.md §7 kind 1) — it
//! never appears here, only as `None`/`Value` at `conform`-shaped APIs.
//! The variants below cover the two kinds that *are* raised: mistakes a
//! programmer makes while building specs, and generation running out of
//! road.

use crate::explain::ExplainData;
use crate::value::QualifiedName;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Raised by `def` when the given name has no namespace part.
    #[error("cannot register unqualified name {0:?}; registry keys must be namespace/local")]
    UnqualifiedName(String),

    /// Raised by `predicate()` when given something that is not a type
    /// tag, value set, pattern, or callable (spec.md §4.1, §4.3).
    #[error("{0} is not a type, value set, pattern, or callable predicate")]
    InvalidPredicate(String),

    /// Raised by `reg_resolve` when a qualified name's alias chain ends
    /// in a name with no registered spec.
    #[error("unresolved spec name: {0}")]
    UnresolvedName(QualifiedName),

    /// Raised when generation needs a generator that no sub-spec and no
    /// override provides (spec.md §7 kind 3).
    #[error("unable to construct a generator at {path}{}", spec.as_ref().map(|s| format!(" for {s}")).unwrap_or_default())]
    NoGen {
        path: String,
        spec: Option<QualifiedName>,
    },

    /// Raised by `assert` when `check_asserts` is enabled and the value
    /// does not conform (spec.md §7, §6.1).
    #[error("assertion failed:\n{0}")]
    AssertionFailed(Box<ExplainData>),
}
