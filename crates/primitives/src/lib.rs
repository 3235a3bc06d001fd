#![deny(clippy::print_stderr)]

//! Value types shared by every stage of the scope-driven toolchain.

/// Documents and the document cache.
pub mod document;
/// Async future aliases.
pub mod future;
/// Dot-delimited scope keys.
pub mod scope;
/// The key-value store that actions populate.
pub mod structures;

pub use document::{Document, DocumentCache};
pub use future::BoxFutureStatic;
pub use scope::{ScopeError, ScopeKey};
pub use structures::{MemoryStructures, Structures};
