#![deny(clippy::print_stderr)]

//! TextMate grammar graphs.
//!
//! Grammars are loaded from their JSON form into a [`GrammarSet`] keyed by
//! scope name. The set picks the grammar for a document
//! ([`GrammarSet::choose_base_scope`]) and can shrink every grammar down to
//! the rules able to produce a scope from a [`KeepSet`]
//! ([`GrammarSet::prune`]).

mod error;
pub mod prune;
mod raw;
mod set;

pub use error::{GrammarError, Result};
pub use prune::{KeepSet, PruneDiagnostic, PruneReport};
pub use raw::{GrammarGraph, IncludeRef, RawRule};
pub use set::GrammarSet;
