#![deny(clippy::print_stderr)]

//! Scope-keyed action registry.
//!
//! Actions are callbacks registered against a dot-delimited scope such as
//! `keyword.control.context`. The [`ActionRegistry`] stores them in a trie
//! keyed by scope segment and answers three kinds of query:
//!
//! * [`ActionRegistry::lookup_exact`]: the actions registered on one scope.
//! * [`ActionRegistry::lookup_ancestors`]: every registered ancestor of a
//!   scope, most specific first.
//! * [`ActionRegistry::scan_prefix`]: every registered scope beneath a prefix,
//!   sorted by scope.
//!
//! Actions are registered either at runtime through
//! [`ActionRegistry::register`] or at link time with [`scope_action!`], which
//! [`ActionRegistry::with_builtins`] collects.

pub mod actions;
mod error;
mod registry;

#[doc(hidden)]
pub use inventory;
#[doc(hidden)]
pub use paste;

pub use actions::{
	ActionContext, ActionEntry, ActionFuture, ActionHandler, ActionHandlerReg, ActionHandlerStatic, ActionResult,
	ActionStep,
};
pub use error::{ActionError, RegistryError};
pub use lpic_primitives::{ScopeError, ScopeKey};
pub use registry::{ActionRegistry, Resolution, ScopeMatch};
