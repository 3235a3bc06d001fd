#![deny(clippy::print_stderr)]

//! Scope-driven dispatch.
//!
//! A [`Tokenizer`] turns each line of a document into [`Token`]s carrying
//! scope lists. The [`DispatchLoop`] buckets token texts by scope, resolves
//! each bucket against the [`ActionRegistry`](lpic_registry::ActionRegistry)
//! and runs the matching actions, either one at a time or all at once per line
//! (see [`ActionRunner`]). Lifecycle phases (`initialize`, `run`, `finalize`)
//! are broadcast to every action registered beneath the phase name with
//! [`DispatchLoop::run_actions_starting_with`].

mod dispatch;
mod error;
pub mod runner;
mod tokenizer;
pub mod trace;

pub use dispatch::{DispatchLoop, DispatchOptions, DocumentReport, LIFECYCLE_PHASES, LIFECYCLE_TRIGGER};
pub use error::{DispatchError, Result};
pub use runner::{ActionRunner, Invocation};
pub use tokenizer::{LineTokens, Token, TokenizeError, Tokenizer};
pub use trace::Tracer;
