//! Action handler static registration via `inventory`.
//!
//! Each [`scope_action!`](crate::scope_action) invocation creates an
//! [`ActionHandlerStatic`] and submits it via `inventory::submit!`. At startup
//! [`ActionRegistry::with_builtins`](crate::ActionRegistry::with_builtins)
//! collects every submitted handler linked into the binary.

use super::{ActionContext, ActionStep};

/// Static handler registration entry collected via `inventory`.
#[derive(Debug)]
pub struct ActionHandlerStatic {
	/// Handler name, unique within its module.
	pub name: &'static str,
	/// Scope the handler is registered under.
	pub scope: &'static str,
	/// Module that defined this handler.
	pub source: &'static str,
	/// The handler function pointer.
	pub handler: fn(&ActionContext) -> ActionStep,
}

/// Wrapper for `inventory::collect!`.
#[derive(Debug)]
pub struct ActionHandlerReg(pub &'static ActionHandlerStatic);

inventory::collect!(ActionHandlerReg);
