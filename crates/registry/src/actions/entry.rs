use std::sync::Arc;

use lpic_primitives::ScopeKey;
use tracing::trace;

use super::{ActionContext, ActionHandler, ActionStep};

/// A handler registered against a scope.
///
/// Entries are immutable once registered and shared with every dispatch that
/// resolves to them.
#[derive(Clone)]
pub struct ActionEntry {
	/// The scope the handler was registered under.
	pub scope: ScopeKey,
	/// Module or file that registered the handler, for diagnostics.
	pub source_id: Arc<str>,
	/// The function that executes this action.
	pub handler: ActionHandler,
}

impl ActionEntry {
	/// Invokes the handler.
	pub fn run(&self, ctx: &ActionContext) -> ActionStep {
		trace!(scope = %self.scope, trigger = %ctx.trigger, source = %self.source_id, "running action");
		(self.handler)(ctx)
	}
}

impl std::fmt::Debug for ActionEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActionEntry")
			.field("scope", &self.scope)
			.field("source_id", &self.source_id)
			.finish_non_exhaustive()
	}
}
