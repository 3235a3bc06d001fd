use std::sync::Arc;

use lpic_primitives::{Document, ScopeKey, Structures};

/// Everything an action is told about the scope occurrence that triggered it.
///
/// Cloning is cheap: every field is shared.
#[derive(Clone)]
pub struct ActionContext {
	/// The scope the action was registered under.
	pub scope: ScopeKey,
	/// The scope that actually triggered the action. Equal to `scope` for exact
	/// matches; a descendant of it under ancestor resolution; the lifecycle
	/// trigger for prefix broadcasts.
	pub trigger: Arc<str>,
	/// Text of every token on the line carrying the triggering scope, left to right.
	pub tokens: Arc<[String]>,
	/// Zero-based line number.
	pub line: usize,
	/// The document being scanned, if any.
	pub document: Option<Arc<Document>>,
	/// Store the action writes its extracted data into.
	pub structures: Arc<dyn Structures>,
}

impl ActionContext {
	/// Concatenated token text.
	pub fn text(&self) -> String {
		self.tokens.concat()
	}
}

impl std::fmt::Debug for ActionContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActionContext")
			.field("scope", &self.scope)
			.field("trigger", &self.trigger)
			.field("tokens", &self.tokens)
			.field("line", &self.line)
			.field("document", &self.document.as_ref().map(|d| d.name.as_str()))
			.finish_non_exhaustive()
	}
}
