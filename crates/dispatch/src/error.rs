use lpic_registry::ActionError;
use thiserror::Error;

use crate::TokenizeError;

/// Errors that abort the dispatch of a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
	/// A registered action failed.
	#[error("action on '{scope}' from {source_id} failed at line {line} (triggered by '{trigger}'): {error}")]
	Handler {
		/// Scope the failing action was registered under.
		scope: String,
		/// Scope that triggered it.
		trigger: String,
		/// Module or file that registered the action.
		source_id: String,
		/// Zero-based line number.
		line: usize,
		#[source]
		error: ActionError,
	},
	/// The tokenizer could not tokenize a line.
	#[error("tokenizing {document} failed at line {line}: {error}")]
	Tokenizer {
		document: String,
		line: usize,
		#[source]
		error: TokenizeError,
	},
}

impl DispatchError {
	/// The action failure, if this is one.
	pub fn action_error(&self) -> Option<&ActionError> {
		match self {
			Self::Handler { error, .. } => Some(error),
			Self::Tokenizer { .. } => None,
		}
	}
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
