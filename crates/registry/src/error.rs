use lpic_primitives::ScopeError;
use thiserror::Error;

/// Errors raised while populating an [`ActionRegistry`](crate::ActionRegistry).
///
/// Registration is all-or-nothing: a rejected call leaves the registry untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	/// The scope string is not a well-formed scope.
	#[error("invalid scope '{scope}' registered by {source_id}: {error}")]
	InvalidScope {
		/// The scope as given.
		scope: String,
		/// Module or file that attempted the registration.
		source_id: String,
		/// Why the scope was rejected.
		#[source]
		error: ScopeError,
	},
}

/// Failure reported by a running action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
	/// General failure with message.
	#[error("{0}")]
	Failed(String),
	/// File I/O performed by the action failed.
	#[error("I/O error: {0}")]
	Io(String),
	/// Reading or writing a structure failed.
	#[error("structure error: {0}")]
	Structure(String),
	/// The action panicked while running on a worker task.
	#[error("action panicked: {0}")]
	Panicked(String),
	/// The action's task was cancelled before it finished.
	#[error("action cancelled")]
	Cancelled,
}

impl ActionError {
	/// Builds a [`ActionError::Failed`] from any displayable message.
	pub fn failed(msg: impl std::fmt::Display) -> Self {
		Self::Failed(msg.to_string())
	}
}

impl From<std::io::Error> for ActionError {
	fn from(error: std::io::Error) -> Self {
		Self::Io(error.to_string())
	}
}

impl From<serde_json::Error> for ActionError {
	fn from(error: serde_json::Error) -> Self {
		Self::Structure(error.to_string())
	}
}
