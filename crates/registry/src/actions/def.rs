use std::future::Future;
use std::sync::Arc;

use lpic_primitives::BoxFutureStatic;

use super::ActionContext;
use crate::ActionError;

/// Outcome of running an action.
pub type ActionResult = Result<(), ActionError>;

/// A boxed future that resolves to an [`ActionResult`].
pub type ActionFuture = BoxFutureStatic<ActionResult>;

/// Shared handler callable stored in the registry.
pub type ActionHandler = Arc<dyn Fn(&ActionContext) -> ActionStep + Send + Sync>;

/// What a handler hands back to the dispatcher.
///
/// Synchronous handlers finish inside the call and return [`ActionStep::Done`].
/// Handlers that perform asynchronous work return [`ActionStep::Async`]; the
/// future must own everything it touches (clone what it needs out of the
/// context) because it may be moved onto a worker task.
pub enum ActionStep {
	/// The action completed synchronously with the given result.
	Done(ActionResult),
	/// The action needs async work. The future will be awaited.
	Async(ActionFuture),
}

impl ActionStep {
	/// A synchronous success.
	pub fn done() -> Self {
		Self::Done(Ok(()))
	}

	/// A synchronous failure.
	pub fn fail(msg: impl std::fmt::Display) -> Self {
		Self::Done(Err(ActionError::failed(msg)))
	}

	/// Wraps a future as an async step.
	pub fn future<F>(fut: F) -> Self
	where
		F: Future<Output = ActionResult> + Send + 'static,
	{
		Self::Async(Box::pin(fut))
	}

	/// Drives the step to completion on the current task.
	pub async fn finish(self) -> ActionResult {
		match self {
			Self::Done(result) => result,
			Self::Async(fut) => fut.await,
		}
	}
}

impl std::fmt::Debug for ActionStep {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Done(result) => f.debug_tuple("Done").field(result).finish(),
			Self::Async(_) => f.write_str("Async(..)"),
		}
	}
}

impl From<ActionResult> for ActionStep {
	fn from(result: ActionResult) -> Self {
		Self::Done(result)
	}
}

impl From<()> for ActionStep {
	fn from(_: ()) -> Self {
		Self::done()
	}
}
