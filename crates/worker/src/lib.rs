#![deny(clippy::print_stderr)]

//! Task plumbing for running actions concurrently.
//!
//! Actions launched for one line (or one lifecycle broadcast) go into a
//! [`WorkerJoinSet`], which drains after every task settles and reports the
//! results in launch order.

mod class;
mod join_set;

pub use class::TaskClass;
pub use join_set::WorkerJoinSet;
use tokio::task::JoinError;

/// Extracts the panic message from a [`JoinError`].
///
/// Returns `None` if the task was cancelled rather than panicking.
pub fn join_error_panic_message(err: JoinError) -> Option<String> {
	if !err.is_panic() {
		return None;
	}
	let payload = err.into_panic();
	let msg = if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"non-string panic payload".to_string()
	};
	Some(msg)
}
