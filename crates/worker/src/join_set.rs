use std::future::Future;

use rustc_hash::FxHashMap as HashMap;
use tokio::task::{Id, JoinError, JoinSet};

use crate::TaskClass;

/// Wrapper for a Tokio [`JoinSet`] that remembers launch order.
///
/// Every spawned task is tagged with its launch index. Completions arrive in
/// whatever order the tasks finish, but [`WorkerJoinSet::drain`] hands results
/// back in launch order once every task has settled.
#[derive(Debug)]
pub struct WorkerJoinSet<T> {
	class: TaskClass,
	inner: JoinSet<T>,
	launched: usize,
	order: HashMap<Id, usize>,
}

impl<T> WorkerJoinSet<T>
where
	T: Send + 'static,
{
	/// Creates an empty join set for the given task class.
	pub fn new(class: TaskClass) -> Self {
		Self {
			class,
			inner: JoinSet::new(),
			launched: 0,
			order: HashMap::default(),
		}
	}

	/// Returns the number of tasks still in the set.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	/// Returns `true` if the set is empty.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Spawns a future into the set on the current runtime and returns its
	/// launch index.
	#[allow(clippy::disallowed_methods)]
	pub fn spawn<F>(&mut self, fut: F) -> usize
	where
		F: Future<Output = T> + Send + 'static,
	{
		let launch = self.launched;
		self.launched += 1;
		tracing::trace!(worker_class = self.class.as_str(), launch, pending = self.inner.len(), "worker.join_set.spawn");
		let handle = self.inner.spawn(fut);
		self.order.insert(handle.id(), launch);
		launch
	}

	/// Waits for the next completed task and returns it with its launch index.
	pub async fn join_next(&mut self) -> Option<(usize, Result<T, JoinError>)> {
		let (id, result) = match self.inner.join_next_with_id().await? {
			Ok((id, value)) => (id, Ok(value)),
			Err(error) => (error.id(), Err(error)),
		};
		let launch = self.order.remove(&id).unwrap_or(usize::MAX);
		Some((launch, result))
	}

	/// Waits for every task to settle and returns the results in launch order.
	pub async fn drain(&mut self) -> Vec<Result<T, JoinError>> {
		let mut settled = Vec::with_capacity(self.inner.len());
		while let Some(entry) = self.join_next().await {
			settled.push(entry);
		}
		settled.sort_by_key(|(launch, _)| *launch);
		tracing::trace!(worker_class = self.class.as_str(), settled = settled.len(), "worker.join_set.drained");
		settled.into_iter().map(|(_, result)| result).collect()
	}
}
