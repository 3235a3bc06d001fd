use std::sync::Arc;

use lpic_registry::{ActionContext, ActionEntry, ActionError, ActionResult};
use lpic_worker::{TaskClass, WorkerJoinSet, join_error_panic_message};
use tokio::task::JoinError;
use tracing::{error, trace};

use crate::{DispatchError, Result};

/// One action about to run, with the context it runs in.
#[derive(Debug, Clone)]
pub struct Invocation {
	pub entry: Arc<ActionEntry>,
	pub ctx: ActionContext,
}

impl Invocation {
	fn failure(&self, error: ActionError) -> DispatchError {
		error!(
			scope = %self.entry.scope,
			trigger = %self.ctx.trigger,
			source = %self.entry.source_id,
			line = self.ctx.line,
			%error,
			"action failed"
		);
		DispatchError::Handler {
			scope: self.entry.scope.to_string(),
			trigger: self.ctx.trigger.to_string(),
			source_id: self.entry.source_id.to_string(),
			line: self.ctx.line,
			error,
		}
	}
}

/// Runs a batch of invocations sequentially or concurrently.
///
/// Sequentially, each action finishes (including its async work) before the
/// next one starts, and the first failure stops the batch. Concurrently, every
/// action is launched in order, the batch waits for all of them to settle,
/// and the first failure in launch order is returned.
#[derive(Debug, Clone, Copy)]
pub struct ActionRunner {
	parallel: bool,
	class: TaskClass,
}

impl ActionRunner {
	pub fn new(parallel: bool, class: TaskClass) -> Self {
		Self { parallel, class }
	}

	pub fn is_parallel(&self) -> bool {
		self.parallel
	}

	/// Runs `invocations` and returns how many ran.
	pub async fn run(&self, invocations: Vec<Invocation>) -> Result<usize> {
		if self.parallel {
			self.run_parallel(invocations).await
		} else {
			self.run_sequential(invocations).await
		}
	}

	async fn run_sequential(&self, invocations: Vec<Invocation>) -> Result<usize> {
		for (launch, invocation) in invocations.iter().enumerate() {
			trace!(worker_class = self.class.as_str(), launch, scope = %invocation.entry.scope, "launching action");
			if let Err(error) = invocation.entry.run(&invocation.ctx).finish().await {
				return Err(invocation.failure(error));
			}
		}
		Ok(invocations.len())
	}

	async fn run_parallel(&self, invocations: Vec<Invocation>) -> Result<usize> {
		let mut set = WorkerJoinSet::new(self.class);
		for invocation in &invocations {
			let Invocation { entry, ctx } = invocation.clone();
			let launch = set.spawn(async move { entry.run(&ctx).finish().await });
			trace!(worker_class = self.class.as_str(), launch, scope = %invocation.entry.scope, "launching action");
		}

		let mut first = None;
		for (invocation, settled) in invocations.iter().zip(set.drain().await) {
			if let Err(error) = flatten(settled) {
				let failure = invocation.failure(error);
				first.get_or_insert(failure);
			}
		}
		match first {
			Some(failure) => Err(failure),
			None => Ok(invocations.len()),
		}
	}
}

fn flatten(settled: std::result::Result<ActionResult, JoinError>) -> ActionResult {
	match settled {
		Ok(result) => result,
		Err(join_error) => Err(match join_error_panic_message(join_error) {
			Some(msg) => ActionError::Panicked(msg),
			None => ActionError::Cancelled,
		}),
	}
}
