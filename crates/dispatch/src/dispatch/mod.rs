use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use lpic_config::Config;
use lpic_primitives::{Document, Structures};
use lpic_registry::{ActionContext, ActionRegistry, Resolution, ScopeKey};
use lpic_worker::TaskClass;
use tracing::{debug, info, trace};

use crate::runner::{ActionRunner, Invocation};
use crate::trace::Tracer;
use crate::{DispatchError, Result, Token, Tokenizer};


/// Lifecycle phases broadcast around a run, in order.
pub const LIFECYCLE_PHASES: [&str; 3] = ["initialize", "run", "finalize"];

/// Triggering scope reported to lifecycle actions.
pub const LIFECYCLE_TRIGGER: &str = "lpic";

/// How a dispatch loop runs actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
	/// Launch every action of a line concurrently.
	pub parallel: bool,
	/// How a scope seen in a token maps to registered actions.
	pub resolution: Resolution,
}

impl From<&Config> for DispatchOptions {
	fn from(config: &Config) -> Self {
		Self {
			parallel: config.parallel,
			resolution: config.resolution,
		}
	}
}

/// Counters for one dispatched document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentReport {
	pub lines: usize,
	pub actions: usize,
}

/// Turns tokenized lines into action invocations.
///
/// The registry is frozen behind an `Arc` for the duration of dispatch. Lines
/// are handled strictly in order: line `n + 1` is not dispatched until every
/// action of line `n` has settled.
pub struct DispatchLoop {
	registry: Arc<ActionRegistry>,
	structures: Arc<dyn Structures>,
	options: DispatchOptions,
	tracer: Tracer,
}

impl DispatchLoop {
	pub fn new(registry: Arc<ActionRegistry>, structures: Arc<dyn Structures>) -> Self {
		Self {
			registry,
			structures,
			options: DispatchOptions::default(),
			tracer: Tracer::disabled(),
		}
	}

	pub fn with_options(mut self, options: DispatchOptions) -> Self {
		self.options = options;
		self
	}

	pub fn with_tracer(mut self, tracer: Tracer) -> Self {
		self.tracer = tracer;
		self
	}

	pub fn registry(&self) -> &ActionRegistry {
		&self.registry
	}

	pub fn structures(&self) -> &Arc<dyn Structures> {
		&self.structures
	}

	pub fn options(&self) -> DispatchOptions {
		self.options
	}

	/// Groups the token texts of a line by scope.
	///
	/// Only scopes that resolve to at least one action are buffered. Scopes
	/// are kept in the order they were first seen on the line; texts in token
	/// order. Each distinct scope on the line is parsed once; malformed ones
	/// are skipped.
	pub fn bucket_line(&self, line: &str, tokens: &[Token]) -> IndexMap<ScopeKey, Vec<String>> {
		let mut buckets: IndexMap<ScopeKey, Vec<String>> = IndexMap::new();
		let mut misses: IndexSet<&str> = IndexSet::new();
		for token in tokens {
			let text = token.text(line);
			for scope in &token.scopes {
				if let Some(texts) = buckets.get_mut(scope.as_str()) {
					texts.push(text.to_string());
					continue;
				}
				if misses.contains(scope.as_str()) {
					continue;
				}
				match ScopeKey::parse(scope) {
					Ok(key) if self.registry.has_actions(&key, self.options.resolution) => {
						buckets.insert(key, vec![text.to_string()]);
					}
					Ok(_) => {
						misses.insert(scope);
					}
					Err(error) => {
						trace!(scope = scope.as_str(), %error, "skipping malformed token scope");
						misses.insert(scope);
					}
				}
			}
		}
		buckets
	}

	fn invocations(&self, scope: &ScopeKey, tokens: &Arc<[String]>, line: usize, document: Option<&Arc<Document>>) -> Vec<Invocation> {
		let trigger: Arc<str> = Arc::from(scope.as_str());
		self.registry
			.resolve(scope, self.options.resolution)
			.into_iter()
			.flat_map(|group| group.actions.iter())
			.map(|entry| Invocation {
				entry: entry.clone(),
				ctx: self.context(entry.scope.clone(), trigger.clone(), tokens.clone(), line, document),
			})
			.collect()
	}

	fn context(&self, scope: ScopeKey, trigger: Arc<str>, tokens: Arc<[String]>, line: usize, document: Option<&Arc<Document>>) -> ActionContext {
		ActionContext {
			scope,
			trigger,
			tokens,
			line,
			document: document.cloned(),
			structures: self.structures.clone(),
		}
	}

	/// Runs the actions for every scope on one tokenized line.
	///
	/// Returns how many actions ran. The first failure aborts the line;
	/// concurrently launched actions are allowed to settle first.
	pub async fn dispatch_line(&self, line: &str, tokens: &[Token], number: usize, document: Option<&Arc<Document>>) -> Result<usize> {
		let traced = self.tracer.line(number, line, tokens);
		let buckets = self.bucket_line(line, tokens);
		if buckets.is_empty() {
			return Ok(0);
		}
		let runner = ActionRunner::new(self.options.parallel, TaskClass::Dispatch);

		let mut traced_scopes = false;
		let mut batch = Vec::new();
		let mut ran = 0;
		for (scope, texts) in buckets {
			let texts: Arc<[String]> = texts.into();
			let scope_traced = self.tracer.actions(traced, scope.as_str());
			if scope_traced {
				self.tracer.tokens(number, scope.as_str(), &texts);
			}
			let invocations = self.invocations(&scope, &texts, number, document);
			if runner.is_parallel() {
				traced_scopes |= scope_traced;
				batch.extend(invocations);
			} else {
				ran += runner.run(invocations).await?;
				if scope_traced {
					self.tracer.structures(self.structures.as_ref());
				}
			}
		}
		if runner.is_parallel() {
			ran += runner.run(batch).await?;
			if traced_scopes {
				self.tracer.structures(self.structures.as_ref());
			}
		}
		trace!(line = number, actions = ran, "dispatched line");
		Ok(ran)
	}

	/// Tokenizes and dispatches a whole document, line by line.
	///
	/// A tokenizer failure aborts the document; the registry is untouched.
	pub async fn run_document<T>(&self, tokenizer: &T, document: &Arc<Document>) -> Result<DocumentReport>
	where
		T: Tokenizer + ?Sized,
	{
		debug!(document = %document.name, lines = document.lines.len(), "dispatching document");
		let mut report = DocumentReport::default();
		let mut state = tokenizer.initial_state();
		for (number, line) in document.lines.iter().enumerate() {
			let tokenized = tokenizer.tokenize_line(line, &state).map_err(|error| DispatchError::Tokenizer {
				document: document.name.clone(),
				line: number,
				error,
			})?;
			report.actions += self.dispatch_line(line, &tokenized.tokens, number, Some(document)).await?;
			report.lines += 1;
			state = tokenized.state;
		}
		info!(document = %document.name, lines = report.lines, actions = report.actions, "dispatched document");
		Ok(report)
	}

	/// Runs every action registered on a scope that starts with `prefix`'s
	/// segments, in sorted scope order then registration order.
	pub async fn run_actions_starting_with(
		&self,
		prefix: &str,
		trigger: &str,
		tokens: Vec<String>,
		line: usize,
		document: Option<&Arc<Document>>,
		parallel: bool,
	) -> Result<usize> {
		let tokens: Arc<[String]> = tokens.into();
		let trigger: Arc<str> = Arc::from(trigger);
		let invocations: Vec<Invocation> = self
			.registry
			.scan_prefix(prefix)
			.into_iter()
			.flat_map(|group| group.actions.iter())
			.map(|entry| Invocation {
				entry: entry.clone(),
				ctx: self.context(entry.scope.clone(), trigger.clone(), tokens.clone(), line, document),
			})
			.collect();
		debug!(prefix, actions = invocations.len(), parallel, "broadcasting");
		ActionRunner::new(parallel, TaskClass::Lifecycle).run(invocations).await
	}

	/// Broadcasts one lifecycle phase. The `run` phase receives `files` as
	/// its tokens; the other phases receive none.
	pub async fn run_phase(&self, phase: &str, files: &[String]) -> Result<usize> {
		let tokens = if phase == "run" { files.to_vec() } else { Vec::new() };
		self.run_actions_starting_with(phase, LIFECYCLE_TRIGGER, tokens, 0, None, self.options.parallel).await
	}

	/// Broadcasts `initialize`, `run` and `finalize` in turn.
	pub async fn run_lifecycle(&self, files: &[String]) -> Result<usize> {
		let mut ran = 0;
		for phase in LIFECYCLE_PHASES {
			ran += self.run_phase(phase, files).await?;
		}
		Ok(ran)
	}
}

impl std::fmt::Debug for DispatchLoop {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DispatchLoop")
			.field("registry", &self.registry)
			.field("options", &self.options)
			.field("tracer", &self.tracer.is_enabled())
			.finish_non_exhaustive()
	}
}
