//! Subcommand implementations.
//!
//! Every command writes its result to the given writer; logs go through
//! `tracing` to stderr.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, bail};
use lpic_config::Config;
use lpic_dispatch::{DispatchLoop, DispatchOptions, Tracer};
use lpic_grammar::{GrammarSet, KeepSet};
use lpic_primitives::{DocumentCache, MemoryStructures};
use lpic_registry::ActionRegistry;
use tracing::{info, warn};

use crate::cli::Command;
use crate::collect::register_collectors;
use crate::replay::ReplayTokenizer;


/// Loaded configuration, grammars and built-in actions.
pub struct Session {
	pub config: Config,
	pub grammars: GrammarSet,
	pub registry: ActionRegistry,
	/// Trace dispatch through [`Tracer`].
	pub trace_dispatch: bool,
}

impl Session {
	pub fn open(config: Config, trace_dispatch: bool) -> anyhow::Result<Self> {
		let mut grammars = GrammarSet::new();
		for path in config.grammar_paths() {
			grammars
				.load_file(&path)
				.with_context(|| format!("loading grammar {}", path.display()))?;
		}
		let registry = ActionRegistry::with_builtins()?;
		info!(grammars = grammars.len(), actions = registry.len(), "session ready");
		Ok(Self {
			config,
			grammars,
			registry,
			trace_dispatch,
		})
	}

	/// The scopes of every registered action.
	fn keep_set(&self) -> KeepSet {
		self.registry.scopes().iter().map(|scope| scope.as_str()).collect()
	}
}

pub async fn run(command: Command, mut session: Session, out: &mut impl Write) -> anyhow::Result<()> {
	match command {
		Command::Actions => {
			for entry in session.registry.entries() {
				writeln!(out, "{}\t{}", entry.scope, entry.source_id)?;
			}
		}
		Command::Scopes => {
			for scope in session.grammars.known_scopes() {
				writeln!(out, "{scope}")?;
			}
		}
		Command::Show { scopes } => show(&session, &scopes, out)?,
		Command::Choose { document } => {
			let mut documents = DocumentCache::new();
			let path = session.config.resolve_path(&document);
			let document = documents
				.load_file(&path)
				.with_context(|| format!("reading {}", path.display()))?;
			match session.grammars.choose_base_scope(&document.match_path(), document.first_line()) {
				Some(scope) => writeln!(out, "{scope}")?,
				None => bail!("no grammar matches {}", path.display()),
			}
		}
		Command::Prune { keep } => {
			let keep = if keep.is_empty() {
				session.keep_set()
			} else {
				keep.iter().collect()
			};
			let report = session.grammars.prune(&keep);
			show(&session, &[], out)?;
			writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
		}
		Command::Trace {
			document,
			tokens,
			collect,
			prune,
		} => trace(session, &document, &tokens, &collect, prune, out).await?,
	}
	Ok(())
}

fn show(session: &Session, scopes: &[String], out: &mut impl Write) -> anyhow::Result<()> {
	let all: Vec<String>;
	let scopes = if scopes.is_empty() {
		all = session.grammars.scopes().map(str::to_string).collect();
		&all
	} else {
		scopes
	};
	for scope in scopes {
		writeln!(out, "{}", session.grammars.to_json_pretty(scope)?)?;
	}
	Ok(())
}

/// Replays a token stream through the dispatch loop and writes the collected
/// structures.
///
/// With pruning on, the grammars are pruned against the registered action
/// scopes before dispatch and the [`PruneReport`](lpic_grammar::PruneReport) is written first. The
/// pruned grammars are what an external tokenizer would load; replay itself
/// never reads them.
async fn trace(mut session: Session, document: &str, tokens: &str, collect: &[String], prune: bool, out: &mut impl Write) -> anyhow::Result<()> {
	let store = Arc::new(MemoryStructures::new());
	register_collectors(&mut session.registry, collect, &store)?;

	if prune || session.config.prune {
		let keep = session.keep_set();
		let report = session.grammars.prune(&keep);
		writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
	}

	let mut documents = DocumentCache::new();
	let path = session.config.resolve_path(document);
	let document = documents
		.load_file(&path)
		.with_context(|| format!("reading {}", path.display()))?;
	match session.grammars.choose_base_scope(&document.match_path(), document.first_line()) {
		Some(scope) => info!(document = %document.name, grammar = scope, "base scope"),
		None if session.grammars.is_empty() => {}
		None => warn!(document = %document.name, "dispatching without a matching grammar"),
	}

	let tokenizer = ReplayTokenizer::load(&session.config.resolve_path(tokens))?;
	if tokenizer.line_count() != document.lines.len() {
		warn!(
			document = %document.name,
			lines = document.lines.len(),
			records = tokenizer.line_count(),
			"token stream and document disagree on line count"
		);
	}

	let tracer = if session.trace_dispatch {
		Tracer::new(session.config.trace.compile()?)
	} else {
		Tracer::disabled()
	};
	let dispatch = DispatchLoop::new(Arc::new(session.registry), store.clone())
		.with_options(DispatchOptions::from(&session.config))
		.with_tracer(tracer);

	let files = vec![document.name.clone()];
	dispatch.run_phase("initialize", &files).await?;
	dispatch.run_phase("run", &files).await?;
	let report = dispatch.run_document(&tokenizer, &document).await?;
	dispatch.run_phase("finalize", &files).await?;
	info!(lines = report.lines, actions = report.actions, "trace complete");

	writeln!(out, "{}", serde_json::to_string_pretty(&store.snapshot())?)?;
	Ok(())
}
