use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashSet as HashSet;
use tracing::{debug, info, warn};

use crate::prune::{KeepSet, PruneReport, Pruner};
use crate::{GrammarError, GrammarGraph, Result};

/// Every loaded grammar, keyed by scope name in load order.
///
/// A pristine copy of each grammar is kept next to the working copy, so a
/// pruned set can be restored with [`GrammarSet::reset`].
#[derive(Debug, Clone, Default)]
pub struct GrammarSet {
	grammars: IndexMap<String, GrammarGraph>,
	pristine: IndexMap<String, GrammarGraph>,
	loaded_paths: HashSet<PathBuf>,
}

impl GrammarSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads a JSON grammar file.
	///
	/// Returns the grammar's scope name, or `None` if this path was already
	/// loaded.
	pub fn load_file(&mut self, path: &Path) -> Result<Option<String>> {
		if path.extension().is_none_or(|ext| ext != "json") {
			return Err(GrammarError::UnsupportedFormat(path.to_path_buf()));
		}
		if self.loaded_paths.contains(path) {
			debug!(path = %path.display(), "grammar already loaded");
			return Ok(None);
		}
		debug!(path = %path.display(), "loading grammar");
		let text = std::fs::read_to_string(path).map_err(|error| GrammarError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let graph: GrammarGraph = serde_json::from_str(&text).map_err(|error| GrammarError::Json {
			path: path.to_path_buf(),
			error,
		})?;
		if graph.scope_name.is_empty() {
			return Err(GrammarError::MissingScopeName(path.to_path_buf()));
		}
		self.loaded_paths.insert(path.to_path_buf());
		let scope = graph.scope_name.clone();
		self.insert(graph);
		Ok(Some(scope))
	}

	/// Adds a grammar, replacing any grammar with the same scope name.
	pub fn insert(&mut self, graph: GrammarGraph) -> Option<GrammarGraph> {
		let scope = graph.scope_name.clone();
		if self.pristine.contains_key(&scope) {
			warn!(grammar = %scope, "overwriting an existing grammar");
		}
		self.grammars.insert(scope.clone(), graph.clone());
		self.pristine.insert(scope, graph)
	}

	pub fn get(&self, scope: &str) -> Option<&GrammarGraph> {
		self.grammars.get(scope)
	}

	/// The grammar as it was loaded, before any pruning.
	pub fn pristine(&self, scope: &str) -> Option<&GrammarGraph> {
		self.pristine.get(scope)
	}

	pub fn contains(&self, scope: &str) -> bool {
		self.grammars.contains_key(scope)
	}

	pub fn len(&self) -> usize {
		self.grammars.len()
	}

	pub fn is_empty(&self) -> bool {
		self.grammars.is_empty()
	}

	/// Grammar scope names in load order.
	pub fn scopes(&self) -> impl Iterator<Item = &str> {
		self.grammars.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &GrammarGraph)> {
		self.grammars.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Restores every grammar to its loaded form.
	pub fn reset(&mut self) {
		self.grammars = self.pristine.clone();
	}

	/// Every scope any loaded grammar can apply, sorted and de-duplicated.
	pub fn known_scopes(&self) -> Vec<String> {
		let mut scopes: Vec<String> = self.grammars.values().flat_map(GrammarGraph::scopes).map(str::to_string).collect();
		scopes.sort_unstable();
		scopes.dedup();
		scopes
	}

	/// Renders a grammar as pretty-printed JSON.
	pub fn to_json_pretty(&self, scope: &str) -> Result<String> {
		let graph = self.get(scope).ok_or_else(|| GrammarError::NotFound(scope.to_string()))?;
		serde_json::to_string_pretty(graph).map_err(|error| GrammarError::Json {
			path: PathBuf::from(scope),
			error,
		})
	}

	/// Picks the grammar for a document.
	///
	/// The first grammar (in load order) whose `firstLineMatch` matches
	/// `first_line` wins; otherwise the first grammar with a `fileTypes` entry
	/// that is a suffix of `path`. Returns `None` if nothing matches.
	pub fn choose_base_scope(&self, path: &str, first_line: &str) -> Option<&str> {
		for (scope, graph) in &self.grammars {
			let Some(pattern) = graph.first_line_match.as_deref() else {
				continue;
			};
			match fancy_regex::Regex::new(pattern) {
				Ok(re) => {
					if re.is_match(first_line).unwrap_or(false) {
						debug!(grammar = %scope, "first line matched");
						return Some(scope);
					}
				}
				Err(error) => warn!(grammar = %scope, %error, "skipping uncompilable firstLineMatch"),
			}
		}
		for (scope, graph) in &self.grammars {
			if graph.file_types.iter().any(|ext| path.ends_with(ext.as_str())) {
				debug!(grammar = %scope, "file type matched");
				return Some(scope);
			}
		}
		warn!(path, "no base scope matched");
		None
	}

	/// Prunes every grammar, in load order, against `keep`.
	///
	/// Pruning is destructive; use [`GrammarSet::reset`] to start again from
	/// the loaded grammars.
	pub fn prune(&mut self, keep: &KeepSet) -> PruneReport {
		let scopes: Vec<String> = self.grammars.keys().cloned().collect();
		let mut pruner = Pruner::new(&mut self.grammars, keep);
		for scope in &scopes {
			pruner.keep_grammar(scope);
		}
		let report = pruner.finish();
		info!(
			kept = report.kept.len(),
			dropped = report.dropped.len(),
			patterns = report.removed_patterns,
			entries = report.removed_repository_entries,
			"pruned grammars"
		);
		report
	}

	/// Prunes one grammar and every grammar it reaches through includes.
	pub fn prune_grammar(&mut self, scope: &str, keep: &KeepSet) -> Result<PruneReport> {
		if !self.contains(scope) {
			return Err(GrammarError::NotFound(scope.to_string()));
		}
		let mut pruner = Pruner::new(&mut self.grammars, keep);
		pruner.keep_grammar(scope);
		Ok(pruner.finish())
	}
}
