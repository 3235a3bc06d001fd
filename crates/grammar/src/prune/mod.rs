//! Grammar pruning.
//!
//! Pruning removes every rule that cannot produce a scope from a [`KeepSet`]:
//! patterns are spliced out of their lists and repository entries nobody
//! includes any more are deleted. A rule survives when its `name`,
//! `contentName`, or a capture name is kept, when one of its child patterns
//! survives, or when its `include` resolves to something that survives.
//!
//! Repository entries may include themselves or each other, so their verdicts
//! are computed as a least fixpoint before anything is mutated. Grammars that
//! include each other are guarded by a visited set: a grammar reached again
//! while it is still being pruned answers with its direct [`KeepSet`]
//! membership.
//!
//! `$self` and `$base` includes are never followed. They are reported as
//! [`PruneDiagnostic::UnsafeInclude`] and treated as not kept.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{GrammarGraph, IncludeRef, RawRule};

#[cfg(test)]
mod tests;

/// Scopes that some action cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepSet {
	scopes: BTreeSet<String>,
}

impl KeepSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, scope: impl Into<String>) -> bool {
		self.scopes.insert(scope.into())
	}

	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.contains(scope)
	}

	fn contains_opt(&self, scope: Option<&str>) -> bool {
		scope.is_some_and(|s| self.contains(s))
	}

	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Kept scopes, sorted.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(String::as_str)
	}
}

impl<S: AsRef<str>> FromIterator<S> for KeepSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self {
			scopes: iter.into_iter().map(|s| s.as_ref().to_string()).collect(),
		}
	}
}

/// Something pruning could not follow.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PruneDiagnostic {
	/// A `$self`/`$base` include; treated as not kept.
	#[error("{grammar}: unsafe include '{include}' treated as not kept")]
	UnsafeInclude { grammar: String, include: String },
	/// A `#name` include with no matching repository entry.
	#[error("{grammar}: include '{include}' has no repository entry")]
	MissingRepositoryEntry { grammar: String, include: String },
	/// An include naming a grammar that is not loaded.
	#[error("{grammar}: include '{include}' names an unknown grammar")]
	UnknownGrammar { grammar: String, include: String },
}

/// Outcome of a pruning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
	/// Grammars decided as kept, in decision order.
	pub kept: Vec<String>,
	/// Grammars decided as dropped, in decision order. They remain loaded
	/// with whatever (possibly empty) rule set survived.
	pub dropped: Vec<String>,
	/// Patterns spliced out of pattern lists. Nested removals inside a
	/// removed pattern are not counted.
	pub removed_patterns: usize,
	/// Repository entries deleted.
	pub removed_repository_entries: usize,
	pub diagnostics: Vec<PruneDiagnostic>,
}

impl PruneReport {
	/// The verdict for `scope`, if the pass decided it.
	pub fn verdict(&self, scope: &str) -> Option<bool> {
		if self.kept.iter().any(|s| s == scope) {
			Some(true)
		} else if self.dropped.iter().any(|s| s == scope) {
			Some(false)
		} else {
			None
		}
	}

	/// Returns `true` if the pass removed nothing.
	pub fn is_noop(&self) -> bool {
		self.removed_patterns == 0 && self.removed_repository_entries == 0
	}

	fn diagnose(&mut self, diagnostic: PruneDiagnostic) {
		if !self.diagnostics.contains(&diagnostic) {
			warn!(%diagnostic, "prune");
			self.diagnostics.push(diagnostic);
		}
	}
}

/// The repository of the grammar currently being pruned.
struct Walk {
	grammar: String,
	index: HashMap<String, usize>,
	live: Vec<bool>,
	marked: Vec<bool>,
	pending: Vec<usize>,
}

impl Walk {
	fn mark(&mut self, idx: usize) {
		if !self.marked[idx] {
			self.marked[idx] = true;
			self.pending.push(idx);
		}
	}
}

/// One pruning pass over a set of grammars.
pub(crate) struct Pruner<'g> {
	grammars: &'g mut IndexMap<String, GrammarGraph>,
	keep: &'g KeepSet,
	visited: HashSet<String>,
	decided: HashMap<String, bool>,
	report: PruneReport,
}

impl<'g> Pruner<'g> {
	pub(crate) fn new(grammars: &'g mut IndexMap<String, GrammarGraph>, keep: &'g KeepSet) -> Self {
		Self {
			grammars,
			keep,
			visited: HashSet::default(),
			decided: HashMap::default(),
			report: PruneReport::default(),
		}
	}

	pub(crate) fn finish(self) -> PruneReport {
		self.report
	}

	/// Decides whether the grammar `scope` is kept, pruning it in place the
	/// first time it is reached.
	pub(crate) fn keep_grammar(&mut self, scope: &str) -> bool {
		if let Some(&verdict) = self.decided.get(scope) {
			return verdict;
		}
		if !self.visited.insert(scope.to_string()) {
			trace!(grammar = scope, "grammar cycle");
			return self.keep.contains(scope);
		}
		let Some(slot) = self.grammars.get_mut(scope) else {
			return self.keep.contains(scope);
		};
		let mut graph = std::mem::take(slot);
		let structural = self.prune_graph(&mut graph);
		if let Some(slot) = self.grammars.get_mut(scope) {
			*slot = graph;
		}

		let verdict = self.keep.contains(scope) || structural;
		debug!(grammar = scope, kept = verdict, "pruned grammar");
		self.decided.insert(scope.to_string(), verdict);
		if verdict {
			self.report.kept.push(scope.to_string());
		} else {
			self.report.dropped.push(scope.to_string());
		}
		verdict
	}

	fn prune_graph(&mut self, graph: &mut GrammarGraph) -> bool {
		let Some(mut patterns) = graph.root.patterns.take() else {
			return false;
		};
		let had_repository = graph.root.repository.is_some();
		let mut repository = graph.root.repository.take().unwrap_or_default();

		let index: HashMap<String, usize> = repository.keys().enumerate().map(|(i, k)| (k.clone(), i)).collect();
		let reachable = reachable_entries(&patterns, &repository, &index);
		let live = self.repository_liveness(&graph.scope_name, &repository, &index, &reachable);

		let mut walk = Walk {
			grammar: graph.scope_name.clone(),
			index,
			live,
			marked: vec![false; repository.len()],
			pending: Vec::new(),
		};
		let kept = self.keep_patterns(&mut walk, &mut patterns);
		while let Some(idx) = walk.pending.pop() {
			if let Some((_, entry)) = repository.get_index_mut(idx) {
				let mut rule = std::mem::take(entry);
				self.keep_rule(&mut walk, &mut rule);
				*entry = rule;
			}
		}

		let before = repository.len();
		let mut marks = walk.marked.iter();
		repository.retain(|name, _| {
			let keep = marks.next().copied().unwrap_or(false);
			if !keep {
				trace!(grammar = %walk.grammar, entry = name.as_str(), "removing repository entry");
			}
			keep
		});
		self.report.removed_repository_entries += before - repository.len();

		graph.root.patterns = Some(patterns);
		if had_repository {
			graph.root.repository = Some(repository);
		}
		kept
	}

	/// Least fixpoint of "this entry can produce a kept scope" over the
	/// reachable repository entries.
	fn repository_liveness(&mut self, grammar: &str, repository: &IndexMap<String, RawRule>, index: &HashMap<String, usize>, reachable: &[usize]) -> Vec<bool> {
		let mut live = vec![false; repository.len()];
		loop {
			let mut changed = false;
			for &idx in reachable {
				if live[idx] {
					continue;
				}
				let Some((_, rule)) = repository.get_index(idx) else {
					continue;
				};
				if self.rule_live(grammar, rule, index, &live) {
					live[idx] = true;
					changed = true;
				}
			}
			if !changed {
				return live;
			}
		}
	}

	fn rule_live(&mut self, grammar: &str, rule: &RawRule, index: &HashMap<String, usize>, live: &[bool]) -> bool {
		if self.keep.contains_opt(rule.name.as_deref()) || self.keep.contains_opt(rule.content_name.as_deref()) {
			return true;
		}
		for capture in rule.capture_maps().flat_map(IndexMap::values) {
			if self.rule_live(grammar, capture, index, live) {
				return true;
			}
		}
		for child in rule.patterns.iter().flatten() {
			if self.rule_live(grammar, child, index, live) {
				return true;
			}
		}
		match rule.include.as_deref().map(IncludeRef::parse) {
			Some(IncludeRef::Local(name)) => index.get(name).is_some_and(|&idx| live[idx]),
			Some(IncludeRef::Foreign(scope)) => self.keep_foreign(grammar, scope, None),
			Some(IncludeRef::SelfRef) | None => false,
		}
	}

	/// Prunes `patterns` in place. Returns `true` if any pattern survived.
	fn keep_patterns(&mut self, walk: &mut Walk, patterns: &mut Vec<RawRule>) -> bool {
		let verdicts: Vec<bool> = patterns.iter_mut().map(|rule| self.keep_rule(walk, rule)).collect();
		let before = patterns.len();
		let mut verdicts = verdicts.into_iter();
		patterns.retain(|_| verdicts.next().unwrap_or(true));
		self.report.removed_patterns += before - patterns.len();
		!patterns.is_empty()
	}

	/// Decides one rule, pruning its children and marking the repository
	/// entries it includes.
	fn keep_rule(&mut self, walk: &mut Walk, rule: &mut RawRule) -> bool {
		let mut keep = self.keep.contains_opt(rule.name.as_deref()) || self.keep.contains_opt(rule.content_name.as_deref());
		for captures in rule.capture_maps_mut() {
			for capture in captures.values_mut() {
				keep |= self.keep_rule(walk, capture);
			}
		}
		if let Some(patterns) = rule.patterns.as_mut() {
			keep |= self.keep_patterns(walk, patterns);
		}
		if let Some(include) = rule.include.as_deref() {
			keep |= self.keep_include(walk, include);
		}
		keep
	}

	fn keep_include(&mut self, walk: &mut Walk, include: &str) -> bool {
		match IncludeRef::parse(include) {
			IncludeRef::SelfRef => {
				self.report.diagnose(PruneDiagnostic::UnsafeInclude {
					grammar: walk.grammar.clone(),
					include: include.to_string(),
				});
				false
			}
			IncludeRef::Local(name) => match walk.index.get(name).copied() {
				Some(idx) if walk.live[idx] => {
					walk.mark(idx);
					true
				}
				Some(_) => false,
				None => {
					self.report.diagnose(PruneDiagnostic::MissingRepositoryEntry {
						grammar: walk.grammar.clone(),
						include: include.to_string(),
					});
					false
				}
			},
			IncludeRef::Foreign(scope) => {
				let grammar = walk.grammar.clone();
				self.keep_foreign(&grammar, scope, Some(include))
			}
		}
	}

	/// Resolves an include of another grammar. `include` is set when an
	/// unknown grammar should be reported.
	///
	/// A loaded grammar is always walked, even when its own scope is kept.
	fn keep_foreign(&mut self, grammar: &str, scope: &str, include: Option<&str>) -> bool {
		if !self.grammars.contains_key(scope) {
			if self.keep.contains(scope) {
				return true;
			}
			if let Some(include) = include {
				self.report.diagnose(PruneDiagnostic::UnknownGrammar {
					grammar: grammar.to_string(),
					include: include.to_string(),
				});
			}
			return false;
		}
		self.keep_grammar(scope)
	}
}

/// Repository entries reachable from `patterns` through `#name` includes, in
/// discovery order.
fn reachable_entries(patterns: &[RawRule], repository: &IndexMap<String, RawRule>, index: &HashMap<String, usize>) -> Vec<usize> {
	let mut seen = vec![false; repository.len()];
	let mut order = Vec::new();
	let mut stack: Vec<&RawRule> = patterns.iter().collect();
	while let Some(root) = stack.pop() {
		root.visit(false, &mut |rule| {
			let Some(IncludeRef::Local(name)) = rule.include.as_deref().map(IncludeRef::parse) else {
				return;
			};
			if let Some(&idx) = index.get(name)
				&& !seen[idx]
			{
				seen[idx] = true;
				order.push(idx);
				if let Some((_, entry)) = repository.get_index(idx) {
					stack.push(entry);
				}
			}
		});
	}
	order
}
