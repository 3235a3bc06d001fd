use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::actions::{ActionContext, ActionEntry, ActionHandler, ActionHandlerReg, ActionStep};
use crate::{RegistryError, ScopeKey};

#[cfg(test)]
mod tests;

/// How a scope occurrence is mapped to registered actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
	/// Only actions registered on exactly the scope.
	#[default]
	Exact,
	/// Only the nearest registered ancestor-or-self.
	MostSpecific,
	/// Every registered ancestor-or-self, most specific first.
	AllAncestors,
}

/// A registered scope together with its actions in registration order.
#[derive(Debug, Clone, Copy)]
pub struct ScopeMatch<'a> {
	/// The scope the actions were registered under.
	pub scope: &'a ScopeKey,
	/// The actions, in registration order. Never empty.
	pub actions: &'a [Arc<ActionEntry>],
}

#[derive(Default)]
struct ScopeNode {
	children: HashMap<Box<str>, ScopeNode>,
	/// Set on the first registration at this node.
	key: Option<ScopeKey>,
	actions: Vec<Arc<ActionEntry>>,
}

impl ScopeNode {
	fn as_match(&self) -> Option<ScopeMatch<'_>> {
		match (&self.key, self.actions.is_empty()) {
			(Some(scope), false) => Some(ScopeMatch {
				scope,
				actions: &self.actions,
			}),
			_ => None,
		}
	}

	fn collect<'a>(&'a self, out: &mut Vec<ScopeMatch<'a>>) {
		out.extend(self.as_match());
		for child in self.children.values() {
			child.collect(out);
		}
	}
}

/// Trie of scope segments mapping each registered scope to its actions.
///
/// The registry is populated during a load phase and then frozen (typically by
/// moving it into an `Arc`) for dispatch; all lookups take `&self`, so
/// concurrent reads during parallel dispatch are safe.
#[derive(Default)]
pub struct ActionRegistry {
	root: ScopeNode,
	scopes: usize,
	entries: usize,
}

impl ActionRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry holding every action submitted with
	/// [`scope_action!`](crate::scope_action).
	pub fn with_builtins() -> Result<Self, RegistryError> {
		let mut registry = Self::new();
		registry.register_builtins()?;
		Ok(registry)
	}

	/// Registers every statically submitted action.
	///
	/// Link order is not stable, so statics are registered sorted by
	/// `(source, name)`. Returns how many were registered.
	pub fn register_builtins(&mut self) -> Result<usize, RegistryError> {
		let mut statics: Vec<_> = inventory::iter::<ActionHandlerReg>.into_iter().map(|r| r.0).collect();
		statics.sort_by(|a, b| (a.source, a.name).cmp(&(b.source, b.name)));
		for def in &statics {
			let handler = def.handler;
			self.register(def.scope, def.source, move |ctx: &ActionContext| handler(ctx))?;
		}
		Ok(statics.len())
	}

	/// Appends `handler` to the actions registered on `scope`.
	///
	/// Re-registering a scope appends; it never replaces. Malformed scopes
	/// (empty, or with an empty segment) are rejected before anything changes.
	pub fn register<F>(&mut self, scope: &str, source_id: impl Into<Arc<str>>, handler: F) -> Result<Arc<ActionEntry>, RegistryError>
	where
		F: Fn(&ActionContext) -> ActionStep + Send + Sync + 'static,
	{
		self.register_handler(scope, source_id, Arc::new(handler))
	}

	/// Like [`ActionRegistry::register`] for an already shared handler.
	pub fn register_handler(&mut self, scope: &str, source_id: impl Into<Arc<str>>, handler: ActionHandler) -> Result<Arc<ActionEntry>, RegistryError> {
		let source_id = source_id.into();
		let key = ScopeKey::parse(scope).map_err(|error| RegistryError::InvalidScope {
			scope: scope.to_string(),
			source_id: source_id.to_string(),
			error,
		})?;
		trace!(scope = %key, source = %source_id, "registering action");

		let mut node = &mut self.root;
		for segment in key.segments() {
			node = node.children.entry(Box::from(segment)).or_default();
		}
		if node.actions.is_empty() {
			self.scopes += 1;
		}
		let entry = Arc::new(ActionEntry {
			scope: node.key.get_or_insert_with(|| key.clone()).clone(),
			source_id,
			handler,
		});
		node.actions.push(entry.clone());
		self.entries += 1;
		Ok(entry)
	}

	fn node<'s, 'a>(&'s self, segments: impl Iterator<Item = &'a str>) -> Option<&'s ScopeNode> {
		let mut node = &self.root;
		for segment in segments {
			node = node.children.get(segment)?;
		}
		Some(node)
	}

	/// The actions registered on exactly `scope`.
	///
	/// Returns `None` when nothing is registered there, including when the
	/// scope only exists as the parent of registered scopes.
	pub fn lookup_exact(&self, scope: &ScopeKey) -> Option<&[Arc<ActionEntry>]> {
		self.node(scope.segments())?.as_match().map(|m| m.actions)
	}

	/// Every registered ancestor-or-self of `scope`, nearest first.
	///
	/// Taking the first group gives most-specific resolution; concatenating
	/// all groups gives all-ancestors resolution.
	pub fn lookup_ancestors(&self, scope: &ScopeKey) -> Vec<ScopeMatch<'_>> {
		let mut found = Vec::with_capacity(scope.depth());
		let mut node = &self.root;
		for segment in scope.segments() {
			match node.children.get(segment) {
				Some(child) => node = child,
				None => break,
			}
			found.extend(node.as_match());
		}
		found.reverse();
		found
	}

	/// Every registered scope whose segments start with `prefix`'s segments,
	/// sorted by scope.
	///
	/// `run` matches `run` and `run.build` but not `running.x`. An empty prefix
	/// matches every registered scope; a malformed one matches nothing.
	pub fn scan_prefix(&self, prefix: &str) -> Vec<ScopeMatch<'_>> {
		let mut found = Vec::new();
		let start = if prefix.is_empty() {
			Some(&self.root)
		} else {
			ScopeKey::parse(prefix).ok().and_then(|key| self.node(key.segments()))
		};
		if let Some(node) = start {
			node.collect(&mut found);
		}
		found.sort_by(|a, b| a.scope.cmp(b.scope));
		found
	}

	/// Resolves `scope` under `policy` into groups of actions, in invocation order.
	pub fn resolve(&self, scope: &ScopeKey, policy: Resolution) -> Vec<ScopeMatch<'_>> {
		match policy {
			Resolution::Exact => self.node(scope.segments()).and_then(ScopeNode::as_match).into_iter().collect(),
			Resolution::MostSpecific => self.lookup_ancestors(scope).into_iter().take(1).collect(),
			Resolution::AllAncestors => self.lookup_ancestors(scope),
		}
	}

	/// Returns `true` if `scope` resolves to at least one action under `policy`.
	pub fn has_actions(&self, scope: &ScopeKey, policy: Resolution) -> bool {
		match policy {
			Resolution::Exact => self.lookup_exact(scope).is_some(),
			Resolution::MostSpecific | Resolution::AllAncestors => !self.lookup_ancestors(scope).is_empty(),
		}
	}

	/// Every scope with at least one action, sorted.
	pub fn scopes(&self) -> Vec<ScopeKey> {
		self.scan_prefix("").into_iter().map(|m| m.scope.clone()).collect()
	}

	/// Every registered action, grouped by sorted scope, in registration order within a scope.
	pub fn entries(&self) -> Vec<Arc<ActionEntry>> {
		self.scan_prefix("").into_iter().flat_map(|m| m.actions.iter().cloned()).collect()
	}

	/// Number of scopes with at least one action.
	pub fn scope_count(&self) -> usize {
		self.scopes
	}

	/// Total number of registered actions.
	pub fn len(&self) -> usize {
		self.entries
	}

	/// Returns `true` if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.entries == 0
	}
}

impl std::fmt::Debug for ActionRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut map = f.debug_map();
		for m in self.scan_prefix("") {
			map.entry(&m.scope.as_str(), &m.actions.len());
		}
		map.finish()
	}
}
