use std::sync::Arc;

use lpic_primitives::{MemoryStructures, ScopeError};
use pretty_assertions::assert_eq;

use super::*;
use crate::actions::{ActionContext, ActionStep};

fn noop(_: &ActionContext) -> ActionStep {
	ActionStep::done()
}

fn key(scope: &str) -> ScopeKey {
	ScopeKey::parse(scope).unwrap()
}

fn scopes_of(matches: &[ScopeMatch<'_>]) -> Vec<String> {
	matches.iter().map(|m| m.scope.to_string()).collect()
}

fn sources_of(actions: &[Arc<ActionEntry>]) -> Vec<String> {
	actions.iter().map(|a| a.source_id.to_string()).collect()
}

crate::scope_action!(registry_test_builtin, "test.builtin.scope", |ctx| {
	ctx.structures.set("builtin", serde_json::json!(ctx.line));
});

#[test]
fn register_then_lookup_exact_returns_last_registered() {
	let mut registry = ActionRegistry::new();
	for i in 0..50 {
		registry.register(&format!("unrelated.scope{i}"), "filler", noop).unwrap();
	}
	registry.register("doc.title", "first", noop).unwrap();
	let entry = registry.register("doc.title", "second", noop).unwrap();

	let actions = registry.lookup_exact(&key("doc.title")).unwrap();
	assert_eq!(sources_of(actions), ["first", "second"]);
	assert!(Arc::ptr_eq(actions.last().unwrap(), &entry));
	assert_eq!(registry.scope_count(), 51);
	assert_eq!(registry.len(), 52);
}

#[test]
fn register_rejects_malformed_scopes() {
	let mut registry = ActionRegistry::new();
	let err = registry.register("doc..title", "bad-module", noop).unwrap_err();
	assert_eq!(
		err,
		RegistryError::InvalidScope {
			scope: "doc..title".into(),
			source_id: "bad-module".into(),
			error: ScopeError::EmptySegment {
				scope: "doc..title".into(),
				index: 1
			},
		}
	);
	assert!(registry.register("", "bad-module", noop).is_err());
	assert!(registry.register(".doc", "bad-module", noop).is_err());
	assert!(registry.register("doc.", "bad-module", noop).is_err());
	assert!(registry.is_empty());
	assert!(registry.scan_prefix("").is_empty());
}

#[test]
fn lookup_exact_ignores_structural_only_nodes() {
	let mut registry = ActionRegistry::new();
	registry.register("a.b.c", "m", noop).unwrap();
	assert!(registry.lookup_exact(&key("a")).is_none());
	assert!(registry.lookup_exact(&key("a.b")).is_none());
	assert!(registry.lookup_exact(&key("a.b.c.d")).is_none());
	assert!(registry.lookup_exact(&key("a.b.c")).is_some());
}

#[test]
fn lookup_ancestors_orders_most_specific_first() {
	let mut registry = ActionRegistry::new();
	registry.register("a", "root", noop).unwrap();
	registry.register("a.b", "middle", noop).unwrap();
	registry.register("a.b.c", "leaf", noop).unwrap();

	let found = registry.lookup_ancestors(&key("a.b.c"));
	assert_eq!(scopes_of(&found), ["a.b.c", "a.b", "a"]);
	assert_eq!(sources_of(found[0].actions), ["leaf"]);

	let deeper = registry.lookup_ancestors(&key("a.b.c.d.e"));
	assert_eq!(scopes_of(&deeper), ["a.b.c", "a.b", "a"]);

	let gap = registry.lookup_ancestors(&key("a.x.c"));
	assert_eq!(scopes_of(&gap), ["a"]);
}

#[test]
fn resolve_applies_policy() {
	let mut registry = ActionRegistry::new();
	registry.register("meta", "outer", noop).unwrap();
	registry.register("meta.block", "inner", noop).unwrap();

	assert!(registry.resolve(&key("meta.block.begin"), Resolution::Exact).is_empty());
	assert_eq!(scopes_of(&registry.resolve(&key("meta.block.begin"), Resolution::MostSpecific)), ["meta.block"]);
	assert_eq!(scopes_of(&registry.resolve(&key("meta.block.begin"), Resolution::AllAncestors)), ["meta.block", "meta"]);
	assert_eq!(scopes_of(&registry.resolve(&key("meta.block"), Resolution::Exact)), ["meta.block"]);

	assert!(!registry.has_actions(&key("meta.block.begin"), Resolution::Exact));
	assert!(registry.has_actions(&key("meta.block.begin"), Resolution::MostSpecific));
	assert!(!registry.has_actions(&key("other"), Resolution::AllAncestors));
}

#[test]
fn scan_prefix_is_segment_wise_and_sorted() {
	let mut registry = ActionRegistry::new();
	registry.register("run.zeta", "m", noop).unwrap();
	registry.register("running.x", "m", noop).unwrap();
	registry.register("run", "m", noop).unwrap();
	registry.register("run.alpha.deep", "m", noop).unwrap();
	registry.register("initialize", "m", noop).unwrap();

	assert_eq!(scopes_of(&registry.scan_prefix("run")), ["run", "run.alpha.deep", "run.zeta"]);
	assert_eq!(scopes_of(&registry.scan_prefix("run.alpha")), ["run.alpha.deep"]);
	assert!(registry.scan_prefix("finalize").is_empty());
	assert!(registry.scan_prefix("run.").is_empty());
	assert_eq!(registry.scan_prefix("").len(), 5);
}

#[test]
fn scopes_and_entries_are_sorted() {
	let mut registry = ActionRegistry::new();
	registry.register("b.x", "second", noop).unwrap();
	registry.register("a.y", "first", noop).unwrap();
	registry.register("b.x", "third", noop).unwrap();

	let scopes: Vec<_> = registry.scopes().iter().map(ToString::to_string).collect();
	assert_eq!(scopes, ["a.y", "b.x"]);
	assert_eq!(sources_of(&registry.entries()), ["first", "second", "third"]);
}

#[test]
fn builtins_are_collected_from_inventory() {
	let registry = ActionRegistry::with_builtins().unwrap();
	let actions = registry.lookup_exact(&key("test.builtin.scope")).expect("static action registered");
	assert_eq!(actions.len(), 1);
	assert!(actions[0].source_id.ends_with("registry::tests"));

	let structures = Arc::new(MemoryStructures::new());
	let ctx = ActionContext {
		scope: actions[0].scope.clone(),
		trigger: Arc::from("test.builtin.scope"),
		tokens: Arc::from(Vec::<String>::new()),
		line: 7,
		document: None,
		structures: structures.clone(),
	};
	assert!(matches!(actions[0].run(&ctx), ActionStep::Done(Ok(()))));
	assert_eq!(lpic_primitives::Structures::get(&*structures, "builtin"), Some(serde_json::json!(7)));
}

#[test]
fn one_parsed_key_serves_every_lookup() {
	let mut registry = ActionRegistry::new();
	registry.register("meta", "outer", noop).unwrap();
	registry.register("meta.block", "inner", noop).unwrap();

	let scope = key("meta.block");
	assert_eq!(sources_of(registry.lookup_exact(&scope).unwrap()), ["inner"]);
	assert_eq!(scopes_of(&registry.lookup_ancestors(&scope)), ["meta.block", "meta"]);
	assert!(registry.has_actions(&scope, Resolution::Exact));
	for found in registry.lookup_ancestors(&scope) {
		assert!(found.scope.is_ancestor_or_self_of(&scope));
	}
	let entry = &registry.resolve(&scope, Resolution::Exact)[0].actions[0];
	assert_eq!(entry.scope, scope);
}
