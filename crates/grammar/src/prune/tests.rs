use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use super::*;
use crate::GrammarSet;

fn set_of(grammars: impl IntoIterator<Item = Value>) -> GrammarSet {
	let mut set = GrammarSet::new();
	for value in grammars {
		set.insert(serde_json::from_value(value).unwrap());
	}
	set
}

fn keep(scopes: &[&str]) -> KeepSet {
	scopes.iter().collect()
}

fn rendered(set: &GrammarSet, scope: &str) -> Value {
	serde_json::to_value(set.get(scope).unwrap()).unwrap()
}

#[test]
fn unused_repository_entries_are_removed() {
	let mut set = set_of([json!({
		"scopeName": "source.x",
		"patterns": [{ "include": "#kw" }],
		"repository": {
			"kw": { "name": "keyword.x" },
			"unused": { "name": "keyword.y" }
		}
	})]);
	let report = set.prune(&keep(&["keyword.x"]));

	assert_eq!(
		rendered(&set, "source.x"),
		json!({
			"scopeName": "source.x",
			"patterns": [{ "include": "#kw" }],
			"repository": { "kw": { "name": "keyword.x" } }
		})
	);
	assert_eq!(report.kept, ["source.x"]);
	assert_eq!(report.removed_repository_entries, 1);
	assert_eq!(report.removed_patterns, 0);
}

#[test]
fn patterns_without_kept_scopes_are_spliced_out() {
	let mut set = set_of([json!({
		"scopeName": "source.x",
		"patterns": [
			{ "name": "drop.a", "match": "a" },
			{ "name": "keep.b", "match": "b" },
			{ "name": "drop.c", "match": "c" },
			{ "begin": "\\(", "end": "\\)", "patterns": [{ "name": "drop.d" }, { "contentName": "keep.e" }] },
			{ "begin": "<", "end": ">", "beginCaptures": { "0": { "name": "keep.f" } } }
		]
	})]);
	let report = set.prune(&keep(&["keep.b", "keep.e", "keep.f"]));

	assert_eq!(
		rendered(&set, "source.x")["patterns"],
		json!([
			{ "name": "keep.b", "match": "b" },
			{ "begin": "\\(", "end": "\\)", "patterns": [{ "contentName": "keep.e" }] },
			{ "begin": "<", "end": ">", "beginCaptures": { "0": { "name": "keep.f" } } }
		])
	);
	assert_eq!(report.removed_patterns, 3);
}

#[test]
fn kept_rule_keeps_its_label_and_prunes_beneath() {
	let mut set = set_of([json!({
		"scopeName": "source.x",
		"patterns": [{
			"name": "meta.block",
			"patterns": [{ "include": "#inner" }, { "name": "noise" }]
		}],
		"repository": {
			"inner": { "name": "keep.inner" }
		}
	})]);
	set.prune(&keep(&["keep.inner"]));

	let graph = rendered(&set, "source.x");
	assert_eq!(graph["patterns"], json!([{ "name": "meta.block", "patterns": [{ "include": "#inner" }] }]));
	assert_eq!(graph["repository"], json!({ "inner": { "name": "keep.inner" } }));
}

#[test]
fn pruning_is_idempotent() {
	let mut set = set_of([
		json!({
			"scopeName": "source.a",
			"patterns": [{ "include": "#one" }, { "include": "source.b" }, { "name": "drop" }],
			"repository": {
				"one": { "patterns": [{ "include": "#two" }, { "name": "keep.one" }] },
				"two": { "patterns": [{ "include": "#one" }] },
				"three": { "name": "keep.three" }
			}
		}),
		json!({
			"scopeName": "source.b",
			"patterns": [{ "include": "source.a" }, { "name": "keep.b" }]
		}),
	]);
	let keep = keep(&["keep.one", "keep.b", "keep.three"]);
	let first = set.prune(&keep);
	assert!(!first.is_noop());
	let after_first: Vec<Value> = set.scopes().map(|s| rendered(&set, s)).collect();

	let second = set.prune(&keep);
	assert!(second.is_noop(), "second pass removed {second:?}");
	let after_second: Vec<Value> = set.scopes().map(|s| rendered(&set, s)).collect();
	assert_eq!(after_first, after_second);
	assert_eq!(first.kept, second.kept);
}

#[test]
fn retained_rules_are_justified() {
	let mut set = set_of([json!({
		"scopeName": "source.x",
		"patterns": [
			{ "include": "#a" },
			{ "begin": "x", "patterns": [{ "include": "#b" }, { "name": "n1" }] },
			{ "name": "n2", "captures": { "1": { "name": "n3" } } }
		],
		"repository": {
			"a": { "patterns": [{ "name": "k1" }, { "name": "n4" }] },
			"b": { "begin": "y", "contentName": "n5", "patterns": [{ "include": "#a" }] },
			"c": { "name": "k2" }
		}
	})]);
	let keep = keep(&["k1", "k2", "n3"]);
	set.prune(&keep);
	let graph = set.get("source.x").unwrap();

	fn produces_kept(rule: &RawRule, keep: &KeepSet, repository: &IndexMap<String, RawRule>) -> bool {
		let mut found = false;
		rule.visit(false, &mut |r| {
			found |= keep.contains_opt(r.name.as_deref()) || keep.contains_opt(r.content_name.as_deref());
			if let Some(IncludeRef::Local(name)) = r.include.as_deref().map(IncludeRef::parse) {
				found |= repository.contains_key(name);
			}
		});
		found
	}
	let repository = graph.repository().unwrap();
	for rule in graph.patterns().iter().chain(repository.values()) {
		assert!(produces_kept(rule, &keep, repository), "unjustified rule {rule:?}");
	}
	assert_eq!(repository.keys().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn mutually_including_grammars_terminate() {
	let mut set = set_of([
		json!({ "scopeName": "source.a", "patterns": [{ "include": "source.b" }, { "name": "a.only" }] }),
		json!({ "scopeName": "source.b", "patterns": [{ "include": "source.a" }, { "name": "b.kept" }] }),
	]);
	let report = set.prune(&keep(&["b.kept"]));

	assert_eq!(report.kept, ["source.b", "source.a"]);
	assert!(report.dropped.is_empty());
	assert_eq!(rendered(&set, "source.a")["patterns"], json!([{ "include": "source.b" }]));
	assert_eq!(rendered(&set, "source.b")["patterns"], json!([{ "name": "b.kept" }]));

	set.reset();
	let report = set.prune(&keep(&["nothing"]));
	assert!(report.kept.is_empty());
	assert_eq!(report.dropped, ["source.b", "source.a"]);
}

#[test]
fn self_recursive_repository_entries_terminate() {
	let mut set = set_of([json!({
		"scopeName": "source.x",
		"patterns": [{ "include": "#nest" }, { "include": "#spin" }],
		"repository": {
			"nest": { "begin": "\\{", "end": "\\}", "name": "keep.brace", "patterns": [{ "include": "#nest" }] },
			"spin": { "patterns": [{ "include": "#spin" }, { "include": "#loop" }] },
			"loop": { "patterns": [{ "include": "#spin" }] }
		}
	})]);
	let report = set.prune(&keep(&["keep.brace"]));

	let graph = rendered(&set, "source.x");
	assert_eq!(graph["patterns"], json!([{ "include": "#nest" }]));
	assert_eq!(
		graph["repository"],
		json!({ "nest": { "begin": "\\{", "end": "\\}", "name": "keep.brace", "patterns": [{ "include": "#nest" }] } })
	);
	assert_eq!(report.removed_repository_entries, 2);
}

#[test]
fn self_includes_are_reported_and_not_followed() {
	let mut set = set_of([json!({
		"scopeName": "source.x",
		"patterns": [{ "include": "$self" }, { "include": "$base" }, { "name": "keep.x" }]
	})]);
	let report = set.prune(&keep(&["keep.x"]));

	assert_eq!(rendered(&set, "source.x")["patterns"], json!([{ "name": "keep.x" }]));
	assert_eq!(
		report.diagnostics,
		[
			PruneDiagnostic::UnsafeInclude {
				grammar: "source.x".into(),
				include: "$self".into()
			},
			PruneDiagnostic::UnsafeInclude {
				grammar: "source.x".into(),
				include: "$base".into()
			},
		]
	);
}

#[test]
fn dangling_includes_are_reported() {
	let mut set = set_of([json!({
		"scopeName": "source.x",
		"patterns": [{ "include": "#missing" }, { "include": "source.none#entry" }, { "name": "keep.x" }]
	})]);
	let report = set.prune(&keep(&["keep.x"]));

	assert_eq!(
		report.diagnostics,
		[
			PruneDiagnostic::MissingRepositoryEntry {
				grammar: "source.x".into(),
				include: "#missing".into()
			},
			PruneDiagnostic::UnknownGrammar {
				grammar: "source.x".into(),
				include: "source.none#entry".into()
			},
		]
	);
	assert_eq!(report.removed_patterns, 2);
}

#[test]
fn direct_request_overrides_structural_emptiness() {
	let mut set = set_of([
		json!({ "scopeName": "source.wanted", "patterns": [{ "name": "noise" }] }),
		json!({ "scopeName": "source.empty" }),
		json!({ "scopeName": "source.user", "patterns": [{ "include": "source.wanted" }] }),
	]);
	let report = set.prune(&keep(&["source.wanted", "source.empty"]));

	assert_eq!(report.verdict("source.wanted"), Some(true));
	assert_eq!(report.verdict("source.empty"), Some(true));
	assert_eq!(report.verdict("source.user"), Some(true));
	assert!(set.get("source.wanted").unwrap().patterns().is_empty());
	assert!(set.contains("source.empty"));
}

#[test]
fn dropped_grammars_stay_loaded() {
	let mut set = set_of([json!({ "scopeName": "source.x", "patterns": [{ "name": "noise" }] })]);
	let report = set.prune(&keep(&["other"]));
	assert_eq!(report.verdict("source.x"), Some(false));
	assert_eq!(set.get("source.x").unwrap().root.patterns, Some(Vec::new()));
}

#[test]
fn prune_grammar_follows_includes_only() {
	let mut set = set_of([
		json!({ "scopeName": "source.a", "patterns": [{ "include": "source.b" }] }),
		json!({ "scopeName": "source.b", "patterns": [{ "name": "keep.b" }, { "name": "noise" }] }),
		json!({ "scopeName": "source.c", "patterns": [{ "name": "noise" }] }),
	]);
	let report = set.prune_grammar("source.a", &keep(&["keep.b"])).unwrap();

	assert_eq!(report.kept, ["source.b", "source.a"]);
	assert_eq!(report.verdict("source.c"), None);
	assert_eq!(set.get("source.b").unwrap().patterns().len(), 1);
	assert_eq!(set.get("source.c").unwrap().patterns().len(), 1);
	assert!(set.prune_grammar("source.none", &keep(&[])).is_err());
}

#[test]
fn prune_grammar_walks_included_grammars_that_are_kept_by_scope() {
	let mut set = set_of([
		json!({ "scopeName": "source.a", "patterns": [{ "include": "source.b" }] }),
		json!({
			"scopeName": "source.b",
			"patterns": [{ "name": "keep.b" }, { "name": "noise" }],
			"repository": { "dead": { "name": "noise2" } }
		}),
	]);
	let report = set.prune_grammar("source.a", &keep(&["source.b", "keep.b"])).unwrap();

	assert_eq!(report.kept, ["source.b", "source.a"]);
	assert_eq!(report.removed_patterns, 1);
	assert_eq!(report.removed_repository_entries, 1);
	assert_eq!(
		rendered(&set, "source.b"),
		json!({ "scopeName": "source.b", "patterns": [{ "name": "keep.b" }], "repository": {} })
	);
}
