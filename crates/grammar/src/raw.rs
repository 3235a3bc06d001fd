use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Capture group index to the rule applied to that group.
pub type Captures = IndexMap<String, RawRule>;

/// A node in a grammar's rule graph.
///
/// Only the fields that take part in scope reachability are typed. Everything
/// else (`match`, `begin`, `end`, `comment`, ...) is carried verbatim in
/// [`RawRule::extra`] so a pruned grammar serializes back to a usable grammar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub include: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub patterns: Option<Vec<RawRule>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub repository: Option<IndexMap<String, RawRule>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub captures: Option<Captures>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub begin_captures: Option<Captures>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub end_captures: Option<Captures>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl RawRule {
	/// A rule that only applies `name`.
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			..Self::default()
		}
	}

	/// A rule that only includes `reference`.
	pub fn including(reference: impl Into<String>) -> Self {
		Self {
			include: Some(reference.into()),
			..Self::default()
		}
	}

	/// Every capture map present on the rule.
	pub fn capture_maps(&self) -> impl Iterator<Item = &Captures> {
		[&self.captures, &self.begin_captures, &self.end_captures].into_iter().flatten()
	}

	pub(crate) fn capture_maps_mut(&mut self) -> impl Iterator<Item = &mut Captures> {
		[&mut self.captures, &mut self.begin_captures, &mut self.end_captures].into_iter().flatten()
	}

	/// Visits this rule and every rule beneath it through patterns and
	/// captures. Nested repositories are only entered when `repositories` is set.
	pub fn visit<'a>(&'a self, repositories: bool, f: &mut impl FnMut(&'a RawRule)) {
		f(self);
		for child in self.patterns.iter().flatten() {
			child.visit(repositories, f);
		}
		for capture in self.capture_maps().flat_map(IndexMap::values) {
			capture.visit(repositories, f);
		}
		if repositories {
			for entry in self.repository.iter().flat_map(IndexMap::values) {
				entry.visit(repositories, f);
			}
		}
	}
}

/// What an `include` value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeRef<'a> {
	/// `$self` or `$base`.
	SelfRef,
	/// `#name`: an entry of the grammar's repository.
	Local(&'a str),
	/// Another grammar by scope name. `source.x#name` refers to `source.x`.
	Foreign(&'a str),
}

impl<'a> IncludeRef<'a> {
	pub fn parse(include: &'a str) -> Self {
		if include.starts_with('$') {
			Self::SelfRef
		} else if let Some(name) = include.strip_prefix('#') {
			Self::Local(name)
		} else {
			Self::Foreign(include.split_once('#').map_or(include, |(scope, _)| scope))
		}
	}
}

/// A complete grammar definition as found in a `.tmLanguage.json` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrammarGraph {
	#[serde(rename = "scopeName", default)]
	pub scope_name: String,
	#[serde(rename = "fileTypes", default, skip_serializing_if = "Vec::is_empty")]
	pub file_types: Vec<String>,
	#[serde(rename = "firstLineMatch", default, skip_serializing_if = "Option::is_none")]
	pub first_line_match: Option<String>,
	/// Top-level `patterns` and `repository`. The root's `name` is the
	/// grammar's display name, not a scope.
	#[serde(flatten)]
	pub root: RawRule,
}

impl GrammarGraph {
	pub fn new(scope_name: impl Into<String>, patterns: Vec<RawRule>) -> Self {
		Self {
			scope_name: scope_name.into(),
			root: RawRule {
				patterns: Some(patterns),
				..RawRule::default()
			},
			..Self::default()
		}
	}

	/// Adds a repository entry.
	pub fn with_entry(mut self, name: impl Into<String>, rule: RawRule) -> Self {
		self.root.repository.get_or_insert_with(IndexMap::new).insert(name.into(), rule);
		self
	}

	pub fn patterns(&self) -> &[RawRule] {
		self.root.patterns.as_deref().unwrap_or_default()
	}

	pub fn repository(&self) -> Option<&IndexMap<String, RawRule>> {
		self.root.repository.as_ref()
	}

	/// Every scope the grammar can apply: its own scope name and every
	/// `name`, `contentName`, and capture name, in no particular order.
	pub fn scopes(&self) -> impl Iterator<Item = &str> {
		let mut found = vec![self.scope_name.as_str()];
		let roots = self.patterns().iter().chain(self.repository().into_iter().flat_map(IndexMap::values));
		for rule in roots {
			rule.visit(true, &mut |r| {
				found.extend(r.name.as_deref());
				found.extend(r.content_name.as_deref());
			});
		}
		found.into_iter()
	}
}
