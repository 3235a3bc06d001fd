use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Include/exclude patterns for one kind of traced item, as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSettings {
	pub include: Vec<String>,
	pub exclude: Vec<String>,
}

impl FilterSettings {
	/// Compiles the patterns.
	pub fn compile(&self) -> Result<TraceFilter> {
		Ok(TraceFilter {
			include: compile_all(&self.include)?,
			exclude: compile_all(&self.exclude)?,
		})
	}
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
	patterns
		.iter()
		.map(|pattern| {
			Regex::new(pattern).map_err(|error| ConfigError::Regex {
				pattern: pattern.clone(),
				error,
			})
		})
		.collect()
}

/// Trace filters for every traced kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceSettings {
	pub lines: FilterSettings,
	pub scopes: FilterSettings,
	pub actions: FilterSettings,
	pub structures: FilterSettings,
}

impl TraceSettings {
	pub fn compile(&self) -> Result<TraceFilters> {
		Ok(TraceFilters {
			lines: self.lines.compile()?,
			scopes: self.scopes.compile()?,
			actions: self.actions.compile()?,
			structures: self.structures.compile()?,
		})
	}
}

/// A compiled include/exclude filter.
///
/// Exclusion wins. A non-empty include list admits only matching text; an
/// empty one admits everything not excluded.
#[derive(Debug, Clone, Default)]
pub struct TraceFilter {
	include: Vec<Regex>,
	exclude: Vec<Regex>,
}

impl TraceFilter {
	pub fn admits(&self, text: &str) -> bool {
		if self.exclude.iter().any(|re| re.is_match(text)) {
			return false;
		}
		self.include.is_empty() || self.include.iter().any(|re| re.is_match(text))
	}
}

/// Compiled [`TraceSettings`].
#[derive(Debug, Clone, Default)]
pub struct TraceFilters {
	pub lines: TraceFilter,
	pub scopes: TraceFilter,
	pub actions: TraceFilter,
	pub structures: TraceFilter,
}
