use lpic_config::TraceFilters;
use lpic_primitives::Structures;
use tracing::debug;

use crate::Token;

/// Logs what dispatch sees, filtered by [`TraceFilters`].
///
/// A disabled tracer logs nothing. Otherwise a line is traced when the line
/// filter admits its text; scopes, actions and structures are only traced on
/// traced lines and when their own filters admit their names.
#[derive(Debug, Clone, Default)]
pub struct Tracer {
	filters: Option<TraceFilters>,
}

impl Tracer {
	pub fn disabled() -> Self {
		Self::default()
	}

	pub fn new(filters: TraceFilters) -> Self {
		Self { filters: Some(filters) }
	}

	pub fn is_enabled(&self) -> bool {
		self.filters.is_some()
	}

	/// Traces a line and its tokens. Returns whether the line is traced.
	pub(crate) fn line(&self, number: usize, text: &str, tokens: &[Token]) -> bool {
		let Some(filters) = &self.filters else {
			return false;
		};
		if !filters.lines.admits(text) {
			return false;
		}
		debug!(line = number, len = text.len(), text, "tokenizing line");
		for token in tokens {
			let scopes: Vec<&str> = token.scopes.iter().map(String::as_str).filter(|s| filters.scopes.admits(s)).collect();
			debug!(line = number, start = token.start, end = token.end, text = token.text(text), ?scopes, "token");
		}
		true
	}

	/// Whether the actions for `scope` are traced on a traced line.
	pub(crate) fn actions(&self, line_traced: bool, scope: &str) -> bool {
		match &self.filters {
			Some(filters) => line_traced && filters.scopes.admits(scope) && filters.actions.admits(scope),
			None => false,
		}
	}

	pub(crate) fn tokens(&self, line: usize, scope: &str, tokens: &[String]) {
		debug!(line, scope, ?tokens, "running actions");
	}

	/// Dumps every admitted structure as JSON.
	pub(crate) fn structures(&self, store: &dyn Structures) {
		let Some(filters) = &self.filters else {
			return;
		};
		for name in store.names() {
			if !filters.structures.admits(&name) {
				continue;
			}
			if let Some(value) = store.get(&name) {
				let json = serde_json::to_string(&value).unwrap_or_default();
				debug!(structure = %name, %json, "structure");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use lpic_config::{FilterSettings, TraceSettings};
	use lpic_primitives::MemoryStructures;
	use serde_json::json;

	use super::*;

	fn excluding(pattern: &str) -> FilterSettings {
		FilterSettings {
			include: Vec::new(),
			exclude: vec![pattern.to_string()],
		}
	}

	fn tracer(settings: TraceSettings) -> Tracer {
		Tracer::new(settings.compile().unwrap())
	}

	#[test]
	fn disabled_tracer_traces_nothing() {
		let tracer = Tracer::disabled();
		assert!(!tracer.is_enabled());
		assert!(!tracer.line(0, "text", &[Token::new(0, 4, ["doc.a"])]));
		assert!(!tracer.actions(true, "doc.a"));

		let store = MemoryStructures::new();
		store.set("doc", json!(1));
		tracer.structures(&store);
	}

	#[test]
	fn open_filters_trace_everything() {
		let tracer = tracer(TraceSettings::default());
		assert!(tracer.is_enabled());
		assert!(tracer.line(0, "text", &[]));
		assert!(tracer.actions(true, "doc.a"));
		assert!(!tracer.actions(false, "doc.a"));
	}

	#[test]
	fn excluded_lines_are_skipped() {
		let tracer = tracer(TraceSettings {
			lines: excluding("^#"),
			..TraceSettings::default()
		});
		assert!(!tracer.line(0, "# heading", &[Token::new(0, 9, ["doc.heading"])]));
		assert!(tracer.line(1, "body", &[]));
	}

	#[test]
	fn excluded_scopes_hide_their_actions() {
		let tracer = tracer(TraceSettings {
			scopes: excluding("secret"),
			..TraceSettings::default()
		});
		assert!(!tracer.actions(true, "doc.secret"));
		assert!(tracer.actions(true, "doc.public"));
	}

	#[test]
	fn excluded_actions_are_skipped() {
		let tracer = tracer(TraceSettings {
			actions: FilterSettings {
				include: vec!["^doc\\.".into()],
				exclude: vec!["noisy$".into()],
			},
			..TraceSettings::default()
		});
		assert!(!tracer.actions(true, "doc.noisy"));
		assert!(!tracer.actions(true, "other.scope"));
		assert!(tracer.actions(true, "doc.quiet"));
	}
}
