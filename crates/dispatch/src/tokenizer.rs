use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One span of a line and the scopes the grammar applied to it, outermost first.
///
/// `start` and `end` are byte offsets into the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	#[serde(alias = "startIndex")]
	pub start: usize,
	#[serde(alias = "endIndex")]
	pub end: usize,
	pub scopes: Vec<String>,
}

impl Token {
	pub fn new(start: usize, end: usize, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			start,
			end,
			scopes: scopes.into_iter().map(Into::into).collect(),
		}
	}

	/// The text this token covers.
	///
	/// Offsets are clamped to the line; a span that does not fall on char
	/// boundaries yields an empty string.
	pub fn text<'l>(&self, line: &'l str) -> &'l str {
		let end = self.end.min(line.len());
		let start = self.start.min(end);
		line.get(start..end).unwrap_or_default()
	}
}

/// The tokens of one line and the state to tokenize the next line with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTokens<S> {
	pub tokens: Vec<Token>,
	pub state: S,
}

/// A tokenizer failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TokenizeError(pub String);

impl TokenizeError {
	pub fn new(msg: impl std::fmt::Display) -> Self {
		Self(msg.to_string())
	}
}

/// A grammar engine, seen as a black box that tokenizes one line at a time.
///
/// The state returned for line `n` is threaded into the call for line `n + 1`;
/// each document starts from [`Tokenizer::initial_state`].
pub trait Tokenizer {
	type State;

	fn initial_state(&self) -> Self::State;

	fn tokenize_line(&self, line: &str, state: &Self::State) -> Result<LineTokens<Self::State>, TokenizeError>;
}
