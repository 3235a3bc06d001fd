//! Replays tokens recorded by an external grammar engine.

use std::io::BufRead;
use std::path::Path;

use anyhow::Context;
use lpic_dispatch::{LineTokens, Token, TokenizeError, Tokenizer};

/// A [`Tokenizer`] over a JSON-lines token stream.
///
/// Record `n` of the stream is a JSON array of tokens
/// (`{"startIndex": 0, "endIndex": 5, "scopes": [...]}`) for document line
/// `n`. The state is the index of the next line.
#[derive(Debug, Clone, Default)]
pub struct ReplayTokenizer {
	lines: Vec<Vec<Token>>,
}

impl ReplayTokenizer {
	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let file = std::fs::File::open(path).with_context(|| format!("opening token stream {}", path.display()))?;
		Self::from_reader(std::io::BufReader::new(file)).with_context(|| format!("reading token stream {}", path.display()))
	}

	pub fn from_reader(reader: impl BufRead) -> anyhow::Result<Self> {
		let mut lines = Vec::new();
		for (number, record) in reader.lines().enumerate() {
			let record = record?;
			let tokens = if record.trim().is_empty() {
				Vec::new()
			} else {
				serde_json::from_str(&record).with_context(|| format!("record {number}"))?
			};
			lines.push(tokens);
		}
		Ok(Self { lines })
	}

	/// Number of recorded lines.
	pub fn line_count(&self) -> usize {
		self.lines.len()
	}
}

impl Tokenizer for ReplayTokenizer {
	type State = usize;

	fn initial_state(&self) -> usize {
		0
	}

	fn tokenize_line(&self, _line: &str, state: &usize) -> Result<LineTokens<usize>, TokenizeError> {
		let tokens = self
			.lines
			.get(*state)
			.ok_or_else(|| TokenizeError::new(format!("no tokens recorded for line {state}")))?;
		Ok(LineTokens {
			tokens: tokens.clone(),
			state: state + 1,
		})
	}
}
