use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or looking up a grammar.
#[derive(Error, Debug)]
pub enum GrammarError {
	#[error("failed to read grammar {}: {error}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		error: std::io::Error,
	},

	#[error("failed to parse grammar {}: {error}", path.display())]
	Json {
		path: PathBuf,
		#[source]
		error: serde_json::Error,
	},

	#[error("grammar {} has no scopeName", .0.display())]
	MissingScopeName(PathBuf),

	#[error("only JSON grammars can be loaded: {}", .0.display())]
	UnsupportedFormat(PathBuf),

	#[error("grammar not found: {0}")]
	NotFound(String),
}

pub type Result<T> = std::result::Result<T, GrammarError>;
