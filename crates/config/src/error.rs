//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {}: {error}", path.display())]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		error: std::io::Error,
	},

	/// A configuration file is not valid TOML, or does not fit the schema.
	#[error("TOML error in {}: {error}", path.display())]
	Toml {
		/// Path to the offending file, or `<merged>` for schema errors.
		path: PathBuf,
		/// The underlying parse error.
		#[source]
		error: toml::de::Error,
	},

	/// A trace filter pattern is not a valid regular expression.
	#[error("invalid trace pattern '{pattern}': {error}")]
	Regex {
		/// The pattern as written.
		pattern: String,
		/// The underlying compile error.
		#[source]
		error: regex::Error,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
