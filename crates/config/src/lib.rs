#![deny(clippy::print_stderr)]

//! Configuration for the `tmgt` toolchain.
//!
//! Configuration is written in TOML. Several files may be given; they are
//! read in order and deep-merged, so a later file overrides individual keys
//! of an earlier one without replacing whole tables:
//!
//! ```toml
//! log_level = "info"
//! parallel = false
//! resolution = "exact"        # exact | most-specific | all-ancestors
//! path_prefix = ""
//! prune = false
//!
//! [load]
//! grammars = ["grammars/context.tmLanguage.json"]
//!
//! [trace.scopes]
//! include = ["^keyword"]
//! exclude = []
//! ```
//!
//! Command-line flags are applied on top by the binary.

pub mod error;
pub mod paths;
pub mod trace;

use std::path::{Path, PathBuf};

pub use error::{ConfigError, Result};
use lpic_registry::Resolution;
pub use paths::normalize_path;
use serde::{Deserialize, Serialize};
pub use trace::{FilterSettings, TraceFilter, TraceFilters, TraceSettings};
use tracing::debug;

/// Name of the configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tmgt.toml";

/// The merged configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Log level used when `RUST_LOG` is not set.
	pub log_level: String,
	/// Run the actions of one line concurrently.
	pub parallel: bool,
	/// How scopes seen in a document map to registered actions.
	pub resolution: Resolution,
	/// Prefix joined onto relative paths.
	pub path_prefix: String,
	/// Prune grammars against the registered scopes before tracing.
	pub prune: bool,
	pub load: LoadSettings,
	pub trace: TraceSettings,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			log_level: "info".to_string(),
			parallel: false,
			resolution: Resolution::default(),
			path_prefix: String::new(),
			prune: false,
			load: LoadSettings::default(),
			trace: TraceSettings::default(),
		}
	}
}

/// Files to load at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadSettings {
	/// JSON grammar files, as written (see [`Config::resolve_path`]).
	pub grammars: Vec<String>,
}

impl Config {
	/// Loads and deep-merges `paths` in order.
	///
	/// With no paths, [`DEFAULT_CONFIG_FILE`] is used if it exists in the
	/// working directory; otherwise the defaults are returned.
	pub fn load(paths: &[PathBuf]) -> Result<Self> {
		let default = PathBuf::from(DEFAULT_CONFIG_FILE);
		let paths: Vec<&Path> = if paths.is_empty() {
			if default.is_file() { vec![default.as_path()] } else { Vec::new() }
		} else {
			paths.iter().map(PathBuf::as_path).collect()
		};

		let mut merged = toml::Table::new();
		for path in paths {
			debug!(path = %path.display(), "loading config");
			let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
				path: path.to_path_buf(),
				error,
			})?;
			let table: toml::Table = toml::from_str(&text).map_err(|error| ConfigError::Toml {
				path: path.to_path_buf(),
				error,
			})?;
			merge_tables(&mut merged, table);
		}
		Self::from_table(merged)
	}

	/// Parses a single TOML document.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		toml::from_str(text).map_err(|error| ConfigError::Toml {
			path: PathBuf::from("<inline>"),
			error,
		})
	}

	fn from_table(table: toml::Table) -> Result<Self> {
		toml::Value::Table(table).try_into().map_err(|error| ConfigError::Toml {
			path: PathBuf::from("<merged>"),
			error,
		})
	}

	/// Resolves a configured path with [`normalize_path`] and `path_prefix`.
	pub fn resolve_path(&self, raw: &str) -> PathBuf {
		normalize_path(raw, &self.path_prefix)
	}

	/// Resolved paths of the grammars to load.
	pub fn grammar_paths(&self) -> Vec<PathBuf> {
		self.load.grammars.iter().map(|raw| self.resolve_path(raw)).collect()
	}
}

/// Merges `overlay` into `base`. Tables present in both are merged key by
/// key; any other value in `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
	for (key, value) in overlay {
		match value {
			toml::Value::Table(overlay) if matches!(base.get(&key), Some(toml::Value::Table(_))) => {
				if let Some(toml::Value::Table(base)) = base.get_mut(&key) {
					merge_tables(base, overlay);
				}
			}
			value => {
				base.insert(key, value);
			}
		}
	}
}
