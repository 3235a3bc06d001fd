//! CLI schema for the tmgt binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lpic_config::{Config, TraceSettings};
use lpic_registry::Resolution;

#[derive(Parser, Debug)]
#[command(name = "tmgt")]
#[command(about = "Run scope actions over documents tokenized with TextMate grammars")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration files, merged in order (defaults to ./tmgt.toml)
	#[arg(short, long = "config", value_name = "FILE", global = true)]
	pub config: Vec<PathBuf>,

	/// Grammar files to load in addition to the configured ones
	#[arg(short, long = "grammar", value_name = "FILE", global = true)]
	pub grammars: Vec<String>,

	/// Run the actions of one line concurrently
	#[arg(long, global = true)]
	pub parallel: bool,

	/// How scopes map to actions: exact, most-specific or all-ancestors
	#[arg(long, value_name = "POLICY", value_parser = parse_resolution, global = true)]
	pub resolution: Option<Resolution>,

	/// Prefix joined onto relative paths
	#[arg(long = "path", value_name = "PREFIX", global = true)]
	pub path_prefix: Option<String>,

	/// Log level used when RUST_LOG is unset
	#[arg(long, value_name = "LEVEL", global = true)]
	pub log_level: Option<String>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Trace dispatch at debug level
	#[arg(long, global = true)]
	pub trace: bool,

	/// Only trace lines matching this regex
	#[arg(long, value_name = "REGEX", global = true)]
	pub trace_line: Vec<String>,

	/// Only trace scopes matching this regex
	#[arg(long, value_name = "REGEX", global = true)]
	pub trace_scope: Vec<String>,

	/// Only trace actions whose scope matches this regex
	#[arg(long, value_name = "REGEX", global = true)]
	pub trace_action: Vec<String>,

	/// Only dump structures whose name matches this regex
	#[arg(long, value_name = "REGEX", global = true)]
	pub trace_structure: Vec<String>,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// List the built-in actions
	Actions,
	/// List every scope the loaded grammars can produce
	Scopes,
	/// Print loaded grammars as JSON
	Show {
		/// Grammar scope names (all grammars if omitted)
		scopes: Vec<String>,
	},
	/// Print the grammar chosen for a document
	Choose {
		/// Document path
		document: String,
	},
	/// Prune the loaded grammars and print them with the prune report
	Prune {
		/// Scopes to keep (defaults to the scopes of the built-in actions)
		#[arg(short, long, value_name = "SCOPE")]
		keep: Vec<String>,
	},
	/// Dispatch a document using tokens recorded by a grammar engine
	Trace {
		/// Document path
		document: String,

		/// JSON-lines file with one token array per document line
		#[arg(long, value_name = "FILE")]
		tokens: String,

		/// Collect the tokens of this scope into a structure of the same name
		#[arg(long, value_name = "SCOPE")]
		collect: Vec<String>,

		/// Prune grammars against the registered scopes first
		#[arg(long)]
		prune: bool,
	},
}

impl Cli {
	/// Loads the configuration files and applies the flags on top.
	pub fn load_config(&self) -> lpic_config::Result<Config> {
		let mut config = Config::load(&self.config)?;
		self.apply(&mut config);
		Ok(config)
	}

	/// Overrides `config` with the flags given on the command line.
	pub fn apply(&self, config: &mut Config) {
		config.parallel |= self.parallel;
		if let Some(resolution) = self.resolution {
			config.resolution = resolution;
		}
		if let Some(prefix) = &self.path_prefix {
			config.path_prefix = prefix.clone();
		}
		if let Some(level) = &self.log_level {
			config.log_level = level.clone();
		}
		config.load.grammars.extend(self.grammars.iter().cloned());

		let trace = &mut config.trace;
		trace.lines.include.extend(self.trace_line.iter().cloned());
		trace.scopes.include.extend(self.trace_scope.iter().cloned());
		trace.actions.include.extend(self.trace_action.iter().cloned());
		trace.structures.include.extend(self.trace_structure.iter().cloned());
	}

	/// Whether dispatch tracing is on: asked for with `--trace`, or implied
	/// by any configured trace filter.
	pub fn tracing_requested(&self, config: &Config) -> bool {
		self.trace || config.trace != TraceSettings::default()
	}
}

fn parse_resolution(raw: &str) -> Result<Resolution, String> {
	match raw {
		"exact" => Ok(Resolution::Exact),
		"most-specific" => Ok(Resolution::MostSpecific),
		"all-ancestors" => Ok(Resolution::AllAncestors),
		other => Err(format!("unknown resolution '{other}' (expected exact, most-specific or all-ancestors)")),
	}
}

#[cfg(test)]
mod tests;
