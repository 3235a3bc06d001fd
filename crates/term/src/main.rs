//! The tmgt binary.
//!
//! Loads configuration and grammars, then runs one subcommand. Results go to
//! stdout; logs go to stderr, or to a per-process file under `LPIC_LOG_DIR`.

mod cli;
mod collect;
mod commands;
mod replay;

use std::path::PathBuf;

use clap::Parser;
use cli::Cli;
use commands::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let config = cli.load_config()?;

	setup_tracing(&config.log_level, cli.verbose);

	let trace_dispatch = cli.tracing_requested(&config);
	let session = Session::open(config, trace_dispatch)?;
	let mut out = std::io::stdout().lock();
	commands::run(cli.command, session, &mut out).await
}

fn setup_tracing(log_level: &str, verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("debug")
			} else {
				EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
			}
		})
	};

	if let Some(log_dir) = std::env::var("LPIC_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("tmgt.{}.log", std::process::id()));
		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);
			tracing_subscriber::registry().with(filter()).with(file_layer).init();
			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
