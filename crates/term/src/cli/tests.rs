use pretty_assertions::assert_eq;

use super::*;

fn parse(args: &[&str]) -> Cli {
	Cli::try_parse_from(std::iter::once("tmgt").chain(args.iter().copied())).unwrap()
}

#[test]
fn parse_trace_subcommand() {
	let cli = parse(&["trace", "notes.tex", "--tokens", "notes.jsonl", "--collect", "markup.heading", "--prune"]);
	assert_eq!(
		cli.command,
		Command::Trace {
			document: "notes.tex".into(),
			tokens: "notes.jsonl".into(),
			collect: vec!["markup.heading".into()],
			prune: true,
		}
	);
}

#[test]
fn trace_requires_tokens() {
	assert!(Cli::try_parse_from(["tmgt", "trace", "notes.tex"]).is_err());
}

#[test]
fn global_flags_follow_the_subcommand() {
	let cli = parse(&["prune", "--keep", "a.b", "-k", "c", "--parallel", "-g", "x.json", "-g", "y.json"]);
	assert_eq!(cli.command, Command::Prune { keep: vec!["a.b".into(), "c".into()] });
	assert!(cli.parallel);
	assert_eq!(cli.grammars, ["x.json", "y.json"]);
}

#[test]
fn resolution_flag_is_validated() {
	let cli = parse(&["--resolution", "all-ancestors", "actions"]);
	assert_eq!(cli.resolution, Some(Resolution::AllAncestors));
	assert!(Cli::try_parse_from(["tmgt", "--resolution", "closest", "actions"]).is_err());
}

#[test]
fn apply_overrides_config() {
	let mut config = Config::from_toml_str(
		r#"
		parallel = false
		path_prefix = "docs"
		[load]
		grammars = ["base.json"]
		"#,
	)
	.unwrap();
	let cli = parse(&[
		"--parallel",
		"--path",
		"/srv",
		"--log-level",
		"debug",
		"-g",
		"extra.json",
		"--trace-scope",
		"^keyword",
		"scopes",
	]);
	cli.apply(&mut config);

	assert!(config.parallel);
	assert_eq!(config.path_prefix, "/srv");
	assert_eq!(config.log_level, "debug");
	assert_eq!(config.load.grammars, ["base.json", "extra.json"]);
	assert_eq!(config.trace.scopes.include, ["^keyword"]);
	assert!(cli.tracing_requested(&config));
}

#[test]
fn tracing_is_off_without_flags_or_filters() {
	let cli = parse(&["scopes"]);
	let mut config = Config::default();
	cli.apply(&mut config);
	assert!(!cli.tracing_requested(&config));
	assert!(parse(&["--trace", "scopes"]).tracing_requested(&config));
}
