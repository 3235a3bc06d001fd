use std::path::{Component, Path, PathBuf};

/// Resolves a path as written in configuration or on the command line.
///
/// * `~` and `~/rest` resolve against the home directory, `~user/rest`
///   against the home directory's parent.
/// * Absolute paths are kept.
/// * Anything else is joined onto `prefix` (left relative when `prefix` is empty).
///
/// The result is normalised lexically: `.` components are dropped and `..`
/// pops the previous component.
pub fn normalize_path(raw: &str, prefix: &str) -> PathBuf {
	let joined = match raw.strip_prefix('~').zip(dirs::home_dir()) {
		Some((rest, home)) => {
			if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') {
				home.join(rest.trim_start_matches(['/', '\\']))
			} else {
				home.parent().unwrap_or(&home).join(rest)
			}
		}
		None if Path::new(raw).is_absolute() || prefix.is_empty() => PathBuf::from(raw),
		None => Path::new(prefix).join(raw),
	};
	lexical_normalize(&joined)
}

fn lexical_normalize(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				if matches!(out.components().next_back(), Some(Component::Normal(_))) {
					out.pop();
				} else if !out.has_root() {
					out.push("..");
				}
			}
			other => out.push(other.as_os_str()),
		}
	}
	if out.as_os_str().is_empty() {
		out.push(".");
	}
	out
}
