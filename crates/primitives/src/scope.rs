use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced when a string is not a well-formed scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
	/// The scope string was empty.
	#[error("scope is empty")]
	Empty,
	/// A segment between dots was empty (leading, trailing, or doubled dot).
	#[error("scope '{scope}' has an empty segment at position {index}")]
	EmptySegment {
		/// The offending scope string.
		scope: String,
		/// Zero-based index of the empty segment.
		index: usize,
	},
}

/// A parsed, dot-delimited scope path such as `keyword.control.context`.
///
/// Keys are validated once at construction: every segment is non-empty, so
/// structural equality of the segment sequence coincides with equality of the
/// backing string. Clones share the backing string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey {
	text: Arc<str>,
}

impl ScopeKey {
	/// Separator between scope segments.
	pub const SEPARATOR: char = '.';

	/// Parses `scope`, rejecting empty scopes and empty segments.
	pub fn parse(scope: &str) -> Result<Self, ScopeError> {
		if scope.is_empty() {
			return Err(ScopeError::Empty);
		}
		if let Some(index) = scope.split(Self::SEPARATOR).position(str::is_empty) {
			return Err(ScopeError::EmptySegment {
				scope: scope.to_string(),
				index,
			});
		}
		Ok(Self { text: Arc::from(scope) })
	}

	/// Returns the scope as written.
	#[inline]
	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// Iterates over the segments, root first.
	pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
		self.text.split(Self::SEPARATOR)
	}

	/// Number of segments.
	pub fn depth(&self) -> usize {
		self.segments().count()
	}

	/// Returns `true` if `self` is `other` or one of its ancestors.
	pub fn is_ancestor_or_self_of(&self, other: &ScopeKey) -> bool {
		segments_start_with(other.as_str(), self.as_str())
	}

	/// Returns `true` if this key's segments start with all of `prefix`'s segments.
	///
	/// `prefix` is compared segment-wise, so `run` matches `run` and `run.x`
	/// but not `running.x`.
	pub fn starts_with_segments(&self, prefix: &str) -> bool {
		segments_start_with(self.as_str(), prefix)
	}

	/// The parent scope, or `None` for a single-segment key.
	pub fn parent(&self) -> Option<ScopeKey> {
		self.text.rfind(Self::SEPARATOR).map(|idx| Self {
			text: Arc::from(&self.text[..idx]),
		})
	}
}

fn segments_start_with(full: &str, prefix: &str) -> bool {
	match full.strip_prefix(prefix) {
		Some(rest) => rest.is_empty() || rest.starts_with(ScopeKey::SEPARATOR),
		None => false,
	}
}

impl fmt::Display for ScopeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

impl fmt::Debug for ScopeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ScopeKey({})", self.text)
	}
}

impl FromStr for ScopeKey {
	type Err = ScopeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<&str> for ScopeKey {
	type Error = ScopeError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}

/// Hashing and ordering follow the backing string, so maps keyed by
/// `ScopeKey` can be queried with a `&str`.
impl Borrow<str> for ScopeKey {
	fn borrow(&self) -> &str {
		&self.text
	}
}

impl AsRef<str> for ScopeKey {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

impl Serialize for ScopeKey {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for ScopeKey {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Self::parse(&raw).map_err(serde::de::Error::custom)
	}
}
