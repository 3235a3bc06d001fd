use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use tracing::debug;

/// A document split into lines, ready to be tokenized front to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
	/// Name under which the document is cached.
	pub name: String,
	/// File the document was read from, if any.
	pub path: Option<PathBuf>,
	/// The document's lines, without their `\n` terminators.
	pub lines: Vec<String>,
}

impl Document {
	/// Builds a document from an in-memory string.
	pub fn from_text(name: impl Into<String>, text: &str) -> Self {
		Self {
			name: name.into(),
			path: None,
			lines: text.split('\n').map(str::to_string).collect(),
		}
	}

	/// Reads a document from the file system.
	pub fn load(path: &Path) -> std::io::Result<Self> {
		debug!(path = %path.display(), "loading document");
		let text = std::fs::read_to_string(path)?;
		let mut doc = Self::from_text(path.display().to_string(), &text);
		doc.path = Some(path.to_path_buf());
		Ok(doc)
	}

	/// The first line, used when choosing a grammar.
	pub fn first_line(&self) -> &str {
		self.lines.first().map_or("", String::as_str)
	}

	/// The path used for file-type matching: the file path when known,
	/// otherwise the document name.
	pub fn match_path(&self) -> String {
		self.path.as_ref().map_or_else(|| self.name.clone(), |p| p.display().to_string())
	}
}

/// Documents loaded during a run, keyed by name.
#[derive(Debug, Default)]
pub struct DocumentCache {
	documents: HashMap<String, Arc<Document>>,
}

impl DocumentCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` if a document with this name is cached.
	pub fn contains(&self, name: &str) -> bool {
		self.documents.contains_key(name)
	}

	/// Returns the cached document with this name.
	pub fn get(&self, name: &str) -> Option<Arc<Document>> {
		self.documents.get(name).cloned()
	}

	/// Loads a document from disk, replacing any cached copy.
	pub fn load_file(&mut self, path: &Path) -> std::io::Result<Arc<Document>> {
		let doc = Arc::new(Document::load(path)?);
		self.documents.insert(doc.name.clone(), doc.clone());
		Ok(doc)
	}

	/// Caches a document built from a string.
	pub fn load_str(&mut self, name: &str, text: &str) -> Arc<Document> {
		let doc = Arc::new(Document::from_text(name, text));
		self.documents.insert(name.to_string(), doc.clone());
		doc
	}
}
