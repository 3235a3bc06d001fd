use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde_json::Value;

/// The key-value store that actions write their extracted data into.
///
/// The dispatch core only ever reads and writes whole values; structure
/// contents are opaque to it. Implementations must be safe to share between
/// actions running in parallel; read-modify-write sequences spanning several
/// calls are the caller's responsibility.
pub trait Structures: Send + Sync {
	/// Returns a copy of the named structure.
	fn get(&self, key: &str) -> Option<Value>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set(&self, key: &str, value: Value);

	/// Names of all known structures, sorted.
	fn names(&self) -> Vec<String>;

	/// Returns the named structure, first storing `initial` if it is absent.
	fn get_or_insert(&self, key: &str, initial: Value) -> Value {
		match self.get(key) {
			Some(value) => value,
			None => {
				self.set(key, initial.clone());
				initial
			}
		}
	}
}

/// In-memory [`Structures`] store.
#[derive(Debug, Default)]
pub struct MemoryStructures {
	values: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStructures {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Applies `f` to the named structure under the write lock, creating it
	/// from `initial` when absent.
	pub fn update<R>(&self, key: &str, initial: impl FnOnce() -> Value, f: impl FnOnce(&mut Value) -> R) -> R {
		let mut values = self.values.write();
		let value = values.entry(key.to_string()).or_insert_with(initial);
		f(value)
	}

	/// Snapshot of every structure, keyed by name.
	pub fn snapshot(&self) -> BTreeMap<String, Value> {
		self.values.read().clone()
	}
}

impl Structures for MemoryStructures {
	fn get(&self, key: &str) -> Option<Value> {
		self.values.read().get(key).cloned()
	}

	fn set(&self, key: &str, value: Value) {
		self.values.write().insert(key.to_string(), value);
	}

	fn names(&self) -> Vec<String> {
		self.values.read().keys().cloned().collect()
	}

	fn get_or_insert(&self, key: &str, initial: Value) -> Value {
		self.values.write().entry(key.to_string()).or_insert(initial).clone()
	}
}
