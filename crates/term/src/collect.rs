//! Runtime actions that gather the tokens of a scope.

use std::sync::Arc;

use lpic_primitives::MemoryStructures;
use lpic_registry::{ActionContext, ActionRegistry, ActionStep, RegistryError, scope_action};
use serde_json::Value;

/// Source id reported for collector actions.
const COLLECT_SOURCE: &str = "tmgt --collect";

/// Registers one action per scope that appends its token texts to the
/// structure named after the scope.
pub fn register_collectors(registry: &mut ActionRegistry, scopes: &[String], store: &Arc<MemoryStructures>) -> Result<(), RegistryError> {
	for scope in scopes {
		let store = store.clone();
		registry.register(scope, COLLECT_SOURCE, move |ctx: &ActionContext| {
			store.update(
				ctx.scope.as_str(),
				|| Value::Array(Vec::new()),
				|value| match value.as_array_mut() {
					Some(texts) => {
						texts.extend(ctx.tokens.iter().cloned().map(Value::String));
						ActionStep::done()
					}
					None => ActionStep::fail(format!("structure '{}' is not a list", ctx.scope)),
				},
			)
		})?;
	}
	Ok(())
}

scope_action!(record_files, "run.tmgt.files", |ctx| {
	ctx.structures.set("files", Value::from(ctx.tokens.to_vec()));
});

scope_action!(report_structures, "finalize.tmgt.report", |ctx| {
	tracing::info!(structures = ctx.structures.names().len(), "finished");
});

#[cfg(test)]
mod tests {
	use lpic_primitives::Structures;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn context(scope: &str, tokens: &[&str], structures: Arc<MemoryStructures>) -> ActionContext {
		ActionContext {
			scope: scope.parse().unwrap(),
			trigger: Arc::from(scope),
			tokens: tokens.iter().map(|t| t.to_string()).collect(),
			line: 0,
			document: None,
			structures,
		}
	}

	#[tokio::test]
	async fn collectors_append_in_order() {
		let store = Arc::new(MemoryStructures::new());
		let mut registry = ActionRegistry::new();
		register_collectors(&mut registry, &["markup.heading".into()], &store).unwrap();

		let entry = registry.lookup_exact(&"markup.heading".parse().unwrap()).unwrap()[0].clone();
		entry.run(&context("markup.heading", &["Intro"], store.clone())).finish().await.unwrap();
		entry.run(&context("markup.heading", &["Usage", "Notes"], store.clone())).finish().await.unwrap();

		assert_eq!(store.get("markup.heading"), Some(json!(["Intro", "Usage", "Notes"])));
		assert_eq!(&*entry.source_id, COLLECT_SOURCE);
	}

	#[tokio::test]
	async fn collectors_refuse_non_list_structures() {
		let store = Arc::new(MemoryStructures::new());
		store.set("title", json!({"text": "x"}));
		let mut registry = ActionRegistry::new();
		register_collectors(&mut registry, &["title".into()], &store).unwrap();

		let entry = registry.lookup_exact(&"title".parse().unwrap()).unwrap()[0].clone();
		assert!(entry.run(&context("title", &["y"], store.clone())).finish().await.is_err());
	}

	#[test]
	fn builtins_are_registered_under_lifecycle_phases() {
		let registry = ActionRegistry::with_builtins().unwrap();
		assert!(registry.lookup_exact(&"run.tmgt.files".parse().unwrap()).is_some());
		assert!(registry.lookup_exact(&"finalize.tmgt.report".parse().unwrap()).is_some());
	}
}
