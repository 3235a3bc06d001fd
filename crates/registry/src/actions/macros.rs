//! Action registration macros.

/// Defines a scope action and submits it for static registration.
///
/// The body receives `&ActionContext` and may evaluate to `()`, an
/// [`ActionResult`](crate::actions::ActionResult), or an
/// [`ActionStep`](crate::actions::ActionStep).
///
/// # Example
///
/// ```ignore
/// scope_action!(log_title, "markup.heading.title", |ctx| {
///     tracing::info!(line = ctx.line, title = %ctx.text(), "title");
/// });
/// ```
#[macro_export]
macro_rules! scope_action {
	($name:ident, $scope:literal, |$ctx:ident| $body:expr) => {
		$crate::paste::paste! {
			#[allow(unused_variables, clippy::unused_unit)]
			fn [<scope_action_ $name>]($ctx: &$crate::actions::ActionContext) -> $crate::actions::ActionStep {
				let result = { $body };
				::core::convert::Into::into(result)
			}

			#[allow(non_upper_case_globals)]
			static [<SCOPE_ACTION_ $name>]: $crate::actions::ActionHandlerStatic = $crate::actions::ActionHandlerStatic {
				name: stringify!($name),
				scope: $scope,
				source: module_path!(),
				handler: [<scope_action_ $name>],
			};

			$crate::inventory::submit!($crate::actions::ActionHandlerReg(&[<SCOPE_ACTION_ $name>]));
		}
	};
}
