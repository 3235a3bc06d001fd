//! Action definitions and handlers.
//!
//! An action is a callback run when its scope is seen while scanning a
//! document. Handlers receive an [`ActionContext`] and answer with an
//! [`ActionStep`]: either a finished result or a future the dispatcher awaits.

mod context;
pub mod def;
pub mod entry;
pub mod handler;
mod macros;

pub use context::ActionContext;
pub use def::{ActionFuture, ActionHandler, ActionResult, ActionStep};
pub use entry::ActionEntry;
pub use handler::{ActionHandlerReg, ActionHandlerStatic};

pub use crate::scope_action;
