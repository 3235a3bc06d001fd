/// Execution classes used for task scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Actions launched for the scopes seen on one line.
	Dispatch,
	/// Actions launched by a lifecycle prefix broadcast.
	Lifecycle,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Dispatch => "dispatch",
			Self::Lifecycle => "lifecycle",
		}
	}
}
