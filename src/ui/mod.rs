pub mod confirm;
pub mod list;
pub mod mutation;
pub mod screen;

pub use confirm::{ConfirmGate, DeleteOutcome};
pub use list::{ListController, ListView, RefreshOutcome};
pub use mutation::{FormDialog, MutationFlow, MutationState, SubmitOutcome};
pub use screen::ManagementScreen;
