pub mod cockpit_session;
pub mod cockpit_state;
pub mod cockpit_storage;
pub mod panel_state;
pub mod project_scope;
pub mod scoped_store;
pub mod workflow_poller;

pub use cockpit_session::CockpitSession;
pub use cockpit_state::{CockpitState, CompletionDialog, SharedCockpitState};
pub use cockpit_storage::CockpitStorage;
pub use panel_state::{PanelHandle, PanelVisibility};
pub use project_scope::{ProjectScope, LAST_PROJECT_KEY};
pub use scoped_store::ScopedLocalStore;
pub use workflow_poller::{PollHandle, PollOutcome, PollerConfig, WorkflowPoller};
