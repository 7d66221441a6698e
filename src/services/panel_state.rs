//! Per-panel open/closed state, persisted per scope.

use crate::domain::models::PanelStates;

use super::scoped_store::ScopedLocalStore;

/// Panel visibility for one client, bound to one scope at a time.
///
/// The loaded scope is tracked explicitly: asking for a panel under a
/// different scope reloads from that scope's entry and drops the in-memory
/// map, so a value never migrates from one project into another.
pub struct PanelVisibility {
    store: ScopedLocalStore,
    scope: Option<String>,
    states: PanelStates,
    loaded: bool,
}

impl PanelVisibility {
    pub const fn new(store: ScopedLocalStore) -> Self {
        Self {
            store,
            scope: None,
            states: PanelStates::new(),
            loaded: false,
        }
    }

    /// Current scope, if any panel has been requested yet.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Resolve a panel's state, loading the scope on first use or on change.
    pub async fn get_or_init(
        &mut self,
        panel_id: &str,
        default_open: bool,
        scope: Option<&str>,
    ) -> PanelHandle<'_> {
        if !self.loaded || self.scope.as_deref() != scope {
            self.states = self.store.load(scope).await;
            self.scope = scope.map(str::to_string);
            self.loaded = true;
        }

        let is_open = self.states.get(panel_id).copied().unwrap_or(default_open);

        PanelHandle {
            owner: self,
            panel_id: panel_id.to_string(),
            is_open,
        }
    }

    async fn set(&mut self, panel_id: &str, is_open: bool) {
        self.states.insert(panel_id.to_string(), is_open);
        self.store.save(self.scope.as_deref(), &self.states).await;
    }
}

/// Borrowed view of one panel returned by [`PanelVisibility::get_or_init`].
pub struct PanelHandle<'a> {
    owner: &'a mut PanelVisibility,
    panel_id: String,
    is_open: bool,
}

impl PanelHandle<'_> {
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn panel_id(&self) -> &str {
        &self.panel_id
    }

    /// Flip the panel and persist the scope; the write has landed when this
    /// returns.
    pub async fn toggle(&mut self) -> bool {
        self.is_open = !self.is_open;
        self.owner.set(&self.panel_id, self.is_open).await;
        self.is_open
    }
}
