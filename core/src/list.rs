//! List screen state: the fetched todos, two filter flags, and refresh
//! bookkeeping.
//!
//! # Design
//! `ListState` is pure state with no store attached, so it can live behind
//! the FFI boundary where the host performs the fetch itself. Every refresh
//! is tagged with a `RefreshTicket`; only the result for the most recently
//! issued ticket is applied, so a slow response can never overwrite a newer
//! one. `ListViewModel` pairs the state with an injected `RemoteStore` for
//! hosts that let the core drive the fetch.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::store::RemoteStore;
use crate::types::TodoItem;

/// Which filter flag to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Completed,
    Incomplete,
}

/// Identifies one refresh. Tickets increase monotonically per `ListState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// What happened to a refresh result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result replaced the list.
    Applied,
    /// A newer refresh was issued; the result was dropped.
    Stale,
    /// The fetch failed; the previous list is kept.
    Failed,
}

/// Keep an item when both flags are set, or when its completion state
/// matches a set flag.
pub fn is_visible(item: &TodoItem, include_completed: bool, include_incomplete: bool) -> bool {
    (include_completed && include_incomplete)
        || (include_completed && item.is_completed)
        || (include_incomplete && !item.is_completed)
}

#[derive(Debug, Clone)]
pub struct ListState {
    items: Vec<TodoItem>,
    include_completed: bool,
    include_incomplete: bool,
    issued: u64,
    pending: Option<RefreshTicket>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            include_completed: true,
            include_incomplete: true,
            issued: 0,
            pending: None,
        }
    }
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh. Any earlier ticket becomes stale.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        let ticket = RefreshTicket(self.issued);
        self.pending = Some(ticket);
        debug!(ticket = ticket.0, "list refresh started");
        ticket
    }

    /// Apply the result of the fetch started with `ticket`.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<TodoItem>, ApiError>,
    ) -> RefreshOutcome {
        if self.pending != Some(ticket) {
            debug!(ticket = ticket.0, latest = self.issued, "dropping stale list refresh");
            return RefreshOutcome::Stale;
        }
        self.pending = None;
        match result {
            Ok(items) => {
                debug!(ticket = ticket.0, count = items.len(), "list refreshed");
                self.items = items;
                RefreshOutcome::Applied
            }
            Err(err) => {
                warn!(ticket = ticket.0, error = %err, "list refresh failed");
                RefreshOutcome::Failed
            }
        }
    }

    /// True while the latest refresh has not completed.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_filter(&mut self, kind: FilterKind, enabled: bool) {
        match kind {
            FilterKind::Completed => self.include_completed = enabled,
            FilterKind::Incomplete => self.include_incomplete = enabled,
        }
    }

    pub fn filter(&self, kind: FilterKind) -> bool {
        match kind {
            FilterKind::Completed => self.include_completed,
            FilterKind::Incomplete => self.include_incomplete,
        }
    }

    /// Everything from the last applied refresh, unfiltered.
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The filtered view, in store order.
    pub fn visible_items(&self) -> Vec<&TodoItem> {
        self.items
            .iter()
            .filter(|item| is_visible(item, self.include_completed, self.include_incomplete))
            .collect()
    }
}

/// List screen view-model backed by a `RemoteStore`.
pub struct ListViewModel<S> {
    store: S,
    state: ListState,
}

impl<S: RemoteStore> ListViewModel<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: ListState::new(),
        }
    }

    /// Refetch everything. Call on mount and whenever the screen regains
    /// focus; failures keep the previous list.
    pub fn refresh(&mut self) -> RefreshOutcome {
        let ticket = self.state.begin_refresh();
        let result = self.store.get_all();
        self.state.complete_refresh(ticket, result)
    }

    pub fn set_filter(&mut self, kind: FilterKind, enabled: bool) {
        self.state.set_filter(kind, enabled);
    }

    pub fn visible_items(&self) -> Vec<&TodoItem> {
        self.state.visible_items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ListState {
        &mut self.state
    }
}
