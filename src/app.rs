use ratatui::widgets::ListState;

use crate::collection::SharedCollection;
use crate::site::{Category, NotificationSite, PendingSite, SiteRecord};
use crate::sync::SyncEvent;

/// Which pane owns the navigation keys.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Pane {
    Notification,
    Pending,
}

/// How key events are interpreted.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    Normal,
    /// Typing into the URL draft.
    EditingUrl,
    /// Waiting on y/n for the delete held in [`App::pending_delete`].
    ConfirmDelete,
    /// Waiting on y/n before promoting every pending site.
    ConfirmPromote,
}

/// The site a delete confirmation refers to, pinned when the prompt opens
/// so a background refresh cannot swap the target mid-confirmation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeleteTarget {
    pub category: Category,
    pub url: String,
    /// Prompt text: the title for notification sites, the URL for pending
    /// ones.
    pub label: String,
}

pub struct App {
    /// Written by the sync coordinator; only read here.
    notification: SharedCollection<NotificationSite>,
    pending: SharedCollection<PendingSite>,
    /// Pane receiving navigation keys.
    pub focus: Pane,
    /// Per-pane list selection.
    pub notification_state: ListState,
    pub pending_state: ListState,
    /// Current input mode.
    pub mode: Mode,
    /// URL being composed; cleared only by a successful add.
    pub draft: String,
    /// Target of the open delete confirmation, if any.
    pub pending_delete: Option<DeleteTarget>,
    /// Last sync outcome or key feedback.
    pub status: String,
    /// Whether the coordinator has an operation in flight.
    pub busy: bool,
    /// Whether the user has requested to quit.
    pub quit: bool,
}

impl App {
    pub fn new(
        notification: SharedCollection<NotificationSite>,
        pending: SharedCollection<PendingSite>,
    ) -> Self {
        Self {
            notification,
            pending,
            focus: Pane::Notification,
            notification_state: ListState::default(),
            pending_state: ListState::default(),
            mode: Mode::Normal,
            draft: String::new(),
            pending_delete: None,
            status: "Starting…".into(),
            busy: false,
            quit: false,
        }
    }

    // -- collection access -----------------------------------------------

    /// Notification sites in display order (recency sort applied if toggled).
    pub fn notification_items(&self) -> Vec<NotificationSite> {
        self.notification.lock().map(|c| c.view()).unwrap_or_default()
    }

    /// Pending sites in backend order.
    pub fn pending_items(&self) -> Vec<PendingSite> {
        self.pending.lock().map(|c| c.view()).unwrap_or_default()
    }

    /// (notification, pending) site counts for the status bar.
    pub fn counts(&self) -> (usize, usize) {
        let notification = self.notification.lock().map(|c| c.len()).unwrap_or(0);
        let pending = self.pending.lock().map(|c| c.len()).unwrap_or(0);
        (notification, pending)
    }

    pub fn sorted_by_recency(&self) -> bool {
        self.notification
            .lock()
            .map(|c| c.sorted_by_recency())
            .unwrap_or(false)
    }

    /// Flip the notification pane between backend order and latest-first.
    pub fn toggle_sort(&mut self) {
        if let Ok(sorted) = self.notification.lock().map(|mut c| c.toggle_sort_order()) {
            self.status = if sorted {
                "Sorting by latest update".into()
            } else {
                "Showing backend order".into()
            };
        }
    }

    // -- navigation --------------------------------------------------------

    pub fn switch_pane(&mut self) {
        self.focus = match self.focus {
            Pane::Notification => Pane::Pending,
            Pane::Pending => Pane::Notification,
        };
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            Pane::Notification => self.notification.lock().map(|c| c.len()).unwrap_or(0),
            Pane::Pending => self.pending.lock().map(|c| c.len()).unwrap_or(0),
        }
    }

    fn focused_state(&mut self) -> &mut ListState {
        match self.focus {
            Pane::Notification => &mut self.notification_state,
            Pane::Pending => &mut self.pending_state,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let state = self.focused_state();
        let i = match state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.focused_len() == 0 {
            return;
        }
        let state = self.focused_state();
        let i = match state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.focused_len() > 0 {
            self.focused_state().select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.focused_len();
        if len > 0 {
            self.focused_state().select(Some(len - 1));
        }
    }

    /// Pull both selections back inside their collections after a refresh
    /// shrinks one.
    pub fn clamp_selection(&mut self) {
        let len = self.notification.lock().map(|c| c.len()).unwrap_or(0);
        clamp(&mut self.notification_state, len);
        let len = self.pending.lock().map(|c| c.len()).unwrap_or(0);
        clamp(&mut self.pending_state, len);
    }

    /// The site the focused selection points at, resolved against the same
    /// display order the list renders.
    pub fn selected_site(&self) -> Option<DeleteTarget> {
        match self.focus {
            Pane::Notification => {
                let items = self.notification_items();
                let site = items.get(self.notification_state.selected()?)?;
                Some(DeleteTarget {
                    category: Category::Notification,
                    url: site.url().to_string(),
                    label: site.title.clone(),
                })
            }
            Pane::Pending => {
                let items = self.pending_items();
                let site = items.get(self.pending_state.selected()?)?;
                Some(DeleteTarget {
                    category: Category::Pending,
                    url: site.url().to_string(),
                    label: site.url().to_string(),
                })
            }
        }
    }

    // -- sync outcomes -----------------------------------------------------

    /// Fold a coordinator outcome into the display state.
    pub fn apply(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Loaded { category, count } => {
                self.status = format!("Loaded {count} {category} sites");
            }
            SyncEvent::RefreshFailed { category, detail } => {
                self.status = format!("Refresh failed ({category}): {detail}");
            }
            SyncEvent::Added { url } => {
                self.draft.clear();
                self.status = format!("Added {url}");
            }
            SyncEvent::AddFailed { detail, .. } => {
                // Draft stays put so the URL can be corrected and resubmitted.
                self.status = format!("Add failed: {detail}");
            }
            SyncEvent::Deleted { url, .. } => {
                self.status = format!("Deleted {url}");
            }
            SyncEvent::DeleteFailed { url, detail, .. } => {
                self.status = format!("Delete of {url} failed: {detail}");
            }
            SyncEvent::Promoted => {
                self.status = "Promoted all pending sites".into();
            }
            SyncEvent::PromoteFailed { detail } => {
                self.status = format!("Promote failed: {detail}");
            }
        }
        self.clamp_selection();
    }
}

fn clamp(state: &mut ListState, len: usize) {
    match state.selected() {
        Some(_) if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}
