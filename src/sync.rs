//! Background synchronization against the backend.
//!
//! The coordinator runs on its own thread inside a single-threaded tokio
//! runtime, alternating between a scheduled refresh tick and user requests
//! from the input layer.  Because it is one task awaiting one operation at a
//! time, requests arriving mid-operation queue in the channel: a slow
//! refresh can never interleave with a mutation's refetch, and the response
//! captured by an earlier refresh can never overwrite a later mutation's
//! outcome.
//!
//! ## For contributors
//!
//! To add a backend operation: add a [`SyncRequest`] variant, a
//! [`SyncEvent`] for its outcome, and an arm in `handle_request`.  Keep the
//! rule that every mutation refetches the collections it may have changed
//! before reporting its outcome.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;

use crate::collection::SharedCollection;
use crate::gateway::SiteGateway;
use crate::site::{Category, NotificationSite, PendingSite};

/// How often the coordinator re-synchronizes both collections.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Requests from the input layer to the coordinator.
///
/// Processed strictly in order of arrival; a request submitted while an
/// operation is in flight waits its turn rather than failing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SyncRequest {
    /// Re-fetch both collections now.
    Refresh,
    /// Submit a URL for tracking.
    AddPending { url: String },
    /// Remove one site from one category.
    Delete { category: Category, url: String },
    /// Promote every pending site to the notification collection.
    PromoteAll,
}

/// Outcome messages sent back to the UI thread.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SyncEvent {
    /// A collection was replaced with `count` sites.
    Loaded { category: Category, count: usize },
    RefreshFailed { category: Category, detail: String },
    Added { url: String },
    AddFailed { url: String, detail: String },
    Deleted { category: Category, url: String },
    DeleteFailed { category: Category, url: String, detail: String },
    Promoted,
    PromoteFailed { detail: String },
}

/// What the coordinator is currently doing.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    Idle,
    Refreshing,
    Mutating,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Owns all backend traffic and is the sole writer of the shared
/// collections.
pub struct Coordinator<G> {
    gateway: G,
    notification: SharedCollection<NotificationSite>,
    pending: SharedCollection<PendingSite>,
    events: Sender<SyncEvent>,
    phase: Arc<Mutex<Phase>>,
}

impl<G: SiteGateway> Coordinator<G> {
    pub fn new(
        gateway: G,
        notification: SharedCollection<NotificationSite>,
        pending: SharedCollection<PendingSite>,
        events: Sender<SyncEvent>,
    ) -> Self {
        Self {
            gateway,
            notification,
            pending,
            events,
            phase: Arc::new(Mutex::new(Phase::Idle)),
        }
    }

    /// Snapshot of the current phase.
    pub fn phase(&self) -> Phase {
        self.phase.lock().map(|p| *p).unwrap_or(Phase::Idle)
    }

    fn share_phase(&self) -> Arc<Mutex<Phase>> {
        Arc::clone(&self.phase)
    }

    fn set_phase(&self, phase: Phase) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }

    /// Run until every request sender is dropped.
    ///
    /// The first tick fires immediately, so startup populates both
    /// collections without a separate bootstrap request.  A tick that comes
    /// due while an operation is still running is delayed, not stacked.
    pub async fn run(self, mut requests: UnboundedReceiver<SyncRequest>) {
        let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.set_phase(Phase::Refreshing);
                    self.refresh_all().await;
                    self.set_phase(Phase::Idle);
                }
                request = requests.recv() => {
                    let Some(request) = request else {
                        break;
                    };
                    self.handle_request(request).await;
                }
            }
        }
        log::info!("sync coordinator stopped");
    }

    async fn handle_request(&self, request: SyncRequest) {
        match request {
            SyncRequest::Refresh => {
                self.set_phase(Phase::Refreshing);
                self.refresh_all().await;
            }
            SyncRequest::AddPending { url } => {
                self.set_phase(Phase::Mutating);
                self.add_pending(url).await;
            }
            SyncRequest::Delete { category, url } => {
                self.set_phase(Phase::Mutating);
                self.delete(category, url).await;
            }
            SyncRequest::PromoteAll => {
                self.set_phase(Phase::Mutating);
                self.promote_all().await;
            }
        }
        self.set_phase(Phase::Idle);
    }

    /// Re-fetch both collections, notification first.  Each failure leaves
    /// that collection's previous contents in place and is reported once;
    /// there is no retry.
    async fn refresh_all(&self) {
        self.refresh_notification().await;
        self.refresh_pending().await;
    }

    async fn refresh_notification(&self) {
        match self.gateway.list_notification().await {
            Ok(sites) => {
                let count = sites.len();
                if let Ok(mut collection) = self.notification.lock() {
                    collection.replace(sites);
                }
                self.emit(SyncEvent::Loaded {
                    category: Category::Notification,
                    count,
                });
            }
            Err(e) => {
                log::warn!("notification refresh failed: {e}");
                self.emit(SyncEvent::RefreshFailed {
                    category: Category::Notification,
                    detail: e.to_string(),
                });
            }
        }
    }

    async fn refresh_pending(&self) {
        match self.gateway.list_pending().await {
            Ok(sites) => {
                let count = sites.len();
                if let Ok(mut collection) = self.pending.lock() {
                    collection.replace(sites);
                }
                self.emit(SyncEvent::Loaded {
                    category: Category::Pending,
                    count,
                });
            }
            Err(e) => {
                log::warn!("pending refresh failed: {e}");
                self.emit(SyncEvent::RefreshFailed {
                    category: Category::Pending,
                    detail: e.to_string(),
                });
            }
        }
    }

    async fn add_pending(&self, url: String) {
        match self.gateway.add_pending(&url).await {
            Ok(()) => {
                log::info!("added pending site {url}");
                self.refresh_pending().await;
                self.emit(SyncEvent::Added { url });
            }
            Err(e) => {
                log::warn!("add of {url} failed: {e}");
                self.emit(SyncEvent::AddFailed {
                    url,
                    detail: e.to_string(),
                });
            }
        }
    }

    async fn delete(&self, category: Category, url: String) {
        match self.gateway.remove(category, &url).await {
            Ok(()) => {
                log::info!("deleted {url} from {category}");
                match category {
                    Category::Notification => self.refresh_notification().await,
                    Category::Pending => self.refresh_pending().await,
                }
                self.emit(SyncEvent::Deleted { category, url });
            }
            Err(e) => {
                log::warn!("delete of {url} from {category} failed: {e}");
                self.emit(SyncEvent::DeleteFailed {
                    category,
                    url,
                    detail: e.to_string(),
                });
            }
        }
    }

    async fn promote_all(&self) {
        let outcome = self.gateway.promote_all().await;
        // The backend may have moved any number of sites even when the call
        // fails; re-synchronize both collections before reporting.
        self.refresh_all().await;
        match outcome {
            Ok(()) => {
                log::info!("promoted all pending sites");
                self.emit(SyncEvent::Promoted);
            }
            Err(e) => {
                log::warn!("promote failed: {e}");
                self.emit(SyncEvent::PromoteFailed {
                    detail: e.to_string(),
                });
            }
        }
    }

    fn emit(&self, event: SyncEvent) {
        // The UI thread may already be gone during shutdown.
        let _ = self.events.send(event);
    }
}

// ---------------------------------------------------------------------------
// Thread plumbing
// ---------------------------------------------------------------------------

/// Handle to the coordinator thread.
pub struct SyncHandle {
    requests: UnboundedSender<SyncRequest>,
    phase: Arc<Mutex<Phase>>,
    thread: thread::JoinHandle<()>,
}

impl SyncHandle {
    /// Channel for submitting requests from the input layer.
    pub fn requests(&self) -> UnboundedSender<SyncRequest> {
        self.requests.clone()
    }

    /// Snapshot of what the coordinator is doing, for the busy indicator.
    pub fn phase(&self) -> Phase {
        self.phase.lock().map(|p| *p).unwrap_or(Phase::Idle)
    }

    /// Stop the scheduler and wait for the coordinator to finish.
    ///
    /// Every other request sender must be dropped first or the join will
    /// wait on a loop that never ends.
    pub fn shutdown(self) {
        let SyncHandle {
            requests, thread, ..
        } = self;
        drop(requests);
        let _ = thread.join();
    }
}

/// Spawn the coordinator on its own runtime thread.
///
/// Returns the control handle plus the event channel the main loop drains
/// every tick.
pub fn spawn<G>(
    gateway: G,
    notification: SharedCollection<NotificationSite>,
    pending: SharedCollection<PendingSite>,
) -> Result<(SyncHandle, Receiver<SyncEvent>)>
where
    G: SiteGateway + 'static,
{
    let (request_tx, request_rx) = unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel();

    let coordinator = Coordinator::new(gateway, notification, pending, event_tx);
    let phase = coordinator.share_phase();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let thread = thread::Builder::new()
        .name("sync".into())
        .spawn(move || runtime.block_on(coordinator.run(request_rx)))?;

    Ok((
        SyncHandle {
            requests: request_tx,
            phase,
            thread,
        },
        event_rx,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
