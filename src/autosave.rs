//! The layout reconciliation and autosave controller.
//!
//! The controller owns the local layout draft and decides when a grid edit
//! becomes a store write. Grid callbacks always replace the draft so the
//! surface stays responsive; whether a save fires is decided separately, on
//! the settle cycle, by comparing canonical forms against the provider's
//! confirmed layout and checking the lock/permission gates. Saves run on a
//! worker thread and are folded back in with a non-blocking poll, the same
//! way [`crate::remote::RemoteState`] handles feed fetches.

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::context::DashboardContext;
use crate::document::Dashboard;
use crate::layout::{self, LayoutEntry};
use crate::permissions::LayoutPermissions;

/// The single generic notice raised when a save fails. The draft is kept
/// as-is so no work is lost; nothing is retried automatically.
pub const SAVE_FAILED_NOTICE: &str = "Something went wrong while saving the dashboard layout.";

/// Accepts a full dashboard document and returns the stored copy, which may
/// differ from the submitted one (server-assigned defaults). Called from a
/// worker thread, so implementations may block.
pub trait DashboardStore: Send + Sync {
    fn save(&self, doc: Dashboard) -> Result<Dashboard, StoreError>;
}

#[derive(Clone, Debug, Error)]
pub enum StoreError {
    #[error("dashboard store rejected the update: {0}")]
    Rejected(String),
    #[error("dashboard store unreachable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget sink for user-visible failure notices.
pub trait Notifier {
    fn error(&self, message: &str);
}

/// Where the controller is in its save cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SavePhase {
    /// Draft matches the last known confirmed layout; nothing to do.
    Idle,
    /// The draft changed materially and has not been evaluated yet.
    Dirty,
    /// A store call is in flight.
    Saving,
    /// The last save failed; the draft stays local until the next edit.
    Error,
}

struct InFlightSave {
    dashboard: Uuid,
    /// Raw draft snapshot at dispatch, used to tell whether edits landed
    /// while the save was running.
    submitted: Vec<LayoutEntry>,
    handle: JoinHandle<Result<Dashboard, StoreError>>,
}

pub struct AutosaveController {
    draft: Vec<LayoutEntry>,
    phase: SavePhase,
    in_flight: Option<InFlightSave>,
    seeded_for: Option<Uuid>,
}

impl Default for AutosaveController {
    fn default() -> Self {
        Self::new()
    }
}

impl AutosaveController {
    pub fn new() -> Self {
        Self {
            draft: Vec::new(),
            phase: SavePhase::Idle,
            in_flight: None,
            seeded_for: None,
        }
    }

    /// The local layout draft, including placeholder slots.
    pub fn draft(&self) -> &[LayoutEntry] {
        &self.draft
    }

    pub fn phase(&self) -> SavePhase {
        self.phase
    }

    /// A store call is running, even one dispatched for a dashboard that is
    /// no longer selected.
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Reseed the draft when the selected dashboard identity changed. Call
    /// once per frame before anything else; an in-flight save keeps running
    /// and is discarded on resolution if it belongs to the old selection.
    pub fn sync_selection(&mut self, ctx: &DashboardContext) {
        let current = ctx.selected_uuid();
        if self.seeded_for != current {
            self.draft = ctx.layouts().to_vec();
            self.phase = SavePhase::Idle;
            self.seeded_for = current;
        }
    }

    /// Accept a raw layout from the grid surface. The draft is always
    /// replaced so the surface never fights the controller; materiality
    /// against the previous draft only decides whether a settle evaluation
    /// is due.
    pub fn on_layout_change(&mut self, next: Vec<LayoutEntry>) {
        let material = !layout::layouts_equal(&self.draft, &next);
        self.draft = next;
        if material && self.phase != SavePhase::Saving {
            self.phase = SavePhase::Dirty;
        }
    }

    /// The settle cycle: evaluate a dirty draft and dispatch at most one
    /// store call. Every failed gate is a silent no-op back to `Idle`; the
    /// draft itself is left alone either way.
    pub fn settle(
        &mut self,
        ctx: &DashboardContext,
        store: &Arc<dyn DashboardStore>,
        permissions: LayoutPermissions,
    ) {
        if self.phase != SavePhase::Dirty {
            return;
        }
        let Some(doc) = ctx.selected() else {
            self.phase = SavePhase::Idle;
            return;
        };
        let should_save = !self.draft.is_empty()
            && !layout::layouts_equal(&self.draft, ctx.layouts())
            && !ctx.locked()
            && permissions.can_edit_layout
            && self.in_flight.is_none();
        if !should_save {
            log::debug!("layout settle: gated, not saving");
            self.phase = SavePhase::Idle;
            return;
        }

        let submitted = self.draft.clone();
        let doc = doc.with_layout(layout::filter_placeholders(&submitted));
        let dashboard = doc.uuid;
        let store = Arc::clone(store);
        self.in_flight = Some(InFlightSave {
            dashboard,
            submitted,
            handle: std::thread::spawn(move || store.save(doc)),
        });
        self.phase = SavePhase::Saving;
    }

    /// Fold a finished store call back in. Returns true when the state
    /// advanced, which is the caller's cue to request a repaint.
    ///
    /// Success adopts the server-confirmed layout into both the provider
    /// context and the draft; this is the only place the controller writes
    /// to the context. A response for a dashboard that is no longer
    /// selected is discarded outright.
    pub fn poll(&mut self, ctx: &mut DashboardContext, notifier: &dyn Notifier) -> bool {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|flight| flight.handle.is_finished());
        if !finished {
            return false;
        }
        let flight = self
            .in_flight
            .take()
            .expect("in-flight save checked above");
        let result = flight.handle.join().expect("save worker panicked");

        if ctx.selected_uuid() != Some(flight.dashboard) {
            log::debug!(
                "discarding save response for deselected dashboard {}",
                flight.dashboard
            );
            return true;
        }

        match result {
            Ok(updated) => {
                let confirmed = updated.data.layout.clone();
                ctx.set_layouts(confirmed.clone());
                ctx.set_selected(updated);
                if layout::layouts_equal(&self.draft, &flight.submitted) {
                    self.draft = confirmed;
                    self.phase = SavePhase::Idle;
                } else {
                    // Edits landed mid-flight; the next settle re-evaluates
                    // them against the layout we just confirmed.
                    self.phase = SavePhase::Dirty;
                }
            }
            Err(err) => {
                log::warn!("dashboard layout save failed: {err}");
                notifier.error(SAVE_FAILED_NOTICE);
                self.phase = SavePhase::Error;
            }
        }
        true
    }
}

/// Store keeping saved documents in memory. Default store of the demo and
/// handy in tests.
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<Dashboard>>,
}

impl MemoryStore {
    pub fn last(&self) -> Option<Dashboard> {
        self.saved.lock().last().cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().len()
    }
}

impl DashboardStore for MemoryStore {
    fn save(&self, doc: Dashboard) -> Result<Dashboard, StoreError> {
        self.saved.lock().push(doc.clone());
        Ok(doc)
    }
}

/// Collects failure notices for the view to display.
#[derive(Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<String>>,
}

impl NoticeLog {
    /// Drain everything collected since the last call.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.notices.lock())
    }

    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl Notifier for NoticeLog {
    fn error(&self, message: &str) {
        self.notices.lock().push(message.to_owned());
    }
}
