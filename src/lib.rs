//! GRIDBOARD is a minimalist dashboard-grid library for Rust.
//!
//! It gives you a draggable, resizable panel grid with an autosaving layout
//! and a small trace explorer, without prescribing how your panels render
//! their data. The interesting part is invisible: the layout controller in
//! [`autosave`] reconciles the local grid draft with an asynchronous store,
//! skipping redundant writes and respecting lock and role gates, so the UI
//! stays responsive even when persistence is slow or failing.

pub mod autosave;
pub mod context;
pub mod document;
pub mod layout;
pub mod permissions;
pub mod prelude;
pub mod remote;
pub mod traces;
pub mod widgets;

use std::sync::Arc;

use eframe::egui;

use crate::autosave::{AutosaveController, DashboardStore, MemoryStore, NoticeLog};
use crate::context::ContextHandle;
use crate::document::Dashboard;
use crate::permissions::{effective_role, resolve_layout_permissions, Role, ViewerSession};
use crate::remote::RemoteState;
use crate::traces::{project_rows, TraceFeed, TraceResponse, TraceRow};
use crate::widgets::{GridBoard, TraceTable};

pub use gridboard_macros::dashboard;

/// Entry point used by the [`dashboard`] attribute: builds the app, hands
/// it to the setup function, then runs it.
pub struct DashboardConfig {
    name: String,
}

impl DashboardConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }

    pub fn run(self, setup: impl FnOnce(&mut DashboardApp)) -> eframe::Result {
        let mut app = DashboardApp::new();
        setup(&mut app);
        app.run(&self.name)
    }
}

/// The dashboard shell: toolbar, grid, notices and the trace explorer,
/// wired to the autosave controller.
pub struct DashboardApp {
    ctx: ContextHandle,
    controller: AutosaveController,
    store: Arc<dyn DashboardStore>,
    notices: NoticeLog,
    visible_notices: Vec<String>,
    viewer: ViewerSession,
    traces: Option<TraceExplorer>,
    show_traces: bool,
}

impl Default for DashboardApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardApp {
    pub fn new() -> Self {
        Self {
            ctx: ContextHandle::default(),
            controller: AutosaveController::new(),
            store: Arc::new(MemoryStore::default()),
            notices: NoticeLog::default(),
            visible_notices: Vec::new(),
            viewer: ViewerSession::new("", Role::Viewer),
            traces: None,
            show_traces: false,
        }
    }

    /// Replace the default in-memory store.
    pub fn set_store(&mut self, store: Arc<dyn DashboardStore>) {
        self.store = store;
    }

    pub fn set_viewer(&mut self, viewer: ViewerSession) {
        self.viewer = viewer;
    }

    /// Select the dashboard to show and seed the confirmed layout from it.
    pub fn open(&mut self, doc: Dashboard) {
        self.ctx.write().select(doc);
    }

    /// Enable the trace explorer, fed from the given source.
    pub fn attach_traces(&mut self, feed: Arc<dyn TraceFeed>) {
        self.traces = Some(TraceExplorer::new(feed));
    }

    /// Handle to the shared provider context, e.g. for switching dashboards
    /// from outside the shell.
    pub fn context(&self) -> ContextHandle {
        self.ctx.clone()
    }

    pub fn run(self, name: &str) -> eframe::Result {
        let mut native_options = eframe::NativeOptions::default();
        native_options.persist_window = true;

        eframe::run_native(
            name,
            native_options,
            Box::new(|cc| {
                let ctx = cc.egui_ctx.clone();
                ctrlc::set_handler(move || ctx.send_viewport_cmd(egui::ViewportCommand::Close))
                    .expect("failed to set exit signal handler");
                Ok(Box::new(self))
            }),
        )
    }

    fn add_panel_slot(&mut self) {
        let mut next = self.controller.draft().to_vec();
        let bottom = next.iter().map(|entry| entry.y + entry.h).max().unwrap_or(0);
        next.push(crate::layout::LayoutEntry::placeholder(0, bottom, 6, 3));
        self.controller.on_layout_change(next);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, egui_ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut ctx = self.ctx.write();

        self.controller.sync_selection(&ctx);
        if self.controller.poll(&mut ctx, &self.notices) {
            egui_ctx.request_repaint();
        }
        self.visible_notices.extend(self.notices.take());

        let role = ctx
            .selected()
            .map(|doc| effective_role(self.viewer.role, &self.viewer.email, &doc.created_by))
            .unwrap_or(self.viewer.role);
        let permissions = resolve_layout_permissions(ctx.locked(), role);
        let editable = !ctx.locked() && permissions.can_add_panel;
        let saving = self.controller.is_saving();

        egui::CentralPanel::default().show(egui_ctx, |ui| {
            ui.horizontal(|ui| {
                let title = ctx
                    .selected()
                    .map(|doc| doc.title.clone())
                    .unwrap_or_else(|| "no dashboard".to_owned());
                ui.heading(title);
                if ctx.locked() {
                    ui.label(egui::RichText::new("locked").weak());
                }
                if saving {
                    ui.add(egui::widgets::Spinner::new());
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.traces.is_some() {
                        ui.toggle_value(&mut self.show_traces, "Traces");
                    }
                    if !ctx.locked() && permissions.can_add_panel {
                        let add =
                            ui.add_enabled(!saving, egui::Button::new("＋ Add panel"));
                        if add.clicked() {
                            self.add_panel_slot();
                        }
                    }
                });
            });

            self.visible_notices.retain(|notice| {
                let mut keep = true;
                ui.horizontal(|ui| {
                    ui.colored_label(ui.visuals().error_fg_color, notice);
                    if ui.small_button("dismiss").clicked() {
                        keep = false;
                    }
                });
                keep
            });

            ui.separator();

            if self.show_traces {
                if let Some(traces) = self.traces.as_mut() {
                    traces.show(ui);
                    return;
                }
            }

            let panels = ctx
                .selected()
                .map(|doc| doc.data.widgets.clone())
                .unwrap_or_default();
            egui::ScrollArea::vertical()
                .auto_shrink(false)
                .show(ui, |ui| {
                    let mut working = self.controller.draft().to_vec();
                    let board = GridBoard::new(&mut working, &panels)
                        .editable(editable)
                        .show(ui);
                    if board.changed {
                        self.controller.on_layout_change(working);
                    }
                });
        });

        self.controller.settle(&ctx, &self.store, permissions);
        let trace_busy = self
            .traces
            .as_ref()
            .is_some_and(TraceExplorer::is_busy);
        if self.controller.is_saving() || trace_busy {
            egui_ctx.request_repaint();
        }
    }
}

/// Fetches the trace feed in the background and renders the span table.
pub struct TraceExplorer {
    feed: Arc<dyn TraceFeed>,
    state: RemoteState<TraceResponse>,
    rows: Vec<TraceRow>,
    projected_generation: Option<usize>,
}

impl TraceExplorer {
    pub fn new(feed: Arc<dyn TraceFeed>) -> Self {
        Self {
            feed,
            state: RemoteState::Idle,
            rows: Vec::new(),
            projected_generation: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    fn fetch_action(feed: &Arc<dyn TraceFeed>) -> impl FnOnce() -> TraceResponse + Send + 'static {
        let feed = Arc::clone(feed);
        move || match feed.fetch() {
            Ok(response) => response,
            Err(err) => {
                log::warn!("trace feed fetch failed: {err}");
                TraceResponse::default()
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        self.state.ensure(Self::fetch_action(&self.feed));
        if self.state.poll() {
            ui.ctx().request_repaint();
        }

        ui.horizontal(|ui| {
            ui.strong("Traces");
            if self.state.is_busy() {
                ui.add(egui::widgets::Spinner::new());
            } else if ui.small_button("refresh").clicked() {
                self.state.refresh(Self::fetch_action(&self.feed));
            }
        });

        // Re-project only when a fetch actually delivered a new response.
        if self.state.generation() != self.projected_generation {
            if let Some(response) = self.state.ready() {
                self.rows = project_rows(response).collect();
            }
            self.projected_generation = self.state.generation();
        }

        TraceTable::new(&self.rows).show(ui);
    }
}
