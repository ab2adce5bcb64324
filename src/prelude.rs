// Preludes: re-export commonly used items for convenience
pub use crate::widgets;

pub use crate::autosave::{
    AutosaveController, DashboardStore, MemoryStore, Notifier, SavePhase, StoreError,
};
pub use crate::context::{ContextHandle, DashboardContext};
pub use crate::dashboard;
pub use crate::document::{Dashboard, DashboardData, PanelKind, PanelSpec};
pub use crate::layout::LayoutEntry;
pub use crate::permissions::{Role, ViewerSession};
pub use crate::remote::RemoteState;
pub use crate::traces::{FeedError, TraceBatch, TraceFeed, TraceResponse, TraceRow};
pub use crate::{DashboardApp, DashboardConfig, TraceExplorer};
