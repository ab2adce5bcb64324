//! The dashboard document as exchanged with the store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::layout::LayoutEntry;

/// How a panel renders its data. The semantics of each kind live with the
/// embedding application; the library only routes the spec to a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    TimeSeries,
    Value,
    Table,
    List,
}

/// A configured panel. Referenced from the layout by `id`, never embedded
/// in it; a layout entry without a matching spec renders as an empty
/// placeholder. The query is carried opaquely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub id: String,
    pub panel_type: PanelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_spans: Option<bool>,
    #[serde(default)]
    pub query: Value,
}

impl PanelSpec {
    pub fn new(id: impl Into<String>, panel_type: PanelKind) -> Self {
        Self {
            id: id.into(),
            panel_type,
            fill_spans: None,
            query: Value::Null,
        }
    }

    #[inline]
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = query;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub layout: Vec<LayoutEntry>,
    #[serde(default)]
    pub widgets: Vec<PanelSpec>,
    #[serde(default)]
    pub variables: Value,
}

/// A full dashboard document. The store only ever sees whole documents;
/// layout updates are submitted by replacing `data.layout` on a copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub uuid: Uuid,
    pub created_by: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub locked: bool,
    pub data: DashboardData,
}

impl Dashboard {
    pub fn new(title: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            created_by: created_by.into(),
            title: title.into(),
            locked: false,
            data: DashboardData::default(),
        }
    }

    /// Look up the panel a layout entry points at.
    pub fn panel(&self, id: &str) -> Option<&PanelSpec> {
        self.data.widgets.iter().find(|panel| panel.id == id)
    }

    /// A copy of this document with the layout replaced, as handed to the
    /// store on save.
    pub fn with_layout(&self, layout: Vec<LayoutEntry>) -> Self {
        let mut doc = self.clone();
        doc.data.layout = layout;
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_lookup_goes_by_id() {
        let mut doc = Dashboard::new("Traffic", "ada@example.com");
        doc.data.widgets.push(PanelSpec::new("w1", PanelKind::TimeSeries));
        assert!(doc.panel("w1").is_some());
        assert!(doc.panel("w2").is_none());
    }

    #[test]
    fn with_layout_leaves_the_original_untouched() {
        let mut doc = Dashboard::new("Traffic", "ada@example.com");
        doc.data.layout.push(LayoutEntry::new("w1", 0, 0, 4, 2));
        let submitted = doc.with_layout(vec![LayoutEntry::new("w1", 1, 0, 4, 2)]);
        assert_eq!(doc.data.layout[0].x, 0);
        assert_eq!(submitted.data.layout[0].x, 1);
        assert_eq!(submitted.uuid, doc.uuid);
    }

    #[test]
    fn documents_round_trip_through_json() {
        let mut doc = Dashboard::new("Traffic", "ada@example.com");
        doc.data.layout.push(LayoutEntry::new("w1", 0, 0, 4, 2));
        doc.data
            .widgets
            .push(PanelSpec::new("w1", PanelKind::Table).with_query(serde_json::json!({
                "metric": "latency_p99"
            })));
        let json = serde_json::to_string(&doc).expect("serialize");
        let back: Dashboard = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, doc);
        // Unset drag metadata stays off the wire entirely.
        assert!(!json.contains("moved"));
    }
}
