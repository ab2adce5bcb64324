//! Demo dashboard: an in-memory store, three panels and a synthetic trace
//! feed. The viewer is only assigned `Viewer`, but owns the dashboard, so
//! the author override still lets the layout autosave.

use std::sync::Arc;
use std::time::Duration;

use gridboard::dashboard;
use gridboard::prelude::*;
use serde_json::json;
use simple_logger::SimpleLogger;

struct DemoFeed;

impl TraceFeed for DemoFeed {
    fn fetch(&self) -> Result<TraceResponse, FeedError> {
        // Pretend to cross a network.
        std::thread::sleep(Duration::from_millis(400));
        let response = json!([
            {
                "events": [
                    [1690000000000_i64, "span-01", "00000000000000007fd0bd80a9f04a2b", "", "GET /api/dashboards", "", "5000000"],
                    [1690000000458_i64, "span-02", "0000000000000000c0b8c385ef91b4ba", "", "SELECT dashboards", "", "1200000"],
                    // A tuple the collector mangled; the table skips it.
                    ["oops", "span-03", "t3", "", "GET /api/traces", "", "900000"],
                    [1690000001890_i64, "span-04", "00000000000000002f1a9ce7d81c3c55", "", "PUT /api/dashboards", "", "48000000"]
                ]
            }
        ]);
        serde_json::from_value(response)
            .map_err(|err| FeedError::Malformed(err.to_string()))
    }
}

fn demo_dashboard() -> Dashboard {
    let mut doc = Dashboard::new("Service overview", "ada@example.com");
    doc.data.widgets = vec![
        PanelSpec::new("latency", PanelKind::TimeSeries)
            .with_query(json!({ "metric": "http_latency_p99" })),
        PanelSpec::new("error-rate", PanelKind::Value)
            .with_query(json!({ "metric": "http_error_rate" })),
        PanelSpec::new("top-endpoints", PanelKind::Table)
            .with_query(json!({ "metric": "http_requests", "group_by": "endpoint" })),
    ];
    doc.data.layout = vec![
        LayoutEntry::new("latency", 0, 0, 8, 3),
        LayoutEntry::new("error-rate", 8, 0, 4, 3),
        LayoutEntry::new("top-endpoints", 0, 3, 12, 3),
    ];
    doc
}

#[dashboard(name = "gridboard demo")]
fn main(app: &mut DashboardApp) {
    SimpleLogger::new().init().ok();

    app.set_viewer(ViewerSession::new("ada@example.com", Role::Viewer));
    app.open(demo_dashboard());
    app.attach_traces(Arc::new(DemoFeed));
}
