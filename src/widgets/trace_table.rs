//! Sortable span table over projected trace rows.

use chrono::DateTime;
use egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::traces::TraceRow;

/// Copy shown when the projected sequence is empty.
pub const NO_SPANS_NOTICE: &str = "No spans found for given filter!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SortKey {
    StartTime,
    Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SortState {
    key: SortKey,
    ascending: bool,
}

impl SortState {
    /// Clicking a column sorts it descending first, then toggles.
    fn toggled(current: Option<SortState>, key: SortKey) -> SortState {
        match current {
            Some(state) if state.key == key => SortState {
                key,
                ascending: !state.ascending,
            },
            _ => SortState {
                key,
                ascending: false,
            },
        }
    }
}

fn ordered_rows<'r>(rows: &'r [TraceRow], sort: Option<SortState>) -> Vec<&'r TraceRow> {
    let mut ordered: Vec<&TraceRow> = rows.iter().collect();
    if let Some(sort) = sort {
        match sort.key {
            SortKey::StartTime => {
                ordered.sort_by(|a, b| a.start_time_ms.total_cmp(&b.start_time_ms));
            }
            SortKey::Duration => ordered.sort_by(|a, b| a.duration_ns.cmp(&b.duration_ns)),
        }
        if !sort.ascending {
            ordered.reverse();
        }
    }
    ordered
}

fn format_start_time(start_time_ms: f64) -> String {
    DateTime::from_timestamp_millis(start_time_ms.round() as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| format!("{start_time_ms}"))
}

/// Only the trailing 16 characters of a zero-padded trace id carry entropy;
/// show those and keep the full id on hover.
fn short_trace_id(trace_id: &str) -> &str {
    let len = trace_id.len();
    if len > 16 && trace_id.is_char_boundary(len - 16) {
        &trace_id[len - 16..]
    } else {
        trace_id
    }
}

fn sort_label(text: &str, state: Option<SortState>, key: SortKey) -> String {
    match state {
        Some(state) if state.key == key && state.ascending => format!("{text} ▲"),
        Some(state) if state.key == key => format!("{text} ▼"),
        _ => text.to_owned(),
    }
}

/// Span table with sortable start-time and duration columns. Sort state is
/// remembered per table id between frames.
#[must_use = "You should call `show` on this table"]
pub struct TraceTable<'a> {
    rows: &'a [TraceRow],
    id_salt: egui::Id,
}

impl<'a> TraceTable<'a> {
    pub fn new(rows: &'a [TraceRow]) -> Self {
        Self {
            rows,
            id_salt: egui::Id::new("__trace_table"),
        }
    }

    /// Required when showing more than one trace table in the same `Ui`.
    #[inline]
    pub fn id_salt(mut self, id_salt: impl std::hash::Hash) -> Self {
        self.id_salt = egui::Id::new(id_salt);
        self
    }

    pub fn show(self, ui: &mut Ui) {
        if self.rows.is_empty() {
            ui.label(NO_SPANS_NOTICE);
            return;
        }

        let state_id = ui.id().with(self.id_salt);
        let mut sort: Option<SortState> = ui.data_mut(|d| d.get_temp(state_id));

        let table = TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto())
            .header(24.0, |mut header| {
                header.col(|ui| {
                    let label = sort_label("Start Time (UTC)", sort, SortKey::StartTime);
                    if ui.add(egui::Button::new(label).small()).clicked() {
                        sort = Some(SortState::toggled(sort, SortKey::StartTime));
                    }
                });
                header.col(|ui| {
                    let label = sort_label("Duration (ms)", sort, SortKey::Duration);
                    if ui.add(egui::Button::new(label).small()).clicked() {
                        sort = Some(SortState::toggled(sort, SortKey::Duration));
                    }
                });
                header.col(|ui| {
                    ui.strong("Operation");
                });
                header.col(|ui| {
                    ui.strong("TraceID");
                });
            });

        let ordered = ordered_rows(self.rows, sort);
        table.body(|body| {
            body.rows(20.0, ordered.len(), |mut row| {
                let span = ordered[row.index()];
                row.col(|ui| {
                    ui.label(format_start_time(span.start_time_ms));
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", span.duration_ns as f64 / 1_000_000.0));
                });
                row.col(|ui| {
                    ui.label(&span.operation_name);
                });
                row.col(|ui| {
                    ui.label(short_trace_id(&span.trace_id))
                        .on_hover_text(&span.trace_id);
                });
            });
        });

        if let Some(sort) = sort {
            ui.data_mut(|d| d.insert_temp(state_id, sort));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, start_time_ms: f64, duration_ns: i64) -> TraceRow {
        TraceRow {
            key: key.to_owned(),
            start_time_ms,
            operation_name: format!("op-{key}"),
            duration_ns,
            span_id: format!("s-{key}"),
            trace_id: format!("t-{key}"),
        }
    }

    #[test]
    fn unsorted_rows_keep_feed_order() {
        let rows = vec![row("a", 3.0, 1), row("b", 1.0, 2), row("c", 2.0, 3)];
        let ordered = ordered_rows(&rows, None);
        let keys: Vec<_> = ordered.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn start_time_sort_is_numeric() {
        let rows = vec![row("a", 3.0, 1), row("b", 1.0, 2), row("c", 2.0, 3)];
        let sort = SortState::toggled(None, SortKey::StartTime);
        assert!(!sort.ascending);
        let ordered = ordered_rows(&rows, Some(sort));
        let keys: Vec<_> = ordered.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["a", "c", "b"]);

        let sort = SortState::toggled(Some(sort), SortKey::StartTime);
        assert!(sort.ascending);
        let ordered = ordered_rows(&rows, Some(sort));
        let keys: Vec<_> = ordered.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["b", "c", "a"]);
    }

    #[test]
    fn duration_sort_switches_the_key() {
        let start = SortState::toggled(None, SortKey::StartTime);
        let sort = SortState::toggled(Some(start), SortKey::Duration);
        assert_eq!(sort.key, SortKey::Duration);
        assert!(!sort.ascending);

        let rows = vec![row("a", 0.0, 30), row("b", 0.0, 10), row("c", 0.0, 20)];
        let ordered = ordered_rows(&rows, Some(sort));
        let keys: Vec<_> = ordered.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["a", "c", "b"]);
    }

    #[test]
    fn trace_ids_shorten_to_the_last_16_chars() {
        assert_eq!(
            short_trace_id("00000000000000001234567890abcdef"),
            "1234567890abcdef"
        );
        assert_eq!(short_trace_id("abc"), "abc");
    }

    #[test]
    fn start_time_formats_as_utc() {
        assert_eq!(
            format_start_time(1690000000000.0),
            "2023-07-22 04:26:40.000 UTC"
        );
    }
}
