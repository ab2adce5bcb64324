//! Projection of the raw trace feed into table rows.
//!
//! The feed delivers spans as positional tuples inside the first element of
//! the response array. The slot assignment is the de facto wire format and
//! must not change: 0 = start time (epoch ms), 1 = span id, 2 = trace id,
//! 4 = operation name, 6 = duration (nanoseconds, as a decimal string).

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// One batch of spans. Only the first batch of a response is consulted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TraceBatch {
    #[serde(default)]
    pub events: Vec<Vec<Value>>,
}

pub type TraceResponse = Vec<TraceBatch>;

/// Where trace batches come from. Fetches run on a worker thread, so
/// implementations are free to block.
pub trait TraceFeed: Send + Sync {
    fn fetch(&self) -> Result<TraceResponse, FeedError>;
}

#[derive(Clone, Debug, Error)]
pub enum FeedError {
    #[error("trace feed unreachable: {0}")]
    Unavailable(String),
    #[error("trace feed returned a malformed response: {0}")]
    Malformed(String),
}

/// A validated span row. Field types are guaranteed here so the table's
/// sort comparators can be plain numeric comparisons.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRow {
    pub key: String,
    pub start_time_ms: f64,
    pub operation_name: String,
    pub duration_ns: i64,
    pub span_id: String,
    pub trace_id: String,
}

/// Lazily project the feed response into rows, in feed order.
///
/// A tuple only yields a row when every required slot carries the expected
/// primitive; anything else is skipped without error. This is a data
/// quality condition, not a system one, so it is not logged either. An
/// absent first batch yields the empty sequence.
pub fn project_rows(response: &[TraceBatch]) -> impl Iterator<Item = TraceRow> + '_ {
    response.first().into_iter().flat_map(|batch| {
        batch
            .events
            .iter()
            .enumerate()
            .filter_map(|(index, tuple)| row_from_tuple(index, tuple))
    })
}

fn row_from_tuple(index: usize, tuple: &[Value]) -> Option<TraceRow> {
    let start_time_ms = tuple.first()?.as_f64()?;
    let span_id = tuple.get(1)?.as_str()?;
    let trace_id = tuple.get(2)?.as_str()?;
    let operation_name = tuple.get(4)?.as_str()?;
    let duration_ns = tuple.get(6)?.as_str()?.trim().parse::<i64>().ok()?;
    Some(TraceRow {
        key: index.to_string(),
        start_time_ms,
        operation_name: operation_name.to_owned(),
        duration_ns,
        span_id: span_id.to_owned(),
        trace_id: trace_id.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch(events: Value) -> TraceResponse {
        serde_json::from_value(json!([{ "events": events }])).expect("valid batch")
    }

    #[test]
    fn well_formed_tuple_yields_one_row() {
        let response = batch(json!([
            [1690000000000_i64, "s1", "t1", "", "op1", "", "5000000"]
        ]));
        let rows: Vec<_> = project_rows(&response).collect();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.start_time_ms, 1690000000000.0);
        assert_eq!(row.duration_ns, 5000000);
        assert_eq!(row.operation_name, "op1");
        assert_eq!(row.span_id, "s1");
        assert_eq!(row.trace_id, "t1");
        assert_eq!(row.key, "0");
    }

    #[test]
    fn malformed_tuples_are_dropped_without_affecting_the_rest() {
        let response = batch(json!([
            ["not-a-number", "s0", "t0", "", "op0", "", "1"],
            [1690000000000_i64, "s1", "t1", "", "op1", "", "5000000"],
            [1690000000001_i64, 42, "t2", "", "op2", "", "6000000"],
            [1690000000002_i64, "s3", "t3", "", "op3", "", "not-nanos"],
            [1690000000003_i64, "s4", "t4", "", "op4", "", "7000000"]
        ]));
        let rows: Vec<_> = project_rows(&response).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].span_id, "s1");
        assert_eq!(rows[1].span_id, "s4");
        // Keys preserve the feed position of the surviving tuples.
        assert_eq!(rows[1].key, "4");
    }

    #[test]
    fn short_tuples_are_dropped() {
        let response = batch(json!([[1690000000000_i64, "s1", "t1"]]));
        assert_eq!(project_rows(&response).count(), 0);
    }

    #[test]
    fn empty_and_absent_batches_yield_nothing() {
        assert_eq!(project_rows(&[]).count(), 0);
        let response = batch(json!([]));
        assert_eq!(project_rows(&response).count(), 0);
    }

    #[test]
    fn only_the_first_batch_is_consulted() {
        let response: TraceResponse = serde_json::from_value(json!([
            { "events": [] },
            { "events": [[1690000000000_i64, "s1", "t1", "", "op1", "", "5000000"]] }
        ]))
        .expect("valid response");
        assert_eq!(project_rows(&response).count(), 0);
    }

    #[test]
    fn projection_is_restartable() {
        let response = batch(json!([
            [1690000000000_i64, "s1", "t1", "", "op1", "", "5000000"]
        ]));
        assert_eq!(project_rows(&response).count(), 1);
        assert_eq!(project_rows(&response).count(), 1);
    }
}
