pub mod grid;
pub mod trace_table;

pub use grid::{GridBoard, GridBoardResponse};
pub use trace_table::{TraceTable, NO_SPANS_NOTICE};
