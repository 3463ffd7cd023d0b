//! Stats module - correlation and distribution summaries

mod calculator;

pub use calculator::{BoxSummary, CorrelationMatrix, StatsCalculator};
