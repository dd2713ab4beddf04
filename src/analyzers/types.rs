//! Summary rows produced by the aggregation pipeline.

use serde::Serialize;

/// Number of records per complaint type (pie chart input).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintCount {
    pub complaint_type: String,
    pub count: usize,
}

/// Backlog and same-day closure rate for one borough (bar chart input).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoroughSummary {
    pub borough: String,
    pub total: usize,
    pub backlog: usize,
    pub pct_closed_same_day: f64,
}

/// Demand and backlog for one (complaint type, borough, hour) combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityRow {
    pub complaint_type: String,
    pub borough: String,
    pub hour: u8,
    pub demand: usize,
    pub backlog: usize,
    pub pct_closed_same_day: f64,
    pub priority_score: usize,
}
