use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::DataError;
use crate::record::{
    ComplaintRecord, RawRecord, UNSPECIFIED, hour_of, parse_flag, parse_hour, parse_timestamp,
};

/// What to do with derived columns that are already present in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DerivedPolicy {
    /// Keep non-empty `hour`, `is_closed` and `closed_same_day` cells as-is,
    /// computing only the ones that are missing.
    #[default]
    Preserve,
    /// Ignore any derived cells and compute everything from the timestamps.
    Recompute,
}

/// Row counts from one normalization pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub kept: usize,
    pub dropped_missing_coordinates: usize,
    pub preserved_derived: usize,
    pub clamped_same_day: usize,
}

/// Normalized records plus the report describing how they were produced.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<ComplaintRecord>,
    pub report: NormalizeReport,
}

/// Derives `hour`, `is_closed` and `closed_same_day` for every raw record and
/// drops records without both coordinates.
///
/// A missing `closed_date` means the request is still open. A preserved
/// `closed_same_day` of true on an open request is forced to false.
///
/// # Errors
///
/// Fails on the first record with an empty or unparseable `created_date`,
/// an unparseable `closed_date`, or (under [`DerivedPolicy::Preserve`]) a
/// derived cell outside its domain.
pub fn normalize(raw: Vec<RawRecord>, policy: DerivedPolicy) -> Result<Normalized, DataError> {
    let mut report = NormalizeReport {
        input_rows: raw.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(raw.len());

    for row in raw {
        let created_text = row
            .created_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DataError::EmptyField {
                unique_key: row.unique_key.clone(),
                column: "created_date",
            })?;
        let created = parse_timestamp(created_text).ok_or_else(|| DataError::InvalidTimestamp {
            unique_key: row.unique_key.clone(),
            column: "created_date",
            value: created_text.to_string(),
        })?;

        let closed = match row.closed_date.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(text) => Some(parse_timestamp(text).ok_or_else(|| {
                DataError::InvalidTimestamp {
                    unique_key: row.unique_key.clone(),
                    column: "closed_date",
                    value: text.to_string(),
                }
            })?),
        };

        let mut hour = hour_of(&created);
        let mut is_closed = closed.is_some();
        let mut closed_same_day = closed.is_some_and(|c| c.date() == created.date());
        let mut same_day_from_input = false;
        let mut preserved = false;

        if policy == DerivedPolicy::Preserve {
            if let Some(text) = row.hour.as_deref() {
                hour = parse_hour(text).ok_or_else(|| invalid(&row, "hour", text))?;
                preserved = true;
            }
            if let Some(text) = row.is_closed.as_deref() {
                is_closed = parse_flag(text).ok_or_else(|| invalid(&row, "is_closed", text))?;
                preserved = true;
            }
            if let Some(text) = row.closed_same_day.as_deref() {
                closed_same_day =
                    parse_flag(text).ok_or_else(|| invalid(&row, "closed_same_day", text))?;
                same_day_from_input = true;
                preserved = true;
            }
        }

        let (Some(latitude), Some(longitude)) = (
            row.latitude.filter(|v| v.is_finite()),
            row.longitude.filter(|v| v.is_finite()),
        ) else {
            report.dropped_missing_coordinates += 1;
            continue;
        };

        if preserved {
            report.preserved_derived += 1;
        }
        // Counted only when the flag came from the input.
        if closed_same_day && !is_closed {
            closed_same_day = false;
            if same_day_from_input {
                report.clamped_same_day += 1;
            }
        }

        records.push(ComplaintRecord {
            unique_key: row.unique_key,
            complaint_type: text_or_unspecified(row.complaint_type),
            borough: text_or_unspecified(row.borough),
            created_date: created,
            closed_date: closed,
            latitude,
            longitude,
            hour,
            is_closed,
            closed_same_day,
        });
    }

    report.kept = records.len();

    if report.clamped_same_day > 0 {
        warn!(
            clamped = report.clamped_same_day,
            "closed_same_day was set on open requests; forced to false"
        );
    }
    if report.dropped_missing_coordinates > 0 {
        debug!(
            dropped = report.dropped_missing_coordinates,
            "Dropped records without coordinates"
        );
    }
    info!(
        input_rows = report.input_rows,
        kept = report.kept,
        preserved_derived = report.preserved_derived,
        ?policy,
        "Normalized complaint records"
    );

    Ok(Normalized { records, report })
}

fn invalid(row: &RawRecord, column: &'static str, value: &str) -> DataError {
    DataError::InvalidDerived {
        unique_key: row.unique_key.clone(),
        column,
        value: value.to_string(),
    }
}

fn text_or_unspecified(value: Option<String>) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNSPECIFIED.to_string())
}
