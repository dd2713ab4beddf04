use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Formats seen in open-data exports and in files re-saved by spreadsheet
/// and data-frame tools.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

/// Value used when a record carries no complaint type or borough.
pub const UNSPECIFIED: &str = "Unspecified";

/// A single row deserialized from a 311 CSV, before normalization.
///
/// Columns other than these are ignored. The three derived columns are only
/// present in files that were exported after a previous normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub unique_key: String,
    pub complaint_type: Option<String>,
    pub borough: Option<String>,
    pub created_date: Option<String>,
    pub closed_date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    #[serde(default)]
    pub hour: Option<String>,
    #[serde(default)]
    pub is_closed: Option<String>,
    #[serde(default)]
    pub closed_same_day: Option<String>,
}

/// A normalized service request with its derived fields.
///
/// Serializes to the same column names it is read from, so an exported
/// dataset can be uploaded again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub unique_key: String,
    pub complaint_type: String,
    pub borough: String,
    pub created_date: NaiveDateTime,
    pub closed_date: Option<NaiveDateTime>,
    pub latitude: f64,
    pub longitude: f64,

    // derived
    pub hour: u8,
    pub is_closed: bool,
    pub closed_same_day: bool,
}

/// Parses a timestamp in any of the accepted layouts.
///
/// Offset-qualified values keep their local wall-clock time; the hour and
/// calendar date seen by the reporter are what the dashboard groups on.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses a boolean flag as written by the usual CSV producers.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "1" | "1.0" => Some(true),
        "false" | "f" | "no" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

/// Parses an hour of day, accepting the `10.0` form float columns produce.
pub fn parse_hour(value: &str) -> Option<u8> {
    let value = value.trim();
    let hour = match value.parse::<u8>() {
        Ok(h) => h,
        Err(_) => {
            let f = value.parse::<f64>().ok()?;
            if f.fract() != 0.0 || !(0.0..=23.0).contains(&f) {
                return None;
            }
            f as u8
        }
    };
    (hour <= 23).then_some(hour)
}

pub(crate) fn hour_of(ts: &NaiveDateTime) -> u8 {
    use chrono::Timelike;
    u8::try_from(ts.hour()).unwrap_or_default()
}
