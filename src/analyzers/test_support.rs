use chrono::{NaiveDate, NaiveDateTime};

use crate::record::ComplaintRecord;

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, 15, 0)
        .unwrap()
}

/// Builds a normalized record created on 2024-05-01 at `hour`.
pub fn record(
    complaint_type: &str,
    borough: &str,
    hour: u8,
    closed: bool,
    same_day: bool,
) -> ComplaintRecord {
    let created = at(1, hour as u32);
    let closed_date = match (closed, same_day) {
        (false, _) => None,
        (true, true) => Some(at(1, 23)),
        (true, false) => Some(at(3, 9)),
    };

    ComplaintRecord {
        unique_key: format!("{complaint_type}-{borough}-{hour}"),
        complaint_type: complaint_type.to_string(),
        borough: borough.to_string(),
        created_date: created,
        closed_date,
        latitude: 40.7,
        longitude: -73.9,
        hour,
        is_closed: closed,
        closed_same_day: closed && same_day,
    }
}

/// The three-record dataset used throughout the aggregation tests.
pub fn three_records() -> Vec<ComplaintRecord> {
    vec![
        record("Noise", "Bronx", 10, false, false),
        record("Noise", "Bronx", 10, true, true),
        record("Parking", "Queens", 14, false, false),
    ]
}
