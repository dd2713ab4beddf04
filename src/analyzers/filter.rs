//! Equality filters applied before every view.

use serde::{Serialize, Serializer};

use crate::error::DataError;
use crate::record::{ComplaintRecord, parse_hour};

/// Sentinel meaning "do not filter on this field".
pub const ALL: &str = "All";

/// A single filter criterion: either no filtering or an exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => wanted == value,
        }
    }
}

impl Selector<String> {
    /// Parses a text selector; `All` (any case) or an empty string is the sentinel.
    pub fn text(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            Selector::All
        } else {
            Selector::Only(value.to_string())
        }
    }
}

impl Selector<u8> {
    /// Parses an hour selector: `All` or an integer from 0 to 23.
    pub fn hour(value: &str) -> Result<Self, DataError> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            return Ok(Selector::All);
        }
        parse_hour(value)
            .map(Selector::Only)
            .ok_or_else(|| DataError::InvalidSelector {
                selector: "hour",
                value: value.to_string(),
            })
    }
}

impl<T: Serialize> Serialize for Selector<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selector::All => serializer.serialize_str(ALL),
            Selector::Only(value) => value.serialize(serializer),
        }
    }
}

/// The three dashboard selectors. Criteria combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub complaint_type: Selector<String>,
    pub borough: Selector<String>,
    pub hour: Selector<u8>,
}

impl Filters {
    pub fn new(complaint_type: &str, borough: &str, hour: &str) -> Result<Self, DataError> {
        Ok(Self {
            complaint_type: Selector::text(complaint_type),
            borough: Selector::text(borough),
            hour: Selector::hour(hour)?,
        })
    }

    /// Sets one selector by field name (`type`, `borough` or `hour`).
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), DataError> {
        match field.trim() {
            "type" | "complaint_type" => self.complaint_type = Selector::text(value),
            "borough" => self.borough = Selector::text(value),
            "hour" => self.hour = Selector::hour(value)?,
            other => {
                return Err(DataError::InvalidSelector {
                    selector: "field",
                    value: other.to_string(),
                });
            }
        }
        Ok(())
    }

    /// True when no selector narrows the data.
    pub fn is_unfiltered(&self) -> bool {
        *self == Filters::default()
    }

    pub fn matches(&self, record: &ComplaintRecord) -> bool {
        self.complaint_type.matches(&record.complaint_type)
            && self.borough.matches(&record.borough)
            && self.hour.matches(&record.hour)
    }

    /// Returns the records matching every selector, in input order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a ComplaintRecord>
    where
        I: IntoIterator<Item = &'a ComplaintRecord>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::{record, three_records};

    fn sample() -> Vec<ComplaintRecord> {
        let mut records = three_records();
        records.push(record("Noise", "Queens", 14, true, false));
        records.push(record("Heat/Hot Water", "Bronx", 0, true, true));
        records
    }

    #[test]
    fn test_all_selectors_is_identity() {
        let records = sample();
        let filters = Filters::new("All", "All", "All").unwrap();

        let out = filters.apply(&records);

        assert!(filters.is_unfiltered());
        assert_eq!(out.len(), records.len());
        assert!(out.iter().zip(&records).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_single_selector() {
        let records = sample();
        let filters = Filters::new("Noise", "All", "All").unwrap();

        let out = filters.apply(&records);

        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.complaint_type == "Noise"));
    }

    #[test]
    fn test_selectors_combine_with_and() {
        let records = sample();
        let filters = Filters::new("Noise", "Queens", "14").unwrap();

        let out = filters.apply(&records);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].borough, "Queens");
        assert_eq!(out[0].hour, 14);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = sample();
        let filters = Filters::new("All", "Bronx", "All").unwrap();

        let once = filters.apply(&records);
        let twice = filters.apply(once.iter().copied());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_match_is_empty() {
        let records = sample();
        let filters = Filters::new("Graffiti", "All", "All").unwrap();

        assert!(filters.apply(&records).is_empty());
    }

    #[test]
    fn test_match_is_exact() {
        let records = sample();
        let filters = Filters::new("noise", "All", "All").unwrap();

        assert!(filters.apply(&records).is_empty());
    }

    #[test]
    fn test_hour_selector_parsing() {
        assert_eq!(Selector::hour("all").unwrap(), Selector::All);
        assert_eq!(Selector::hour("7").unwrap(), Selector::Only(7));
        assert!(Selector::hour("24").is_err());
        assert!(Selector::hour("noon").is_err());
    }

    #[test]
    fn test_set_by_field_name() {
        let mut filters = Filters::default();
        filters.set("type", "Noise").unwrap();
        filters.set("hour", "10").unwrap();
        filters.set("borough", "All").unwrap();

        assert_eq!(filters.complaint_type, Selector::Only("Noise".to_string()));
        assert_eq!(filters.hour, Selector::Only(10));
        assert_eq!(filters.borough, Selector::All);
        assert!(filters.set("agency", "NYPD").is_err());
    }

    #[test]
    fn test_serializes_sentinel_as_all() {
        let filters = Filters::new("Noise", "All", "3").unwrap();
        let json = serde_json::to_value(&filters).unwrap();

        assert_eq!(json["complaint_type"], "Noise");
        assert_eq!(json["borough"], "All");
        assert_eq!(json["hour"], 3);
    }
}
