//! Assembly of the data behind the four dashboard views.
//!
//! A [`DashboardView`] is what a presentation layer renders: selector
//! choices, pie and bar inputs, map points and the priority table. It is
//! rebuilt in full for every filter change.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::aggregate::{borough_summary, complaint_counts, priority_rows};
use crate::analyzers::filter::{ALL, Filters};
use crate::analyzers::types::{BoroughSummary, ComplaintCount, PriorityRow};
use crate::record::ComplaintRecord;
use crate::services::{DataOrigin, Dataset};

/// Shown instead of the map when no record matches the filters.
pub const NO_DATA_NOTICE: &str = "No data for selected filter.";

/// Choices offered by each selector, `All` first, then sorted values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectorOptions {
    pub complaint_types: Vec<String>,
    pub boroughs: Vec<String>,
    pub hours: Vec<String>,
}

impl SelectorOptions {
    /// Collects the distinct values present in the unfiltered dataset.
    pub fn from_records(records: &[ComplaintRecord]) -> Self {
        let types: BTreeSet<&str> = records.iter().map(|r| r.complaint_type.as_str()).collect();
        let boroughs: BTreeSet<&str> = records.iter().map(|r| r.borough.as_str()).collect();
        let hours: BTreeSet<u8> = records.iter().map(|r| r.hour).collect();

        Self {
            complaint_types: with_all(types.into_iter().map(str::to_string)),
            boroughs: with_all(boroughs.into_iter().map(str::to_string)),
            hours: with_all(hours.into_iter().map(|h| h.to_string())),
        }
    }
}

fn with_all(values: impl Iterator<Item = String>) -> Vec<String> {
    std::iter::once(ALL.to_string()).chain(values).collect()
}

/// One complaint plotted on the map, with its hover attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub closed_same_day: bool,
    pub complaint_type: String,
    pub borough: String,
    pub is_closed: bool,
}

impl From<&ComplaintRecord> for MapPoint {
    fn from(r: &ComplaintRecord) -> Self {
        Self {
            latitude: r.latitude,
            longitude: r.longitude,
            closed_same_day: r.closed_same_day,
            complaint_type: r.complaint_type.clone(),
            borough: r.borough.clone(),
            is_closed: r.is_closed,
        }
    }
}

/// Map input: points to draw, or a notice when there is nothing to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapView {
    Points { points: Vec<MapPoint> },
    Placeholder { notice: String },
}

impl MapView {
    pub fn point_count(&self) -> usize {
        match self {
            MapView::Points { points } => points.len(),
            MapView::Placeholder { .. } => 0,
        }
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub generated_at: DateTime<Utc>,
    pub source: DataOrigin,
    pub selectors: SelectorOptions,
    pub filters: Filters,
    pub record_count: usize,
    pub complaint_counts: Vec<ComplaintCount>,
    pub borough_summary: Vec<BoroughSummary>,
    pub map: MapView,
    pub priority_table: Vec<PriorityRow>,
}

/// Filters the dataset and computes every view from the filtered records.
pub fn build_view(dataset: &Dataset, filters: &Filters) -> DashboardView {
    let filtered = filters.apply(&dataset.records);

    let map = if filtered.is_empty() {
        MapView::Placeholder {
            notice: NO_DATA_NOTICE.to_string(),
        }
    } else {
        MapView::Points {
            points: filtered.iter().copied().map(MapPoint::from).collect(),
        }
    };

    DashboardView {
        generated_at: Utc::now(),
        source: dataset.origin.clone(),
        selectors: SelectorOptions::from_records(&dataset.records),
        filters: filters.clone(),
        record_count: filtered.len(),
        complaint_counts: complaint_counts(filtered.iter().copied()),
        borough_summary: borough_summary(filtered.iter().copied()),
        map,
        priority_table: priority_rows(filtered.iter().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::NormalizeReport;
    use crate::analyzers::test_support::{record, three_records};

    fn dataset(records: Vec<ComplaintRecord>) -> Dataset {
        Dataset {
            origin: DataOrigin::Upload {
                path: "test.csv".to_string(),
            },
            loaded_at: Utc::now(),
            records,
            report: NormalizeReport::default(),
        }
    }

    #[test]
    fn test_unfiltered_view() {
        let ds = dataset(three_records());
        let view = build_view(&ds, &Filters::default());

        assert_eq!(view.record_count, 3);
        assert_eq!(view.map.point_count(), 3);
        assert_eq!(view.borough_summary.len(), 2);
        assert_eq!(view.priority_table.len(), 2);
        assert_eq!(view.complaint_counts[0].complaint_type, "Noise");
    }

    #[test]
    fn test_selectors_come_from_full_dataset() {
        let ds = dataset(three_records());
        let filters = Filters::new("Parking", "All", "All").unwrap();
        let view = build_view(&ds, &filters);

        assert_eq!(view.record_count, 1);
        assert_eq!(view.selectors.complaint_types, vec!["All", "Noise", "Parking"]);
        assert_eq!(view.selectors.boroughs, vec!["All", "Bronx", "Queens"]);
        assert_eq!(view.selectors.hours, vec!["All", "10", "14"]);
    }

    #[test]
    fn test_hours_sort_numerically() {
        let ds = dataset(vec![
            record("Noise", "Bronx", 9, false, false),
            record("Noise", "Bronx", 10, false, false),
            record("Noise", "Bronx", 2, false, false),
        ]);
        let view = build_view(&ds, &Filters::default());

        assert_eq!(view.selectors.hours, vec!["All", "2", "9", "10"]);
    }

    #[test]
    fn test_empty_selection_gives_placeholder() {
        let ds = dataset(three_records());
        let filters = Filters::new("Noise", "Queens", "All").unwrap();
        let view = build_view(&ds, &filters);

        assert_eq!(view.record_count, 0);
        assert_eq!(
            view.map,
            MapView::Placeholder {
                notice: NO_DATA_NOTICE.to_string()
            }
        );
        assert!(view.complaint_counts.is_empty());
        assert!(view.borough_summary.is_empty());
        assert!(view.priority_table.is_empty());
    }

    #[test]
    fn test_map_points_carry_hover_attributes() {
        let ds = dataset(three_records());
        let filters = Filters::new("All", "Bronx", "All").unwrap();
        let view = build_view(&ds, &filters);

        let MapView::Points { points } = &view.map else {
            panic!("expected points");
        };
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.borough == "Bronx"));
        assert_eq!(points.iter().filter(|p| p.closed_same_day).count(), 1);
        assert_eq!(points.iter().filter(|p| p.is_closed).count(), 1);
    }

    #[test]
    fn test_view_serializes() {
        let ds = dataset(three_records());
        let view = build_view(&ds, &Filters::new("All", "All", "10").unwrap());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["record_count"], 2);
        assert_eq!(json["filters"]["hour"], 10);
        assert_eq!(json["filters"]["borough"], "All");
        assert_eq!(json["map"]["kind"], "points");
        assert_eq!(json["source"]["kind"], "upload");
        assert_eq!(json["priority_table"][0]["priority_score"], 3);
    }
}
