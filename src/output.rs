//! Output formatting and persistence for dashboard views and datasets.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::dashboard::DashboardView;
use crate::record::ComplaintRecord;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Logs a view using Rust's debug pretty-print format.
pub fn print_pretty(view: &DashboardView) {
    debug!("{:#?}", view);
}

/// Logs the headline numbers of a view.
pub fn log_summary(view: &DashboardView) {
    info!(
        source = %view.source,
        records = view.record_count,
        filtered = !view.filters.is_unfiltered(),
        map_points = view.map.point_count(),
        complaint_types = view.complaint_counts.len(),
        boroughs = view.borough_summary.len(),
        "Dashboard view built"
    );

    for row in &view.borough_summary {
        info!(
            borough = %row.borough,
            total = row.total,
            backlog = row.backlog,
            pct_closed_same_day = row.pct_closed_same_day,
            "Borough"
        );
    }

    for (rank, row) in view.priority_table.iter().enumerate() {
        info!(
            rank = rank + 1,
            complaint_type = %row.complaint_type,
            borough = %row.borough,
            hour = row.hour,
            demand = row.demand,
            backlog = row.backlog,
            priority_score = row.priority_score,
            "Priority"
        );
    }
}

/// Writes a view as JSON to `writer`.
pub fn write_json<W: Write>(mut writer: W, view: &DashboardView, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, view)?;
    } else {
        serde_json::to_writer(&mut writer, view)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes a view as JSON to `path`, replacing any existing file.
pub fn save_json(path: &str, view: &DashboardView, pretty: bool) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
    write_json(file, view, pretty)?;
    info!(path, "Dashboard view written");
    Ok(())
}

/// Writes normalized records, derived columns included, as a CSV that can be
/// uploaded again.
///
/// Creates parent directories as needed and replaces any existing file.
pub fn export_records(path: &str, records: &[ComplaintRecord]) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    debug!(path, rows = records.len(), "Exporting records");

    let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path, rows = records.len(), "Records exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::three_records;
    use crate::analyzers::{DerivedPolicy, Filters, NormalizeReport, normalize};
    use crate::dashboard::build_view;
    use crate::parser::parse_records;
    use crate::services::{DataOrigin, Dataset};
    use chrono::Utc;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn view() -> DashboardView {
        let dataset = Dataset {
            origin: DataOrigin::Upload {
                path: "test.csv".to_string(),
            },
            loaded_at: Utc::now(),
            records: three_records(),
            report: NormalizeReport::default(),
        };
        build_view(&dataset, &Filters::default())
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&view());
    }

    #[test]
    fn test_log_summary_does_not_panic() {
        log_summary(&view());
    }

    #[test]
    fn test_write_json_is_one_line_when_compact() {
        let mut buf = Vec::new();
        write_json(&mut buf, &view(), false).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["record_count"], 3);
    }

    #[test]
    fn test_save_json_creates_file() {
        let path = temp_path("nyc311_dashboard_test_view.json");
        let _ = fs::remove_file(&path);

        save_json(&path, &view(), true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"priority_table\""));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let path = temp_path("nyc311_dashboard_test_export.csv");
        let _ = fs::remove_file(&path);

        export_records(&path, &three_records()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("closed_same_day"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_exported_file_uploads_back_unchanged() {
        let path = temp_path("nyc311_dashboard_test_reupload.csv");
        let _ = fs::remove_file(&path);
        let records = three_records();

        export_records(&path, &records).unwrap();
        let bytes = fs::read(&path).unwrap();
        let reloaded = normalize(parse_records(&bytes).unwrap(), DerivedPolicy::Preserve).unwrap();

        assert_eq!(reloaded.records, records);
        assert_eq!(reloaded.report.preserved_derived, records.len());

        fs::remove_file(&path).unwrap();
    }
}
