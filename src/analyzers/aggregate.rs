use std::collections::{BTreeMap, HashMap};

use crate::analyzers::types::{BoroughSummary, ComplaintCount, PriorityRow};
use crate::analyzers::utility::{pct, round_tenth};
use crate::record::ComplaintRecord;

/// Maximum number of rows in the priority table.
pub const PRIORITY_LIMIT: usize = 10;

/// Running counts for one group of records.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    total: usize,
    backlog: usize,
    same_day: usize,
}

impl Tally {
    fn add(&mut self, record: &ComplaintRecord) {
        self.total += 1;
        if !record.is_closed {
            self.backlog += 1;
        }
        if record.closed_same_day {
            self.same_day += 1;
        }
    }

    fn pct_closed_same_day(&self) -> f64 {
        round_tenth(pct(self.same_day, self.total))
    }
}

/// Counts records per complaint type, most frequent first.
pub fn complaint_counts<'a, I>(records: I) -> Vec<ComplaintCount>
where
    I: IntoIterator<Item = &'a ComplaintRecord>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.complaint_type.as_str()).or_default() += 1;
    }

    let mut out: Vec<ComplaintCount> = counts
        .into_iter()
        .map(|(complaint_type, count)| ComplaintCount {
            complaint_type: complaint_type.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.complaint_type.cmp(&b.complaint_type))
    });
    out
}

/// Groups records by borough, ordered by borough name.
pub fn borough_summary<'a, I>(records: I) -> Vec<BoroughSummary>
where
    I: IntoIterator<Item = &'a ComplaintRecord>,
{
    let mut groups: BTreeMap<&str, Tally> = BTreeMap::new();
    for record in records {
        groups.entry(record.borough.as_str()).or_default().add(record);
    }

    groups
        .into_iter()
        .map(|(borough, tally)| BoroughSummary {
            borough: borough.to_string(),
            total: tally.total,
            backlog: tally.backlog,
            pct_closed_same_day: tally.pct_closed_same_day(),
        })
        .collect()
}

/// Ranks (complaint type, borough, hour) groups by `demand + backlog`, then
/// by backlog, and keeps the top [`PRIORITY_LIMIT`].
///
/// Groups are enumerated in key order and the sort is stable, so rows that
/// tie on both score and backlog always come out in the same order.
pub fn priority_rows<'a, I>(records: I) -> Vec<PriorityRow>
where
    I: IntoIterator<Item = &'a ComplaintRecord>,
{
    let mut groups: BTreeMap<(&str, &str, u8), Tally> = BTreeMap::new();
    for record in records {
        groups
            .entry((
                record.complaint_type.as_str(),
                record.borough.as_str(),
                record.hour,
            ))
            .or_default()
            .add(record);
    }

    let mut rows: Vec<PriorityRow> = groups
        .into_iter()
        .map(|((complaint_type, borough, hour), tally)| PriorityRow {
            complaint_type: complaint_type.to_string(),
            borough: borough.to_string(),
            hour,
            demand: tally.total,
            backlog: tally.backlog,
            pct_closed_same_day: tally.pct_closed_same_day(),
            priority_score: tally.total + tally.backlog,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.priority_score
            .cmp(&a.priority_score)
            .then_with(|| b.backlog.cmp(&a.backlog))
    });
    rows.truncate(PRIORITY_LIMIT);
    rows
}
