//! CSV parser for NYC 311 service-request exports.

use std::borrow::Cow;
use std::io::Read;

use csv::{ReaderBuilder, Trim};
use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::DataError;
use crate::record::RawRecord;

/// Columns every input must carry, live or uploaded.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "unique_key",
    "complaint_type",
    "borough",
    "created_date",
    "closed_date",
    "latitude",
    "longitude",
];

/// Columns a previously exported dataset may already contain.
pub const DERIVED_COLUMNS: &[&str] = &["hour", "is_closed", "closed_same_day"];

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decodes CSV bytes (optionally gzip-compressed) into raw records.
///
/// # Errors
///
/// Returns [`DataError::MissingColumns`] naming every absent required
/// column before any row is read, or a CSV error for malformed rows.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<RawRecord>, DataError> {
    let bytes = decompress(bytes)?;

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(&*bytes);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }

    let derived: Vec<&str> = DERIVED_COLUMNS
        .iter()
        .copied()
        .filter(|col| headers.iter().any(|h| h == *col))
        .collect();
    debug!(columns = headers.len(), ?derived, "CSV header validated");

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: RawRecord = result?;
        records.push(record);
    }

    Ok(records)
}

fn decompress(bytes: &[u8]) -> Result<Cow<'_, [u8]>, DataError> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(bytes));
    }

    let mut out = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut out)?;
    debug!(compressed = bytes.len(), decompressed = out.len(), "Inflated gzip input");
    Ok(Cow::Owned(out))
}
