//! Observation ingest from CSV or JSON.
//!
//! This module turns an input file into a list of `{date, val}` records ready
//! for analysis.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip unreadable rows, but report what happened)
//! - **Dates stay textual**: date parsing belongs to the analysis, so a bad
//!   date fails the run instead of silently dropping a row
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use clap::ValueEnum;
use csv::StringRecord;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::domain::RawRecord;
use crate::error::AppError;

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Pick from the file extension (`.json` is JSON, anything else CSV).
    Auto,
    /// Header row with `date` and `val` (or `value`) columns.
    Csv,
    /// A JSON array of `{"date": "...", "val": ...}` objects.
    Json,
}

impl InputFormat {
    fn resolve(self, path: &Path) -> InputFormat {
        match self {
            InputFormat::Auto => {
                let is_json = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("json"));
                if is_json {
                    InputFormat::Json
                } else {
                    InputFormat::Csv
                }
            }
            other => other,
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: records in file order + row errors.
#[derive(Debug, Clone)]
pub struct IngestedRecords {
    pub records: Vec<RawRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load observation records from `path`.
pub fn load_records(path: &Path, format: InputFormat) -> Result<IngestedRecords, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;

    let ingested = match format.resolve(path) {
        InputFormat::Json => read_json_records(file)?,
        _ => read_csv_records(file)?,
    };

    debug!(
        "read {} row(s) from '{}', {} usable",
        ingested.rows_read,
        path.display(),
        ingested.records.len()
    );
    for err in &ingested.row_errors {
        warn!("line {}: {}", err.line, err.message);
    }

    if ingested.records.is_empty() {
        return Err(AppError::new(3, "No usable rows in input."));
    }
    Ok(ingested)
}

/// Read `date,val` CSV rows. An empty `val` cell is a missing observation.
pub fn read_csv_records<R: Read>(reader: R) -> Result<IngestedRecords, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    if !header_map.contains_key("date") {
        return Err(AppError::new(2, "Missing required column: `date`"));
    }
    let value_column = ["val", "value"]
        .into_iter()
        .find(|name| header_map.contains_key(*name))
        .ok_or_else(|| AppError::new(2, "Missing required column: `val` (or `value`)"))?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let row = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&row, &header_map, value_column) {
            Ok(record) => records.push(record),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    Ok(IngestedRecords {
        records,
        row_errors,
        rows_read,
    })
}

/// Read a JSON array of `{date, val}` objects.
pub fn read_json_records<R: Read>(reader: R) -> Result<IngestedRecords, AppError> {
    let records: Vec<RawRecord> = serde_json::from_reader(reader)
        .map_err(|e| AppError::new(2, format!("Invalid observation JSON: {e}")))?;

    let mut row_errors = Vec::new();
    let rows_read = records.len();
    let records = records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, r)| match r.val {
            Some(v) if !v.is_finite() => {
                row_errors.push(RowError {
                    line: idx + 1,
                    message: format!("Non-finite value for {}", r.date),
                });
                None
            }
            _ => Some(r),
        })
        .collect();

    Ok(IngestedRecords {
        records,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>, value_column: &str) -> Result<RawRecord, String> {
    let date = get_required(record, header_map, "date")?.to_string();
    let val = match get_optional(record, header_map, value_column) {
        None => None,
        Some(text) => match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            Ok(_) => return Err(format!("Non-finite `{value_column}` value: {text}")),
            Err(_) if is_missing_marker(text) => None,
            Err(_) => return Err(format!("Invalid `{value_column}` value: {text}")),
        },
    };
    Ok(RawRecord { date, val })
}

fn is_missing_marker(text: &str) -> bool {
    matches!(text.to_ascii_lowercase().as_str(), "na" | "n/a" | "null" | "none")
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_with_missing_values_and_bom_header() {
        let csv = "\u{feff}Date,Val\n2010-12-31,1.5\n2011-12-31,\n2012-12-31,NA\n2013-12-31,abc\n,4\n";
        let out = read_csv_records(csv.as_bytes()).unwrap();

        assert_eq!(out.rows_read, 5);
        assert_eq!(
            out.records,
            vec![
                RawRecord::new("2010-12-31", 1.5),
                RawRecord {
                    date: "2011-12-31".to_string(),
                    val: None
                },
                RawRecord {
                    date: "2012-12-31".to_string(),
                    val: None
                },
            ]
        );
        let lines: Vec<usize> = out.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![5, 6]);
    }

    #[test]
    fn csv_accepts_value_column_alias() {
        let out = read_csv_records("date,value\n2010-01-01,2\n".as_bytes()).unwrap();
        assert_eq!(out.records, vec![RawRecord::new("2010-01-01", 2.0)]);
    }

    #[test]
    fn csv_requires_date_and_value_columns() {
        let err = read_csv_records("day,val\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`date`"));

        let err = read_csv_records("date,x\n2010-01-01,2\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("`val`"));
    }

    #[test]
    fn json_records_keep_nulls_as_missing() {
        let json = r#"[{"date": "2012-09-01", "val": 10.0}, {"date": "2011-09-01", "val": null}, {"date": "2010-09-01"}]"#;
        let out = read_json_records(json.as_bytes()).unwrap();
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.records[0], RawRecord::new("2012-09-01", 10.0));
        assert_eq!(out.records[1].val, None);
        assert_eq!(out.records[2].val, None);
        assert!(out.row_errors.is_empty());
    }

    #[test]
    fn format_resolves_from_extension() {
        assert_eq!(InputFormat::Auto.resolve(Path::new("a/b.JSON")), InputFormat::Json);
        assert_eq!(InputFormat::Auto.resolve(Path::new("a/b.csv")), InputFormat::Csv);
        assert_eq!(InputFormat::Json.resolve(Path::new("a/b.csv")), InputFormat::Json);
    }

    #[test]
    fn load_records_round_trips_through_a_file() {
        let path = std::env::temp_dir().join(format!("trend_ingest_{}.csv", std::process::id()));
        std::fs::write(&path, "date,val\n2010-12-31,1\n2011-12-31,2\n").unwrap();
        let out = load_records(&path, InputFormat::Auto).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(out.records.len(), 2);

        let missing = std::env::temp_dir().join("trend_ingest_does_not_exist.csv");
        assert_eq!(load_records(&missing, InputFormat::Csv).unwrap_err().exit_code(), 2);
    }
}
