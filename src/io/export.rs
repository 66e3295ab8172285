//! Export fit records to CSV or JSON.
//!
//! The CSV is flat (one column per equation coefficient) so it opens cleanly in
//! spreadsheets; the JSON keeps the nested record shape.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{FitRecord, RawRecord};
use crate::error::AppError;

pub const CSV_HEADER: &str = "index_date,index_day,val_raw,val_fit,eqn_fit_slope,eqn_fit_intercept,eqn_right_slope,eqn_right_intercept,vertex,spike";

/// Write fit records to a CSV file.
pub fn write_records_csv(path: &Path, records: &[FitRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_records(&mut out, records)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

/// Write fit records as CSV to any writer. Missing raw values are empty cells.
pub fn write_records<W: Write>(out: &mut W, records: &[FitRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(CSV_HEADER.split(','))
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writer
            .write_record([
                r.index_date.to_string(),
                r.index_day.to_string(),
                optional_cell(r.val_raw),
                format!("{:.10}", r.val_fit),
                format!("{:.10}", r.eqn_fit.slope),
                format!("{:.10}", r.eqn_fit.intercept),
                format!("{:.10}", r.eqn_right.slope),
                format!("{:.10}", r.eqn_right.intercept),
                r.vertex.to_string(),
                r.spike.to_string(),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write fit records to a pretty-printed JSON array.
pub fn write_records_json(path: &Path, records: &[FitRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, records)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export JSON: {e}")))
}

/// Write `date,val` observation rows (the ingest format) to any writer.
pub fn write_observations<W: Write>(out: &mut W, records: &[RawRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["date", "val"])
        .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;
    for r in records {
        writer
            .write_record([r.date.clone(), optional_cell(r.val)])
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineEquation;
    use chrono::NaiveDate;

    fn record(day: i64, raw: Option<f64>, vertex: bool) -> FitRecord {
        let eqn = LineEquation::new(0.5, 1.0);
        FitRecord {
            index_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap() + chrono::Duration::days(day),
            index_day: day,
            val_raw: raw,
            val_fit: eqn.apply(day as f64),
            eqn_fit: eqn,
            eqn_right: eqn,
            vertex,
            spike: raw.is_none(),
        }
    }

    #[test]
    fn csv_rows_follow_header() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[record(0, Some(1.0), true), record(2, None, false)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "2010-01-01,0,1,1.0000000000,0.5000000000,1.0000000000,0.5000000000,1.0000000000,true,false"
        );
        assert_eq!(
            lines[2],
            "2010-01-03,2,,2.0000000000,0.5000000000,1.0000000000,0.5000000000,1.0000000000,false,true"
        );
    }

    #[test]
    fn csv_export_reads_back_with_the_csv_reader() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[record(0, Some(1.0), true), record(2, None, false)]).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 10);
        assert_eq!(&headers[2], "val_raw");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "1");
        assert_eq!(&rows[1][2], "");
        assert_eq!(&rows[1][9], "true");
    }

    #[test]
    fn observations_read_back_through_ingest() {
        let records = vec![
            RawRecord::new("2010-08-01", 0.25),
            RawRecord {
                date: "2011-08-01".to_string(),
                val: None,
            },
        ];
        let mut buf = Vec::new();
        write_observations(&mut buf, &records).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "date,val\n2010-08-01,0.25\n2011-08-01,\n");

        let back = crate::io::ingest::read_csv_records(buf.as_slice()).unwrap();
        assert_eq!(back.records, records);
    }

    #[test]
    fn json_export_reads_back() {
        let records = vec![record(0, Some(1.0), true), record(1, None, false)];
        let path = std::env::temp_dir().join(format!("trend_export_{}.json", std::process::id()));
        write_records_json(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let back: Vec<FitRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, records);
    }
}
