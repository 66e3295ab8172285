//! Calendar-date parsing at the input boundary.

use chrono::NaiveDate;

use crate::error::TrendError;

/// The only accepted textual date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
///
/// The year must have four digits: chrono alone would accept `200-01-13` as
/// the year 200, which is almost always a truncated value in our inputs.
pub fn parse_date(text: &str) -> Result<NaiveDate, TrendError> {
    let trimmed = text.trim();
    let year_digits = trimmed.split('-').next().map_or(0, str::len);
    if year_digits != 4 {
        return Err(TrendError::DateParse {
            text: text.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| TrendError::DateParse {
        text: text.to_string(),
    })
}
