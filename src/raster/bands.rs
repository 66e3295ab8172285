//! Text helpers for band-algebra expressions and scene file names.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use chrono::NaiveDate;

use crate::error::TrendError;

/// Band numbers referenced as `B<n>` in a band-algebra expression, ascending
/// and without duplicates.
pub fn band_refs(expr: &str) -> Vec<u32> {
    let bytes = expr.as_bytes();
    let mut bands = BTreeSet::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'B' {
            i += 1;
            continue;
        }
        let digits_start = i + 1;
        let mut j = digits_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            if let Ok(band) = expr[digits_start..j].parse::<u32>() {
                bands.insert(band);
            }
        }
        i = j.max(i + 1);
    }

    bands.into_iter().collect()
}

/// Replace every occurrence of every key of `replacements` in one left-to-right
/// pass. Replaced text is never rescanned; at a given position the longest
/// matching key wins.
pub fn multiple_replace(text: &str, replacements: &HashMap<&str, &str>) -> String {
    let mut keys: Vec<&str> = replacements.keys().copied().filter(|k| !k.is_empty()).collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while let Some(ch) = rest.chars().next() {
        for key in &keys {
            if let Some(tail) = rest.strip_prefix(*key) {
                out.push_str(replacements[key]);
                rest = tail;
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Acquisition date of a scene named `<id>_<year>_<day-of-year>_...`.
///
/// `/tmp/4529_2012_222_ledaps.tif` was acquired on 2012-08-09.
pub fn scene_date_from_filename(path: impl AsRef<Path>) -> Result<NaiveDate, TrendError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let unparseable = || TrendError::DateParse {
        text: path.display().to_string(),
    };

    let mut parts = name.split('_').skip(1);
    let year = parts
        .next()
        .and_then(|p| p.parse::<i32>().ok())
        .ok_or_else(unparseable)?;
    let ordinal = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .ok_or_else(unparseable)?;

    NaiveDate::from_yo_opt(year, ordinal).ok_or_else(unparseable)
}
