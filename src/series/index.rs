//! Ordered series construction and day-offset normalization.

use crate::domain::{IndexedSeries, Observation, OrderedSeries, RawRecord};
use crate::error::TrendError;
use crate::series::dates::parse_date;

impl OrderedSeries {
    /// Parse every record's date and order the observations by date.
    ///
    /// The first malformed date or non-finite value fails the whole call.
    pub fn from_records(records: &[RawRecord]) -> Result<Self, TrendError> {
        let observations = records
            .iter()
            .enumerate()
            .map(|(k, r)| {
                if let Some(v) = r.val.filter(|v| !v.is_finite()) {
                    return Err(TrendError::invalid_input(format!(
                        "record {k} ({}) has non-finite value {v}",
                        r.date
                    )));
                }
                Ok(Observation {
                    date: parse_date(&r.date)?,
                    value: r.val,
                })
            })
            .collect::<Result<Vec<_>, TrendError>>()?;
        Ok(Self::from_observations(observations))
    }

    /// Order observations by date (stable, no deduplication).
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self { observations }
    }

    /// Map each date to its whole-day offset from the first date.
    pub fn to_indexed(&self) -> Result<IndexedSeries, TrendError> {
        let Some(first) = self.observations.first() else {
            return Err(TrendError::invalid_input("series is empty"));
        };

        let mut days = Vec::with_capacity(self.observations.len());
        for (k, obs) in self.observations.iter().enumerate() {
            if let Some(v) = obs.value.filter(|v| !v.is_finite()) {
                return Err(TrendError::invalid_input(format!(
                    "position {k} ({}) has non-finite value {v}",
                    obs.date
                )));
            }
            let day = (obs.date - first.date).num_days();
            if let Some(&prev) = days.last() {
                if day <= prev {
                    return Err(TrendError::invalid_input(format!(
                        "dates must be strictly increasing: position {k} ({}) does not follow position {}",
                        obs.date,
                        k - 1
                    )));
                }
            }
            days.push(day);
        }

        Ok(IndexedSeries {
            days,
            values: self.values(),
        })
    }
}

impl IndexedSeries {
    /// Index a plain value list by position (`days = 0, 1, 2, ...`).
    pub fn from_positions(values: Vec<Option<f64>>) -> Self {
        Self {
            days: (0..values.len() as i64).collect(),
            values,
        }
    }
}
