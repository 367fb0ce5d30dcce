//! Daily date axis

use crate::error::ReportError;
use chrono::{Duration, NaiveDate};

/// Contiguous ascending sequence of calendar days, both ends inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAxis {
    dates: Vec<NaiveDate>,
}

impl DateAxis {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if end < start {
            return Err(ReportError::config(format!(
                "date axis end {} precedes start {}",
                end, start
            )));
        }
        let dates = start.iter_days().take_while(|d| *d <= end).collect();
        Ok(Self { dates })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied()
    }

    /// Index of an exact date on the axis
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.first()).num_days();
        usize::try_from(offset).ok().filter(|&i| i < self.len())
    }

    /// Index of the first axis date at or after `date`
    pub fn first_index_at_or_after(&self, date: NaiveDate) -> Option<usize> {
        if date <= self.first() {
            return Some(0);
        }
        self.index_of(date)
    }

    /// Whole-day offset of `date` from the axis start, as a chart x coordinate
    pub fn offset_days(&self, date: NaiveDate) -> f64 {
        (date - self.first()).num_days() as f64
    }

    /// Date at a (possibly fractional) chart coordinate, rounded to the nearest day
    pub fn date_at_offset(&self, offset: f64) -> NaiveDate {
        self.first() + Duration::days(offset.round() as i64)
    }
}
