//! Converters bound to one report build
//!
//! A report is built for a fixed list of column headers and a fixed reference
//! instant. Binding the converters to those inputs lets a later drill-down
//! request reuse exactly the state the report was built with, including the
//! calendar's warm holiday cache. Two converters initialized from equal
//! inputs compare equal.

use crate::calendar::HolidayCalendar;
use crate::convert::{DaysToWorkingDays, WorkingDaysToDays};
use crate::error::{ReportError, ReportResult};
use crate::header::{AgeRange, TimeIntervalColumnHeader};
use crate::item::QueryItem;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Forward converter bound to a report's headers and reference instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaysToWorkingDaysReportConverter {
    column_headers: Vec<TimeIntervalColumnHeader>,
    reference: DateTime<Utc>,
    converter: DaysToWorkingDays,
}

impl DaysToWorkingDaysReportConverter {
    /// Bind a forward converter to one report build
    pub fn initialize(
        column_headers: Vec<TimeIntervalColumnHeader>,
        reference: DateTime<Utc>,
        calendar: Arc<HolidayCalendar>,
    ) -> Self {
        Self {
            column_headers,
            reference,
            converter: DaysToWorkingDays::new(calendar),
        }
    }

    /// Convert a raw day offset from the reference instant
    pub fn convert_days_to_working_days(&self, days: i32) -> ReportResult<i32> {
        self.converter.convert(self.reference_date(), days)
    }

    /// Convert the age of every item, leaving keys and counts untouched.
    ///
    /// Each distinct raw age is converted once.
    pub fn convert_items(&self, items: Vec<QueryItem>) -> ReportResult<Vec<QueryItem>> {
        let mut converted: HashMap<i32, i32> = HashMap::new();
        let mut result = Vec::with_capacity(items.len());

        for item in items {
            let days = item.age_in_days();
            let working_days = match converted.get(&days) {
                Some(&working_days) => working_days,
                None => {
                    let working_days = self.convert_days_to_working_days(days)?;
                    converted.insert(days, working_days);
                    working_days
                }
            };
            result.push(item.with_age(working_days));
        }

        debug!(
            items = result.len(),
            distinct_ages = converted.len(),
            "Converted item ages to working days"
        );
        Ok(result)
    }

    /// Column headers of the bound report
    pub fn column_headers(&self) -> &[TimeIntervalColumnHeader] {
        &self.column_headers
    }

    /// Reference instant of the bound report
    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    fn reference_date(&self) -> NaiveDate {
        self.reference.date_naive()
    }
}

/// Inverse converter bound to a report's headers and reference instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDaysToDaysReportConverter {
    column_headers: Vec<TimeIntervalColumnHeader>,
    reference: DateTime<Utc>,
    converter: WorkingDaysToDays,
}

impl WorkingDaysToDaysReportConverter {
    /// Bind an inverse converter to one report build
    pub fn initialize(
        column_headers: Vec<TimeIntervalColumnHeader>,
        reference: DateTime<Utc>,
        calendar: Arc<HolidayCalendar>,
    ) -> Self {
        Self {
            column_headers,
            reference,
            converter: WorkingDaysToDays::new(calendar),
        }
    }

    /// Expand a working-day offset into the raw day offsets mapping to it
    pub fn convert_working_days_to_days(&self, working_days: i32) -> ReportResult<BTreeSet<i32>> {
        self.converter.convert(self.reference.date_naive(), working_days)
    }

    /// Raw-day age range covered by a column header.
    ///
    /// The lower bound is the earliest raw day mapping to the header's lower
    /// bound, the upper bound the latest raw day mapping to its upper bound.
    /// Unbounded ends stay unbounded.
    pub fn age_range(&self, header: &TimeIntervalColumnHeader) -> ReportResult<AgeRange> {
        let lower = header
            .lower()
            .map(|lower| self.first_day(lower))
            .transpose()?;
        let upper = header
            .upper()
            .map(|upper| self.last_day(upper))
            .transpose()?;
        Ok(AgeRange::new(lower, upper))
    }

    /// Raw-day age range covered by the column at `index`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidArgument` if the report has no such column.
    pub fn age_range_for_column(&self, index: usize) -> ReportResult<AgeRange> {
        let header = self.column_headers.get(index).ok_or_else(|| {
            ReportError::invalid_argument(format!(
                "column {} does not exist; the report has {} columns",
                index,
                self.column_headers.len()
            ))
        })?;
        self.age_range(header)
    }

    /// Column headers of the bound report
    pub fn column_headers(&self) -> &[TimeIntervalColumnHeader] {
        &self.column_headers
    }

    /// Reference instant of the bound report
    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    fn first_day(&self, working_days: i32) -> ReportResult<i32> {
        self.convert_working_days_to_days(working_days)?
            .first()
            .copied()
            .ok_or_else(|| empty_preimage(working_days))
    }

    fn last_day(&self, working_days: i32) -> ReportResult<i32> {
        self.convert_working_days_to_days(working_days)?
            .last()
            .copied()
            .ok_or_else(|| empty_preimage(working_days))
    }
}

fn empty_preimage(working_days: i32) -> ReportError {
    ReportError::invalid_argument(format!(
        "working-day offset {} has no calendar days",
        working_days
    ))
}
