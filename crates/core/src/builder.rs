//! Report building pipeline
//!
//! Ties the calendar, the report-bound converters and [`Report`] together:
//! raw items go in, their ages are converted to working days (unless the
//! report is built in calendar days) and they are aggregated into rows.

use crate::calendar::HolidayCalendar;
use crate::error::{ReportError, ReportResult};
use crate::header::{AgeRange, TimeIntervalColumnHeader};
use crate::item::{QueryItem, QueryItemPreprocessor};
use crate::report::{Report, ReportRow};
use crate::report_converter::{DaysToWorkingDaysReportConverter, WorkingDaysToDaysReportConverter};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Builder for one monitoring report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportBuilder {
    calendar: Arc<HolidayCalendar>,
    column_headers: Vec<TimeIntervalColumnHeader>,
    reference: DateTime<Utc>,
    in_working_days: bool,
}

impl ReportBuilder {
    /// Create a builder in working days with no columns
    pub fn new(calendar: Arc<HolidayCalendar>, reference: DateTime<Utc>) -> Self {
        Self {
            calendar,
            column_headers: Vec::new(),
            reference,
            in_working_days: true,
        }
    }

    /// Set the column headers
    pub fn with_column_headers(mut self, column_headers: Vec<TimeIntervalColumnHeader>) -> Self {
        self.column_headers = column_headers;
        self
    }

    /// Choose between working-day (default) and calendar-day ages
    pub fn with_in_working_days(mut self, in_working_days: bool) -> Self {
        self.in_working_days = in_working_days;
        self
    }

    /// Column headers of the report
    pub fn column_headers(&self) -> &[TimeIntervalColumnHeader] {
        &self.column_headers
    }

    /// Reference instant ages are measured from
    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    /// Whether ages are bucketed as working days
    pub fn in_working_days(&self) -> bool {
        self.in_working_days
    }

    /// Forward converter bound to this report
    pub fn days_to_working_days(&self) -> DaysToWorkingDaysReportConverter {
        DaysToWorkingDaysReportConverter::initialize(
            self.column_headers.clone(),
            self.reference,
            self.calendar.clone(),
        )
    }

    /// Inverse converter bound to this report
    pub fn working_days_to_days(&self) -> WorkingDaysToDaysReportConverter {
        WorkingDaysToDaysReportConverter::initialize(
            self.column_headers.clone(),
            self.reference,
            self.calendar.clone(),
        )
    }

    /// Build a report from items carrying raw calendar-day ages.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidArgument` if an age cannot be converted.
    pub fn build<R: ReportRow>(&self, items: Vec<QueryItem>) -> ReportResult<Report<R>> {
        let items = self.prepare(items)?;
        let mut report = Report::new(self.column_headers.clone());
        report.add_items(items);
        Ok(report)
    }

    /// Build a report, letting `preprocessor` replace each item's count.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidArgument` if an age cannot be converted.
    pub fn build_with<R, P>(&self, items: Vec<QueryItem>, preprocessor: &P) -> ReportResult<Report<R>>
    where
        R: ReportRow,
        P: QueryItemPreprocessor + ?Sized,
    {
        let items = self.prepare(items)?;
        let mut report = Report::new(self.column_headers.clone());
        report.add_items_with(items, preprocessor);
        Ok(report)
    }

    /// Raw-day age range behind the column at `index`, for drill-down.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidArgument` if the report has no such column.
    pub fn age_range(&self, index: usize) -> ReportResult<AgeRange> {
        if self.in_working_days {
            return self.working_days_to_days().age_range_for_column(index);
        }

        self.column_headers
            .get(index)
            .map(|header| AgeRange::from(*header))
            .ok_or_else(|| {
                ReportError::invalid_argument(format!(
                    "column {} does not exist; the report has {} columns",
                    index,
                    self.column_headers.len()
                ))
            })
    }

    fn prepare(&self, items: Vec<QueryItem>) -> ReportResult<Vec<QueryItem>> {
        debug!(
            items = items.len(),
            columns = self.column_headers.len(),
            in_working_days = self.in_working_days,
            reference = %self.reference,
            "Building report"
        );

        if self.in_working_days {
            self.days_to_working_days().convert_items(items)
        } else {
            Ok(items)
        }
    }
}

static_assertions::assert_impl_all!(ReportBuilder: Send, Sync);
