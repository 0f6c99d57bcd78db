//! Convert command for single offsets
//!
//! Implements `tly convert`, which converts one day offset relative to a
//! reference date into working days, or a working-day offset back into the
//! set of day offsets it covers.

use crate::commands::parse_date;
use chrono::{NaiveDate, Utc};
use clap::Args;
use std::sync::Arc;
use tally_core::{DaysToWorkingDays, HolidayCalendar, WorkingDaysToDays};
use tally_db::DbError;

/// Convert a day offset to working days, or back
#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// Offset in days (or working days with --inverse)
    #[arg(allow_negative_numbers = true)]
    pub offset: i32,

    /// Reference date (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    pub reference: Option<NaiveDate>,

    /// Convert working days back to calendar-day offsets
    #[arg(short, long)]
    pub inverse: bool,
}

impl ConvertCommand {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Report` if the offset leaves the supported date range.
    pub fn execute(&self, calendar: &Arc<HolidayCalendar>) -> Result<String, DbError> {
        let reference = self
            .reference
            .unwrap_or_else(|| Utc::now().date_naive());

        if self.inverse {
            let days = WorkingDaysToDays::new(calendar.clone()).convert(reference, self.offset)?;
            Ok(days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", "))
        } else {
            let working_days =
                DaysToWorkingDays::new(calendar.clone()).convert(reference, self.offset)?;
            Ok(working_days.to_string())
        }
    }
}
