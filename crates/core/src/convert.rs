//! Conversion between calendar-day and working-day offsets
//!
//! [`DaysToWorkingDays`] maps a raw day offset from a reference date to the
//! number of working days crossed on the way there. Runs of non-working days
//! collapse onto the working day nearest the reference date, so the mapping
//! is lossy; [`WorkingDaysToDays`] returns its full preimage.

use crate::calendar::HolidayCalendar;
use crate::error::{ReportError, ReportResult};
use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Shift a date by a signed number of days.
fn shift(reference: NaiveDate, offset: i32) -> ReportResult<NaiveDate> {
    let days = Days::new(u64::from(offset.unsigned_abs()));
    let shifted = if offset >= 0 {
        reference.checked_add_days(days)
    } else {
        reference.checked_sub_days(days)
    };

    shifted.ok_or_else(|| {
        ReportError::invalid_argument(format!(
            "offset of {} days from {} is outside the supported date range",
            offset, reference
        ))
    })
}

/// Forward converter: raw day offset to working-day offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaysToWorkingDays {
    calendar: Arc<HolidayCalendar>,
}

impl DaysToWorkingDays {
    /// Create a converter backed by the given calendar
    pub fn new(calendar: Arc<HolidayCalendar>) -> Self {
        Self { calendar }
    }

    /// The calendar this converter consults
    pub fn calendar(&self) -> &Arc<HolidayCalendar> {
        &self.calendar
    }

    /// Convert a raw day offset into a working-day offset.
    ///
    /// Walks from the reference date towards `days`, counting every working
    /// day crossed. The reference date itself is never counted, so `0` always
    /// maps to `0`, and the result has the sign of `days`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidArgument` if the target date lies outside
    /// the date range chrono can represent.
    pub fn convert(&self, reference: NaiveDate, days: i32) -> ReportResult<i32> {
        shift(reference, days)?;
        let step = days.signum();
        let mut working_days = 0;

        for offset in 1..=days.unsigned_abs() {
            // offset never exceeds |days|, which fits in i32 except for i32::MIN
            let offset = i32::try_from(offset).map_or(i32::MIN, |offset| offset * step);
            if self.calendar.is_working_day(shift(reference, offset)?) {
                working_days += 1;
            }
        }

        Ok(working_days * step)
    }
}

/// Inverse converter: working-day offset to the raw day offsets mapping to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDaysToDays {
    calendar: Arc<HolidayCalendar>,
}

impl WorkingDaysToDays {
    /// Create a converter backed by the given calendar
    pub fn new(calendar: Arc<HolidayCalendar>) -> Self {
        Self { calendar }
    }

    /// The calendar this converter consults
    pub fn calendar(&self) -> &Arc<HolidayCalendar> {
        &self.calendar
    }

    /// Convert a working-day offset into every raw day offset mapping to it.
    ///
    /// The result holds the working day itself followed by the non-working
    /// days adjacent to it on the side away from the reference date. For `0`
    /// the non-working days on both sides of the reference date are included.
    /// `i32::MIN` and `i32::MAX` stand for unbounded ends and map to
    /// themselves.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidArgument` if the calendar has no working
    /// days, or if the search leaves the date range chrono can represent.
    pub fn convert(&self, reference: NaiveDate, working_days: i32) -> ReportResult<BTreeSet<i32>> {
        if working_days == i32::MIN || working_days == i32::MAX {
            return Ok(BTreeSet::from([working_days]));
        }
        if !self.calendar.has_working_days() {
            return Err(ReportError::invalid_argument(
                "the holiday configuration leaves no working days",
            ));
        }
        // a working-day offset is never shorter than its calendar-day span
        shift(reference, working_days)?;

        let mut days = BTreeSet::new();

        if working_days == 0 {
            days.insert(0);
            self.collect_non_working(reference, 0, 1, &mut days)?;
            self.collect_non_working(reference, 0, -1, &mut days)?;
            return Ok(days);
        }

        let step = working_days.signum();
        let target = working_days.unsigned_abs();
        let mut offset = 0;
        let mut crossed = 0;

        while crossed < target {
            offset += step;
            if self.calendar.is_working_day(shift(reference, offset)?) {
                crossed += 1;
            }
        }

        days.insert(offset);
        self.collect_non_working(reference, offset, step, &mut days)?;
        Ok(days)
    }

    /// Insert the run of non-working days following `from` in direction `step`.
    fn collect_non_working(
        &self,
        reference: NaiveDate,
        from: i32,
        step: i32,
        days: &mut BTreeSet<i32>,
    ) -> ReportResult<()> {
        let mut offset = from + step;
        while !self.calendar.is_working_day(shift(reference, offset)?) {
            days.insert(offset);
            offset += step;
        }
        Ok(())
    }
}

static_assertions::assert_impl_all!(DaysToWorkingDays: Send, Sync);
static_assertions::assert_impl_all!(WorkingDaysToDays: Send, Sync);
