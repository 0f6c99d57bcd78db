//! Working-day reporting core for Tally
//!
//! Converts raw calendar-day ages into working-day ages under a holiday
//! calendar, aggregates counted items into reports with column headers, and
//! maps report columns back to raw-day ranges for drill-down.

pub mod builder;
pub mod calendar;
pub mod convert;
pub mod error;
pub mod header;
pub mod item;
pub mod report;
pub mod report_converter;

pub use builder::ReportBuilder;
pub use calendar::{CustomHoliday, HolidayCalendar, HolidayConfig, easter_sunday};
pub use convert::{DaysToWorkingDays, WorkingDaysToDays};
pub use error::{ReportError, ReportResult};
pub use header::{AgeRange, TimeIntervalColumnHeader};
pub use item::{QueryItem, QueryItemPreprocessor};
pub use report::{FoldableRow, Report, ReportRow, Row, SUM_ROW_KEY};
pub use report_converter::{DaysToWorkingDaysReportConverter, WorkingDaysToDaysReportConverter};
