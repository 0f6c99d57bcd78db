//! CLI commands for Tally
//!
//! This module contains all subcommand implementations for the tly CLI.

pub mod add;
pub mod convert;
pub mod drill;
pub mod report;

pub use add::AddCommand;
pub use convert::ConvertCommand;
pub use drill::DrillCommand;
pub use report::{ReportCommand, ReportOptions};

use chrono::NaiveDate;
use clap::Subcommand;
use std::sync::Arc;
use tally_core::HolidayCalendar;
use tally_db::{CustomField, Database, DbError, TaskState};

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new task
    Add(AddCommand),
    /// Print a working-day age report of open tasks
    Report(ReportCommand),
    /// List the tasks counted in one report cell
    Drill(DrillCommand),
    /// Convert a day offset to working days, or back
    Convert(ConvertCommand),
}

impl Command {
    /// Execute the command with the given database connection and calendar.
    ///
    /// # Arguments
    ///
    /// * `db` - Reference to the database connection
    /// * `calendar` - Holiday calendar shared by all conversions
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the command execution fails.
    pub async fn execute(
        &self,
        db: &Database,
        calendar: &Arc<HolidayCalendar>,
    ) -> Result<String, DbError> {
        match self {
            Command::Add(cmd) => cmd.execute(db).await,
            Command::Report(cmd) => cmd.execute(db, calendar).await,
            Command::Drill(cmd) => cmd.execute(db, calendar).await,
            Command::Convert(cmd) => cmd.execute(calendar),
        }
    }
}

/// Parse a YYYY-MM-DD date
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}'. Expected YYYY-MM-DD", s))
}

/// Parse a task state
pub(crate) fn parse_state(s: &str) -> Result<TaskState, String> {
    TaskState::parse(&s.to_lowercase()).ok_or_else(|| {
        format!(
            "invalid state '{}'. Valid values: ready, claimed, completed, cancelled, terminated",
            s
        )
    })
}

/// Parse a `N=VALUE` custom field assignment
pub(crate) fn parse_custom_value(s: &str) -> Result<(CustomField, String), String> {
    let (number, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid custom value '{}'. Expected N=VALUE", s))?;
    let number: u8 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid custom field number '{}'", number))?;
    let field = CustomField::from_number(number).map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}
