//! Test infrastructure for integration tests
//!
//! Provides isolated database setup/teardown and CLI command builders.
//! Each test gets its own database instance to ensure no shared state.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tally_cli::commands::{AddCommand, DrillCommand, ReportCommand, ReportOptions};
use tally_core::{CustomHoliday, HolidayCalendar, HolidayConfig};
use tally_db::{Database, TaskState};

/// Test context containing an isolated database and temp directory
pub struct TestContext {
    pub db: Database,
    pub temp_dir: PathBuf,
}

impl TestContext {
    /// Create a new test context with an isolated database.
    ///
    /// Each call creates a uniquely named temp directory using process ID,
    /// thread ID, and nanosecond timestamp to guarantee isolation.
    pub async fn new() -> Self {
        let temp_dir = std::env::temp_dir().join(format!(
            "tally-integration-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let db = Database::connect(&temp_dir).await.unwrap();
        db.init().await.unwrap();

        Self { db, temp_dir }
    }

    /// Add a task through the CLI command and return its id
    pub async fn add(&self, cmd: AddCommand) -> String {
        cmd.execute(&self.db).await.unwrap()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.temp_dir);
    }
}

// =============================================================================
// Calendars
// =============================================================================

/// Calendar with German public holidays
pub fn german_calendar() -> Arc<HolidayCalendar> {
    Arc::new(HolidayCalendar::new(
        HolidayConfig::new().with_german_public_holidays(true),
    ))
}

/// German calendar with extra one-off holidays
pub fn german_calendar_with(holidays: &[&str]) -> Arc<HolidayCalendar> {
    let custom = holidays
        .iter()
        .map(|h| h.parse::<CustomHoliday>().unwrap());
    Arc::new(HolidayCalendar::new(
        HolidayConfig::new()
            .with_german_public_holidays(true)
            .with_custom_holidays(custom),
    ))
}

// =============================================================================
// Command Builder Helpers
// =============================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Tuesday 2018-02-06, the reference date of most scenarios
pub fn reference() -> NaiveDate {
    date(2018, 2, 6)
}

/// Create an AddCommand with default optional fields filled in.
pub fn add_cmd(name: &str, workbasket: &str, due: NaiveDate) -> AddCommand {
    AddCommand {
        name: name.to_string(),
        workbasket: workbasket.to_string(),
        due,
        domain: None,
        classification: "L10000".to_string(),
        category: "EXTERNAL".to_string(),
        attachment: None,
        state: None,
        priority: 0,
        custom: vec![],
    }
}

/// Create an AddCommand with a classification and attachment classification.
pub fn add_cmd_classified(
    name: &str,
    classification: &str,
    attachment: Option<&str>,
    due: NaiveDate,
) -> AddCommand {
    AddCommand {
        classification: classification.to_string(),
        attachment: attachment.map(str::to_string),
        ..add_cmd(name, "WB1", due)
    }
}

/// Create an AddCommand in a given state.
pub fn add_cmd_with_state(
    name: &str,
    workbasket: &str,
    due: NaiveDate,
    state: TaskState,
) -> AddCommand {
    AddCommand {
        state: Some(state),
        ..add_cmd(name, workbasket, due)
    }
}

/// Report options with default headers measured from [`reference`].
pub fn report_options() -> ReportOptions {
    ReportOptions {
        reference: Some(reference()),
        ..ReportOptions::default()
    }
}

/// Create a ReportCommand from options.
pub fn report_cmd(options: ReportOptions, detailed: bool) -> ReportCommand {
    ReportCommand { options, detailed }
}

/// Create a DrillCommand for one cell.
pub fn drill_cmd(options: ReportOptions, key: &str, column: usize) -> DrillCommand {
    DrillCommand {
        options,
        key: key.to_string(),
        detail: None,
        column,
        offset: 0,
        limit: None,
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Numbers of the table line whose label is `key`, cells followed by total.
///
/// Detail lines are matched with their indentation stripped.
pub fn row_values(output: &str, key: &str) -> Option<Vec<u64>> {
    output.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        if parts.next()? != key {
            return None;
        }
        parts.map(|p| p.parse().ok()).collect()
    })
}

/// Ids printed by a drill command
pub fn drilled_ids(output: &str) -> Vec<String> {
    if output == "No tasks found." {
        return vec![];
    }
    output.lines().map(str::to_string).collect()
}
