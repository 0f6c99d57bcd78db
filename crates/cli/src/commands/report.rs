//! Report command for working-day age reports
//!
//! Implements the `tly report` command, and the options it shares with
//! `tly drill` so a drill-down resolves exactly the cells a report printed.

use crate::commands::{parse_custom_value, parse_date, parse_state};
use crate::output::{format_detailed_report_table, format_report_table};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Args;
use std::sync::Arc;
use tally_core::{
    FoldableRow, HolidayCalendar, ReportBuilder, Row, TimeIntervalColumnHeader,
};
use tally_db::{CustomField, Database, DbError, MonitorFilter, ReportGrouping, TaskState};
use tracing::debug;

/// Column headers used when none are given
pub const DEFAULT_HEADERS: [&str; 9] = [
    "..-11", "-10..-6", "-5..-2", "-1", "0", "1", "2..5", "6..10", "11..",
];

/// Options shared by report and drill
#[derive(Debug, Clone, Args)]
pub struct ReportOptions {
    /// Row grouping (workbasket, classification, category, custom-1 to custom-4)
    #[arg(long = "by", default_value = "workbasket", value_parser = parse_grouping)]
    pub grouping: ReportGrouping,

    /// Column header such as 3, 1..5, ..-6 or 6.. (can be specified multiple times)
    #[arg(long = "header", allow_hyphen_values = true, value_parser = parse_header)]
    pub headers: Vec<TimeIntervalColumnHeader>,

    /// Date ages are measured from (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    pub reference: Option<NaiveDate>,

    /// Bucket ages as calendar days instead of working days
    #[arg(long)]
    pub calendar_days: bool,

    /// Filter by workbasket (can be specified multiple times)
    #[arg(short, long = "workbasket")]
    pub workbaskets: Vec<String>,

    /// Filter by state (can be specified multiple times, default ready and claimed)
    #[arg(short, long = "state", value_parser = parse_state)]
    pub states: Vec<TaskState>,

    /// Filter by classification category (can be specified multiple times)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Filter by domain (can be specified multiple times)
    #[arg(long = "domain")]
    pub domains: Vec<String>,

    /// Filter by classification key (can be specified multiple times)
    #[arg(long = "classification")]
    pub classifications: Vec<String>,

    /// Filter by custom attribute as N=VALUE (can be specified multiple times)
    #[arg(long = "custom", value_parser = parse_custom_value)]
    pub custom: Vec<(CustomField, String)>,
}

/// Parse a report grouping
fn parse_grouping(s: &str) -> Result<ReportGrouping, String> {
    s.parse::<ReportGrouping>().map_err(|e| e.to_string())
}

/// Parse a column header
fn parse_header(s: &str) -> Result<TimeIntervalColumnHeader, String> {
    s.parse::<TimeIntervalColumnHeader>()
        .map_err(|e| e.to_string())
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            grouping: ReportGrouping::Workbasket,
            headers: vec![],
            reference: None,
            calendar_days: false,
            workbaskets: vec![],
            states: vec![],
            categories: vec![],
            domains: vec![],
            classifications: vec![],
            custom: vec![],
        }
    }
}

impl ReportOptions {
    /// Requested headers, or the default bucket layout
    pub fn column_headers(&self) -> Vec<TimeIntervalColumnHeader> {
        if !self.headers.is_empty() {
            return self.headers.clone();
        }
        DEFAULT_HEADERS
            .iter()
            .filter_map(|header| header.parse().ok())
            .collect()
    }

    /// Task filter these options describe
    pub fn filter(&self) -> MonitorFilter {
        let mut filter = MonitorFilter::new()
            .with_workbaskets(self.workbaskets.iter().cloned())
            .with_states(self.states.iter().copied());
        for category in &self.categories {
            filter = filter.with_category(category.clone());
        }
        for domain in &self.domains {
            filter = filter.with_domain(domain.clone());
        }
        for classification in &self.classifications {
            filter = filter.with_classification(classification.clone());
        }
        for (field, value) in &self.custom {
            filter = filter.with_custom_value(*field, value.clone());
        }
        filter
    }

    /// Reference instant, midnight UTC of the reference date or now
    pub fn reference_instant(&self) -> DateTime<Utc> {
        match self.reference {
            Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
            None => Utc::now(),
        }
    }

    /// Report builder configured from these options
    pub fn builder(
        &self,
        calendar: &Arc<HolidayCalendar>,
        reference: DateTime<Utc>,
    ) -> ReportBuilder {
        ReportBuilder::new(calendar.clone(), reference)
            .with_column_headers(self.column_headers())
            .with_in_working_days(!self.calendar_days)
    }
}

/// Print a working-day age report
#[derive(Debug, Args)]
pub struct ReportCommand {
    #[command(flatten)]
    pub options: ReportOptions,

    /// Fold rows by attachment classification
    #[arg(short, long)]
    pub detailed: bool,
}

impl ReportCommand {
    /// Execute the report command.
    ///
    /// Counts the filtered tasks by row key and age, converts ages to
    /// working days and renders the resulting report as a table.
    ///
    /// # Arguments
    ///
    /// * `db` - Reference to the database connection
    /// * `calendar` - Holiday calendar used for the conversion
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the query fails or an age cannot be converted.
    pub async fn execute(
        &self,
        db: &Database,
        calendar: &Arc<HolidayCalendar>,
    ) -> Result<String, DbError> {
        let reference = self.options.reference_instant();
        let builder = self.options.builder(calendar, reference);

        let items = db
            .monitor()
            .age_counts(
                &self.options.filter(),
                self.options.grouping,
                self.detailed,
                reference.date_naive(),
            )
            .await?;
        debug!(items = items.len(), detailed = self.detailed, "Loaded report items");

        let label = grouping_label(self.options.grouping);
        if self.detailed {
            let report = builder.build::<FoldableRow>(items)?;
            Ok(format_detailed_report_table(&report, label))
        } else {
            let report = builder.build::<Row>(items)?;
            Ok(format_report_table(&report, label))
        }
    }
}

/// Title of the key column for a grouping
fn grouping_label(grouping: ReportGrouping) -> &'static str {
    match grouping {
        ReportGrouping::Workbasket => "Workbasket",
        ReportGrouping::Classification => "Classification",
        ReportGrouping::ClassificationCategory => "Category",
        ReportGrouping::CustomField(CustomField::Custom1) => "Custom 1",
        ReportGrouping::CustomField(CustomField::Custom2) => "Custom 2",
        ReportGrouping::CustomField(CustomField::Custom3) => "Custom 3",
        ReportGrouping::CustomField(CustomField::Custom4) => "Custom 4",
    }
}
