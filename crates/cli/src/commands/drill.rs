//! Drill command for resolving report cells
//!
//! Implements the `tly drill` command, which lists the tasks counted in
//! one cell of the report built with the same options.

use crate::commands::report::ReportOptions;
use clap::Args;
use std::sync::Arc;
use tally_core::HolidayCalendar;
use tally_db::{CellSelection, Database, DbError, Page};
use tracing::debug;

/// List the tasks behind one report cell
#[derive(Debug, Args)]
pub struct DrillCommand {
    #[command(flatten)]
    pub options: ReportOptions,

    /// Row key of the cell
    #[arg(short, long)]
    pub key: String,

    /// Detail key of a folded row within the row
    #[arg(long)]
    pub detail: Option<String>,

    /// Zero-based column index of the cell
    #[arg(short, long)]
    pub column: usize,

    /// Number of ids to skip
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Maximum number of ids to print
    #[arg(long)]
    pub limit: Option<usize>,
}

impl DrillCommand {
    /// Execute the drill command.
    ///
    /// Maps the column back to the raw-day age range it covers and lists the
    /// ids of the matching tasks, sorted, one per line.
    ///
    /// # Arguments
    ///
    /// * `db` - Reference to the database connection
    /// * `calendar` - Holiday calendar used for the conversion
    ///
    /// # Errors
    ///
    /// Returns `DbError::Report` if the column does not exist.
    /// Returns `DbError::Query` if the database query fails.
    pub async fn execute(
        &self,
        db: &Database,
        calendar: &Arc<HolidayCalendar>,
    ) -> Result<String, DbError> {
        let reference = self.options.reference_instant();
        let builder = self.options.builder(calendar, reference);
        let age_range = builder.age_range(self.column)?;
        debug!(
            column = self.column,
            lower = ?age_range.lower,
            upper = ?age_range.upper,
            "Resolved column to raw-day range"
        );

        let mut cell = CellSelection::new(self.key.clone(), age_range);
        if let Some(detail) = &self.detail {
            cell = cell.with_detail_key(detail.clone());
        }

        let ids = db
            .monitor()
            .task_ids(
                &self.options.filter(),
                self.options.grouping,
                &cell,
                reference.date_naive(),
                Page::new(self.offset, self.limit),
            )
            .await?;

        if ids.is_empty() {
            Ok("No tasks found.".to_string())
        } else {
            Ok(ids.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tally_core::ReportError;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        drill: DrillCommand,
    }

    #[test]
    fn test_drill_parses_cell_and_page() {
        let cli = TestCli::try_parse_from([
            "test", "--key", "WB1", "--column", "4", "--offset", "2", "--limit", "5",
        ])
        .unwrap();
        assert_eq!(cli.drill.key, "WB1");
        assert_eq!(cli.drill.column, 4);
        assert_eq!(cli.drill.offset, 2);
        assert_eq!(cli.drill.limit, Some(5));
        assert!(cli.drill.detail.is_none());
    }

    #[test]
    fn test_drill_requires_key_and_column() {
        assert!(TestCli::try_parse_from(["test", "--key", "WB1"]).is_err());
        assert!(TestCli::try_parse_from(["test", "--column", "1"]).is_err());
    }

    #[tokio::test]
    async fn test_drill_into_missing_column_fails() {
        let db = Database::in_memory().await.unwrap();
        db.init().await.unwrap();
        let cli = TestCli::try_parse_from(["test", "--key", "WB1", "--column", "42"]).unwrap();

        let result = cli
            .drill
            .execute(&db, &Arc::new(HolidayCalendar::default()))
            .await;
        assert!(matches!(
            result,
            Err(DbError::Report(ReportError::InvalidArgument { .. }))
        ));
    }
}
