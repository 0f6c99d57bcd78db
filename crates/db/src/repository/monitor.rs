//! Monitoring queries over stored tasks
//!
//! Counts the tasks a [`MonitorFilter`] selects per row key, detail key and
//! due date, turning each group into a [`QueryItem`] whose age is the due
//! date minus the reference date. Drill-down narrows the same filter to one
//! report cell and returns the matching task ids.

use crate::error::{DbError, DbResult};
use crate::models::ReportGrouping;
use crate::repository::filter::{MonitorFilter, Page};
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;
use tally_core::{AgeRange, QueryItem};
use tracing::{debug, trace};

/// Format of the stored `due` field; sorts like the dates it encodes
const DUE_FORMAT: &str = "%Y-%m-%d";

/// One report cell to resolve into task ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSelection {
    /// Row key of the report row
    pub row_key: String,
    /// Detail key of a folded sub-row, if the cell belongs to one
    pub detail_key: Option<String>,
    /// Raw-day age range of the column
    pub age_range: AgeRange,
}

impl CellSelection {
    /// Select every task in a row within an age range
    pub fn new(row_key: impl Into<String>, age_range: AgeRange) -> Self {
        Self {
            row_key: row_key.into(),
            detail_key: None,
            age_range,
        }
    }

    /// Narrow the selection to one detail sub-row
    pub fn with_detail_key(mut self, detail_key: impl Into<String>) -> Self {
        self.detail_key = Some(detail_key.into());
        self
    }

    /// Build the WHERE conditions selecting this cell and the values they bind.
    ///
    /// The age range becomes bounds on `due`. A bound that falls outside the
    /// representable dates cannot exclude any task and is left out.
    pub(crate) fn conditions(
        &self,
        grouping: ReportGrouping,
        reference_date: NaiveDate,
    ) -> (Vec<String>, Vec<(String, String)>) {
        let mut conditions = vec![format!("{} = $row_key", grouping.column())];
        let mut params = vec![("row_key".to_string(), self.row_key.clone())];

        if let Some(detail_key) = &self.detail_key {
            conditions.push("attachment_classification_key = $detail_key".to_string());
            params.push(("detail_key".to_string(), detail_key.clone()));
        }

        let bounds = [
            ("due >= $due_from", "due_from", self.age_range.lower),
            ("due <= $due_to", "due_to", self.age_range.upper),
        ];
        for (condition, param, days) in bounds {
            if let Some(due) = days.and_then(|days| due_date(reference_date, days)) {
                conditions.push(condition.to_string());
                params.push((param.to_string(), due.format(DUE_FORMAT).to_string()));
            }
        }

        (conditions, params)
    }
}

/// The date `days` after `reference_date`
fn due_date(reference_date: NaiveDate, days: i32) -> Option<NaiveDate> {
    let offset = Days::new(u64::from(days.unsigned_abs()));
    if days < 0 {
        reference_date.checked_sub_days(offset)
    } else {
        reference_date.checked_add_days(offset)
    }
}

/// One group of tasks sharing row key, detail key and due date
#[derive(Debug, Deserialize)]
struct AgeCountRow {
    key: String,
    #[serde(default)]
    detail_key: Option<String>,
    due: NaiveDate,
    total: u64,
}

impl AgeCountRow {
    fn into_item(self, reference_date: NaiveDate) -> DbResult<QueryItem> {
        let days = (self.due - reference_date).num_days();
        let age = i32::try_from(days).map_err(|_| DbError::ValidationError {
            message: format!(
                "tasks of '{}' are due {} days from the reference date, which is out of range",
                self.key, days
            ),
        })?;

        let item = QueryItem::new(self.key, age, self.total);
        Ok(match self.detail_key {
            Some(detail_key) => item.with_detail_key(detail_key),
            None => item,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TaskIdRow {
    id: Thing,
}

/// Repository for monitoring report queries
pub struct MonitorRepository<'a> {
    client: &'a Surreal<Db>,
}

impl<'a> MonitorRepository<'a> {
    /// Create a new MonitorRepository with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self { client }
    }

    /// Count tasks per row key, detail key and raw age in days.
    ///
    /// Tasks without a value for the grouping field are left out.
    ///
    /// # Arguments
    ///
    /// * `filter` - Which tasks to count
    /// * `grouping` - Task field providing the row key
    /// * `detailed` - Whether to carry the attachment classification as detail key
    /// * `reference_date` - Date ages are measured from
    ///
    /// # Errors
    ///
    /// Returns `DbError::Query` if the database query fails.
    pub async fn age_counts(
        &self,
        filter: &MonitorFilter,
        grouping: ReportGrouping,
        detailed: bool,
        reference_date: NaiveDate,
    ) -> DbResult<Vec<QueryItem>> {
        let (mut conditions, params) = filter.conditions();
        conditions.push(format!("{} != NONE", grouping.column()));

        let (detail_field, detail_group) = if detailed {
            ("attachment_classification_key AS detail_key, ", "detail_key, ")
        } else {
            ("", "")
        };
        let query = format!(
            "SELECT {col} AS key, {detail_field}due, count() AS total FROM task \
             WHERE {where_clause} GROUP BY key, {detail_group}due",
            col = grouping.column(),
            where_clause = conditions.join(" AND "),
        );
        trace!("Age count query: {}", query);

        let mut request = self.client.query(&query);
        for param in params {
            request = request.bind(param);
        }
        let mut result = request.await?;
        let rows: Vec<AgeCountRow> = result.take(0)?;

        debug!(
            grouping = grouping.column(),
            items = rows.len(),
            "Counted task ages"
        );

        rows.into_iter()
            .map(|row| row.into_item(reference_date))
            .collect()
    }

    /// Resolve a report cell to the ids of the tasks counted in it.
    ///
    /// Ids are sorted before `page` is applied.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter the report was built with
    /// * `grouping` - The grouping the report was built with
    /// * `cell` - Row, optional detail row, and raw-day age range of the cell
    /// * `reference_date` - Date ages are measured from
    /// * `page` - Window over the sorted ids
    ///
    /// # Errors
    ///
    /// Returns `DbError::Query` if the database query fails.
    pub async fn task_ids(
        &self,
        filter: &MonitorFilter,
        grouping: ReportGrouping,
        cell: &CellSelection,
        reference_date: NaiveDate,
        page: Page,
    ) -> DbResult<Vec<String>> {
        let (mut conditions, params) = filter.conditions();
        let (cell_conditions, cell_params) = cell.conditions(grouping, reference_date);
        conditions.extend(cell_conditions);

        let query = format!(
            "SELECT id FROM task WHERE {} ORDER BY id{}",
            conditions.join(" AND "),
            page.clause()
        );
        trace!("Drill-down query: {}", query);

        let mut request = self.client.query(&query);
        for param in params {
            request = request.bind(param);
        }
        for param in cell_params {
            request = request.bind(param);
        }
        let mut result = request.await?;
        let rows: Vec<TaskIdRow> = result.take(0)?;

        debug!(
            row_key = %cell.row_key,
            matched = rows.len(),
            "Resolved report cell"
        );

        Ok(rows.into_iter().map(|row| row.id.id.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::models::{CustomField, Task, TaskState};
    use crate::repository::TaskRepository;

    async fn setup_test_db() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.init().await.unwrap();
        db
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Tuesday
    fn reference() -> NaiveDate {
        date(2018, 2, 6)
    }

    async fn seed(db: &Database) {
        let repo = TaskRepository::new(db.client());
        let tasks = [
            ("t01", Task::new("A", "WB1", "L10000", date(2018, 2, 6))),
            ("t02", Task::new("B", "WB1", "L10000", date(2018, 2, 6))),
            (
                "t03",
                Task::new("C", "WB1", "L20000", date(2018, 2, 10))
                    .with_attachment_classification("L11000"),
            ),
            (
                "t04",
                Task::new("D", "WB2", "L10000", date(2018, 1, 22))
                    .with_state(TaskState::Claimed)
                    .with_attachment_classification("L22000")
                    .with_custom(CustomField::Custom1, "north"),
            ),
            (
                "t05",
                Task::new("E", "WB2", "L10000", date(2018, 2, 7)).with_state(TaskState::Completed),
            ),
            (
                "t06",
                Task::new("F", "WB2", "L20000", date(2018, 2, 11))
                    .with_category("MANUAL")
                    .with_custom(CustomField::Custom1, "south"),
            ),
        ];
        for (id, task) in tasks {
            repo.create(id, &task).await.unwrap();
        }
    }

    fn find<'a>(items: &'a [QueryItem], key: &str, age: i32) -> Option<&'a QueryItem> {
        items
            .iter()
            .find(|i| i.key() == key && i.age_in_days() == age)
    }

    #[tokio::test]
    async fn test_age_counts_by_workbasket() {
        let db = setup_test_db().await;
        seed(&db).await;
        let repo = MonitorRepository::new(db.client());

        let items = repo
            .age_counts(
                &MonitorFilter::new(),
                ReportGrouping::Workbasket,
                false,
                reference(),
            )
            .await
            .unwrap();

        // Completed task t05 is not open
        assert_eq!(items.len(), 4);
        assert_eq!(find(&items, "WB1", 0).unwrap().count(), 2);
        assert_eq!(find(&items, "WB1", 4).unwrap().count(), 1);
        assert_eq!(find(&items, "WB2", -15).unwrap().count(), 1);
        assert_eq!(find(&items, "WB2", 5).unwrap().count(), 1);
        assert!(items.iter().all(|i| i.detail_key().is_none()));
    }

    #[tokio::test]
    async fn test_age_counts_with_explicit_states() {
        let db = setup_test_db().await;
        seed(&db).await;
        let repo = MonitorRepository::new(db.client());

        let items = repo
            .age_counts(
                &MonitorFilter::new().with_state(TaskState::Completed),
                ReportGrouping::Workbasket,
                false,
                reference(),
            )
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(find(&items, "WB2", 1).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_age_counts_detailed_by_classification() {
        let db = setup_test_db().await;
        seed(&db).await;
        let repo = MonitorRepository::new(db.client());

        let items = repo
            .age_counts(
                &MonitorFilter::new(),
                ReportGrouping::Classification,
                true,
                reference(),
            )
            .await
            .unwrap();

        let detailed = find(&items, "L10000", -15).unwrap();
        assert_eq!(detailed.detail_key(), Some("L22000"));
        assert_eq!(find(&items, "L10000", 0).unwrap().detail_key(), None);
        assert_eq!(find(&items, "L20000", 4).unwrap().detail_key(), Some("L11000"));
    }

    #[tokio::test]
    async fn test_age_counts_by_custom_field_skips_missing_values() {
        let db = setup_test_db().await;
        seed(&db).await;
        let repo = MonitorRepository::new(db.client());

        let items = repo
            .age_counts(
                &MonitorFilter::new(),
                ReportGrouping::CustomField(CustomField::Custom1),
                false,
                reference(),
            )
            .await
            .unwrap();

        let mut keys: Vec<&str> = items.iter().map(|i| i.key()).collect();
        keys.sort();
        assert_eq!(keys, vec!["north", "south"]);
    }

    #[tokio::test]
    async fn test_age_counts_filters_combine() {
        let db = setup_test_db().await;
        seed(&db).await;
        let repo = MonitorRepository::new(db.client());

        let filter = MonitorFilter::new()
            .with_workbasket("WB2")
            .with_category("MANUAL");
        let items = repo
            .age_counts(&filter, ReportGrouping::Workbasket, false, reference())
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(find(&items, "WB2", 5).unwrap().count(), 1);

        let filter = MonitorFilter::new().with_custom_value(CustomField::Custom1, "north");
        let items = repo
            .age_counts(&filter, ReportGrouping::Workbasket, false, reference())
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(find(&items, "WB2", -15).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_task_ids_for_cell() {
        let db = setup_test_db().await;
        seed(&db).await;
        let repo = MonitorRepository::new(db.client());

        let cell = CellSelection::new("WB1", AgeRange::new(Some(0), Some(5)));
        let ids = repo
            .task_ids(
                &MonitorFilter::new(),
                ReportGrouping::Workbasket,
                &cell,
                reference(),
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids, vec!["t01", "t02", "t03"]);

        let cell = CellSelection::new("WB2", AgeRange::new(None, Some(-1)));
        let ids = repo
            .task_ids(
                &MonitorFilter::new(),
                ReportGrouping::Workbasket,
                &cell,
                reference(),
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids, vec!["t04"]);
    }

    #[tokio::test]
    async fn test_task_ids_with_detail_key_and_page() {
        let db = setup_test_db().await;
        seed(&db).await;
        let repo = MonitorRepository::new(db.client());

        let cell = CellSelection::new("L20000", AgeRange::default()).with_detail_key("L11000");
        let ids = repo
            .task_ids(
                &MonitorFilter::new(),
                ReportGrouping::Classification,
                &cell,
                reference(),
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids, vec!["t03"]);

        let cell = CellSelection::new("WB1", AgeRange::default());
        let ids = repo
            .task_ids(
                &MonitorFilter::new(),
                ReportGrouping::Workbasket,
                &cell,
                reference(),
                Page::new(1, Some(1)),
            )
            .await
            .unwrap();
        assert_eq!(ids, vec!["t02"]);
    }

    #[tokio::test]
    async fn test_task_ids_only_reads_selected_row() {
        let db = setup_test_db().await;
        let repo = TaskRepository::new(db.client());
        for (n, workbasket) in ["WB1", "WB2", "WB3", "WB4"].iter().enumerate() {
            for (m, due) in [date(2018, 2, 6), date(2018, 2, 9), date(2018, 2, 20)]
                .into_iter()
                .enumerate()
            {
                let id = format!("w{}d{}", n + 1, m);
                repo.create(&id, &Task::new("T", *workbasket, "L10000", due))
                    .await
                    .unwrap();
            }
        }
        let monitor = MonitorRepository::new(db.client());

        let cell = CellSelection::new("WB3", AgeRange::new(Some(0), Some(3)));
        let ids = monitor
            .task_ids(
                &MonitorFilter::new(),
                ReportGrouping::Workbasket,
                &cell,
                reference(),
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids, vec!["w3d0", "w3d1"]);

        let cell = CellSelection::new("WB2", AgeRange::new(Some(1), None));
        let ids = monitor
            .task_ids(
                &MonitorFilter::new(),
                ReportGrouping::Workbasket,
                &cell,
                reference(),
                Page::new(1, Some(5)),
            )
            .await
            .unwrap();
        assert_eq!(ids, vec!["w2d2"]);
    }

    #[tokio::test]
    async fn test_age_counts_group_same_due_date() {
        let db = setup_test_db().await;
        let repo = TaskRepository::new(db.client());
        for id in ["a1", "a2", "a3"] {
            repo.create(id, &Task::new("T", "WB1", "L10000", date(2018, 2, 9)))
                .await
                .unwrap();
        }
        let monitor = MonitorRepository::new(db.client());

        let items = monitor
            .age_counts(
                &MonitorFilter::new(),
                ReportGrouping::Workbasket,
                false,
                reference(),
            )
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(find(&items, "WB1", 3).unwrap().count(), 3);
    }

    #[test]
    fn test_cell_conditions_bind_row_and_due_bounds() {
        let cell = CellSelection::new("WB1", AgeRange::new(Some(-3), Some(5)));
        let (conditions, params) = cell.conditions(ReportGrouping::Workbasket, reference());

        assert_eq!(
            conditions,
            vec![
                "workbasket_key = $row_key".to_string(),
                "due >= $due_from".to_string(),
                "due <= $due_to".to_string(),
            ]
        );
        assert_eq!(
            params,
            vec![
                ("row_key".to_string(), "WB1".to_string()),
                ("due_from".to_string(), "2018-02-03".to_string()),
                ("due_to".to_string(), "2018-02-11".to_string()),
            ]
        );
    }

    #[test]
    fn test_cell_conditions_with_detail_and_open_ends() {
        let cell = CellSelection::new("L10000", AgeRange::new(None, Some(-11)))
            .with_detail_key("L11000");
        let (conditions, params) =
            cell.conditions(ReportGrouping::Classification, reference());

        assert_eq!(
            conditions,
            vec![
                "classification_key = $row_key".to_string(),
                "attachment_classification_key = $detail_key".to_string(),
                "due <= $due_to".to_string(),
            ]
        );
        assert_eq!(params[2], ("due_to".to_string(), "2018-01-26".to_string()));

        let cell = CellSelection::new("WB1", AgeRange::default());
        let (conditions, _) = cell.conditions(ReportGrouping::Workbasket, reference());
        assert_eq!(conditions, vec!["workbasket_key = $row_key".to_string()]);
    }

    #[test]
    fn test_unrepresentable_bound_is_dropped() {
        let cell = CellSelection::new("WB1", AgeRange::new(Some(i32::MIN), Some(i32::MAX)));
        let (conditions, _) = cell.conditions(ReportGrouping::Workbasket, reference());
        assert_eq!(conditions, vec!["workbasket_key = $row_key".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_database_yields_no_items() {
        let db = setup_test_db().await;
        let repo = MonitorRepository::new(db.client());
        let items = repo
            .age_counts(
                &MonitorFilter::new(),
                ReportGrouping::Workbasket,
                true,
                reference(),
            )
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
