//! Task repository for storing and fetching tasks
//!
//! Provides a repository pattern implementation for task operations,
//! encapsulating SurrealDB queries and providing a clean API.

use crate::error::{DbError, DbResult};
use crate::models::Task;
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::{debug, trace};

/// Repository for task operations
///
/// Encapsulates database queries for tasks, providing a clean API
/// that hides the underlying SurrealDB implementation details.
pub struct TaskRepository<'a> {
    client: &'a Surreal<Db>,
}

/// Minimal row for checking task existence
#[derive(Debug, Deserialize)]
struct IdOnly {
    #[allow(dead_code)]
    id: surrealdb::sql::Thing,
}

impl<'a> TaskRepository<'a> {
    /// Create a new TaskRepository with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self { client }
    }

    /// Check if a task with the given ID exists.
    ///
    /// # Arguments
    ///
    /// * `id` - The task ID to check
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let task: Option<IdOnly> = self
            .client
            .select(("task", id))
            .await
            .map_err(|e| DbError::Query(Box::new(e)))?;
        Ok(task.is_some())
    }

    /// Create a new task with the specified ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique task ID
    /// * `task` - The task data to create
    ///
    /// # Errors
    ///
    /// Returns `DbError::ValidationError` if the name or workbasket is blank.
    /// Returns `DbError::Query` if the database operation fails.
    pub async fn create(&self, id: &str, task: &Task) -> DbResult<Task> {
        debug!("Creating task: {} in workbasket: {}", id, task.workbasket_key);
        trace!("Task data: {:?}", task);

        if task.name.trim().is_empty() {
            return Err(DbError::ValidationError {
                message: "task name must not be empty".to_string(),
            });
        }
        if task.workbasket_key.trim().is_empty() {
            return Err(DbError::ValidationError {
                message: "workbasket key must not be empty".to_string(),
            });
        }

        let mut content = task.clone();
        content.id = None;

        let created: Option<Task> = self.client.create(("task", id)).content(content).await?;
        created.ok_or_else(|| DbError::NotFound {
            task_id: id.to_string(),
        })
    }

    /// Get a task by ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The task ID to fetch
    ///
    /// # Returns
    ///
    /// `Some(Task)` if found, `None` otherwise.
    pub async fn get(&self, id: &str) -> DbResult<Option<Task>> {
        debug!("Fetching task: {}", id);
        let task: Option<Task> = self.client.select(("task", id)).await.map_err(|e| {
            debug!("Failed to fetch task: {}: {}", id, e);
            DbError::Query(Box::new(e))
        })?;
        if task.is_none() {
            debug!("Task not found: {}", id);
        }
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::models::{CustomField, TaskState};
    use chrono::NaiveDate;

    async fn setup_test_db() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.init().await.unwrap();
        db
    }

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 2, 9).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_task() {
        let db = setup_test_db().await;
        let repo = TaskRepository::new(db.client());

        let task = Task::new("Check invoice", "WB1", "L10000", due())
            .with_domain("DOMAIN_A")
            .with_attachment_classification("L11000")
            .with_custom(CustomField::Custom2, "north");
        let created = repo.create("abc123", &task).await.unwrap();
        assert_eq!(created.name, "Check invoice");
        assert!(created.id.is_some());

        let fetched = repo.get("abc123").await.unwrap().unwrap();
        assert_eq!(fetched.workbasket_key, "WB1");
        assert_eq!(fetched.due, due());
        assert_eq!(fetched.state, TaskState::Ready);
        assert_eq!(fetched.attachment_classification_key.as_deref(), Some("L11000"));
        assert_eq!(fetched.custom(CustomField::Custom2), Some("north"));
        assert_eq!(fetched.custom(CustomField::Custom1), None);
    }

    #[tokio::test]
    async fn test_get_missing_task() {
        let db = setup_test_db().await;
        let repo = TaskRepository::new(db.client());
        assert!(repo.get("nothere").await.unwrap().is_none());
        assert!(!repo.exists("nothere").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_after_create() {
        let db = setup_test_db().await;
        let repo = TaskRepository::new(db.client());
        repo.create("t1", &Task::new("A", "WB1", "L1", due()))
            .await
            .unwrap();
        assert!(repo.exists("t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let db = setup_test_db().await;
        let repo = TaskRepository::new(db.client());
        let result = repo.create("t1", &Task::new("  ", "WB1", "L1", due())).await;
        assert!(matches!(result, Err(DbError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let db = setup_test_db().await;
        let repo = TaskRepository::new(db.client());
        let task = Task::new("A", "WB1", "L1", due());
        repo.create("dup", &task).await.unwrap();
        assert!(repo.create("dup", &task).await.is_err());
    }
}
