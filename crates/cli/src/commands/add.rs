//! Add command for creating new tasks
//!
//! Implements the `tly add` command to create tasks that reports count.

use crate::commands::{parse_custom_value, parse_date, parse_state};
use crate::id::IdGenerator;
use chrono::NaiveDate;
use clap::Args;
use tally_db::{CustomField, Database, DbError, Task, TaskState};
use tracing::debug;

/// Create a new task
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Name of the task
    #[arg(required = true)]
    pub name: String,

    /// Workbasket the task sits in
    #[arg(short, long)]
    pub workbasket: String,

    /// Due date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub due: NaiveDate,

    /// Domain of the task
    #[arg(long)]
    pub domain: Option<String>,

    /// Classification key
    #[arg(short, long, default_value = "GENERAL")]
    pub classification: String,

    /// Classification category
    #[arg(long, default_value = "EXTERNAL")]
    pub category: String,

    /// Classification of the task's attachment
    #[arg(long)]
    pub attachment: Option<String>,

    /// Initial state (ready, claimed, completed, cancelled, terminated)
    #[arg(short, long, value_parser = parse_state)]
    pub state: Option<TaskState>,

    /// Priority, higher is more urgent
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub priority: i32,

    /// Custom attribute as N=VALUE (can be specified multiple times)
    #[arg(long = "custom", value_parser = parse_custom_value)]
    pub custom: Vec<(CustomField, String)>,
}

impl AddCommand {
    /// Execute the add command.
    ///
    /// Creates a new task with the specified options and stores it in the database.
    ///
    /// # Arguments
    ///
    /// * `db` - Reference to the database connection
    ///
    /// # Errors
    ///
    /// Returns `DbError` if:
    /// - The name or workbasket is empty
    /// - No free id could be found
    /// - Database operations fail
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        if self.name.trim().is_empty() {
            return Err(DbError::ValidationError {
                message: "task name must not be empty".to_string(),
            });
        }

        let id = self.generate_unique_id(db).await?;

        let mut task = Task::new(
            self.name.clone(),
            self.workbasket.clone(),
            self.classification.clone(),
            self.due,
        )
        .with_category(self.category.clone())
        .with_state(self.state.unwrap_or(TaskState::Ready))
        .with_priority(self.priority);

        if let Some(domain) = &self.domain {
            task = task.with_domain(domain.clone());
        }

        if let Some(attachment) = &self.attachment {
            task = task.with_attachment_classification(attachment.clone());
        }

        for (field, value) in &self.custom {
            task = task.with_custom(*field, value.clone());
        }

        db.tasks().create(&id, &task).await?;
        debug!("Created task {} due {}", id, self.due);

        Ok(id)
    }

    /// Generate a unique ID that doesn't collide with existing tasks.
    async fn generate_unique_id(&self, db: &Database) -> Result<String, DbError> {
        let mut generator = IdGenerator::new(&self.name);

        while let Some(id) = generator.next_id() {
            if !db.tasks().exists(&id).await? {
                return Ok(id);
            }
        }

        Err(DbError::ValidationError {
            message: "failed to generate unique ID after maximum retries".to_string(),
        })
    }
}
