//! Data models for Tally task storage
//!
//! Defines Rust types that map to the SurrealDB schema for tasks and the
//! enums used to filter and group them in monitoring reports.

use crate::error::{DbError, DbResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Ready,
    Claimed,
    Completed,
    Cancelled,
    Terminated,
}

impl TaskState {
    /// States a monitoring report looks at when none are requested
    pub const OPEN: [TaskState; 2] = [TaskState::Ready, TaskState::Claimed];

    /// Returns the string representation used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Ready => "ready",
            TaskState::Claimed => "claimed",
            TaskState::Completed => "completed",
            TaskState::Cancelled => "cancelled",
            TaskState::Terminated => "terminated",
        }
    }

    /// Parse a state from its database representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ready" => Some(TaskState::Ready),
            "claimed" => Some(TaskState::Claimed),
            "completed" => Some(TaskState::Completed),
            "cancelled" => Some(TaskState::Cancelled),
            "terminated" => Some(TaskState::Terminated),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the free-form custom attributes on a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomField {
    Custom1,
    Custom2,
    Custom3,
    Custom4,
}

impl CustomField {
    /// Select a custom field by its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ValidationError` if `number` is not between 1 and 4.
    pub fn from_number(number: u8) -> DbResult<Self> {
        match number {
            1 => Ok(CustomField::Custom1),
            2 => Ok(CustomField::Custom2),
            3 => Ok(CustomField::Custom3),
            4 => Ok(CustomField::Custom4),
            _ => Err(DbError::ValidationError {
                message: format!(
                    "custom field {} does not exist; valid fields are 1 to 4",
                    number
                ),
            }),
        }
    }

    /// Column name in the task table
    pub fn column(&self) -> &'static str {
        match self {
            CustomField::Custom1 => "custom_1",
            CustomField::Custom2 => "custom_2",
            CustomField::Custom3 => "custom_3",
            CustomField::Custom4 => "custom_4",
        }
    }
}

/// Task field providing the row key of a monitoring report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportGrouping {
    Workbasket,
    Classification,
    ClassificationCategory,
    CustomField(CustomField),
}

impl ReportGrouping {
    /// Column name in the task table
    pub fn column(&self) -> &'static str {
        match self {
            ReportGrouping::Workbasket => "workbasket_key",
            ReportGrouping::Classification => "classification_key",
            ReportGrouping::ClassificationCategory => "classification_category",
            ReportGrouping::CustomField(field) => field.column(),
        }
    }
}

impl std::str::FromStr for ReportGrouping {
    type Err = DbError;

    /// Parses `workbasket`, `classification`, `category` and `custom-N`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "workbasket" => Ok(ReportGrouping::Workbasket),
            "classification" => Ok(ReportGrouping::Classification),
            "category" => Ok(ReportGrouping::ClassificationCategory),
            other => {
                let number = other
                    .strip_prefix("custom-")
                    .and_then(|n| n.parse::<u8>().ok())
                    .ok_or_else(|| DbError::ValidationError {
                        message: format!(
                            "invalid grouping '{}'. Valid values: workbasket, classification, category, custom-1 to custom-4",
                            s
                        ),
                    })?;
                CustomField::from_number(number).map(ReportGrouping::CustomField)
            }
        }
    }
}

/// A task as stored in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (SurrealDB record ID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    /// Task name
    pub name: String,

    /// Key of the workbasket the task sits in
    pub workbasket_key: String,

    /// Domain the task belongs to
    #[serde(default)]
    pub domain: String,

    /// Classification key
    pub classification_key: String,

    /// Category of the classification
    pub classification_category: String,

    /// Classification of the task's attachment, used as the detail key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_classification_key: Option<String>,

    /// Current state
    pub state: TaskState,

    /// Priority, higher is more urgent
    #[serde(default)]
    pub priority: i32,

    /// Due date
    pub due: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_4: Option<String>,
}

impl Task {
    /// Create a ready task in the given workbasket
    pub fn new(
        name: impl Into<String>,
        workbasket_key: impl Into<String>,
        classification_key: impl Into<String>,
        due: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            workbasket_key: workbasket_key.into(),
            domain: String::new(),
            classification_key: classification_key.into(),
            classification_category: "EXTERNAL".to_string(),
            attachment_classification_key: None,
            state: TaskState::Ready,
            priority: 0,
            due,
            custom_1: None,
            custom_2: None,
            custom_3: None,
            custom_4: None,
        }
    }

    /// Set the domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the classification category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.classification_category = category.into();
        self
    }

    /// Set the attachment classification
    pub fn with_attachment_classification(mut self, key: impl Into<String>) -> Self {
        self.attachment_classification_key = Some(key.into());
        self
    }

    /// Set the state
    pub fn with_state(mut self, state: TaskState) -> Self {
        self.state = state;
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set a custom attribute
    pub fn with_custom(mut self, field: CustomField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            CustomField::Custom1 => self.custom_1 = value,
            CustomField::Custom2 => self.custom_2 = value,
            CustomField::Custom3 => self.custom_3 = value,
            CustomField::Custom4 => self.custom_4 = value,
        }
        self
    }

    /// Read a custom attribute
    pub fn custom(&self, field: CustomField) -> Option<&str> {
        match field {
            CustomField::Custom1 => self.custom_1.as_deref(),
            CustomField::Custom2 => self.custom_2.as_deref(),
            CustomField::Custom3 => self.custom_3.as_deref(),
            CustomField::Custom4 => self.custom_4.as_deref(),
        }
    }
}
