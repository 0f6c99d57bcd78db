//! Monitor filter criteria
//!
//! Provides a builder-pattern MonitorFilter that selects the tasks a
//! monitoring report counts, and the Page window used by drill-down.
//! Both render into SurrealQL with bound parameters.

use crate::models::{CustomField, TaskState};

/// Filter criteria for monitoring reports
///
/// All filter criteria use OR semantics within the same type
/// (e.g., multiple workbaskets means "match any of these workbaskets")
/// and AND semantics across different types.
///
/// When no state is given, only open tasks (ready and claimed) are counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorFilter {
    /// Filter by workbasket keys (OR semantics)
    pub workbasket_keys: Vec<String>,
    /// Filter by states (OR semantics)
    pub states: Vec<TaskState>,
    /// Filter by classification categories (OR semantics)
    pub categories: Vec<String>,
    /// Filter by domains (OR semantics)
    pub domains: Vec<String>,
    /// Filter by classification keys (OR semantics)
    pub classification_keys: Vec<String>,
    /// Filter by custom field values (OR within one field, AND across fields)
    pub custom_values: Vec<(CustomField, Vec<String>)>,
}

impl MonitorFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a workbasket to filter by
    pub fn with_workbasket(mut self, key: impl Into<String>) -> Self {
        self.workbasket_keys.push(key.into());
        self
    }

    /// Add multiple workbaskets to filter by
    pub fn with_workbaskets(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.workbasket_keys.extend(keys.into_iter().map(|k| k.into()));
        self
    }

    /// Add a state to filter by
    pub fn with_state(mut self, state: TaskState) -> Self {
        self.states.push(state);
        self
    }

    /// Add multiple states to filter by
    pub fn with_states(mut self, states: impl IntoIterator<Item = TaskState>) -> Self {
        self.states.extend(states);
        self
    }

    /// Add a classification category to filter by
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Add a domain to filter by
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.push(domain.into());
        self
    }

    /// Add a classification key to filter by
    pub fn with_classification(mut self, key: impl Into<String>) -> Self {
        self.classification_keys.push(key.into());
        self
    }

    /// Add an accepted value for a custom field
    pub fn with_custom_value(mut self, field: CustomField, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.custom_values.iter_mut().find(|(f, _)| *f == field) {
            Some((_, values)) => values.push(value),
            None => self.custom_values.push((field, vec![value])),
        }
        self
    }

    /// States the filter selects, falling back to the open states
    pub fn effective_states(&self) -> Vec<TaskState> {
        if self.states.is_empty() {
            TaskState::OPEN.to_vec()
        } else {
            self.states.clone()
        }
    }

    /// Build the WHERE conditions and the parameters they bind.
    ///
    /// Every condition references a `$name` parameter so no user text is
    /// spliced into the query.
    pub(crate) fn conditions(&self) -> (Vec<String>, Vec<(String, Vec<String>)>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        let states = self
            .effective_states()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        conditions.push("state IN $states".to_string());
        params.push(("states".to_string(), states));

        let lists = [
            ("workbasket_key", "workbaskets", &self.workbasket_keys),
            ("classification_category", "categories", &self.categories),
            ("domain", "domains", &self.domains),
            ("classification_key", "classifications", &self.classification_keys),
        ];
        for (column, param, values) in lists {
            if !values.is_empty() {
                conditions.push(format!("{} IN ${}", column, param));
                params.push((param.to_string(), values.clone()));
            }
        }

        for (field, values) in &self.custom_values {
            if !values.is_empty() {
                conditions.push(format!("{0} IN ${0}", field.column()));
                params.push((field.column().to_string(), values.clone()));
            }
        }

        (conditions, params)
    }
}

/// Window over a sorted drill-down result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Number of leading entries to skip
    pub offset: usize,
    /// Maximum number of entries to return, unlimited when None
    pub limit: Option<usize>,
}

impl Page {
    /// Create a page window
    pub fn new(offset: usize, limit: Option<usize>) -> Self {
        Self { offset, limit }
    }

    /// SurrealQL `LIMIT`/`START` suffix selecting this window
    pub(crate) fn clause(&self) -> String {
        let mut clause = String::new();
        if let Some(limit) = self.limit {
            clause.push_str(&format!(" LIMIT {}", limit));
        }
        if self.offset > 0 {
            clause.push_str(&format!(" START {}", self.offset));
        }
        clause
    }
}
