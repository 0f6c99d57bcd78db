//! Database schema initialization for Tally
//!
//! Defines the SurrealDB schema for the task table monitoring reports read.

use crate::error::DbError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// SQL statements for schema initialization
mod sql {
    /// Define the task table with all fields
    pub const DEFINE_TASK_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS task SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS name ON task TYPE string;

        DEFINE FIELD IF NOT EXISTS workbasket_key ON task TYPE string;

        DEFINE FIELD IF NOT EXISTS domain ON task TYPE string DEFAULT "";

        DEFINE FIELD IF NOT EXISTS classification_key ON task TYPE string;

        DEFINE FIELD IF NOT EXISTS classification_category ON task TYPE string;

        DEFINE FIELD IF NOT EXISTS attachment_classification_key ON task TYPE option<string>;

        DEFINE FIELD IF NOT EXISTS state ON task TYPE string
            ASSERT $value IN ["ready", "claimed", "completed", "cancelled", "terminated"];

        DEFINE FIELD IF NOT EXISTS priority ON task TYPE int DEFAULT 0;

        DEFINE FIELD IF NOT EXISTS due ON task TYPE string;

        DEFINE FIELD IF NOT EXISTS custom_1 ON task TYPE option<string>;
        DEFINE FIELD IF NOT EXISTS custom_2 ON task TYPE option<string>;
        DEFINE FIELD IF NOT EXISTS custom_3 ON task TYPE option<string>;
        DEFINE FIELD IF NOT EXISTS custom_4 ON task TYPE option<string>;

        DEFINE FIELD IF NOT EXISTS created_at ON task TYPE datetime DEFAULT time::now();
    "#;

    /// Indexes backing the monitor filters
    pub const DEFINE_TASK_INDEXES: &str = r#"
        DEFINE INDEX IF NOT EXISTS task_workbasket ON task FIELDS workbasket_key;
        DEFINE INDEX IF NOT EXISTS task_state ON task FIELDS state;
    "#;
}

/// Initialize the database schema.
///
/// Creates the task table with all required fields, constraints and indexes.
///
/// This function is idempotent - it can be called multiple times safely
/// as it uses `IF NOT EXISTS` clauses.
///
/// # Errors
///
/// Returns `DbError::Schema` if any schema definition fails.
pub async fn init_schema(client: &Surreal<Db>) -> Result<(), DbError> {
    client
        .query(sql::DEFINE_TASK_TABLE)
        .await
        .and_then(|response| response.check())
        .map_err(|e| DbError::Schema(Box::new(e)))?;

    client
        .query(sql::DEFINE_TASK_INDEXES)
        .await
        .and_then(|response| response.check())
        .map_err(|e| DbError::Schema(Box::new(e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::local::Mem;

    async fn setup_test_db() -> Surreal<Db> {
        let client = Surreal::new::<Mem>(()).await.unwrap();
        client.use_ns("tally").use_db("test").await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let client = setup_test_db().await;
        init_schema(&client).await.unwrap();
        init_schema(&client).await.unwrap();
    }

    #[tokio::test]
    async fn test_state_assertion_rejects_unknown_state() {
        let client = setup_test_db().await;
        init_schema(&client).await.unwrap();

        let result = client
            .query(
                r#"CREATE task:bad SET
                    name = "Bad",
                    workbasket_key = "WB1",
                    classification_key = "L1",
                    classification_category = "EXTERNAL",
                    state = "done",
                    due = "2018-02-06""#,
            )
            .await
            .unwrap()
            .check();
        assert!(result.is_err(), "Unknown state should be rejected");
    }

    #[tokio::test]
    async fn test_valid_task_is_accepted() {
        let client = setup_test_db().await;
        init_schema(&client).await.unwrap();

        let result = client
            .query(
                r#"CREATE task:ok SET
                    name = "Ok",
                    workbasket_key = "WB1",
                    classification_key = "L1",
                    classification_category = "EXTERNAL",
                    state = "ready",
                    due = "2018-02-06""#,
            )
            .await
            .unwrap()
            .check();
        assert!(result.is_ok(), "Valid task should be accepted: {:?}", result.err());
    }
}
