//! Task storage for Tally
//!
//! Tasks live in an embedded SurrealDB instance, on disk through SurrealKV or
//! in memory. [`Database`] opens the store and hands out the repositories
//! that write tasks and answer report and drill-down queries.

pub mod error;
pub mod models;
pub mod repository;
pub mod schema;

pub use error::{DbError, DbResult};
pub use models::{CustomField, ReportGrouping, Task, TaskState};
pub use repository::{CellSelection, MonitorFilter, MonitorRepository, Page, TaskRepository};

use std::path::{Path, PathBuf};
use std::process::Command;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, SurrealKv};
use tracing::debug;

/// Store location inside a project, relative to its git root
pub const DEFAULT_DB_PATH: &str = ".tally/data";

/// Namespace and database every Tally connection selects
const NAMESPACE: &str = "tally";
const DATABASE: &str = "main";

/// An open task store
pub struct Database {
    client: Surreal<Db>,
    /// On-disk location, `None` for in-memory stores
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the on-disk store in `path`.
    ///
    /// Missing directories are created.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidPath` if `path` is a file,
    /// `DbError::CreateDirectory` if the directory cannot be created, and
    /// `DbError::Connection` if SurrealKV refuses to open it.
    pub async fn connect(path: &Path) -> DbResult<Self> {
        ensure_directory(path)?;
        debug!(path = %path.display(), "Opening task store");

        let client = Surreal::new::<SurrealKv>(path.to_path_buf()).await;
        Self::open(client, Some(path.to_path_buf()))
    }

    /// Open a store that lives only as long as this value.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the engine fails to start.
    pub async fn in_memory() -> DbResult<Self> {
        let client = Surreal::new::<Mem>(()).await;
        Self::open(client, None)
    }

    fn open(client: surrealdb::Result<Surreal<Db>>, path: Option<PathBuf>) -> DbResult<Self> {
        match client {
            Ok(client) => Ok(Self { client, path }),
            Err(source) => Err(DbError::Connection {
                path: path.unwrap_or_else(|| PathBuf::from(":memory:")),
                source: Box::new(source),
            }),
        }
    }

    /// Select the Tally namespace and define the task table.
    ///
    /// Safe to call on every start; definitions are idempotent.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Schema` if either step is rejected.
    pub async fn init(&self) -> DbResult<()> {
        self.client
            .use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| DbError::Schema(Box::new(e)))?;
        schema::init_schema(&self.client).await
    }

    pub fn client(&self) -> &Surreal<Db> {
        &self.client
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Task storage
    pub fn tasks(&self) -> TaskRepository<'_> {
        TaskRepository::new(&self.client)
    }

    /// Report and drill-down queries
    pub fn monitor(&self) -> MonitorRepository<'_> {
        MonitorRepository::new(&self.client)
    }

    /// `.tally/data` under the enclosing git checkout, or under the current
    /// directory outside of one.
    pub fn default_path() -> PathBuf {
        find_project_root()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DB_PATH)
    }
}

static_assertions::assert_impl_all!(Database: Send, Sync);

/// Make sure `path` is a directory, creating it when missing
fn ensure_directory(path: &Path) -> DbResult<()> {
    if path.is_file() {
        return Err(DbError::InvalidPath {
            path: path.to_path_buf(),
            reason: "expected a directory, found a file".to_string(),
        });
    }
    std::fs::create_dir_all(path).map_err(|source| DbError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// Top-level directory of the git checkout containing the working directory
pub fn find_project_root() -> Option<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let root = String::from_utf8(output.stdout).ok()?;
    Some(PathBuf::from(root.trim()))
}
