//! Repository modules for database operations
//!
//! Provides repository pattern implementations for task storage and
//! monitoring queries, encapsulating database queries.

mod filter;
mod monitor;
mod task;

pub use filter::{MonitorFilter, Page};
pub use monitor::{CellSelection, MonitorRepository};
pub use task::TaskRepository;
