//! Port contracts for the task workflow.
//!
//! Ports define infrastructure-agnostic interfaces to the hosted data store,
//! the read-only directories, and the change feed.

pub mod backend;
pub mod change_feed;
pub mod directory;

pub use backend::{TaskBackend, TaskBackendError, TaskBackendResult};
pub use change_feed::{ChangeEvent, ChangeEventType};
pub use directory::{DirectoryError, DirectoryResult, TaskDirectory};

#[cfg(test)]
pub use backend::MockTaskBackend;
