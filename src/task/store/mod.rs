//! Session-local replica of the task collection.
//!
//! [`TaskStore`] is a dumb container with a selection set and an observer
//! channel. [`PendingWrites`] keeps the snapshots needed to undo optimistic
//! writes, and [`SessionReplica`] shares both behind one lock.

mod pending;
mod replica;
mod selection;
mod shared;

pub use pending::{OperationId, PendingPatch, PendingWrites};
pub use replica::{StoreEvent, TaskStore};
pub use selection::Selection;
pub use shared::{EchoOutcome, ReplicaError, SessionReplica};
