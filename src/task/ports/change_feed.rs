//! Wire format of the change feed pushed by the data store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeEventType {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was removed.
    Delete,
}

/// One change notification.
///
/// `record` is the raw row without directory joins. For deletions only the
/// `id` field is guaranteed to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Kind of change.
    pub event_type: ChangeEventType,
    /// Table the change happened in.
    pub table: String,
    /// Raw row payload.
    pub record: Value,
}

impl ChangeEvent {
    /// Creates an event for `table`.
    #[must_use]
    pub fn new(event_type: ChangeEventType, table: impl Into<String>, record: Value) -> Self {
        Self {
            event_type,
            table: table.into(),
            record,
        }
    }
}
