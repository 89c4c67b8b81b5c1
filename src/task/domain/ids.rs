//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a schedule entry owned by the scheduling subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(Uuid);

impl ScheduleId {
    /// Creates a new random schedule identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScheduleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declares an opaque, non-empty string reference into an external directory.
macro_rules! directory_ref {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a validated reference.
            ///
            /// # Errors
            ///
            /// Returns [`TaskDomainError::EmptyReference`] when the value is
            /// blank after trimming.
            pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
                let raw = value.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(TaskDomainError::EmptyReference($kind));
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the reference as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

directory_ref!(
    /// Identifier of a user profile supplied by the identity provider.
    UserId,
    "user"
);
directory_ref!(
    /// Identifier of a client in the client directory.
    ClientId,
    "client"
);
directory_ref!(
    /// Identifier of a project in the project directory.
    ProjectId,
    "project"
);

/// Task type label, e.g. `Poster` or `Posting`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    /// Task types whose `posting_status` axis is meaningful.
    pub const POSTING_TYPES: [&'static str; 6] = [
        "Posting",
        "Account Creation",
        "Meeting",
        "Followup",
        "Connect",
        "Ad Post",
    ];

    /// Creates a validated task type.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyReference`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyReference("task type"));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the type label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the type belongs to the fixed posting-type set.
    #[must_use]
    pub fn is_posting_type(&self) -> bool {
        Self::POSTING_TYPES.contains(&self.0.as_str())
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
