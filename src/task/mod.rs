//! Task review workflow for a session of the agency dashboard.
//!
//! Tasks move through a review pipeline whose legal transitions depend on the
//! actor's role, their relation to the task and the dashboard view in use.
//! Completed tasks can spawn one derived posting task, the bin supports
//! all-or-nothing bulk operations, and every mutation is applied
//! optimistically to a session replica that a change feed keeps in step with
//! other sessions. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The session replica in [`store`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod store;

#[cfg(test)]
mod tests;
