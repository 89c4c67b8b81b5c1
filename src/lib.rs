//! Atelier: task review workflow core for an agency operations dashboard.
//!
//! The crate owns the part of the dashboard that carries real invariants:
//! role- and view-scoped status transitions, the rework audit trail, derived
//! posting tasks, optimistic writes reconciled against a change feed, and bin
//! operations over a selection.
//!
//! # Architecture
//!
//! Atelier follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the hosted store and directories
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`config`]: Workflow settings
//! - [`task`]: Task lifecycle, replica and reconciliation

pub mod config;
pub mod task;
