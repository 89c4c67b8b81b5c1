//! Adapter implementations of the task workflow ports.

pub mod memory;
