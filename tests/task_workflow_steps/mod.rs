//! Step definitions for task workflow behaviour tests.

pub mod given;
pub mod when;
pub mod world;
