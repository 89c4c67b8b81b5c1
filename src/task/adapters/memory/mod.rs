//! In-process adapters used by tests and local tooling.

mod backend;
mod directory;

pub use backend::InMemoryTaskBackend;
pub use directory::InMemoryDirectory;
