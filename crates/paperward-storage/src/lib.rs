//! In-memory adapters for the paperward authorization ports, suitable for
//! tests, demos, and single-process deployments.

pub mod hierarchy;
pub mod memory;

pub use hierarchy::InMemoryResourceLookup;
pub use memory::InMemoryPermissionStore;
