//! Port interfaces (traits) for clipboard mechanisms
//!
//! These traits define the boundary between the orchestration layer
//! and concrete clipboard mechanisms.

pub mod driver;

// Re-export common types
pub use driver::{BindingSet, Driver, DriverError};
