//! Application layer - Orchestration and port interfaces
//!
//! Contains the event bus, the driver catalog, the copy-binding facade
//! and the trait definitions drivers implement.

pub mod binder;
pub mod bus;
pub mod catalog;
pub mod custom;
pub mod ports;

// Re-export core types
pub use binder::{Clipbind, CopyError};
pub use bus::{EventBus, HandlerId, DEBOUNCE_WINDOW};
pub use catalog::{DriverCatalog, RegistryError};
pub use custom::{CallbackDriver, DriverSpec};
