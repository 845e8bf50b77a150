//! Infrastructure layer - Concrete driver adapters
//!
//! Contains the built-in clipboard drivers and the settings store.

pub mod config;
pub mod driver;

// Re-export adapters
pub use config::XdgSettingsStore;
pub use driver::{
    create_binder, create_binder_with, CommandDriver, CopyTool, NativeDriver, COMMAND_DRIVER,
    NATIVE_DRIVER,
};
