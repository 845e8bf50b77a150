//! Built-in clipboard drivers
//!
//! Provides the in-process system clipboard driver (arboard) and the
//! external-tool driver used as its fallback.

mod command;
mod native;

pub use command::{CommandDriver, CopyTool, COMMAND_DRIVER};
pub use native::{NativeDriver, NATIVE_DRIVER};

use std::sync::Arc;

use crate::application::binder::Clipbind;
use crate::domain::config::Settings;

/// Create a facade with the built-in drivers registered, in fallback
/// order: native first, command second.
pub fn create_binder() -> Clipbind {
    create_binder_with(Settings::defaults())
}

/// Create a facade with caller-supplied settings and the built-in drivers
pub fn create_binder_with(settings: Settings) -> Clipbind {
    let tool = settings.command_tool().map(str::to_string);
    let binder = Clipbind::with_settings(settings);

    // A fresh catalog cannot hold duplicates, so registration failures
    // here only mean a programming error worth hearing about.
    if let Err(error) = binder.register(Arc::new(NativeDriver::new(binder.bus()))) {
        log::warn!("failed to register the native driver: {error}");
    }
    if let Err(error) = binder.register(Arc::new(CommandDriver::with_tool(binder.bus(), tool))) {
        log::warn!("failed to register the command driver: {error}");
    }

    binder
}
