//! Settings storage
//!
//! Loads and saves facade settings from an XDG-compliant location.

mod xdg;

pub use xdg::{SettingsStoreError, XdgSettingsStore};
