//! clipbind - copy-to-clipboard binding with pluggable drivers
//!
//! This crate binds "copy this text" behavior to named targets behind a
//! driver abstraction: each driver encapsulates one clipboard mechanism
//! (capability probe, bind, interact, teardown), and the facade rotates to
//! the next working mechanism when the active one fails at interaction
//! time. Outcomes are reported through a debounced event bus that
//! coalesces bursts of near-simultaneous mechanism reports.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Events, targets, value sources, and settings
//! - **Application**: The driver port, event bus, catalog, and the
//!   copy-binding facade with its fallback protocol
//! - **Infrastructure**: Built-in driver adapters (arboard, external
//!   tools) and the XDG settings store
//! - **CLI**: Command-line interface, argument parsing, and presentation
//!
//! # Example
//!
//! ```no_run
//! use clipbind::{create_binder, EventKind, Target};
//!
//! # async fn demo() -> Result<(), clipbind::CopyError> {
//! let binder = create_binder();
//! binder.on(EventKind::Copy, |event| {
//!     println!("copied: {:?}", event.text());
//! });
//!
//! let target = Target::new("share-button");
//! binder.copy(target.clone(), "https://example.com").await?;
//! binder.interact(&target).await?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

pub use application::binder::{Clipbind, CopyError};
pub use application::bus::{EventBus, HandlerId, DEBOUNCE_WINDOW};
pub use application::catalog::{DriverCatalog, RegistryError};
pub use application::custom::{CallbackDriver, DriverSpec};
pub use application::ports::{BindingSet, Driver, DriverError};
pub use domain::{ClipEvent, EventKind, FaultKind, Settings, Target, TargetSelector, ValueSource};
pub use infrastructure::{
    create_binder, create_binder_with, CommandDriver, NativeDriver, XdgSettingsStore,
};
