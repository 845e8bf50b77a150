//! System clipboard driver using arboard
//!
//! Works on Windows, macOS, and Linux (X11/Wayland).

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::application::bus::EventBus;
use crate::application::ports::{BindingSet, Driver, DriverError};
use crate::domain::event::{ClipEvent, FaultKind};
use crate::domain::target::Target;
use crate::domain::value_source::ValueSource;

/// Name the native driver registers under
pub const NATIVE_DRIVER: &str = "native";

enum Commit {
    Done,
    /// No clipboard context could be opened; the mechanism itself is gone
    Unavailable(String),
    /// The context exists but the write failed
    WriteFailed(String),
}

/// In-process system clipboard driver.
///
/// The support probe asks whether a clipboard context can be created at
/// all and memoizes the answer. A context is still opened fresh on every
/// interaction: an environment that probed fine can lose its display
/// server later, and that kind of failure is reported as a support fault
/// so the facade rotates away from this driver.
pub struct NativeDriver {
    bus: EventBus,
    bindings: BindingSet,
    supported: OnceCell<bool>,
}

impl NativeDriver {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            bindings: BindingSet::new(),
            supported: OnceCell::new(),
        }
    }

    async fn probe() -> bool {
        // arboard operations are blocking, so run in spawn_blocking
        tokio::task::spawn_blocking(|| arboard::Clipboard::new().is_ok())
            .await
            .unwrap_or(false)
    }

    async fn commit(text: String) -> Commit {
        let outcome = tokio::task::spawn_blocking(move || {
            let mut clipboard = match arboard::Clipboard::new() {
                Ok(clipboard) => clipboard,
                Err(error) => return Commit::Unavailable(error.to_string()),
            };
            match clipboard.set_text(text) {
                Ok(()) => Commit::Done,
                Err(error) => Commit::WriteFailed(error.to_string()),
            }
        })
        .await;

        match outcome {
            Ok(commit) => commit,
            Err(error) => Commit::WriteFailed(format!("task join error: {error}")),
        }
    }
}

#[async_trait]
impl Driver for NativeDriver {
    fn name(&self) -> &str {
        NATIVE_DRIVER
    }

    async fn check_support(&self) -> bool {
        *self.supported.get_or_init(Self::probe).await
    }

    async fn bind(&self, targets: &[Target], source: &ValueSource) -> Result<(), DriverError> {
        self.bindings.bind(targets, source);
        Ok(())
    }

    async fn interact(&self, target: &Target) -> Result<(), DriverError> {
        let Some(source) = self.bindings.source_for(target) else {
            return Err(DriverError::NotBound(target.id().to_string()));
        };

        let text = source.resolve(target, Some(NATIVE_DRIVER));
        match Self::commit(text.clone()).await {
            Commit::Done => {
                self.bus
                    .trigger(ClipEvent::copied(Some(target.clone()), NATIVE_DRIVER, text));
                Ok(())
            }
            Commit::Unavailable(reason) => {
                log::debug!("native clipboard unavailable: {reason}");
                self.bus.trigger(ClipEvent::failed(
                    FaultKind::Support,
                    reason.clone(),
                    Some(target.clone()),
                    Some(NATIVE_DRIVER.to_string()),
                ));
                Err(DriverError::Unsupported(reason))
            }
            Commit::WriteFailed(reason) => {
                self.bus.trigger(ClipEvent::failed(
                    FaultKind::CopyFailed,
                    reason.clone(),
                    Some(target.clone()),
                    Some(NATIVE_DRIVER.to_string()),
                ));
                Err(DriverError::CommitFailed(reason))
            }
        }
    }

    async fn destroy(&self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn name_is_native() {
        let driver = NativeDriver::new(EventBus::new());
        assert_eq!(driver.name(), NATIVE_DRIVER);
    }

    #[tokio::test]
    async fn interact_on_unbound_target_never_touches_the_clipboard() {
        let driver = NativeDriver::new(EventBus::new());
        let result = driver.interact(&Target::new("nothing")).await;
        assert!(matches!(result, Err(DriverError::NotBound(id)) if id == "nothing"));
    }

    #[tokio::test]
    async fn destroy_clears_bindings() {
        let driver = NativeDriver::new(EventBus::new());
        let target = Target::new("a");
        driver
            .bind(&[target.clone()], &ValueSource::from("text"))
            .await
            .unwrap();
        driver.destroy().await;

        let result = driver.interact(&target).await;
        assert!(matches!(result, Err(DriverError::NotBound(_))));
    }

    #[tokio::test]
    async fn check_support_is_memoized() {
        let driver = NativeDriver::new(EventBus::new());
        // Whatever the environment says, it must say it twice.
        assert_eq!(driver.check_support().await, driver.check_support().await);
    }
}
