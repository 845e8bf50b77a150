//! Caller-defined drivers built from closures

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::bus::EventBus;
use crate::application::ports::{BindingSet, Driver, DriverError};
use crate::domain::config::Settings;
use crate::domain::event::{ClipEvent, FaultKind};
use crate::domain::target::Target;
use crate::domain::value_source::ValueSource;

type SupportFn = Arc<dyn Fn() -> bool + Send + Sync>;
type CommitFn = Arc<dyn Fn(&Target, &str) -> Result<(), String> + Send + Sync>;
type TeardownFn = Arc<dyn Fn() + Send + Sync>;

/// Building blocks for a [`CallbackDriver`].
///
/// Three operations are required: `check_support`, `copy` and `destroy`.
/// A spec missing any of them never becomes a driver.
#[derive(Clone, Default)]
pub struct DriverSpec {
    check_support: Option<SupportFn>,
    copy: Option<CommitFn>,
    destroy: Option<TeardownFn>,
    settings: Settings,
}

impl DriverSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capability probe for the mechanism
    pub fn check_support(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.check_support = Some(Arc::new(f));
        self
    }

    /// Commit `text` for a target; an `Err` message becomes a copy-failed
    /// error event
    pub fn copy(
        mut self,
        f: impl Fn(&Target, &str) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.copy = Some(Arc::new(f));
        self
    }

    /// Release mechanism resources
    pub fn destroy(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.destroy = Some(Arc::new(f));
        self
    }

    /// Settings fragment contributed when the driver is registered
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    fn missing_operation(&self) -> Option<&'static str> {
        if self.check_support.is_none() {
            return Some("check_support");
        }
        if self.copy.is_none() {
            return Some("copy");
        }
        if self.destroy.is_none() {
            return Some("destroy");
        }
        None
    }
}

impl fmt::Debug for DriverSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverSpec")
            .field("check_support", &self.check_support.is_some())
            .field("copy", &self.copy.is_some())
            .field("destroy", &self.destroy.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

/// A driver whose operations are supplied as closures.
///
/// Construction is atomic: an empty name or a missing required operation
/// produces no driver at all. The rejection is reported as a single
/// "driver-error" event on the bus rather than returned to the caller, so
/// subscribers see it and the defining code path stays quiet.
pub struct CallbackDriver {
    name: String,
    bus: EventBus,
    bindings: BindingSet,
    check: SupportFn,
    commit: CommitFn,
    teardown: TeardownFn,
    settings: Settings,
}

impl CallbackDriver {
    /// Validate `spec` and build the driver, or report why not.
    ///
    /// Publishes on the bus, so it must run inside a Tokio runtime.
    pub fn new(name: &str, spec: DriverSpec, bus: EventBus) -> Option<Self> {
        if name.is_empty() {
            bus.trigger(ClipEvent::failed(
                FaultKind::DriverError,
                "driver name must be a non-empty string",
                None,
                None,
            ));
            return None;
        }
        if let Some(operation) = spec.missing_operation() {
            bus.trigger(ClipEvent::failed(
                FaultKind::DriverError,
                format!("driver '{name}' is missing required operation '{operation}'"),
                None,
                Some(name.to_string()),
            ));
            return None;
        }

        let DriverSpec {
            check_support,
            copy,
            destroy,
            settings,
        } = spec;
        Some(Self {
            name: name.to_string(),
            bus,
            bindings: BindingSet::new(),
            check: check_support?,
            commit: copy?,
            teardown: destroy?,
            settings,
        })
    }
}

#[async_trait]
impl Driver for CallbackDriver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check_support(&self) -> bool {
        (self.check)()
    }

    async fn bind(&self, targets: &[Target], source: &ValueSource) -> Result<(), DriverError> {
        self.bindings.bind(targets, source);
        Ok(())
    }

    async fn interact(&self, target: &Target) -> Result<(), DriverError> {
        let Some(source) = self.bindings.source_for(target) else {
            return Err(DriverError::NotBound(target.id().to_string()));
        };

        let text = source.resolve(target, Some(self.name.as_str()));
        match (self.commit)(target, &text) {
            Ok(()) => {
                self.bus
                    .trigger(ClipEvent::copied(Some(target.clone()), self.name.as_str(), text));
                Ok(())
            }
            Err(reason) => {
                self.bus.trigger(ClipEvent::failed(
                    FaultKind::CopyFailed,
                    reason.clone(),
                    Some(target.clone()),
                    Some(self.name.clone()),
                ));
                Err(DriverError::CommitFailed(reason))
            }
        }
    }

    async fn destroy(&self) {
        (self.teardown)();
        self.bindings.clear();
    }

    fn settings(&self) -> Settings {
        self.settings.clone()
    }
}
