//! Copy-binding facade and the driver fallback protocol

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::application::bus::{EventBus, HandlerId};
use crate::application::catalog::{DriverCatalog, RegistryError};
use crate::application::custom::{CallbackDriver, DriverSpec};
use crate::application::ports::{Driver, DriverError};
use crate::domain::config::Settings;
use crate::domain::event::{ClipEvent, EventKind, FaultKind};
use crate::domain::target::{Target, TargetSelector};
use crate::domain::value_source::ValueSource;

/// Errors returned synchronously by the facade.
///
/// These are the programmer-misuse category: bad arguments and bad
/// registrations fail the call that made them. Environment problems never
/// appear here; they travel the error channel and, where a fallback
/// exists, are recovered automatically.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("copy requires at least one target")]
    InvalidArguments,

    #[error("no driver named '{0}' is registered")]
    DriverMissing(String),

    #[error("target '{0}' is not bound to any driver")]
    TargetNotBound(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// The most recent binding request, kept so a driver activated by the
/// fallback protocol can be bound to the same work.
#[derive(Clone)]
struct Session {
    targets: Vec<Target>,
    source: ValueSource,
}

struct Shared {
    bus: EventBus,
    catalog: Mutex<DriverCatalog>,
    settings: Mutex<Settings>,
    session: Mutex<Option<Session>>,
    watcher_installed: AtomicBool,
}

impl Shared {
    fn catalog(&self) -> MutexGuard<'_, DriverCatalog> {
        self.catalog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settings(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The public entry point: binds copy behavior to targets, routes
/// interactions to drivers, and keeps the stack healthy by rotating away
/// from mechanisms that die at interaction time.
///
/// One instance owns the whole state (bus, catalog, settings, binding
/// session) from construction to [`Clipbind::destroy`]. Constructed bare
/// it has no drivers; [`crate::infrastructure::create_binder`] registers
/// the built-in ones.
///
/// Cloning is shallow: clones share the same state.
#[derive(Clone)]
pub struct Clipbind {
    shared: Arc<Shared>,
}

impl Default for Clipbind {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipbind {
    /// Create a facade with default settings and an empty catalog
    pub fn new() -> Self {
        Self::with_settings(Settings::defaults())
    }

    /// Create a facade with caller-supplied settings
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            shared: Arc::new(Shared {
                bus: EventBus::new(),
                catalog: Mutex::new(DriverCatalog::new()),
                settings: Mutex::new(settings),
                session: Mutex::new(None),
                watcher_installed: AtomicBool::new(false),
            }),
        }
    }

    /// Handle to the notification bus, for driver constructors and
    /// external publishers
    pub fn bus(&self) -> EventBus {
        self.shared.bus.clone()
    }

    /// Bind copy-on-interaction behavior for `targets`.
    ///
    /// On the first call the configured base driver is activated and bound
    /// without a support pre-check; mechanisms are trusted until an
    /// interaction proves otherwise. A configured alternative driver is
    /// bound alongside when it claims support, so both mechanisms listen
    /// and whichever commits first on interaction wins; an alternative
    /// that disclaims support is removed from the catalog on the spot.
    /// Later calls bind through the active driver only.
    pub async fn copy(
        &self,
        targets: impl Into<TargetSelector>,
        source: impl Into<ValueSource>,
    ) -> Result<(), CopyError> {
        let targets = targets.into().resolve();
        if targets.is_empty() {
            return Err(CopyError::InvalidArguments);
        }
        let source = source.into();

        self.install_support_watcher();
        *self.shared.session() = Some(Session {
            targets: targets.clone(),
            source: source.clone(),
        });

        let active = self.shared.catalog().current();
        if let Some(active) = active {
            active.bind(&targets, &source).await?;
            return Ok(());
        }

        let (base_name, alternative_name) = {
            let settings = self.shared.settings();
            (
                settings.base_driver_or_default().to_string(),
                settings.alternative_driver().map(str::to_string),
            )
        };

        let base = {
            let mut catalog = self.shared.catalog();
            let Some(driver) = catalog.get(&base_name) else {
                return Err(CopyError::DriverMissing(base_name));
            };
            catalog.activate(&base_name);
            driver
        };
        base.bind(&targets, &source).await?;
        log::debug!("driver '{base_name}' is active");

        if let Some(alternative_name) = alternative_name.filter(|name| *name != base_name) {
            let alternative = self.shared.catalog().get(&alternative_name);
            if let Some(alternative) = alternative {
                if alternative.check_support().await {
                    alternative.bind(&targets, &source).await?;
                    log::debug!("alternative driver '{alternative_name}' bound alongside");
                } else {
                    log::debug!("alternative driver '{alternative_name}' unsupported, removing");
                    self.remove(&alternative_name).await;
                }
            }
        }

        Ok(())
    }

    /// Run the copy interaction for one bound target.
    ///
    /// The active driver attempts first, then any other mechanism bound to
    /// the target, in registration order; the first successful commit wins
    /// and the rest are suppressed. Outcomes, including a failing driver
    /// being rotated out, are observable only through events; the only
    /// synchronous error is a target nothing has bound.
    pub async fn interact(&self, target: &Target) -> Result<(), CopyError> {
        let drivers = {
            let catalog = self.shared.catalog();
            let mut drivers = catalog.snapshot();
            if let Some(active) = catalog.using() {
                if let Some(index) = drivers.iter().position(|d| d.name() == active) {
                    let active = drivers.remove(index);
                    drivers.insert(0, active);
                }
            }
            drivers
        };

        let mut attempted = false;
        for driver in drivers {
            match driver.interact(target).await {
                Ok(()) => return Ok(()),
                Err(DriverError::NotBound(_)) => continue,
                // Reported by the driver on the error channel; let the
                // next bound mechanism claim the interaction.
                Err(_) => attempted = true,
            }
        }

        if attempted {
            Ok(())
        } else {
            Err(CopyError::TargetNotBound(target.id().to_string()))
        }
    }

    /// Merge `options` into the settings; last write wins. Takes effect
    /// the next time an operation reads the affected key.
    pub fn config(&self, options: Settings) {
        let mut settings = self.shared.settings();
        let merged = settings.clone().merge(options);
        *settings = merged;
    }

    /// Current settings snapshot
    pub fn settings(&self) -> Settings {
        self.shared.settings().clone()
    }

    /// Tear everything down: destroy every registered driver (active or
    /// not), clear the catalog, the binding session and all
    /// subscriptions. Safe to call repeatedly, and safe before any copy.
    ///
    /// The destroy notification is scheduled first but its debounce window
    /// outlives the subscriptions, which are cleared here, so external
    /// subscribers do not observe it. Clearing handlers before a pending
    /// dispatch fires suppresses that dispatch.
    pub async fn destroy(&self) {
        self.shared.bus.trigger(ClipEvent::destroyed());

        let drivers = self.shared.catalog().drain();
        for driver in drivers {
            driver.destroy().await;
        }

        *self.shared.session() = None;
        self.shared.bus.off_all();
        self.shared.watcher_installed.store(false, Ordering::SeqCst);
    }

    // --- driver registration -------------------------------------------

    /// Register a driver, merging its settings contribution; duplicate and
    /// empty names are rejected
    pub fn register(&self, driver: Arc<dyn Driver>) -> Result<(), RegistryError> {
        let contribution = driver.settings();
        self.shared.catalog().register(driver)?;
        let mut settings = self.shared.settings();
        let merged = settings.clone().merge(contribution);
        *settings = merged;
        Ok(())
    }

    /// Build a [`CallbackDriver`] from `spec` and register it.
    ///
    /// `Ok(true)` means registered. An invalid spec is `Ok(false)`: the
    /// rejection is reported as a "driver-error" event, not returned;
    /// subscribe to the error channel to observe it. Only a name conflict
    /// with an existing driver is a synchronous error.
    pub fn define(&self, name: &str, spec: DriverSpec) -> Result<bool, RegistryError> {
        match CallbackDriver::new(name, spec, self.bus()) {
            Some(driver) => {
                self.register(Arc::new(driver))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Destroy and remove the driver under `name`; unknown names are a
    /// no-op. Returns whether a driver was removed.
    pub async fn remove(&self, name: &str) -> bool {
        let Some(driver) = self.shared.catalog().take(name) else {
            return false;
        };
        driver.destroy().await;
        true
    }

    // --- catalog introspection -----------------------------------------

    /// Name of the active driver, if any
    pub fn using(&self) -> Option<String> {
        self.shared.catalog().using().map(str::to_string)
    }

    /// The active driver, if any
    pub fn current(&self) -> Option<Arc<dyn Driver>> {
        self.shared.catalog().current()
    }

    /// Make `name` the active driver; unknown names are a no-op
    pub fn activate(&self, name: &str) {
        self.shared.catalog().activate(name);
    }

    pub fn has(&self, name: &str) -> bool {
        self.shared.catalog().has(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.shared.catalog().get(name)
    }

    /// Registered driver names in registration order
    pub fn names(&self) -> Vec<String> {
        self.shared.catalog().names()
    }

    // --- notification surface ------------------------------------------

    pub fn on(
        &self,
        kind: EventKind,
        handler: impl Fn(&ClipEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        self.shared.bus.on(kind, handler)
    }

    pub fn once(
        &self,
        kind: EventKind,
        handler: impl Fn(&ClipEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        self.shared.bus.once(kind, handler)
    }

    pub fn off(&self, kind: &EventKind) {
        self.shared.bus.off(kind);
    }

    pub fn off_all(&self) {
        self.shared.bus.off_all();
    }

    pub fn unsubscribe(&self, id: HandlerId) {
        self.shared.bus.unsubscribe(id);
    }

    pub fn trigger(&self, event: ClipEvent) {
        self.shared.bus.trigger(event);
    }

    // --- fallback protocol ---------------------------------------------

    /// Install the standing error-channel watcher that drives rotation.
    /// Installed on the first `copy` call; destroy re-arms it.
    fn install_support_watcher(&self) {
        if self.shared.watcher_installed.swap(true, Ordering::SeqCst) {
            return;
        }

        let weak = Arc::downgrade(&self.shared);
        self.shared.bus.on(EventKind::Error, move |event| {
            let support_fault = event
                .fault()
                .map(|fault| fault.kind() == &FaultKind::Support)
                .unwrap_or(false);
            if !support_fault {
                return;
            }
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let Some(failed) = event.driver().map(str::to_string) else {
                return;
            };
            let target = event.target().cloned();
            tokio::spawn(async move {
                rotate(shared, failed, target).await;
            });
        });
    }
}

/// Swap a dead driver for the next one that works.
///
/// Removes the failed driver, scans the remaining catalog in registration
/// order, binds the first driver that claims support to the recorded
/// session, makes it active, and replays the interaction that exposed the
/// failure so the user's action is not lost. A replay that fails raises a
/// fresh support fault against a smaller catalog, so the protocol
/// terminates once nothing supports the environment.
async fn rotate(shared: Arc<Shared>, failed: String, target: Option<Target>) {
    // Stale reports about drivers already rotated out must not displace a
    // working active driver.
    let Some(removed) = shared.catalog().take(&failed) else {
        return;
    };
    log::info!("driver '{failed}' lost support, rotating");
    removed.destroy().await;

    let Some(session) = shared.session().clone() else {
        return;
    };

    let candidates = shared.catalog().snapshot();
    for driver in candidates {
        if !driver.check_support().await {
            continue;
        }
        let name = driver.name().to_string();
        if let Err(error) = driver.bind(&session.targets, &session.source).await {
            log::warn!("rebinding through '{name}' failed: {error}");
            continue;
        }
        shared.catalog().activate(&name);
        log::info!("driver '{name}' is now active");

        if let Some(target) = target {
            // Outcome surfaces as the replay's own event.
            let _ = driver.interact(&target).await;
        }
        return;
    }

    log::warn!("no remaining driver supports this environment");
}
