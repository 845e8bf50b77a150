//! Driver registry with active-driver tracking

use std::sync::Arc;

use thiserror::Error;

use crate::application::ports::Driver;

/// Registration errors
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("a driver named '{0}' is already registered")]
    Duplicate(String),

    #[error("driver name must be a non-empty string")]
    EmptyName,
}

/// Registry of drivers in registration order.
///
/// Registration order is load-bearing: it is the order the fallback
/// protocol scans when the active driver dies, and the order interactions
/// try concurrently bound mechanisms.
///
/// Invariant: `using`, when set, always names a registered driver; the
/// operations that remove drivers clear it as needed.
#[derive(Default)]
pub struct DriverCatalog {
    drivers: Vec<(String, Arc<dyn Driver>)>,
    using: Option<String>,
}

impl DriverCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a driver under its own name. Duplicate or empty names are
    /// rejected and the catalog is left unchanged.
    pub fn register(&mut self, driver: Arc<dyn Driver>) -> Result<(), RegistryError> {
        let name = driver.name().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.has(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.drivers.push((name, driver));
        Ok(())
    }

    /// Make `name` the active driver; unknown names are a no-op
    pub fn activate(&mut self, name: &str) {
        if self.has(name) {
            self.using = Some(name.to_string());
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.drivers.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, driver)| Arc::clone(driver))
    }

    /// Remove and return the driver under `name`, clearing the active
    /// marker when it pointed at the removed entry. The caller owns the
    /// follow-up `destroy()`.
    pub fn take(&mut self, name: &str) -> Option<Arc<dyn Driver>> {
        let index = self.drivers.iter().position(|(n, _)| n == name)?;
        let (_, driver) = self.drivers.remove(index);
        if self.using.as_deref() == Some(name) {
            self.using = None;
        }
        Some(driver)
    }

    /// Remove every driver, clearing the active marker
    pub fn drain(&mut self) -> Vec<Arc<dyn Driver>> {
        self.using = None;
        self.drivers.drain(..).map(|(_, driver)| driver).collect()
    }

    /// Name of the active driver, if any
    pub fn using(&self) -> Option<&str> {
        self.using.as_deref()
    }

    /// The active driver, if any
    pub fn current(&self) -> Option<Arc<dyn Driver>> {
        self.using().and_then(|name| {
            self.drivers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, driver)| Arc::clone(driver))
        })
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.drivers.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Registered drivers in registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn Driver>> {
        self.drivers
            .iter()
            .map(|(_, driver)| Arc::clone(driver))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::DriverError;
    use crate::domain::target::Target;
    use crate::domain::value_source::ValueSource;
    use async_trait::async_trait;

    struct StubDriver {
        name: &'static str,
    }

    #[async_trait]
    impl Driver for StubDriver {
        fn name(&self) -> &str {
            self.name
        }

        async fn check_support(&self) -> bool {
            true
        }

        async fn bind(&self, _targets: &[Target], _source: &ValueSource) -> Result<(), DriverError> {
            Ok(())
        }

        async fn interact(&self, target: &Target) -> Result<(), DriverError> {
            Err(DriverError::NotBound(target.id().to_string()))
        }

        async fn destroy(&self) {}
    }

    fn stub(name: &'static str) -> Arc<dyn Driver> {
        Arc::new(StubDriver { name })
    }

    #[test]
    fn register_then_lookup() {
        let mut catalog = DriverCatalog::new();
        catalog.register(stub("native")).unwrap();

        assert!(catalog.has("native"));
        assert!(catalog.get("native").is_some());
        assert!(catalog.get("command").is_none());
        assert_eq!(catalog.names(), vec!["native"]);
    }

    #[test]
    fn duplicate_name_is_rejected_and_first_kept() {
        let mut catalog = DriverCatalog::new();
        catalog.register(stub("native")).unwrap();

        let err = catalog.register(stub("native")).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(name) if name == "native"));
        assert_eq!(catalog.names().len(), 1);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut catalog = DriverCatalog::new();
        let err = catalog.register(stub("")).unwrap_err();
        assert!(matches!(err, RegistryError::EmptyName));
        assert!(catalog.is_empty());
    }

    #[test]
    fn activate_ignores_unknown_names() {
        let mut catalog = DriverCatalog::new();
        catalog.register(stub("native")).unwrap();

        catalog.activate("command");
        assert!(catalog.using().is_none());

        catalog.activate("native");
        assert_eq!(catalog.using(), Some("native"));
        assert_eq!(catalog.current().unwrap().name(), "native");
    }

    #[test]
    fn take_clears_active_marker_for_removed_driver() {
        let mut catalog = DriverCatalog::new();
        catalog.register(stub("native")).unwrap();
        catalog.register(stub("command")).unwrap();
        catalog.activate("native");

        let removed = catalog.take("native").unwrap();
        assert_eq!(removed.name(), "native");
        assert!(catalog.using().is_none());
        assert!(catalog.current().is_none());
        assert_eq!(catalog.names(), vec!["command"]);

        assert!(catalog.take("native").is_none());
    }

    #[test]
    fn take_keeps_active_marker_for_other_drivers() {
        let mut catalog = DriverCatalog::new();
        catalog.register(stub("native")).unwrap();
        catalog.register(stub("command")).unwrap();
        catalog.activate("command");

        catalog.take("native");
        assert_eq!(catalog.using(), Some("command"));
    }

    #[test]
    fn snapshot_preserves_registration_order() {
        let mut catalog = DriverCatalog::new();
        catalog.register(stub("native")).unwrap();
        catalog.register(stub("command")).unwrap();
        catalog.register(stub("bridge")).unwrap();

        let order: Vec<_> = catalog
            .snapshot()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(order, vec!["native", "command", "bridge"]);
    }

    #[test]
    fn drain_empties_the_catalog() {
        let mut catalog = DriverCatalog::new();
        catalog.register(stub("native")).unwrap();
        catalog.activate("native");

        let drained = catalog.drain();
        assert_eq!(drained.len(), 1);
        assert!(catalog.is_empty());
        assert!(catalog.using().is_none());
    }
}
