//! Driver port interface

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::config::Settings;
use crate::domain::target::Target;
use crate::domain::value_source::ValueSource;

/// Driver errors
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    #[error("target '{0}' is not bound to this driver")]
    NotBound(String),

    #[error("mechanism unsupported: {0}")]
    Unsupported(String),

    #[error("copy failed: {0}")]
    CommitFailed(String),
}

/// Port for one clipboard mechanism.
///
/// A driver owns its binding state privately and reports interaction
/// outcomes itself, as events on the bus it was constructed with; the
/// `Result` values here exist so the facade can sequence mechanisms, not
/// as the primary reporting channel.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Immutable mechanism name, set once at construction
    fn name(&self) -> &str;

    /// Capability probe for the current environment. Idempotent; costly
    /// probes memoize their first answer.
    ///
    /// A positive answer is a hint, not a promise: some mechanisms only
    /// reveal failure at first use, which [`Driver::interact`] reports as
    /// a support fault.
    async fn check_support(&self) -> bool;

    /// Bind copy behavior for `targets`, resolving text through `source`
    /// at interaction time
    async fn bind(&self, targets: &[Target], source: &ValueSource) -> Result<(), DriverError>;

    /// Attempt the mechanism for a previously bound target.
    ///
    /// Support is re-validated on this path; the outcome is published on
    /// the bus as a copy event or an error event.
    async fn interact(&self, target: &Target) -> Result<(), DriverError>;

    /// Release every binding and resource owned by this driver
    async fn destroy(&self);

    /// Settings fragment contributed at registration time
    fn settings(&self) -> Settings {
        Settings::empty()
    }
}

struct Binding {
    targets: Vec<Target>,
    source: ValueSource,
}

/// Binding state shared by driver implementations.
///
/// Each `bind` call is recorded separately; when the same target appears
/// in several bindings the most recent one wins, so re-binding a target
/// with a new value source behaves as an update.
#[derive(Default)]
pub struct BindingSet {
    bindings: Mutex<Vec<Binding>>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn bindings(&self) -> MutexGuard<'_, Vec<Binding>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a binding for `targets`
    pub fn bind(&self, targets: &[Target], source: &ValueSource) {
        self.bindings().push(Binding {
            targets: targets.to_vec(),
            source: source.clone(),
        });
    }

    /// The value source for `target`, from the most recent binding that
    /// includes it
    pub fn source_for(&self, target: &Target) -> Option<ValueSource> {
        self.bindings()
            .iter()
            .rev()
            .find(|binding| binding.targets.iter().any(|t| t.id() == target.id()))
            .map(|binding| binding.source.clone())
    }

    /// Drop every recorded binding
    pub fn clear(&self) {
        self.bindings().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bindings().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_target_has_no_source() {
        let bindings = BindingSet::new();
        assert!(bindings.source_for(&Target::new("a")).is_none());
        assert!(bindings.is_empty());
    }

    #[test]
    fn most_recent_binding_wins_for_a_target() {
        let bindings = BindingSet::new();
        let target = Target::new("a");
        bindings.bind(&[target.clone()], &ValueSource::from("old"));
        bindings.bind(&[target.clone()], &ValueSource::from("new"));

        let source = bindings.source_for(&target).unwrap();
        assert_eq!(source.resolve(&target, None), "new");
    }

    #[test]
    fn binding_covers_every_listed_target() {
        let bindings = BindingSet::new();
        let a = Target::new("a");
        let b = Target::new("b");
        bindings.bind(&[a.clone(), b.clone()], &ValueSource::from("text"));

        assert!(bindings.source_for(&a).is_some());
        assert!(bindings.source_for(&b).is_some());
        assert!(bindings.source_for(&Target::new("c")).is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let bindings = BindingSet::new();
        let target = Target::new("a");
        bindings.bind(&[target.clone()], &ValueSource::from("text"));
        bindings.clear();
        assert!(bindings.source_for(&target).is_none());
        assert!(bindings.is_empty());
    }
}
