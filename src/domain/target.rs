//! Copy targets and target selection

/// A thing copy behavior can be bound to.
///
/// Targets are opaque handles owned by the caller: an id the application
/// understands plus an optional human-readable label. The library never
/// interprets either beyond equality on the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    id: String,
    label: Option<String>,
}

impl Target {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    pub fn with_label(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Accepted shapes for naming the targets of a copy binding.
///
/// Normalization is stateless: an id becomes a single synthetic target, a
/// list passes through as-is. Resolving an empty list yields an empty
/// result rather than an error; the facade decides what that means.
#[derive(Debug, Clone)]
pub enum TargetSelector {
    Id(String),
    One(Target),
    Many(Vec<Target>),
}

impl TargetSelector {
    /// Normalize into a concrete target list
    pub fn resolve(self) -> Vec<Target> {
        match self {
            Self::Id(id) => vec![Target::new(id)],
            Self::One(target) => vec![target],
            Self::Many(targets) => targets,
        }
    }
}

impl From<&str> for TargetSelector {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for TargetSelector {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Target> for TargetSelector {
    fn from(target: Target) -> Self {
        Self::One(target)
    }
}

impl From<Vec<Target>> for TargetSelector {
    fn from(targets: Vec<Target>) -> Self {
        Self::Many(targets)
    }
}

impl From<&[Target]> for TargetSelector {
    fn from(targets: &[Target]) -> Self {
        Self::Many(targets.to_vec())
    }
}
