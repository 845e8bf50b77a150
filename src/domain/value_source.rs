//! Static vs. computed copy text resolution

use std::fmt;
use std::sync::Arc;

use crate::domain::event::ClipEvent;
use crate::domain::target::Target;

/// Where the text placed on the clipboard comes from.
///
/// This is the single place where "static text vs. computed text" is
/// resolved; every driver goes through [`ValueSource::resolve`] rather than
/// interpreting its input itself.
#[derive(Clone)]
pub enum ValueSource {
    /// A literal string, used as-is
    Text(String),
    /// A structured value, serialized to its canonical JSON form
    Json(serde_json::Value),
    /// A callback invoked per interaction with a copy-kind event for the
    /// interacted target; its return value is the text
    Compute(Arc<dyn Fn(&ClipEvent) -> String + Send + Sync>),
}

impl ValueSource {
    /// Build a computing source from a closure
    pub fn from_fn(f: impl Fn(&ClipEvent) -> String + Send + Sync + 'static) -> Self {
        Self::Compute(Arc::new(f))
    }

    /// Resolve the text for one interaction on `target`.
    ///
    /// `driver` names the mechanism performing the commit so a computing
    /// callback sees the same event shape a subscriber would.
    pub fn resolve(&self, target: &Target, driver: Option<&str>) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => value.to_string(),
            Self::Compute(f) => {
                let event = ClipEvent::copy_request(target.clone(), driver.map(str::to_string));
                f(&event)
            }
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

impl From<&str> for ValueSource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ValueSource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<serde_json::Value> for ValueSource {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}
