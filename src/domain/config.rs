//! Facade settings value object

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default name of the driver tried first
pub const DEFAULT_BASE_DRIVER: &str = "native";
/// Default name of the driver bound alongside the base on first use
pub const DEFAULT_ALTERNATIVE_DRIVER: &str = "command";

/// Facade configuration.
/// All fields are optional to support partial settings and merging.
///
/// Drivers may contribute fragments of this at registration time (the
/// command driver contributes its resolved tool, for example); explicit
/// `config()` calls merge the same way. Unknown keys land in `extra` and
/// are carried verbatim for driver-specific use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub base_driver: Option<String>,
    pub alternative_driver: Option<String>,
    pub command_tool: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Settings {
    /// Create settings with default values
    pub fn defaults() -> Self {
        Self {
            base_driver: Some(DEFAULT_BASE_DRIVER.to_string()),
            alternative_driver: Some(DEFAULT_ALTERNATIVE_DRIVER.to_string()),
            command_tool: None,
            extra: BTreeMap::new(),
        }
    }

    /// Create empty settings (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge these settings with another, where other takes precedence.
    /// Only set values from other override; extra keys overwrite per key.
    pub fn merge(self, other: Self) -> Self {
        let mut extra = self.extra;
        extra.extend(other.extra);
        Self {
            base_driver: other.base_driver.or(self.base_driver),
            alternative_driver: other.alternative_driver.or(self.alternative_driver),
            command_tool: other.command_tool.or(self.command_tool),
            extra,
        }
    }

    /// Get the base driver name, or the built-in default if not set
    pub fn base_driver_or_default(&self) -> &str {
        self.base_driver.as_deref().unwrap_or(DEFAULT_BASE_DRIVER)
    }

    /// Get the alternative driver name, if any is configured.
    ///
    /// Unlike the base driver this has no implicit fallback once it is
    /// explicitly cleared: merging `alternative_driver: None` leaves any
    /// earlier value in place, so "no alternative" is expressed by never
    /// setting one on construction.
    pub fn alternative_driver(&self) -> Option<&str> {
        self.alternative_driver.as_deref()
    }

    pub fn command_tool(&self) -> Option<&str> {
        self.command_tool.as_deref()
    }

    /// Get a driver-specific extra value
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_have_expected_values() {
        let settings = Settings::defaults();
        assert_eq!(settings.base_driver_or_default(), "native");
        assert_eq!(settings.alternative_driver(), Some("command"));
        assert!(settings.command_tool().is_none());
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn empty_has_all_none() {
        let settings = Settings::empty();
        assert!(settings.base_driver.is_none());
        assert!(settings.alternative_driver.is_none());
        assert!(settings.command_tool.is_none());
        // base driver accessor still falls back
        assert_eq!(settings.base_driver_or_default(), "native");
        assert!(settings.alternative_driver().is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = Settings {
            base_driver: Some("native".to_string()),
            alternative_driver: Some("command".to_string()),
            ..Default::default()
        };
        let other = Settings {
            base_driver: Some("command".to_string()),
            alternative_driver: None, // Should not override
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.base_driver_or_default(), "command");
        assert_eq!(merged.alternative_driver(), Some("command"));
    }

    #[test]
    fn merge_extra_keys_overwrite_per_key() {
        let mut base = Settings::empty();
        base.extra.insert("bridge".to_string(), json!("v1"));
        base.extra.insert("retries".to_string(), json!(2));

        let mut other = Settings::empty();
        other.extra.insert("bridge".to_string(), json!("v2"));

        let merged = base.merge(other);
        assert_eq!(merged.extra("bridge"), Some(&json!("v2")));
        assert_eq!(merged.extra("retries"), Some(&json!(2)));
    }

    #[test]
    fn deserializes_unknown_keys_into_extra() {
        let settings: Settings = toml::from_str(
            r#"
            base_driver = "command"
            command_tool = "xclip"
            bridge_path = "/opt/bridge"
            "#,
        )
        .unwrap();

        assert_eq!(settings.base_driver_or_default(), "command");
        assert_eq!(settings.command_tool(), Some("xclip"));
        assert_eq!(settings.extra("bridge_path"), Some(&json!("/opt/bridge")));
    }
}
