//! Identity store configuration.

use serde::{Deserialize, Serialize};
use sessionward_activity::DEFAULT_CAPACITY;
use sessionward_session::SessionConfig;
use tracing::warn;

use crate::SessionwardError;

/// Configuration for an [`IdentityStore`](crate::IdentityStore).
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```rust
/// use sessionward::StoreConfig;
///
/// let config = StoreConfig::from_json(r#"{"defaultLanguage":"fr"}"#).unwrap();
/// assert_eq!(config.default_language, "fr");
/// assert!(config.menu_visible);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Settings for the session manager actor.
    pub session: SessionConfig,

    /// Language in effect before anyone calls `set_language`.
    pub default_language: String,

    /// Whether the navigation menu starts visible.
    pub menu_visible: bool,

    /// Signals buffered per activity listener before older ones are
    /// skipped. Clamped to at least 1.
    pub activity_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            default_language: "en".to_string(),
            menu_visible: true,
            activity_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Parses a camelCase JSON document and fixes out-of-range values.
    ///
    /// # Errors
    /// [`SessionwardError::Config`] if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, SessionwardError> {
        let config: Self = serde_json::from_str(json).map_err(SessionwardError::Config)?;
        Ok(config.validated())
    }

    /// Fixes out-of-range values. Called by the store builder.
    pub fn validated(mut self) -> Self {
        self.session = self.session.validated();
        if self.activity_capacity == 0 {
            warn!("activity_capacity is 0, using 1");
            self.activity_capacity = 1;
        }
        if self.default_language.trim().is_empty() {
            warn!("default_language is blank, using \"en\"");
            self.default_language = "en".to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_empty_object_gives_defaults() {
        let config = StoreConfig::from_json("{}").expect("valid");
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_from_json_nested_session_settings() {
        let json = r#"{
            "session": { "commandChannelSize": 8, "notifyOnExpiry": false },
            "menuVisible": false,
            "activityCapacity": 16
        }"#;

        let config = StoreConfig::from_json(json).expect("valid");

        assert_eq!(config.session.command_channel_size, 8);
        assert!(!config.session.notify_on_expiry);
        assert!(!config.menu_visible);
        assert_eq!(config.activity_capacity, 16);
        assert_eq!(config.default_language, "en");
    }

    #[test]
    fn test_from_json_clamps_out_of_range_values() {
        let json = r#"{"activityCapacity":0,"defaultLanguage":" ","session":{"commandChannelSize":0}}"#;

        let config = StoreConfig::from_json(json).expect("valid");

        assert_eq!(config.activity_capacity, 1);
        assert_eq!(config.default_language, "en");
        assert_eq!(config.session.command_channel_size, 1);
    }

    #[test]
    fn test_from_json_wrong_type_is_config_error() {
        let err = StoreConfig::from_json(r#"{"menuVisible":"yes"}"#).unwrap_err();
        assert!(matches!(err, SessionwardError::Config(_)));
    }
}
