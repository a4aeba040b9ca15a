//! Runtime configuration.
//!
//! `Config::default()` matches the flag selector markup of the target
//! board. A userscript loader can override any field by passing JSON to
//! `install_with_config`; omitted fields keep their defaults.

use serde::Deserialize;

use crate::error::ConfigError;

/// Persistence keys, one per logical setting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageKeys {
    pub eligible: String,
    pub enabled: String,
    pub prevent_duplicates: String,
    pub last_roll: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            eligible: "flagRandomizerEligibleFlags".to_string(),
            enabled: "flagRandomizerEnabled".to_string(),
            prevent_duplicates: "flagRandomizerPreventDuplicates".to_string(),
            last_roll: "flagRandomizerLastRoll".to_string(),
        }
    }
}

/// A fixed subset of choice identifiers with its own "clear" shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceGroup {
    /// Path segment used by `/panel/clear/{group}`.
    pub key: String,
    pub label: String,
    pub members: Vec<String>,
}

impl ChoiceGroup {
    pub(crate) fn new(key: &str, label: &str, members: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.members.iter().any(|m| m == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage_keys: StorageKeys,
    /// CSS selector matching every flag selector widget.
    pub widget_selector: String,
    pub trigger_class: String,
    pub trigger_label: String,
    pub trigger_title: String,
    /// Idempotency marker attribute set to `"true"` on processed widgets.
    pub marker_attribute: String,
    /// Attribute pairing a widget with its trigger.
    pub correlation_attribute: String,
    /// Upper bound on draws when avoiding a repeat of the last roll.
    pub max_roll_attempts: usize,
    pub choice_groups: Vec<ChoiceGroup>,
    /// `log` level filter name, e.g. `"info"` or `"debug"`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_keys: StorageKeys::default(),
            widget_selector: "select.flagSelector".to_string(),
            trigger_class: "flag-randomizer-btn".to_string(),
            trigger_label: "\u{1F3B2}".to_string(), // 🎲
            trigger_title: "Randomize flag".to_string(),
            marker_attribute: "data-has-randomizer".to_string(),
            correlation_attribute: "data-flag-selector-id".to_string(),
            max_roll_attempts: 100,
            choice_groups: vec![
                ChoiceGroup::new(
                    "eqg",
                    "Clear EQG",
                    &[
                        "ADA", "AB", "SON", "SUS", "EQA", "EQF", "EQP", "EQR", "EQT", "EQI",
                        "EQS", "ERA",
                    ],
                ),
                ChoiceGroup::new("g5", "Clear G5", &["HT", "IZ", "PP", "SS", "SPT", "ZS"]),
                ChoiceGroup::new(
                    "tfh",
                    "Clear TFH",
                    &["TFA", "TFO", "TFP", "TFS", "TFT", "TFV", "TP"],
                ),
            ],
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a JSON override document and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = if json.trim().is_empty() {
            Config::default()
        } else {
            serde_json::from_str(json)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.widget_selector.trim().is_empty() {
            return Err(ConfigError::Invalid("widget_selector must not be empty".into()));
        }
        if self.trigger_class.trim().is_empty() {
            return Err(ConfigError::Invalid("trigger_class must not be empty".into()));
        }
        if self.max_roll_attempts == 0 {
            return Err(ConfigError::Invalid("max_roll_attempts must be at least 1".into()));
        }

        for (field, name) in [
            ("marker_attribute", &self.marker_attribute),
            ("correlation_attribute", &self.correlation_attribute),
        ] {
            if !is_attribute_name(name) {
                return Err(ConfigError::Invalid(format!(
                    "{} `{}` is not a valid attribute name",
                    field, name
                )));
            }
        }
        if self.marker_attribute == self.correlation_attribute {
            return Err(ConfigError::Invalid(
                "marker_attribute and correlation_attribute must differ".into(),
            ));
        }

        let keys = [
            &self.storage_keys.eligible,
            &self.storage_keys.enabled,
            &self.storage_keys.prevent_duplicates,
            &self.storage_keys.last_roll,
        ];
        if keys.iter().any(|k| k.is_empty()) {
            return Err(ConfigError::Invalid("storage keys must not be empty".into()));
        }
        for (i, a) in keys.iter().enumerate() {
            if keys[i + 1..].contains(a) {
                return Err(ConfigError::Invalid(format!("storage key `{}` is used twice", a)));
            }
        }

        for group in &self.choice_groups {
            if group.key.is_empty() || group.key.contains('/') {
                return Err(ConfigError::Invalid(format!(
                    "choice group key `{}` must be a non-empty path segment",
                    group.key
                )));
            }
        }
        Ok(())
    }

    pub fn group(&self, key: &str) -> Option<&ChoiceGroup> {
        self.choice_groups.iter().find(|g| g.key == key)
    }

    /// The configured level, falling back to `Info` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// Names `setAttribute` accepts without throwing `InvalidCharacterError`.
fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '=' | '"' | '\'' | '/' | '<' | '>')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_board_markup() {
        let config = Config::default();
        assert_eq!(config.widget_selector, "select.flagSelector");
        assert_eq!(config.storage_keys.eligible, "flagRandomizerEligibleFlags");
        assert_eq!(config.max_roll_attempts, 100);
        assert_eq!(config.choice_groups.len(), 3);
        assert!(config.group("g5").unwrap().contains("SPT"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = Config::from_json(r#"{"max_roll_attempts": 5, "log_level": "debug"}"#)
            .unwrap();
        assert_eq!(config.max_roll_attempts, 5);
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
        assert_eq!(config.trigger_class, "flag-randomizer-btn");
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(Config::from_json("  ").unwrap(), Config::default());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(matches!(
            Config::from_json(r#"{"widget_selectr": "select"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_zero_attempts() {
        let err = Config::from_json(r#"{"max_roll_attempts": 0}"#).unwrap_err();
        assert!(err.to_string().contains("max_roll_attempts"));
    }

    #[test]
    fn rejects_shared_storage_keys() {
        let json = r#"{"storage_keys": {"enabled": "same", "last_roll": "same"}}"#;
        let err = Config::from_json(json).unwrap_err();
        assert!(err.to_string().contains("used twice"));
    }

    #[test]
    fn rejects_empty_marker_attribute() {
        let json = r#"{"marker_attribute": "", "correlation_attribute": ""}"#;
        let err = Config::from_json(json).unwrap_err();
        assert!(err.to_string().contains("marker_attribute"));
    }

    #[test]
    fn rejects_malformed_attribute_names() {
        for name in ["data has", "data=x", "data\"x", "data/x"] {
            let config = Config {
                correlation_attribute: name.to_string(),
                ..Config::default()
            };
            assert!(config.validate().is_err(), "accepted {:?}", name);
        }
        let config = Config {
            correlation_attribute: "data-has-randomizer".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = Config {
            log_level: "chatty".to_string(),
            ..Config::default()
        };
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
    }
}
