//! Application configuration
//!
//! One JSON document configures the whole app:
//!
//! ```json
//! {
//!   "detector": { "fall_threshold": 1.2, "cooldown_ms": 5000 },
//!   "emergency": { "contact": "+919822115810", "sms_delay_ms": 3000 },
//!   "help": { "contacts": ["+917972432649"] },
//!   "health": { "blood_type": "O+", "allergies": "None" }
//! }
//! ```
//!
//! Every section except `emergency` may be omitted and falls back to the
//! shipped defaults.

use std::fs;
use std::path::Path;

use guidex_core::{DetectorConfig, DetectorError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    emergency::EmergencyConfig, help::HelpConfig, message::HealthInfo, monitor::MonitorOptions,
    reminders::ReminderConfig,
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid detector configuration: {0}")]
    Detector(#[from] DetectorError),

    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub detector: DetectorConfig,
    pub emergency: EmergencyConfig,
    #[serde(default)]
    pub help: HelpConfig,
    #[serde(default)]
    pub monitor: MonitorOptions,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub health: HealthInfo,
}

impl AppConfig {
    /// Configuration with defaults everywhere except the emergency contact
    pub fn new(emergency: EmergencyConfig) -> Self {
        Self {
            detector: DetectorConfig::default(),
            emergency,
            help: HelpConfig::default(),
            monitor: MonitorOptions::default(),
            reminders: ReminderConfig::default(),
            health: HealthInfo::default(),
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector.validate()?;

        let rate = self.emergency.voice_rate;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "emergency.voice_rate",
                reason: "must be finite and positive",
            });
        }
        if self.emergency.alarm_duration_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "emergency.alarm_duration_ms",
                reason: "must be greater than zero",
            });
        }
        if self.help.alarm_duration_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "help.alarm_duration_ms",
                reason: "must be greater than zero",
            });
        }
        if self.reminders.storage_key.is_empty() {
            return Err(ConfigError::Invalid {
                field: "reminders.storage_key",
                reason: "must not be empty",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidex_core::PhoneNumber;

    #[test]
    fn minimal_document_uses_defaults() {
        let config = AppConfig::from_json_str(r#"{"emergency":{"contact":"+919822115810"}}"#).unwrap();

        assert_eq!(config.detector, DetectorConfig::default());
        assert_eq!(config.emergency.sms_delay_ms, 3000);
        assert_eq!(config.help.alarm_duration_ms, 10_000);
        assert!(config.help.contacts.is_empty());
        assert_eq!(config.reminders.storage_key, "reminders");
        assert_eq!(config.health.summary(), "Blood Type: O+\nAllergies: None");
        assert!(!config.monitor.rearm_on_dispatch_failure);
    }

    #[test]
    fn partial_detector_section_keeps_other_defaults() {
        let config = AppConfig::from_json_str(
            r#"{"detector":{"fall_threshold":1.8},"emergency":{"contact":"112"},"help":{"contacts":["+917972432649"]}}"#,
        )
        .unwrap();

        assert_eq!(config.detector.fall_threshold, 1.8);
        assert_eq!(config.detector.cooldown_ms, 5000);
        assert_eq!(config.help.contacts[0].as_str(), "+917972432649");
    }

    #[test]
    fn missing_contact_is_a_parse_error() {
        assert!(matches!(AppConfig::from_json_str("{}"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            AppConfig::from_json_str(r#"{"emergency":{"contact":"dial me"}}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn invalid_detector_values_rejected() {
        let result = AppConfig::from_json_str(
            r#"{"detector":{"cooldown_ms":0},"emergency":{"contact":"112"}}"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Detector(DetectorError::InvalidDuration { name: "cooldown_ms" }))
        ));
    }

    #[test]
    fn zero_alarm_duration_rejected() {
        let mut config = AppConfig::new(EmergencyConfig::new(PhoneNumber::parse("112").unwrap()));
        config.help.alarm_duration_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "help.alarm_duration_ms", .. })
        ));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guidex.json");

        let config = AppConfig::new(EmergencyConfig::new(PhoneNumber::parse("+919822115810").unwrap()));
        fs::write(&path, config.to_json_pretty().unwrap()).unwrap();

        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
    }
}
