//! Detector configuration
//!
//! Defaults reproduce the values the phone app shipped with
//! (see [`crate::constants::detection`]). Deployments can tighten or relax
//! them with the `with_*` builders; [`DetectorConfig::validate`] runs when a
//! detector is constructed so a bad value is rejected before the first sample.
//!
//! ```rust
//! use guidex_core::DetectorConfig;
//!
//! let config = DetectorConfig::default()
//!     .with_fall_threshold(1.8)
//!     .with_cooldown_ms(10_000);
//! assert!(config.validate().is_ok());
//! ```

use crate::{
    constants::detection::{
        COOLDOWN_PERIOD_MS, FALL_THRESHOLD_G, MAX_THRESHOLD_G, SAMPLE_INTERVAL_MS,
        VIBRATION_THRESHOLD_G,
    },
    errors::{DetectorError, DetectorResult},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Thresholds and timing of the fall heuristic
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    /// Acceleration magnitude above which a fall is suspected (g)
    pub fall_threshold: f32,

    /// Sample-to-sample change above which a fall is suspected (g)
    pub vibration_threshold: f32,

    /// Minimum time between two fall events (ms)
    pub cooldown_ms: u64,

    /// Expected time between sensor polls (ms)
    pub sample_interval_ms: u64,

    /// Use the first sample as the baseline instead of the zero vector.
    ///
    /// Off by default: the first reading is compared against zero, which can
    /// fire on start-up when the device is already at ~1 g.
    pub prime_with_first_sample: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            fall_threshold: FALL_THRESHOLD_G,
            vibration_threshold: VIBRATION_THRESHOLD_G,
            cooldown_ms: COOLDOWN_PERIOD_MS,
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            prime_with_first_sample: false,
        }
    }
}

impl DetectorConfig {
    /// Set the magnitude threshold (g)
    pub fn with_fall_threshold(mut self, threshold: f32) -> Self {
        self.fall_threshold = threshold;
        self
    }

    /// Set the delta threshold (g)
    pub fn with_vibration_threshold(mut self, threshold: f32) -> Self {
        self.vibration_threshold = threshold;
        self
    }

    /// Set the minimum time between triggers
    pub fn with_cooldown_ms(mut self, cooldown_ms: u64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    /// Set the expected sensor update interval
    pub fn with_sample_interval_ms(mut self, interval_ms: u64) -> Self {
        self.sample_interval_ms = interval_ms;
        self
    }

    /// Use the first sample as the delta baseline instead of zero
    pub fn with_first_sample_priming(mut self, enabled: bool) -> Self {
        self.prime_with_first_sample = enabled;
        self
    }

    /// Check every field, reporting the first invalid one
    pub fn validate(&self) -> DetectorResult<()> {
        check_threshold("fall_threshold", self.fall_threshold)?;
        check_threshold("vibration_threshold", self.vibration_threshold)?;

        if self.cooldown_ms == 0 {
            return Err(DetectorError::InvalidDuration { name: "cooldown_ms" });
        }
        if self.sample_interval_ms == 0 {
            return Err(DetectorError::InvalidDuration { name: "sample_interval_ms" });
        }

        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f32) -> DetectorResult<()> {
    if !value.is_finite() || value <= 0.0 || value > MAX_THRESHOLD_G {
        return Err(DetectorError::InvalidThreshold { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_field_values() {
        let config = DetectorConfig::default();
        assert_eq!(config.fall_threshold, 1.2);
        assert_eq!(config.vibration_threshold, 2.5);
        assert_eq!(config.cooldown_ms, 5000);
        assert_eq!(config.sample_interval_ms, 800);
        assert!(!config.prime_with_first_sample);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_positive_thresholds_rejected() {
        let config = DetectorConfig::default().with_fall_threshold(0.0);
        assert_eq!(
            config.validate(),
            Err(DetectorError::InvalidThreshold { name: "fall_threshold", value: 0.0 })
        );

        let config = DetectorConfig::default().with_vibration_threshold(-1.0);
        assert!(matches!(
            config.validate(),
            Err(DetectorError::InvalidThreshold { name: "vibration_threshold", .. })
        ));
    }

    #[test]
    fn nan_threshold_rejected() {
        let config = DetectorConfig::default().with_fall_threshold(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_durations_rejected() {
        let config = DetectorConfig::default().with_cooldown_ms(0);
        assert_eq!(config.validate(), Err(DetectorError::InvalidDuration { name: "cooldown_ms" }));

        let config = DetectorConfig::default().with_sample_interval_ms(0);
        assert_eq!(
            config.validate(),
            Err(DetectorError::InvalidDuration { name: "sample_interval_ms" })
        );
    }
}
