//! Event types produced by the detector
//!
//! ## Overview
//!
//! A [`FallEvent`] is a momentary signal: "a fall was detected now". It is
//! never persisted. The fields beyond the timestamp exist for logging and
//! for the collaborator that decides how loudly to react.
//!
//! [`EmergencyKind`] names the situations the alert screens distinguish and
//! carries the wording shown and spoken for each.

use core::fmt;

use crate::time::Timestamp;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which threshold tripped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TriggerCause {
    /// Acceleration magnitude exceeded the fall threshold
    Impact,
    /// Change from the previous sample exceeded the vibration threshold
    Vibration,
    /// Both thresholds were exceeded by the same sample
    Both,
}

impl TriggerCause {
    /// Classify a trigger; `None` when neither threshold was exceeded
    pub fn classify(impact: bool, vibration: bool) -> Option<Self> {
        match (impact, vibration) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Impact),
            (false, true) => Some(Self::Vibration),
            (false, false) => None,
        }
    }

    /// Stable lowercase name for logs and events
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Impact => "impact",
            Self::Vibration => "vibration",
            Self::Both => "impact+vibration",
        }
    }
}

/// A detected fall
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FallEvent {
    /// Timestamp of the sample that triggered
    pub timestamp: Timestamp,
    /// Acceleration magnitude of that sample (g)
    pub magnitude: f32,
    /// Change from the previous sample (g)
    pub delta: f32,
    /// Threshold(s) that tripped
    pub cause: TriggerCause,
}

impl fmt::Display for FallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fall at {} ms ({}: magnitude {:.2} g, delta {:.2} g)",
            self.timestamp,
            self.cause.name(),
            self.magnitude,
            self.delta
        )
    }
}

/// Kind of emergency being signalled to the user and the contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EmergencyKind {
    /// Raised by the fall detector
    Fall,
    /// Raised by the user for a medical problem
    Medical,
    /// Any other request for assistance
    #[default]
    General,
}

impl EmergencyKind {
    /// Text shown on the confirmation screen
    pub const fn alert_message(&self) -> &'static str {
        match self {
            Self::Fall => "Fall Detected!\nEmergency contact will be alerted.",
            Self::Medical => "Medical Emergency!\nHelp is on the way.",
            Self::General => "Emergency Alert!\nAssistance requested.",
        }
    }

    /// Text spoken when the confirmation screen appears
    pub const fn voice_prompt(&self) -> &'static str {
        match self {
            Self::Fall => "Fall detected! Confirm emergency alert?",
            Self::Medical | Self::General => "Emergency assistance requested. Confirm?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_cause_classification() {
        assert_eq!(TriggerCause::classify(true, false), Some(TriggerCause::Impact));
        assert_eq!(TriggerCause::classify(false, true), Some(TriggerCause::Vibration));
        assert_eq!(TriggerCause::classify(true, true), Some(TriggerCause::Both));
        assert_eq!(TriggerCause::classify(false, false), None);
    }

    #[test]
    fn fall_prompt_differs_from_general() {
        assert_ne!(EmergencyKind::Fall.voice_prompt(), EmergencyKind::General.voice_prompt());
        assert_eq!(EmergencyKind::Medical.voice_prompt(), EmergencyKind::General.voice_prompt());
        assert!(EmergencyKind::Fall.alert_message().starts_with("Fall Detected!"));
    }

    #[test]
    fn event_size() {
        assert!(core::mem::size_of::<FallEvent>() <= 32);
    }
}
