//! Constants for GuideX Core
//!
//! Every numeric value used by the detector and the emergency flow lives
//! here, grouped by domain:
//! - **Detection**: thresholds and windows of the fall heuristic
//! - **Emergency**: delays and durations of the alert sequence
//!
//! Names carry their units (`_MS`, `_G`).

/// Fall heuristic thresholds, cooldown and sampling interval.
pub mod detection;

/// Timing of the emergency alert and Get Help sequences, and speech rates.
pub mod emergency;

pub use detection::{
    FALL_THRESHOLD_G, VIBRATION_THRESHOLD_G, COOLDOWN_PERIOD_MS, SAMPLE_INTERVAL_MS,
};

pub use emergency::{
    EMERGENCY_SMS_DELAY_MS, GUIDANCE_SPEECH_RATE, HELP_ALARM_DURATION_MS, VOICE_PROMPT_RATE,
};
