//! Fall Detection Constants
//!
//! Values observed in the field deployment of the phone app. Accelerometer
//! readings are reported in g, so a phone lying still reads roughly 1 g.

/// Magnitude of the combined acceleration vector above which a fall is suspected (g).
///
/// At rest the magnitude is close to 1 g, so this threshold is sensitive:
/// brisk handling of the phone already exceeds it.
pub const FALL_THRESHOLD_G: f32 = 1.2;

/// Magnitude of the change between consecutive samples above which a
/// shake or impact is suspected (g).
pub const VIBRATION_THRESHOLD_G: f32 = 2.5;

/// Minimum time between two fall events (milliseconds).
///
/// Measured from the timestamp of the previous trigger. Also the duration
/// of the "fall active" display state.
pub const COOLDOWN_PERIOD_MS: u64 = 5000;

/// Accelerometer polling interval (milliseconds).
pub const SAMPLE_INTERVAL_MS: u64 = 800;

/// Upper bound accepted for a threshold (g).
///
/// Consumer accelerometers saturate well below this.
pub const MAX_THRESHOLD_G: f32 = 64.0;
