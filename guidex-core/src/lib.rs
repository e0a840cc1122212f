//! Fall detection engine for GuideX
//!
//! Turns a stream of 3-axis accelerometer samples into discrete fall events
//! using a magnitude/delta threshold heuristic with a cooldown. Designed to
//! run on the phone or on a wearable next to the sensor.
//!
//! Key constraints:
//! - No heap allocation on the sample path
//! - Timestamps come from the samples, never from a hidden clock
//! - At most one fall event per cooldown window
//!
//! ```no_run
//! use guidex_core::{AccelerationSample, DetectorConfig, FallDetector};
//!
//! let mut detector = FallDetector::new(DetectorConfig::default())?;
//!
//! // Called by the sensor driver every ~800 ms
//! if let Some(event) = detector.on_sample(AccelerationSample::new(0.1, 0.2, 2.4, 12_800))? {
//!     // Hand the event to the emergency dispatcher
//!     let _ = event;
//! }
//! # Ok::<(), guidex_core::DetectorError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod contact;
pub mod detector;
pub mod errors;
pub mod events;
pub mod sample;
pub mod stream;
pub mod time;

// Public API
pub use config::DetectorConfig;
pub use contact::PhoneNumber;
pub use detector::{DetectorState, DetectorStats, FallDetector};
pub use errors::{DetectorError, DetectorResult};
pub use events::{EmergencyKind, FallEvent, TriggerCause};
pub use sample::AccelerationSample;
pub use time::{TimeSource, Timestamp};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
