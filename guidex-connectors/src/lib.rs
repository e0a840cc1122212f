//! Device collaborators and services for GuideX
//!
//! ## Overview
//!
//! `guidex-core` decides *that* a fall happened. This crate decides what the
//! phone does about it, and hosts the other features that talk to the
//! platform:
//!
//! | Module       | Responsibility                                          |
//! |--------------|---------------------------------------------------------|
//! | `device`     | Traits for alarm, telephony, location, speech, haptics  |
//! | `recording`  | In-memory device implementing every trait               |
//! | `emergency`  | Voice prompt, alarm, dial, delayed SMS with location    |
//! | `help`       | "Get Help" button: vibrate, timed alarm, help SMS       |
//! | `guidance`   | Spoken welcome and time-set confirmations               |
//! | `monitor`    | Async task owning the detector and dispatching alerts   |
//! | `reminders`  | One-off, daily and weekly reminder notifications        |
//! | `storage`    | Key-value persistence (memory, JSON files)              |
//! | `message`    | SMS wording, `tel:`/`sms:` URIs, address and health text |
//! | `schedule`   | Cancellable delayed actions                             |
//! | `config`     | The app's JSON configuration                            |
//!
//! ## Failure Policy
//!
//! Platform actions return [`device::ActionError`]. The emergency and help
//! flows never stop at the first failure: each step is attempted, its
//! outcome recorded in a report, and failures logged. Nothing is retried
//! automatically.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use guidex_connectors::{
//!     config::AppConfig,
//!     device::Devices,
//!     emergency::EmergencyDispatcher,
//!     monitor::FallMonitor,
//!     recording::RecordingDevice,
//! };
//! use guidex_core::FallDetector;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_file("guidex.json")?;
//! let devices = Devices::from_shared(Arc::new(RecordingDevice::new()));
//!
//! let detector = FallDetector::new(config.detector)?;
//! let dispatcher = Arc::new(EmergencyDispatcher::new(config.emergency, devices));
//! let monitor = FallMonitor::spawn(detector, dispatcher, config.monitor);
//!
//! monitor.send_reading(0.02, -0.01, 0.98).await?;
//! let stats = monitor.shutdown().await?;
//! println!("{} samples", stats.samples_processed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod device;
pub mod emergency;
pub mod guidance;
pub mod help;
pub mod message;
pub mod monitor;
pub mod recording;
pub mod reminders;
pub mod schedule;
pub mod storage;

// Re-export common types
pub use config::{AppConfig, ConfigError};
pub use device::{ActionError, ActionResult, Devices};
pub use emergency::{EmergencyDispatcher, EmergencyNotifier, EmergencyReport, StepOutcome};
pub use help::{HelpReport, HelpService};
pub use monitor::{FallMonitor, MonitorEvent, MonitorHandle, MonitorOptions};
pub use reminders::{Reminder, ReminderError, ReminderManager, Repeat};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
