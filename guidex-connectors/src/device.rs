//! Platform collaborators
//!
//! Everything the app asks the phone to do (speak, ring, dial, text, locate,
//! vibrate) goes through one of these traits. Production builds bind them to
//! the platform; [`crate::recording::RecordingDevice`] implements all of them
//! in memory.
//!
//! Actions report failure through [`ActionError`] instead of showing an
//! alert. Callers decide whether a failure matters.

use std::sync::Arc;

use async_trait::async_trait;
use guidex_core::PhoneNumber;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a platform action
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The user refused the permission the action needs
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The device cannot perform the action at all
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The action was attempted and failed
    #[error("Action failed: {0}")]
    Failed(String),
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Bundled alarm sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmSound {
    /// Played when a fall is detected
    Fall,
    /// Played when the user presses "Get Help"
    Help,
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Result reported by the platform SMS composer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsStatus {
    Sent,
    Cancelled,
    /// The platform cannot tell (iOS reports this for every send)
    Unknown,
}

#[async_trait]
pub trait AlarmPlayer: Send + Sync {
    /// Start playing `sound`
    async fn play(&self, sound: AlarmSound) -> ActionResult<()>;

    /// Stop `sound` if it is playing
    async fn stop(&self, sound: AlarmSound) -> ActionResult<()>;
}

#[async_trait]
pub trait Telephony: Send + Sync {
    /// Hand a `tel:` or `sms:` URI to the platform
    async fn open_url(&self, url: &str) -> ActionResult<()>;

    /// Compose an SMS to `recipients` through the platform composer
    async fn send_sms(&self, recipients: &[PhoneNumber], body: &str) -> ActionResult<SmsStatus>;
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Current position, requesting foreground permission if needed
    async fn current_position(&self) -> ActionResult<Coordinates>;
}

#[async_trait]
pub trait Announcer: Send + Sync {
    /// Speak `text` at `rate` (1.0 is the platform default)
    async fn speak(&self, text: &str, rate: f32) -> ActionResult<()>;
}

/// Vibration is fire-and-forget on every platform
pub trait Haptics: Send + Sync {
    fn vibrate(&self) -> ActionResult<()>;
}

/// The set of collaborators the emergency and help flows need
#[derive(Clone)]
pub struct Devices {
    pub alarm: Arc<dyn AlarmPlayer>,
    pub telephony: Arc<dyn Telephony>,
    pub location: Arc<dyn LocationProvider>,
    pub announcer: Arc<dyn Announcer>,
    pub haptics: Arc<dyn Haptics>,
}

impl Devices {
    /// Use one object for every collaborator
    pub fn from_shared<D>(device: Arc<D>) -> Self
    where
        D: AlarmPlayer + Telephony + LocationProvider + Announcer + Haptics + 'static,
    {
        Self {
            alarm: device.clone(),
            telephony: device.clone(),
            location: device.clone(),
            announcer: device.clone(),
            haptics: device,
        }
    }
}

impl std::fmt::Debug for Devices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Devices").finish_non_exhaustive()
    }
}
