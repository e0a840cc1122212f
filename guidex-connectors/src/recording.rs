//! In-memory device
//!
//! [`RecordingDevice`] implements every collaborator trait, records each call
//! in order and can be told to fail specific actions. It backs the simulator
//! and every async test in this crate.
//!
//! ```rust
//! use std::sync::Arc;
//! use guidex_connectors::device::{ActionError, Devices};
//! use guidex_connectors::recording::{Action, RecordingDevice};
//!
//! let device = Arc::new(RecordingDevice::new());
//! device.fail(Action::Locate, ActionError::PermissionDenied("location".into()));
//! let devices = Devices::from_shared(device.clone());
//! # let _ = devices;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use guidex_core::PhoneNumber;

use crate::device::{
    ActionError, ActionResult, AlarmPlayer, AlarmSound, Announcer, Coordinates, Haptics,
    LocationProvider, SmsStatus, Telephony,
};
use crate::reminders::{ChannelConfig, NotificationContent, NotificationScheduler, Trigger};

/// Actions that can be scripted to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Play,
    Stop,
    OpenUrl,
    SendSms,
    Locate,
    Speak,
    Vibrate,
    RequestPermissions,
    ConfigureChannel,
    Schedule,
    Cancel,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Play(AlarmSound),
    Stop(AlarmSound),
    OpenUrl(String),
    SendSms { recipients: Vec<String>, body: String },
    Locate,
    Speak { text: String, rate: f32 },
    Vibrate,
    RequestPermissions,
    ConfigureChannel(ChannelConfig),
    Schedule { id: String, content: NotificationContent, trigger: Trigger },
    Cancel(String),
}

impl DeviceCall {
    fn action(&self) -> Action {
        match self {
            Self::Play(_) => Action::Play,
            Self::Stop(_) => Action::Stop,
            Self::OpenUrl(_) => Action::OpenUrl,
            Self::SendSms { .. } => Action::SendSms,
            Self::Locate => Action::Locate,
            Self::Speak { .. } => Action::Speak,
            Self::Vibrate => Action::Vibrate,
            Self::RequestPermissions => Action::RequestPermissions,
            Self::ConfigureChannel(_) => Action::ConfigureChannel,
            Self::Schedule { .. } => Action::Schedule,
            Self::Cancel(_) => Action::Cancel,
        }
    }
}

#[derive(Debug)]
struct Inner {
    calls: Vec<DeviceCall>,
    failures: HashMap<Action, ActionError>,
    position: Coordinates,
    sms_status: SmsStatus,
    permission_granted: bool,
    next_notification: u64,
    scheduled: BTreeMap<String, (NotificationContent, Trigger)>,
    playing: Vec<AlarmSound>,
}

/// Scriptable in-memory implementation of every device trait
#[derive(Debug)]
pub struct RecordingDevice {
    inner: Mutex<Inner>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    /// Device at the Pune city centre that lets everything succeed
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                calls: Vec::new(),
                failures: HashMap::new(),
                position: Coordinates::new(18.5204, 73.8567),
                sms_status: SmsStatus::Sent,
                permission_granted: true,
                next_notification: 1,
                scheduled: BTreeMap::new(),
                playing: Vec::new(),
            }),
        }
    }

    pub fn with_position(self, position: Coordinates) -> Self {
        self.lock().position = position;
        self
    }

    pub fn with_sms_status(self, status: SmsStatus) -> Self {
        self.lock().sms_status = status;
        self
    }

    pub fn with_permission(self, granted: bool) -> Self {
        self.lock().permission_granted = granted;
        self
    }

    /// Make every later `action` fail with `error`
    pub fn fail(&self, action: Action, error: ActionError) {
        self.lock().failures.insert(action, error);
    }

    /// Let `action` succeed again
    pub fn succeed(&self, action: Action) {
        self.lock().failures.remove(&action);
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// URIs handed to `open_url`, in order
    pub fn opened_urls(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::OpenUrl(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, action: Action) -> usize {
        self.lock().calls.iter().filter(|c| c.action() == action).count()
    }

    pub fn is_playing(&self, sound: AlarmSound) -> bool {
        self.lock().playing.contains(&sound)
    }

    /// Notifications scheduled and not cancelled, by id
    pub fn scheduled(&self) -> BTreeMap<String, (NotificationContent, Trigger)> {
        self.lock().scheduled.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `call` and return the scripted failure for it, if any
    fn record(&self, call: DeviceCall) -> ActionResult<MutexGuard<'_, Inner>> {
        let mut inner = self.lock();
        let action = call.action();
        inner.calls.push(call);
        if let Some(error) = inner.failures.get(&action).cloned() {
            return Err(error);
        }
        Ok(inner)
    }
}

#[async_trait]
impl AlarmPlayer for RecordingDevice {
    async fn play(&self, sound: AlarmSound) -> ActionResult<()> {
        let mut inner = self.record(DeviceCall::Play(sound))?;
        if !inner.playing.contains(&sound) {
            inner.playing.push(sound);
        }
        Ok(())
    }

    async fn stop(&self, sound: AlarmSound) -> ActionResult<()> {
        let mut inner = self.record(DeviceCall::Stop(sound))?;
        inner.playing.retain(|s| *s != sound);
        Ok(())
    }
}

#[async_trait]
impl Telephony for RecordingDevice {
    async fn open_url(&self, url: &str) -> ActionResult<()> {
        self.record(DeviceCall::OpenUrl(url.to_string()))?;
        Ok(())
    }

    async fn send_sms(&self, recipients: &[PhoneNumber], body: &str) -> ActionResult<SmsStatus> {
        let inner = self.record(DeviceCall::SendSms {
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
            body: body.to_string(),
        })?;
        Ok(inner.sms_status)
    }
}

#[async_trait]
impl LocationProvider for RecordingDevice {
    async fn current_position(&self) -> ActionResult<Coordinates> {
        let inner = self.record(DeviceCall::Locate)?;
        Ok(inner.position)
    }
}

#[async_trait]
impl Announcer for RecordingDevice {
    async fn speak(&self, text: &str, rate: f32) -> ActionResult<()> {
        self.record(DeviceCall::Speak {
            text: text.to_string(),
            rate,
        })?;
        Ok(())
    }
}

impl Haptics for RecordingDevice {
    fn vibrate(&self) -> ActionResult<()> {
        self.record(DeviceCall::Vibrate)?;
        Ok(())
    }
}

#[async_trait]
impl NotificationScheduler for RecordingDevice {
    async fn request_permissions(&self) -> ActionResult<bool> {
        let inner = self.record(DeviceCall::RequestPermissions)?;
        Ok(inner.permission_granted)
    }

    async fn configure_channel(&self, channel: &ChannelConfig) -> ActionResult<()> {
        self.record(DeviceCall::ConfigureChannel(channel.clone()))?;
        Ok(())
    }

    async fn schedule(&self, content: &NotificationContent, trigger: &Trigger) -> ActionResult<String> {
        let id = format!("notification-{}", self.lock().next_notification);
        let mut inner = self.record(DeviceCall::Schedule {
            id: id.clone(),
            content: content.clone(),
            trigger: *trigger,
        })?;
        inner.next_notification += 1;
        inner.scheduled.insert(id.clone(), (content.clone(), *trigger));
        Ok(id)
    }

    async fn cancel(&self, notification_id: &str) -> ActionResult<()> {
        let mut inner = self.record(DeviceCall::Cancel(notification_id.to_string()))?;
        inner.scheduled.remove(notification_id);
        Ok(())
    }
}
