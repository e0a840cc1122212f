//! Emergency dispatch after a detected fall
//!
//! ## Sequence
//!
//! 1. Speak the fall prompt so the user knows what is happening
//! 2. Sound the fall alarm
//! 3. Open the dialer on the emergency contact
//! 4. Wait `sms_delay_ms` so the dialer is in front before the composer opens
//! 5. Read the current position and open the SMS composer with a maps link
//!
//! Every step runs even if an earlier one failed, except the SMS, which
//! needs a position. Outcomes are collected in an [`EmergencyReport`];
//! nothing is retried automatically. The user can redial with
//! [`EmergencyDispatcher::retry_call`].
//!
//! The dispatcher never touches detector state. Whether a failed dispatch
//! re-arms the detector is decided by the monitor.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use guidex_core::{
    constants::{EMERGENCY_SMS_DELAY_MS, VOICE_PROMPT_RATE},
    EmergencyKind, FallEvent, PhoneNumber,
};
use serde::{Deserialize, Serialize};

use crate::{
    device::{ActionError, ActionResult, AlarmSound, Coordinates, Devices},
    message::{fall_alert_message, sms_uri, tel_uri},
    schedule::ScheduledTask,
};

/// Emergency section of the app configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyConfig {
    /// Number dialled and texted after a fall
    pub contact: PhoneNumber,

    /// Delay between opening the dialer and opening the SMS composer (ms)
    #[serde(default = "default_sms_delay_ms")]
    pub sms_delay_ms: u64,

    /// Stop the fall alarm after this long (ms); plays until silenced if unset
    #[serde(default)]
    pub alarm_duration_ms: Option<u64>,

    /// Speech rate of the voice prompt
    #[serde(default = "default_voice_rate")]
    pub voice_rate: f32,
}

fn default_sms_delay_ms() -> u64 {
    EMERGENCY_SMS_DELAY_MS
}

fn default_voice_rate() -> f32 {
    VOICE_PROMPT_RATE
}

impl EmergencyConfig {
    pub fn new(contact: PhoneNumber) -> Self {
        Self {
            contact,
            sms_delay_ms: EMERGENCY_SMS_DELAY_MS,
            alarm_duration_ms: None,
            voice_rate: VOICE_PROMPT_RATE,
        }
    }

    pub fn with_sms_delay_ms(mut self, delay_ms: u64) -> Self {
        self.sms_delay_ms = delay_ms;
        self
    }

    pub fn with_alarm_duration_ms(mut self, duration_ms: u64) -> Self {
        self.alarm_duration_ms = Some(duration_ms);
        self
    }
}

/// Outcome of one dispatch step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Completed,
    Failed(ActionError),
    /// Not attempted because a step it depends on failed
    Skipped,
}

impl StepOutcome {
    fn from_result<T>(step: &str, result: ActionResult<T>) -> Self {
        match result {
            Ok(_) => {
                log::debug!("Emergency step '{}' completed", step);
                Self::Completed
            }
            Err(e) => {
                log::warn!("Emergency step '{}' failed: {}", step, e);
                Self::Failed(e)
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What happened during one dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyReport {
    pub event: FallEvent,
    pub announcement: StepOutcome,
    pub alarm: StepOutcome,
    pub call: StepOutcome,
    pub location: StepOutcome,
    pub sms: StepOutcome,
    /// Position included in the SMS, if one was obtained
    pub coordinates: Option<Coordinates>,
}

impl EmergencyReport {
    /// True if either the dialer or the SMS composer was opened
    pub fn contact_reached(&self) -> bool {
        self.call.is_completed() || self.sms.is_completed()
    }

    pub fn failed_steps(&self) -> usize {
        [&self.announcement, &self.alarm, &self.call, &self.location, &self.sms]
            .into_iter()
            .filter(|step| step.is_failed())
            .count()
    }
}

/// Counters kept by the dispatcher
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchStats {
    /// Dispatches started
    pub dispatches: u64,
    /// Dispatches that reached the contact through neither call nor SMS
    pub unreachable: u64,
    /// Individual steps that failed, across all dispatches
    pub failed_steps: u64,
    /// Manual redials
    pub retries: u64,
}

/// Something that reacts to a fall
#[async_trait]
pub trait EmergencyNotifier: Send + Sync {
    async fn notify_emergency(&self, event: FallEvent) -> EmergencyReport;
}

/// Runs the fall emergency sequence on the device collaborators
pub struct EmergencyDispatcher {
    config: EmergencyConfig,
    devices: Devices,
    alarm_stop: Mutex<Option<ScheduledTask>>,
    stats: Mutex<DispatchStats>,
}

impl EmergencyDispatcher {
    pub fn new(config: EmergencyConfig, devices: Devices) -> Self {
        Self {
            config,
            devices,
            alarm_stop: Mutex::new(None),
            stats: Mutex::new(DispatchStats::default()),
        }
    }

    pub fn config(&self) -> &EmergencyConfig {
        &self.config
    }

    pub fn stats(&self) -> DispatchStats {
        self.lock_stats().clone()
    }

    /// Open the dialer on the emergency contact again
    pub async fn retry_call(&self) -> ActionResult<()> {
        log::info!("Retrying emergency call to {}", self.config.contact);
        self.lock_stats().retries += 1;
        self.devices.telephony.open_url(&tel_uri(&self.config.contact)).await
    }

    /// Stop the fall alarm now and drop any pending automatic stop
    pub async fn silence(&self) -> ActionResult<()> {
        self.lock_alarm_stop().take();
        self.devices.alarm.stop(AlarmSound::Fall).await
    }

    async fn send_location_sms(&self) -> (StepOutcome, StepOutcome, Option<Coordinates>) {
        match self.devices.location.current_position().await {
            Ok(coords) => {
                let body = fall_alert_message(coords);
                let uri = sms_uri(&self.config.contact, &body);
                let sms = StepOutcome::from_result("sms", self.devices.telephony.open_url(&uri).await);
                (StepOutcome::Completed, sms, Some(coords))
            }
            Err(e) => {
                log::warn!("Unable to fetch location, SMS not sent: {}", e);
                (StepOutcome::Failed(e), StepOutcome::Skipped, None)
            }
        }
    }

    fn schedule_alarm_stop(&self) {
        let Some(duration_ms) = self.config.alarm_duration_ms else {
            return;
        };

        let alarm = self.devices.alarm.clone();
        let task = ScheduledTask::after(Duration::from_millis(duration_ms), async move {
            if let Err(e) = alarm.stop(AlarmSound::Fall).await {
                log::warn!("Failed to stop fall alarm: {}", e);
            }
        });
        *self.lock_alarm_stop() = Some(task);
    }

    fn lock_stats(&self) -> MutexGuard<'_, DispatchStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_alarm_stop(&self) -> MutexGuard<'_, Option<ScheduledTask>> {
        self.alarm_stop.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EmergencyNotifier for EmergencyDispatcher {
    async fn notify_emergency(&self, event: FallEvent) -> EmergencyReport {
        log::info!("Dispatching emergency to {} for {}", self.config.contact, event);
        self.lock_stats().dispatches += 1;

        let prompt = EmergencyKind::Fall.voice_prompt();
        let announcement = StepOutcome::from_result(
            "announce",
            self.devices.announcer.speak(prompt, self.config.voice_rate).await,
        );

        let alarm = StepOutcome::from_result("alarm", self.devices.alarm.play(AlarmSound::Fall).await);
        if alarm.is_completed() {
            self.schedule_alarm_stop();
        }

        let call = StepOutcome::from_result(
            "call",
            self.devices.telephony.open_url(&tel_uri(&self.config.contact)).await,
        );

        tokio::time::sleep(Duration::from_millis(self.config.sms_delay_ms)).await;
        let (location, sms, coordinates) = self.send_location_sms().await;

        let report = EmergencyReport {
            event,
            announcement,
            alarm,
            call,
            location,
            sms,
            coordinates,
        };

        {
            let mut stats = self.lock_stats();
            stats.failed_steps += report.failed_steps() as u64;
            if !report.contact_reached() {
                stats.unreachable += 1;
            }
        }

        if report.contact_reached() {
            log::info!("Emergency dispatch finished, contact reached");
        } else {
            log::error!("Emergency dispatch could not reach {}", self.config.contact);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use guidex_core::TriggerCause;

    use crate::recording::{Action, DeviceCall, RecordingDevice};

    fn event() -> FallEvent {
        FallEvent {
            timestamp: 800,
            magnitude: 1.5,
            delta: 1.5,
            cause: TriggerCause::Impact,
        }
    }

    fn dispatcher(device: &Arc<RecordingDevice>) -> EmergencyDispatcher {
        let config = EmergencyConfig::new(PhoneNumber::parse("+919822115810").unwrap());
        EmergencyDispatcher::new(config, Devices::from_shared(device.clone()))
    }

    #[tokio::test(start_paused = true)]
    async fn full_sequence_in_order() {
        let device = Arc::new(RecordingDevice::new());
        let report = dispatcher(&device).notify_emergency(event()).await;

        assert!(report.contact_reached());
        assert_eq!(report.failed_steps(), 0);

        let calls = device.calls();
        assert_eq!(
            calls[0],
            DeviceCall::Speak {
                text: "Fall detected! Confirm emergency alert?".into(),
                rate: 0.8
            }
        );
        assert_eq!(calls[1], DeviceCall::Play(AlarmSound::Fall));
        assert_eq!(calls[2], DeviceCall::OpenUrl("tel:+919822115810".into()));
        assert_eq!(calls[3], DeviceCall::Locate);
        assert!(matches!(&calls[4], DeviceCall::OpenUrl(url)
            if url.starts_with("sms:+919822115810?body=%F0%9F%9A%A8%20Fall%20detected%21")));
    }

    #[tokio::test(start_paused = true)]
    async fn sms_waits_for_delay() {
        let device = Arc::new(RecordingDevice::new());
        let dispatcher = Arc::new(dispatcher(&device));

        let task = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move { dispatcher.notify_emergency(event()).await }
        });

        tokio::time::sleep(Duration::from_millis(2_999)).await;
        assert_eq!(device.opened_urls(), vec!["tel:+919822115810".to_string()]);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(device.opened_urls().len(), 2);
        assert!(task.await.unwrap().sms.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn location_failure_skips_sms() {
        let device = Arc::new(RecordingDevice::new());
        device.fail(Action::Locate, ActionError::PermissionDenied("location".into()));

        let dispatcher = dispatcher(&device);
        let report = dispatcher.notify_emergency(event()).await;

        assert!(report.location.is_failed());
        assert_eq!(report.sms, StepOutcome::Skipped);
        assert!(report.contact_reached());
        assert_eq!(device.opened_urls().len(), 1);
        assert_eq!(dispatcher.stats().failed_steps, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dialer_failure_does_not_stop_sequence() {
        let device = Arc::new(RecordingDevice::new());
        device.fail(Action::OpenUrl, ActionError::Unavailable("no telephony".into()));

        let dispatcher = dispatcher(&device);
        let report = dispatcher.notify_emergency(event()).await;

        assert!(report.call.is_failed());
        assert!(report.sms.is_failed());
        assert!(!report.contact_reached());
        assert_eq!(device.count(Action::OpenUrl), 2);

        let stats = dispatcher.stats();
        assert_eq!(stats.dispatches, 1);
        assert_eq!(stats.unreachable, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn alarm_stops_after_configured_duration() {
        let device = Arc::new(RecordingDevice::new());
        let config = EmergencyConfig::new(PhoneNumber::parse("112").unwrap())
            .with_sms_delay_ms(0)
            .with_alarm_duration_ms(10_000);
        let dispatcher = EmergencyDispatcher::new(config, Devices::from_shared(device.clone()));

        dispatcher.notify_emergency(event()).await;
        assert!(device.is_playing(AlarmSound::Fall));

        tokio::time::sleep(Duration::from_millis(10_001)).await;
        assert!(!device.is_playing(AlarmSound::Fall));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_call_redials() {
        let device = Arc::new(RecordingDevice::new());
        let dispatcher = dispatcher(&device);

        dispatcher.retry_call().await.unwrap();
        assert_eq!(device.opened_urls(), vec!["tel:+919822115810".to_string()]);
        assert_eq!(dispatcher.stats().retries, 1);
    }

    #[test]
    fn config_defaults_from_json() {
        let config: EmergencyConfig = serde_json::from_str(r#"{"contact":"+91 98221 15810"}"#).unwrap();
        assert_eq!(config.contact.as_str(), "+919822115810");
        assert_eq!(config.sms_delay_ms, 3000);
        assert_eq!(config.alarm_duration_ms, None);
        assert_eq!(config.voice_rate, 0.8);
    }
}
