//! "Get Help" button
//!
//! Vibrates, sounds the help alarm for a fixed time and texts a fixed
//! message to the help contacts. Pressing the button again restarts the
//! alarm timer instead of stacking a second one.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use guidex_core::{constants::HELP_ALARM_DURATION_MS, PhoneNumber};
use serde::{Deserialize, Serialize};

use crate::{
    device::{ActionResult, AlarmSound, Devices, SmsStatus},
    emergency::StepOutcome,
    message::HELP_MESSAGE,
    schedule::ScheduledTask,
};

/// Help section of the app configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    /// Numbers texted when help is requested
    pub contacts: Vec<PhoneNumber>,
    /// How long the help alarm plays (ms)
    pub alarm_duration_ms: u64,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            contacts: Vec::new(),
            alarm_duration_ms: HELP_ALARM_DURATION_MS,
        }
    }
}

/// What happened during one help request
#[derive(Debug, Clone, PartialEq)]
pub struct HelpReport {
    pub vibration: StepOutcome,
    pub alarm: StepOutcome,
    pub sms: StepOutcome,
    /// Composer result when the SMS step completed
    pub sms_status: Option<SmsStatus>,
}

impl HelpReport {
    /// True only when the platform confirmed the SMS was sent
    pub fn confirmed_sent(&self) -> bool {
        self.sms_status == Some(SmsStatus::Sent)
    }
}

pub struct HelpService {
    config: HelpConfig,
    devices: Devices,
    alarm_stop: Mutex<Option<ScheduledTask>>,
}

impl HelpService {
    pub fn new(config: HelpConfig, devices: Devices) -> Self {
        Self {
            config,
            devices,
            alarm_stop: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &HelpConfig {
        &self.config
    }

    pub async fn request_help(&self) -> HelpReport {
        log::info!("Help requested");

        let vibration = match self.devices.haptics.vibrate() {
            Ok(()) => StepOutcome::Completed,
            Err(e) => {
                log::warn!("Vibration failed: {}", e);
                StepOutcome::Failed(e)
            }
        };

        let alarm = match self.devices.alarm.play(AlarmSound::Help).await {
            Ok(()) => {
                self.schedule_alarm_stop();
                StepOutcome::Completed
            }
            Err(e) => {
                log::warn!("Help alarm failed: {}", e);
                StepOutcome::Failed(e)
            }
        };

        let (sms, sms_status) = if self.config.contacts.is_empty() {
            log::warn!("No help contacts configured, SMS not sent");
            (StepOutcome::Skipped, None)
        } else {
            match self
                .devices
                .telephony
                .send_sms(&self.config.contacts, HELP_MESSAGE)
                .await
            {
                Ok(status) => {
                    log::info!("Help SMS to {} contacts: {:?}", self.config.contacts.len(), status);
                    (StepOutcome::Completed, Some(status))
                }
                Err(e) => {
                    log::error!("Help SMS failed: {}", e);
                    (StepOutcome::Failed(e), None)
                }
            }
        };

        HelpReport {
            vibration,
            alarm,
            sms,
            sms_status,
        }
    }

    /// Cancel the pending alarm stop and silence the alarm now
    pub async fn shutdown(&self) -> ActionResult<()> {
        self.lock_alarm_stop().take();
        self.devices.alarm.stop(AlarmSound::Help).await
    }

    fn schedule_alarm_stop(&self) {
        let alarm = self.devices.alarm.clone();
        let task = ScheduledTask::after(Duration::from_millis(self.config.alarm_duration_ms), async move {
            if let Err(e) = alarm.stop(AlarmSound::Help).await {
                log::warn!("Failed to stop help alarm: {}", e);
            }
        });

        // Replacing the handle aborts the previous timer
        *self.lock_alarm_stop() = Some(task);
    }

    fn lock_alarm_stop(&self) -> MutexGuard<'_, Option<ScheduledTask>> {
        self.alarm_stop.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
