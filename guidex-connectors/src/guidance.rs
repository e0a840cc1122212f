//! Spoken guidance
//!
//! Short voice announcements that help the user find their way around the
//! app: the home screen layout on start, and a confirmation after a time is
//! picked. Both are spoken slightly slower than normal speech.

use chrono::{NaiveTime, Timelike};
use guidex_core::constants::GUIDANCE_SPEECH_RATE;

use crate::device::{ActionResult, Announcer};

/// Read out when the home screen opens
pub const WELCOME_MESSAGE: &str = "Welcome to GuideX. The first button is Get Help, the second is Navigation, third is Reminders, and fourth is Emergency Alerts.";

/// Confirmation spoken after a time is chosen, `HH:MM` in 24-hour form
pub fn time_set_message(time: NaiveTime) -> String {
    format!("Time set to {:02}:{:02}", time.hour(), time.minute())
}

/// Describe the home screen buttons
pub async fn announce_welcome(announcer: &dyn Announcer) -> ActionResult<()> {
    announcer.speak(WELCOME_MESSAGE, GUIDANCE_SPEECH_RATE).await
}

pub async fn announce_time_set(announcer: &dyn Announcer, time: NaiveTime) -> ActionResult<()> {
    announcer
        .speak(&time_set_message(time), GUIDANCE_SPEECH_RATE)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ActionError;
    use crate::recording::{Action, DeviceCall, RecordingDevice};

    #[test]
    fn time_is_zero_padded() {
        let time = NaiveTime::from_hms_opt(7, 5, 42).unwrap();
        assert_eq!(time_set_message(time), "Time set to 07:05");
        let time = NaiveTime::from_hms_opt(21, 30, 0).unwrap();
        assert_eq!(time_set_message(time), "Time set to 21:30");
    }

    #[tokio::test]
    async fn welcome_lists_the_buttons() {
        let device = RecordingDevice::new();
        announce_welcome(&device).await.unwrap();

        assert_eq!(
            device.calls(),
            vec![DeviceCall::Speak {
                text: "Welcome to GuideX. The first button is Get Help, the second is Navigation, third is Reminders, and fourth is Emergency Alerts.".into(),
                rate: 0.9,
            }]
        );
    }

    #[tokio::test]
    async fn time_confirmation_spoken_at_guidance_rate() {
        let device = RecordingDevice::new();
        announce_time_set(&device, NaiveTime::from_hms_opt(8, 0, 0).unwrap())
            .await
            .unwrap();

        assert_eq!(
            device.calls(),
            vec![DeviceCall::Speak {
                text: "Time set to 08:00".into(),
                rate: 0.9,
            }]
        );
    }

    #[tokio::test]
    async fn speech_failure_is_returned() {
        let device = RecordingDevice::new();
        device.fail(Action::Speak, ActionError::Unavailable("no tts engine".into()));

        assert_eq!(
            announce_welcome(&device).await,
            Err(ActionError::Unavailable("no tts engine".into()))
        );
    }
}
