//! Emergency Sequence Constants

/// Delay between opening the dialer and opening the SMS composer (milliseconds).
///
/// Gives the dial intent time to come to the foreground first.
pub const EMERGENCY_SMS_DELAY_MS: u64 = 3000;

/// How long the Get Help alarm plays before it is stopped (milliseconds).
pub const HELP_ALARM_DURATION_MS: u64 = 10_000;

/// Speech rate for emergency voice prompts (1.0 = normal).
pub const VOICE_PROMPT_RATE: f32 = 0.8;

/// Speech rate for spoken guidance such as the home screen welcome (1.0 = normal).
pub const GUIDANCE_SPEECH_RATE: f32 = 0.9;
