//! Reminders
//!
//! ## Overview
//!
//! A reminder is a short text shown as a local notification at a chosen time,
//! once or repeating daily or weekly. The OS does the actual scheduling through
//! a [`NotificationScheduler`]; this module turns a reminder into a
//! [`Trigger`], keeps the list, and persists it as JSON under one key.
//!
//! ## Triggers
//!
//! Seconds are always dropped from the chosen time, then:
//!
//! | repeat   | trigger                                   |
//! |----------|-------------------------------------------|
//! | `none`   | exact date-time, must be in the future    |
//! | `daily`  | hour and minute                           |
//! | `weekly` | weekday (1 = Sunday .. 7 = Saturday), hour and minute |
//!
//! ## Consistency
//!
//! The stored list only holds reminders that have a live notification id.
//! Entries without one are dropped on [`ReminderManager::load`].
//!
//! Edits schedule the replacement before cancelling the old notification,
//! so a failed edit leaves the reminder and its notification as they were.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    device::{ActionError, ActionResult, Announcer},
    guidance,
    storage::{load_json, save_json, KeyValueStore, StorageError},
};

/// Default storage key of the reminder list
pub const STORAGE_KEY: &str = "reminders";

/// Android channel used for reminder notifications
pub const CHANNEL_ID: &str = "reminder-channel";

/// Notification title of every reminder
pub const NOTIFICATION_TITLE: &str = "Reminder";

/// Reminder errors
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Reminder text is empty")]
    EmptyText,

    #[error("No reminder with id {0}")]
    NotFound(String),

    #[error("Time {0} has already passed, choose a future time")]
    TimeInPast(NaiveDateTime),

    #[error("Scheduling failed: {0}")]
    Scheduling(#[from] ActionError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// How often a reminder fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
}

/// Stored reminder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub text: String,
    /// Local time chosen by the user
    pub time: NaiveDateTime,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub notification_id: Option<String>,
}

/// When the OS should show a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Once, at a local date-time
    At { time: NaiveDateTime },
    /// Every day
    Daily { hour: u32, minute: u32 },
    /// Every week; `weekday` counts from 1 = Sunday
    Weekly { weekday: u32, hour: u32, minute: u32 },
}

impl Trigger {
    /// Compute the trigger for `time` and `repeat` as seen at `now`
    pub fn compute(time: NaiveDateTime, repeat: Repeat, now: NaiveDateTime) -> Result<Self, ReminderError> {
        let time = truncate_to_minute(time);

        match repeat {
            Repeat::None if time <= now => Err(ReminderError::TimeInPast(time)),
            Repeat::None => Ok(Self::At { time }),
            Repeat::Daily => Ok(Self::Daily {
                hour: time.hour(),
                minute: time.minute(),
            }),
            Repeat::Weekly => Ok(Self::Weekly {
                weekday: time.weekday().number_from_sunday(),
                hour: time.hour(),
                minute: time.minute(),
            }),
        }
    }

    pub fn repeats(&self) -> bool {
        !matches!(self, Self::At { .. })
    }
}

fn truncate_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// What the notification shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub channel_id: String,
    pub sound: bool,
    pub vibrate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Default,
    High,
}

/// Android notification channel settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    pub importance: Importance,
    /// Alternating off/on durations in milliseconds
    pub vibration_pattern: Vec<u64>,
    /// `#AARRGGBB`
    pub light_color: String,
    pub sound: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id: CHANNEL_ID.into(),
            name: "Reminders".into(),
            importance: Importance::High,
            vibration_pattern: vec![0, 250, 250, 250],
            light_color: "#FF231F7C".into(),
            sound: true,
        }
    }
}

/// Reminder section of the app configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub channel: ChannelConfig,
    pub storage_key: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            storage_key: STORAGE_KEY.into(),
        }
    }
}

/// Local notification service of the platform
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Ask for permission to post notifications; false if refused
    async fn request_permissions(&self) -> ActionResult<bool>;

    async fn configure_channel(&self, channel: &ChannelConfig) -> ActionResult<()>;

    /// Schedule a notification, returning its id
    async fn schedule(&self, content: &NotificationContent, trigger: &Trigger) -> ActionResult<String>;

    async fn cancel(&self, notification_id: &str) -> ActionResult<()>;
}

/// Source of the local wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The device's local time zone
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock frozen at one instant, for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Creates, edits, deletes and persists reminders
pub struct ReminderManager {
    config: ReminderConfig,
    scheduler: Arc<dyn NotificationScheduler>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    announcer: Option<Arc<dyn Announcer>>,
    reminders: Vec<Reminder>,
}

impl ReminderManager {
    pub fn new(
        config: ReminderConfig,
        scheduler: Arc<dyn NotificationScheduler>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_clock(config, scheduler, store, Arc::new(LocalClock))
    }

    pub fn with_clock(
        config: ReminderConfig,
        scheduler: Arc<dyn NotificationScheduler>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            scheduler,
            store,
            clock,
            announcer: None,
            reminders: Vec::new(),
        }
    }

    /// Speak "Time set to HH:MM" after every successful add or edit
    pub fn with_announcer(mut self, announcer: Arc<dyn Announcer>) -> Self {
        self.announcer = Some(announcer);
        self
    }

    /// Request notification permission and configure the reminder channel
    pub async fn setup(&self) -> Result<(), ReminderError> {
        if !self.scheduler.request_permissions().await? {
            log::warn!("Notification permission refused, reminders will not be shown");
        }
        self.scheduler.configure_channel(&self.config.channel).await?;
        Ok(())
    }

    /// Replace the in-memory list with the stored one
    ///
    /// A corrupt list is logged and treated as empty. Returns the number of
    /// reminders kept.
    pub fn load(&mut self) -> Result<usize, ReminderError> {
        let stored: Vec<Reminder> = match load_json(self.store.as_ref(), &self.config.storage_key) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(StorageError::Serialization(e)) => {
                log::error!("Failed to load reminders: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let total = stored.len();
        self.reminders = stored
            .into_iter()
            .filter(|r| r.notification_id.is_some())
            .collect();

        if self.reminders.len() < total {
            log::info!(
                "Dropped {} reminders without a scheduled notification",
                total - self.reminders.len()
            );
        }
        Ok(self.reminders.len())
    }

    pub fn list(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    /// Schedule and store a new reminder
    ///
    /// If the list cannot be saved the new notification is cancelled again.
    pub async fn add(&mut self, text: &str, time: NaiveDateTime, repeat: Repeat) -> Result<Reminder, ReminderError> {
        check_text(text)?;

        let trigger = Trigger::compute(time, repeat, self.clock.now())?;
        let notification_id = self.schedule(text, &trigger).await?;
        let reminder = Reminder {
            id: self.next_id(),
            text: text.to_string(),
            time,
            repeat,
            notification_id: Some(notification_id.clone()),
        };

        let mut reminders = self.reminders.clone();
        reminders.push(reminder.clone());
        if let Err(e) = save_json(self.store.as_ref(), &self.config.storage_key, &reminders) {
            self.withdraw(&notification_id).await;
            return Err(e.into());
        }
        self.reminders = reminders;

        log::info!("Reminder {} set for {} ({:?})", reminder.id, reminder.time, repeat);
        self.announce_time_set(time).await;
        Ok(reminder)
    }

    /// Replace text, time and repeat of an existing reminder
    ///
    /// The new notification is scheduled first. If the old one then cannot
    /// be cancelled, the new one is withdrawn and the reminder left unchanged.
    pub async fn edit(
        &mut self,
        id: &str,
        text: &str,
        time: NaiveDateTime,
        repeat: Repeat,
    ) -> Result<Reminder, ReminderError> {
        check_text(text)?;

        let index = self.index_of(id)?;
        let old_notification = self.reminders[index].notification_id.clone();
        let trigger = Trigger::compute(time, repeat, self.clock.now())?;

        let notification_id = self.schedule(text, &trigger).await?;
        if let Some(old) = &old_notification {
            if let Err(e) = self.scheduler.cancel(old).await {
                log::error!("Error cancelling notification {}: {}", old, e);
                self.withdraw(&notification_id).await;
                return Err(e.into());
            }
        }

        let reminder = &mut self.reminders[index];
        reminder.text = text.to_string();
        reminder.time = time;
        reminder.repeat = repeat;
        reminder.notification_id = Some(notification_id);
        let updated = reminder.clone();

        self.save()?;
        log::info!("Reminder {} updated", id);
        self.announce_time_set(time).await;
        Ok(updated)
    }

    /// Cancel and remove a reminder
    ///
    /// A failed cancellation is logged; the reminder is removed regardless.
    pub async fn delete(&mut self, id: &str) -> Result<Reminder, ReminderError> {
        let index = self.index_of(id)?;
        if let Some(notification_id) = self.reminders[index].notification_id.clone() {
            if let Err(e) = self.scheduler.cancel(&notification_id).await {
                log::error!("Error cancelling notification {}: {}", notification_id, e);
            }
        }

        let removed = self.reminders.remove(index);
        self.save()?;
        Ok(removed)
    }

    async fn schedule(&self, text: &str, trigger: &Trigger) -> Result<String, ReminderError> {
        let content = NotificationContent {
            title: NOTIFICATION_TITLE.into(),
            body: text.to_string(),
            channel_id: self.config.channel.id.clone(),
            sound: self.config.channel.sound,
            vibrate: true,
        };

        self.scheduler.schedule(&content, trigger).await.map_err(|e| {
            log::error!("Error scheduling notification: {}", e);
            e.into()
        })
    }

    /// Cancel a notification that was scheduled for a change that failed
    async fn withdraw(&self, notification_id: &str) {
        if let Err(e) = self.scheduler.cancel(notification_id).await {
            log::error!("Error cancelling notification {}: {}", notification_id, e);
        }
    }

    async fn announce_time_set(&self, time: NaiveDateTime) {
        if let Some(announcer) = &self.announcer {
            if let Err(e) = guidance::announce_time_set(announcer.as_ref(), time.time()).await {
                log::warn!("Time confirmation not spoken: {}", e);
            }
        }
    }

    fn save(&self) -> Result<(), ReminderError> {
        save_json(self.store.as_ref(), &self.config.storage_key, &self.reminders)?;
        Ok(())
    }

    fn index_of(&self, id: &str) -> Result<usize, ReminderError> {
        self.reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ReminderError::NotFound(id.to_string()))
    }

    /// Millisecond timestamp of the clock, bumped until unique
    fn next_id(&self) -> String {
        let mut candidate = self.clock.now().and_utc().timestamp_millis();
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}

fn check_text(text: &str) -> Result<(), ReminderError> {
    if text.trim().is_empty() {
        Err(ReminderError::EmptyText)
    } else {
        Ok(())
    }
}
