//! Fall monitor service
//!
//! ## Overview
//!
//! One tokio task owns the [`FallDetector`] and is the only place samples are
//! evaluated, so detector state never needs a lock. The task waits on:
//!
//! - incoming samples or raw readings (bounded mpsc channel)
//! - the shutdown signal
//! - the deadline that clears the "fall active" flag one cooldown after a
//!   trigger
//! - emergency dispatches that have finished
//!
//! ```text
//!  sensor ──samples──▶ ┌──────────────┐ ──watch──▶ alert screen (fall_active)
//!                      │ monitor task │ ──broadcast──▶ MonitorEvent
//!  handle ──shutdown──▶└──────┬───────┘
//!                             │ spawn (not awaited)
//!                             ▼
//!                     EmergencyNotifier::notify_emergency
//! ```
//!
//! Dispatches run on their own tasks; a slow dialer never delays the next
//! sample. At shutdown in-flight dispatches are detached, not aborted: a
//! call that is already ringing keeps ringing.

use std::sync::Arc;
use std::time::Duration;

use guidex_core::{
    time::MonotonicTime, AccelerationSample, DetectorStats, FallDetector, FallEvent, TimeSource,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

use crate::emergency::{EmergencyNotifier, EmergencyReport};

/// Monitor errors
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The monitor task is no longer running
    #[error("Monitor stopped")]
    Closed,

    /// The sample queue is full
    #[error("Sample queue full")]
    Full,

    #[error("Monitor task failed: {0}")]
    TaskFailed(String),
}

/// Monitor tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorOptions {
    /// Samples buffered between the sensor and the monitor task
    pub sample_capacity: usize,
    /// Events buffered per subscriber before the oldest are dropped
    pub event_capacity: usize,
    /// Re-arm the detector when a dispatch reached the contact neither by
    /// call nor by SMS, so the next fall is not swallowed by the cooldown
    pub rearm_on_dispatch_failure: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            sample_capacity: 64,
            event_capacity: 16,
            rearm_on_dispatch_failure: false,
        }
    }
}

/// Notifications published by the monitor
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    FallDetected(FallEvent),
    /// The cooldown after a fall elapsed and the alert was cleared
    FallCleared,
    EmergencyFinished(EmergencyReport),
}

#[derive(Debug, Clone, Copy)]
enum Input {
    Sample(AccelerationSample),
    Reading { x: f32, y: f32, z: f32 },
}

/// Cloneable producer side of the sample queue
#[derive(Debug, Clone)]
pub struct SampleSender {
    tx: mpsc::Sender<Input>,
}

impl SampleSender {
    /// Queue a timestamped sample, waiting for space
    pub async fn send(&self, sample: AccelerationSample) -> Result<(), MonitorError> {
        self.tx.send(Input::Sample(sample)).await.map_err(|_| MonitorError::Closed)
    }

    /// Queue a raw reading; the monitor stamps it on receipt
    pub async fn send_reading(&self, x: f32, y: f32, z: f32) -> Result<(), MonitorError> {
        self.tx
            .send(Input::Reading { x, y, z })
            .await
            .map_err(|_| MonitorError::Closed)
    }

    /// Queue a sample without waiting; for sensor callbacks that cannot block
    pub fn try_send(&self, sample: AccelerationSample) -> Result<(), MonitorError> {
        self.tx.try_send(Input::Sample(sample)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MonitorError::Full,
            mpsc::error::TrySendError::Closed(_) => MonitorError::Closed,
        })
    }
}

/// Handle to a running monitor
pub struct MonitorHandle {
    samples: SampleSender,
    fall_active: watch::Receiver<bool>,
    events: broadcast::Sender<MonitorEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<DetectorStats>,
}

impl MonitorHandle {
    pub fn sender(&self) -> SampleSender {
        self.samples.clone()
    }

    pub async fn send(&self, sample: AccelerationSample) -> Result<(), MonitorError> {
        self.samples.send(sample).await
    }

    pub async fn send_reading(&self, x: f32, y: f32, z: f32) -> Result<(), MonitorError> {
        self.samples.send_reading(x, y, z).await
    }

    /// Current value of the "fall detected" display flag
    pub fn is_fall_active(&self) -> bool {
        *self.fall_active.borrow()
    }

    /// Watch the display flag
    pub fn fall_active(&self) -> watch::Receiver<bool> {
        self.fall_active.clone()
    }

    /// Receive events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    /// Stop the monitor and return the detector's final counters
    ///
    /// The pending flag reset is dropped and in-flight dispatches are left
    /// running on their own.
    pub async fn shutdown(mut self) -> Result<DetectorStats, MonitorError> {
        if let Some(tx) = self.shutdown.take() {
            // The task may already be gone; joining reports that below
            let _ = tx.send(());
        }
        self.task
            .await
            .map_err(|e| MonitorError::TaskFailed(e.to_string()))
    }
}

/// The monitor task
pub struct FallMonitor {
    detector: FallDetector,
    notifier: Arc<dyn EmergencyNotifier>,
    options: MonitorOptions,
    clock: Box<dyn TimeSource>,
    fall_active: watch::Sender<bool>,
    events: broadcast::Sender<MonitorEvent>,
    dispatches: JoinSet<EmergencyReport>,
}

impl FallMonitor {
    /// Start monitoring; raw readings are stamped with a monotonic clock
    pub fn spawn(
        detector: FallDetector,
        notifier: Arc<dyn EmergencyNotifier>,
        options: MonitorOptions,
    ) -> MonitorHandle {
        Self::spawn_with_clock(detector, notifier, options, Box::new(MonotonicTime::new()))
    }

    /// Start monitoring with a custom clock for raw readings
    pub fn spawn_with_clock(
        detector: FallDetector,
        notifier: Arc<dyn EmergencyNotifier>,
        options: MonitorOptions,
        clock: Box<dyn TimeSource>,
    ) -> MonitorHandle {
        let (sample_tx, sample_rx) = mpsc::channel(options.sample_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (fall_tx, fall_rx) = watch::channel(false);
        let (events_tx, _) = broadcast::channel(options.event_capacity.max(1));

        let monitor = Self {
            detector,
            notifier,
            options,
            clock,
            fall_active: fall_tx,
            events: events_tx.clone(),
            dispatches: JoinSet::new(),
        };
        let task = tokio::spawn(monitor.run(sample_rx, shutdown_rx));

        MonitorHandle {
            samples: SampleSender { tx: sample_tx },
            fall_active: fall_rx,
            events: events_tx,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    async fn run(
        mut self,
        mut inputs: mpsc::Receiver<Input>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> DetectorStats {
        let cooldown = Duration::from_millis(self.detector.config().cooldown_ms);
        let reset = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(reset);
        let mut reset_armed = false;

        log::info!("Fall monitor started");

        loop {
            tokio::select! {
                biased;

                () = &mut reset, if reset_armed => {
                    reset_armed = false;
                    self.clear_fall_active();
                }

                Some(joined) = self.dispatches.join_next(), if !self.dispatches.is_empty() => {
                    match joined {
                        Ok(report) => self.on_dispatch_finished(report),
                        Err(e) => log::error!("Emergency dispatch task failed: {}", e),
                    }
                }

                _ = &mut shutdown => {
                    // Refuse new input, then evaluate what is already queued
                    inputs.close();
                    while let Ok(input) = inputs.try_recv() {
                        if let Some(event) = self.evaluate(input) {
                            self.on_fall(event);
                        }
                    }
                    break;
                }

                input = inputs.recv() => {
                    let Some(input) = input else { break };
                    if let Some(event) = self.evaluate(input) {
                        self.on_fall(event);
                        reset.as_mut().reset(Instant::now() + cooldown);
                        reset_armed = true;
                    }
                }
            }
        }

        if !self.dispatches.is_empty() {
            log::info!("Leaving {} emergency dispatches running", self.dispatches.len());
        }
        self.dispatches.detach_all();

        let stats = self.detector.stats();
        log::info!(
            "Fall monitor stopped: {} samples, {} falls",
            stats.samples_processed,
            stats.falls_detected
        );
        stats
    }

    fn evaluate(&mut self, input: Input) -> Option<FallEvent> {
        let result = match input {
            Input::Sample(sample) => self.detector.on_sample(sample),
            Input::Reading { x, y, z } => self.detector.on_reading(x, y, z, self.clock.as_ref()),
        };

        match result {
            Ok(event) => event,
            Err(e) => {
                log::debug!("Sample dropped: {}", e);
                None
            }
        }
    }

    fn on_fall(&mut self, event: FallEvent) {
        self.fall_active.send_replace(true);
        self.publish(MonitorEvent::FallDetected(event));

        let notifier = Arc::clone(&self.notifier);
        self.dispatches
            .spawn(async move { notifier.notify_emergency(event).await });
    }

    fn clear_fall_active(&mut self) {
        self.detector.clear_fall_active();
        self.fall_active.send_replace(false);
        self.publish(MonitorEvent::FallCleared);
    }

    fn on_dispatch_finished(&mut self, report: EmergencyReport) {
        if !report.contact_reached() && self.options.rearm_on_dispatch_failure {
            log::warn!("Emergency contact unreachable, re-arming detector");
            self.detector.rearm();
        }
        self.publish(MonitorEvent::EmergencyFinished(report));
    }

    fn publish(&self, event: MonitorEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
