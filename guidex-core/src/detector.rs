//! Fall Event Detector
//!
//! ## Overview
//!
//! Threshold heuristic over a stream of accelerometer samples. For every
//! sample the detector computes
//!
//! ```text
//! magnitude = |current|
//! delta     = |current - previous|
//! elapsed   = current.timestamp - last_trigger
//! ```
//!
//! and emits a [`FallEvent`] when `elapsed > cooldown` and
//! `magnitude > fall_threshold || delta > vibration_threshold`. The sample is
//! stored as the new `previous` whether or not it triggered.
//!
//! ## Cooldown
//!
//! At most one event is emitted per cooldown window. Samples that exceed a
//! threshold inside the window are counted as suppressed and otherwise
//! ignored. The window is measured from the timestamp of the triggering
//! sample, never from the wall clock, so replaying a trace gives the same
//! result as running live.
//!
//! ## Display state
//!
//! A trigger also raises the `fall_active` flag used by the alert screen. The
//! detector does not clear it by itself: the owner schedules
//! [`FallDetector::clear_fall_active`] one cooldown later (the async monitor
//! in `guidex-connectors` does this with a cancellable deadline).
//!
//! ## Start-up baseline
//!
//! Before the first sample the previous reading is the zero vector, so a
//! device resting at 1 g produces `delta ≈ 1 g` on its first sample. With the
//! default vibration threshold this does not fire, but the first sample still
//! fires on magnitude when the device is moving. Set
//! [`DetectorConfig::prime_with_first_sample`] to use the first reading as
//! the baseline and skip evaluating it.
//!
//! ```rust
//! use guidex_core::{AccelerationSample, DetectorConfig, FallDetector};
//!
//! let mut detector = FallDetector::new(DetectorConfig::default())?;
//!
//! assert!(detector.on_sample(AccelerationSample::new(0.0, 0.0, 0.0, 0))?.is_none());
//! let event = detector.on_sample(AccelerationSample::new(0.0, 0.0, 1.5, 800))?;
//! assert_eq!(event.map(|e| e.timestamp), Some(800));
//! # Ok::<(), guidex_core::DetectorError>(())
//! ```

use crate::{
    config::DetectorConfig,
    errors::{DetectorError, DetectorResult},
    events::{FallEvent, TriggerCause},
    sample::AccelerationSample,
    time::{elapsed_ms, TimeSource, Timestamp},
};

/// Mutable state of one detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorState {
    /// Last accepted sample, zero vector until the first one arrives
    pub previous_sample: AccelerationSample,
    /// Timestamp of the last trigger, `None` if the detector never fired
    pub last_trigger: Option<Timestamp>,
    /// Whether the alert screen should show "fall detected"
    pub fall_active: bool,
    /// Whether any sample has been accepted yet
    pub primed: bool,
}

impl Default for DetectorState {
    fn default() -> Self {
        Self {
            previous_sample: AccelerationSample::zero(),
            last_trigger: None,
            fall_active: false,
            primed: false,
        }
    }
}

/// Counters kept by the detector
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectorStats {
    /// Samples accepted (finite), including the priming sample
    pub samples_processed: u64,
    /// Fall events emitted
    pub falls_detected: u64,
    /// Threshold-exceeding samples swallowed by the cooldown
    pub suppressed: u64,
    /// Samples rejected as non-finite
    pub rejected: u64,
}

/// Threshold fall detector with cooldown
#[derive(Debug, Clone)]
pub struct FallDetector {
    config: DetectorConfig,
    state: DetectorState,
    stats: DetectorStats,
}

impl FallDetector {
    /// Create a detector, rejecting invalid configuration
    pub fn new(config: DetectorConfig) -> DetectorResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: DetectorState::default(),
            stats: DetectorStats::default(),
        })
    }

    /// Feed one sample, returning the fall event it triggered, if any
    pub fn on_sample(&mut self, sample: AccelerationSample) -> DetectorResult<Option<FallEvent>> {
        if !sample.is_finite() {
            self.stats.rejected += 1;
            log::warn!("Rejected non-finite sample at {} ms", sample.timestamp);
            return Err(DetectorError::InvalidSample);
        }

        self.stats.samples_processed += 1;

        if self.config.prime_with_first_sample && !self.state.primed {
            self.state.primed = true;
            self.state.previous_sample = sample;
            return Ok(None);
        }

        let magnitude = sample.magnitude();
        let delta = sample.delta(&self.state.previous_sample);
        let now = sample.timestamp;

        let cause = TriggerCause::classify(
            magnitude > self.config.fall_threshold,
            delta > self.config.vibration_threshold,
        );

        let event = match cause {
            Some(cause) if self.cooldown_elapsed(now) => {
                self.state.last_trigger = Some(now);
                self.state.fall_active = true;
                self.stats.falls_detected += 1;

                let event = FallEvent { timestamp: now, magnitude, delta, cause };
                log::info!("Fall detected: {}", event);
                Some(event)
            }
            Some(cause) => {
                self.stats.suppressed += 1;
                log::debug!(
                    "Suppressed {} trigger at {} ms, inside cooldown",
                    cause.name(),
                    now
                );
                None
            }
            None => None,
        };

        self.state.previous_sample = sample;
        self.state.primed = true;

        Ok(event)
    }

    /// Feed a reading without its own timestamp, stamping it from `clock`
    pub fn on_reading<T: TimeSource + ?Sized>(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        clock: &T,
    ) -> DetectorResult<Option<FallEvent>> {
        self.on_sample(AccelerationSample::new(x, y, z, clock.now()))
    }

    fn cooldown_elapsed(&self, now: Timestamp) -> bool {
        match self.state.last_trigger {
            None => true,
            Some(last) => elapsed_ms(last, now) > self.config.cooldown_ms,
        }
    }

    /// Clear the display flag raised by the last trigger
    pub fn clear_fall_active(&mut self) {
        self.state.fall_active = false;
    }

    /// True from a trigger until [`FallDetector::clear_fall_active`]
    pub fn is_fall_active(&self) -> bool {
        self.state.fall_active
    }

    /// Forget the last trigger so the next exceeding sample fires immediately
    pub fn rearm(&mut self) {
        self.state.last_trigger = None;
    }

    /// Drop all state and counters, keeping the configuration
    pub fn reset(&mut self) {
        self.state = DetectorState::default();
        self.stats = DetectorStats::default();
    }

    /// Previous sample, last trigger and fall flag
    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Counters since creation or the last [`FallDetector::reset`]
    pub fn stats(&self) -> DetectorStats {
        self.stats
    }

    /// Active configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}
