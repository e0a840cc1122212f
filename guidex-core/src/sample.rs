//! Acceleration samples
//!
//! A sample is one 3-axis accelerometer reading in g together with the time
//! it was taken. Samples are consumed by the detector and then discarded.

use crate::time::Timestamp;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Single 3-axis accelerometer reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AccelerationSample {
    /// Acceleration along the x axis (g)
    pub x: f32,
    /// Acceleration along the y axis (g)
    pub y: f32,
    /// Acceleration along the z axis (g)
    pub z: f32,
    /// When the reading was taken (milliseconds)
    pub timestamp: Timestamp,
}

impl AccelerationSample {
    /// Sample from axis readings in g at `timestamp` (ms)
    pub const fn new(x: f32, y: f32, z: f32, timestamp: Timestamp) -> Self {
        Self { x, y, z, timestamp }
    }

    /// Zero vector at timestamp 0, the baseline before any reading arrives
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0)
    }

    /// Euclidean norm of the acceleration vector
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Euclidean distance to `previous`, ignoring timestamps
    pub fn delta(&self, previous: &AccelerationSample) -> f32 {
        let dx = self.x - previous.x;
        let dy = self.y - previous.y;
        let dz = self.z - previous.z;
        libm::sqrtf(dx * dx + dy * dy + dz * dz)
    }

    /// True when every axis is a finite number
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Same reading, different timestamp
    pub fn at(self, timestamp: Timestamp) -> Self {
        Self { timestamp, ..self }
    }
}
