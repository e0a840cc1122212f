//! Common test utilities and sample generators for integration tests
//!
//! - Deterministic accelerometer traces (resting, walking, falling)
//! - Proptest strategies for samples below the trigger thresholds

#![allow(dead_code)]

use guidex_core::{AccelerationSample, Timestamp};
use proptest::prelude::*;

/// Default polling interval of the phone sensor
pub const INTERVAL_MS: u64 = 800;

/// Device lying still: gravity on z with a little noise
pub fn resting(count: usize, start: Timestamp) -> Vec<AccelerationSample> {
    let mut rng = TestRng::new(7);
    (0..count)
        .map(|i| {
            AccelerationSample::new(
                rng.noise(0.02),
                rng.noise(0.02),
                0.98 + rng.noise(0.02),
                start + i as u64 * INTERVAL_MS,
            )
        })
        .collect()
}

/// Resting trace with a single impact spike at `spike_index`
pub fn fall_at(count: usize, spike_index: usize, peak_g: f32) -> Vec<AccelerationSample> {
    let mut trace = resting(count, 0);
    if let Some(sample) = trace.get_mut(spike_index) {
        sample.z = peak_g;
    }
    trace
}

/// Small deterministic LCG so traces are reproducible without a rand dependency
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (self.state >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform noise in `[-amplitude, amplitude)`
    pub fn noise(&mut self, amplitude: f32) -> f32 {
        (self.next_f32() * 2.0 - 1.0) * amplitude
    }
}

/// Samples whose magnitude and pairwise deltas stay below the default thresholds
///
/// Each axis is bounded by 0.6 g, so `|v| <= 0.6 * sqrt(3) ≈ 1.04 g` and
/// `|a - b| <= 1.2 * sqrt(3) ≈ 2.08 g`.
pub fn quiet_sample() -> impl Strategy<Value = (f32, f32, f32)> {
    (-0.6f32..0.6, -0.6f32..0.6, -0.6f32..0.6)
}

/// Stamp a list of axis triples at increasing timestamps
pub fn stamp(axes: &[(f32, f32, f32)], gaps: &[u64]) -> Vec<AccelerationSample> {
    let mut now = 0u64;
    axes.iter()
        .zip(gaps.iter().chain(std::iter::repeat(&INTERVAL_MS)))
        .map(|(&(x, y, z), gap)| {
            now += gap;
            AccelerationSample::new(x, y, z, now)
        })
        .collect()
}
