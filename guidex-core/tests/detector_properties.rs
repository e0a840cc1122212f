//! Property tests for the fall detector
//!
//! - Quiet traces never fire
//! - Fall events are always more than one cooldown apart
//! - Re-feeding the same reading inside the window never fires
//! - Every fired event actually exceeded a threshold

mod common;

use guidex_core::{AccelerationSample, DetectorConfig, FallDetector};
use proptest::prelude::*;

use common::{fall_at, quiet_sample, resting, stamp};

fn axis() -> impl Strategy<Value = f32> {
    -4.0f32..4.0
}

proptest! {
    #[test]
    fn quiet_trace_never_fires(
        axes in prop::collection::vec(quiet_sample(), 1..200),
        gaps in prop::collection::vec(0u64..10_000, 0..200),
    ) {
        let mut detector = FallDetector::new(DetectorConfig::default()).unwrap();

        for sample in stamp(&axes, &gaps) {
            prop_assert!(detector.on_sample(sample).unwrap().is_none());
        }
        prop_assert_eq!(detector.stats().falls_detected, 0);
    }

    #[test]
    fn events_are_separated_by_more_than_cooldown(
        axes in prop::collection::vec((axis(), axis(), axis()), 1..300),
        gaps in prop::collection::vec(0u64..3_000, 0..300),
        cooldown in 1u64..20_000,
    ) {
        let config = DetectorConfig::default().with_cooldown_ms(cooldown);
        let mut detector = FallDetector::new(config).unwrap();

        let fired: Vec<u64> = stamp(&axes, &gaps)
            .into_iter()
            .filter_map(|sample| detector.on_sample(sample).unwrap())
            .map(|event| event.timestamp)
            .collect();

        for pair in fired.windows(2) {
            prop_assert!(pair[1] - pair[0] > cooldown);
        }
    }

    #[test]
    fn repeated_reading_inside_window_is_silent(
        (x, y, z) in (axis(), axis(), axis()),
        start in 0u64..1_000_000,
        offset in 0u64..=5_000,
    ) {
        let mut detector = FallDetector::new(DetectorConfig::default()).unwrap();
        let sample = AccelerationSample::new(x, y, z, start);

        detector.on_sample(sample).unwrap();
        prop_assert!(detector.on_sample(sample.at(start + offset)).unwrap().is_none());
    }

    #[test]
    fn fired_events_exceed_a_threshold(
        axes in prop::collection::vec((axis(), axis(), axis()), 1..100),
    ) {
        let config = DetectorConfig::default();
        let mut detector = FallDetector::new(config).unwrap();

        for sample in stamp(&axes, &[]) {
            if let Some(event) = detector.on_sample(sample).unwrap() {
                prop_assert!(
                    event.magnitude > config.fall_threshold
                        || event.delta > config.vibration_threshold
                );
            }
        }
    }
}

#[test]
fn resting_phone_never_fires() {
    let mut detector = FallDetector::new(DetectorConfig::default()).unwrap();

    for sample in resting(500, 0) {
        assert!(detector.on_sample(sample).unwrap().is_none());
    }
}

#[test]
fn single_spike_fires_once() {
    let mut detector = FallDetector::new(DetectorConfig::default()).unwrap();
    let trace = fall_at(40, 10, 3.8);

    let events: Vec<_> = trace
        .iter()
        .filter_map(|sample| detector.on_sample(*sample).unwrap())
        .collect();

    // The spike trips both thresholds, the sample after it only the delta
    // check, which lands inside the cooldown
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].timestamp, 10 * common::INTERVAL_MS);
    assert_eq!(detector.stats().suppressed, 1);
}
