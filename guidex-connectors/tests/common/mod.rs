//! Shared fixtures for the connector integration tests
//!
//! - A recording device wired into every collaborator slot
//! - Dispatcher and monitor builders with the shipped defaults
//! - Local date-times around a known Sunday (2024-03-03)

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use guidex_connectors::{
    emergency::{EmergencyConfig, EmergencyDispatcher},
    monitor::{FallMonitor, MonitorEvent, MonitorHandle, MonitorOptions},
    recording::RecordingDevice,
    Devices,
};
use guidex_core::{AccelerationSample, DetectorConfig, FallDetector, PhoneNumber, Timestamp};
use tokio::sync::broadcast;

pub const CONTACT: &str = "+919822115810";

pub fn contact() -> PhoneNumber {
    PhoneNumber::parse(CONTACT).unwrap()
}

pub fn device() -> Arc<RecordingDevice> {
    Arc::new(RecordingDevice::new())
}

pub fn dispatcher(device: &Arc<RecordingDevice>) -> Arc<EmergencyDispatcher> {
    Arc::new(EmergencyDispatcher::new(
        EmergencyConfig::new(contact()),
        Devices::from_shared(device.clone()),
    ))
}

/// Monitor running the default detector against a real dispatcher
pub fn monitor(device: &Arc<RecordingDevice>, options: MonitorOptions) -> MonitorHandle {
    let detector = FallDetector::new(DetectorConfig::default()).unwrap();
    FallMonitor::spawn(detector, dispatcher(device), options)
}

/// Phone lying flat
pub fn resting(timestamp: Timestamp) -> AccelerationSample {
    AccelerationSample::new(0.0, 0.0, 0.98, timestamp)
}

/// Hard impact along z
pub fn impact(timestamp: Timestamp) -> AccelerationSample {
    AccelerationSample::new(0.0, 0.0, 3.0, timestamp)
}

/// Everything still buffered for a subscriber whose monitor has stopped
pub fn drain(events: &mut broadcast::Receiver<MonitorEvent>) -> Vec<MonitorEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// Local time on a day in March 2024; the 3rd was a Sunday
pub fn march(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}
