//! Time management for the detector
//!
//! The detector never reads a clock on its own: every sample carries its
//! timestamp. Clock sources are only needed where raw `x, y, z` readings
//! arrive without one and have to be stamped on receipt:
//! - Monotonic clock (default, immune to wall-clock adjustments)
//! - System clock (milliseconds since the Unix epoch)
//! - Fixed clock (tests and replay)

/// Timestamp in milliseconds since epoch (or since clock creation for monotonic)
pub type Timestamp = u64;

/// Source of time for the system
pub trait TimeSource: Send {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;

    /// Get precision in milliseconds
    fn precision_ms(&self) -> u32;
}

/// Milliseconds between two timestamps, zero if the clock went backwards
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

/// Monotonic time source
///
/// Starts at 0 when created, always increases
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Clock whose zero is the moment of creation
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock stopped at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to `timestamp`
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}
