//! In-memory sample stream
//!
//! Replays a borrowed slice of samples, for unit tests, simulation and
//! re-running traces that are already in memory.

use super::{Stream, StreamError};
use crate::sample::AccelerationSample;

/// Stream over a slice of samples
///
/// ```rust
/// use guidex_core::{stream::{replay, MemoryStream}, AccelerationSample, DetectorConfig, FallDetector};
///
/// let trace = [
///     AccelerationSample::new(0.0, 0.0, 0.0, 0),
///     AccelerationSample::new(0.0, 0.0, 1.5, 800),
/// ];
///
/// let mut detector = FallDetector::new(DetectorConfig::default())?;
/// let mut stream = MemoryStream::new(&trace);
/// let falls = replay(&mut detector, &mut stream, |_| {}).unwrap();
/// assert_eq!(falls, 1);
/// # Ok::<(), guidex_core::DetectorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStream<'a> {
    samples: &'a [AccelerationSample],
    position: usize,
}

impl<'a> MemoryStream<'a> {
    /// Stream over `samples`, starting at the first
    pub fn new(samples: &'a [AccelerationSample]) -> Self {
        Self { samples, position: 0 }
    }

    /// Rewind to the first sample
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Index of the next sample
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once every sample has been yielded
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.samples.len()
    }
}

impl<'a> Stream for MemoryStream<'a> {
    type Item = AccelerationSample;
    type Error = StreamError<()>;

    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error> {
        let sample = match self.samples.get(self.position) {
            Some(sample) => *sample,
            None => return Err(nb::Error::Other(StreamError::EndOfStream)),
        };
        self.position += 1;
        Ok(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.samples.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}
