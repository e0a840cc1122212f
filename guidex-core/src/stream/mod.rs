//! Sample streams
//!
//! Pull-based sources of [`AccelerationSample`]s. On a device the sensor
//! pushes readings into the detector directly; streams exist so recorded
//! traces and synthetic sequences can be driven through exactly the same
//! code path.
//!
//! - `memory` - replay a slice of samples (feature `stream-memory`)
//! - `file` - replay a recorded CSV or JSON Lines trace (feature `stream-file`)
//!
//! Streams use `nb::Result`: `WouldBlock` means "nothing yet", and a stream
//! that never yields simply never produces a fall.

use core::fmt;

use crate::{detector::FallDetector, events::FallEvent, sample::AccelerationSample};

#[cfg(feature = "stream-memory")]
pub mod memory;

#[cfg(feature = "stream-file")]
pub mod file;

#[cfg(feature = "stream-memory")]
pub use memory::MemoryStream;

#[cfg(feature = "stream-file")]
pub use file::{FileFormat, FileStream, FileStreamStats};

/// Errors that can occur while pulling samples
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError<E> {
    /// Transport-level error (e.g., I/O error)
    Transport(E),
    /// Data format error
    Format(&'static str),
    /// End of stream reached
    EndOfStream,
    /// A record did not fit the line buffer
    Overflow,
}

impl<E: fmt::Display> fmt::Display for StreamError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::Format(msg) => write!(f, "Format error: {}", msg),
            Self::EndOfStream => write!(f, "End of stream"),
            Self::Overflow => write!(f, "Record too long"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display> std::error::Error for StreamError<E> {}

/// Pull-based source of items
///
/// Return `nb::Error::WouldBlock` when no item is ready and
/// `StreamError::EndOfStream` once the source is exhausted.
pub trait Stream {
    /// Type of items produced
    type Item;
    /// Error type for stream operations
    type Error;

    /// Poll for the next item
    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error>;

    /// Bounds on the number of remaining items
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}

/// Feed every available sample of `stream` into `detector`
///
/// Calls `on_fall` for each event and returns how many fired. Stops at the
/// end of the stream or when it would block, so it can be called again once
/// more data is available. Non-finite samples are skipped; the detector
/// counts them as rejected.
pub fn replay<S, E, F>(
    detector: &mut FallDetector,
    stream: &mut S,
    mut on_fall: F,
) -> Result<u64, StreamError<E>>
where
    S: Stream<Item = AccelerationSample, Error = StreamError<E>>,
    F: FnMut(&FallEvent),
{
    let mut falls = 0u64;

    loop {
        match stream.poll_next() {
            Ok(sample) => {
                if let Ok(Some(event)) = detector.on_sample(sample) {
                    falls += 1;
                    on_fall(&event);
                }
            }
            Err(nb::Error::WouldBlock) => break,
            Err(nb::Error::Other(StreamError::EndOfStream)) => break,
            Err(nb::Error::Other(e)) => return Err(e),
        }
    }

    Ok(falls)
}
