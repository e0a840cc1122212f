//! File replay of recorded accelerometer traces
//!
//! ## Supported Formats
//!
//! 1. **CSV**: `timestamp,x,y,z`, or `x,y,z` with timestamps synthesised at
//!    `index × sample_interval_ms` (the shape phone sensor loggers export)
//! 2. **JSON Lines**: one `{"timestamp":..,"x":..,"y":..,"z":..}` per line
//!
//! Blank lines and lines starting with `#` are ignored. Lines that fail to
//! parse are counted in [`FileStreamStats::parse_errors`], logged, and
//! skipped, so a header row costs one parse error unless it is skipped with
//! [`FileStream::with_skip_lines`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{Stream, StreamError};
use crate::{constants::detection::SAMPLE_INTERVAL_MS, sample::AccelerationSample, time::Timestamp};

const READ_BUFFER_SIZE: usize = 4096;
const LINE_CAPACITY: usize = 256;

/// Trace formats supported by [`FileStream`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Line-delimited JSON
    JsonLines,
}

impl FileFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "csv" | "txt" => Some(Self::Csv),
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Statistics for file replay
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileStreamStats {
    /// Samples parsed successfully
    pub samples_read: usize,
    /// Lines consumed, including skipped and malformed ones
    pub lines_processed: usize,
    /// Lines that could not be parsed
    pub parse_errors: usize,
    /// Bytes read from the file
    pub bytes_read: usize,
}

/// Sample stream backed by a trace file
///
/// ```rust,no_run
/// use guidex_core::stream::{FileStream, Stream};
///
/// let mut stream = FileStream::from_csv("walk.csv")?.with_skip_lines(1);
/// while let Ok(sample) = stream.poll_next() {
///     println!("{:.2} g", sample.magnitude());
/// }
/// # Ok::<(), guidex_core::stream::StreamError<std::io::Error>>(())
/// ```
pub struct FileStream {
    file: File,
    format: FileFormat,
    buffer: [u8; READ_BUFFER_SIZE],
    buffer_pos: usize,
    buffer_len: usize,
    line_buffer: heapless::String<LINE_CAPACITY>,
    eof: bool,
    skip_lines: usize,
    lines_skipped: usize,
    sample_interval_ms: u64,
    stats: FileStreamStats,
}

impl FileStream {
    /// Open a trace in `format`
    pub fn open<P: AsRef<Path>>(
        path: P,
        format: FileFormat,
    ) -> Result<Self, StreamError<std::io::Error>> {
        let file = File::open(path).map_err(StreamError::Transport)?;

        Ok(Self {
            file,
            format,
            buffer: [0; READ_BUFFER_SIZE],
            buffer_pos: 0,
            buffer_len: 0,
            line_buffer: heapless::String::new(),
            eof: false,
            skip_lines: 0,
            lines_skipped: 0,
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            stats: FileStreamStats::default(),
        })
    }

    /// Open a CSV trace
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, StreamError<std::io::Error>> {
        Self::open(path, FileFormat::Csv)
    }

    /// Open a JSON Lines trace
    pub fn from_json_lines<P: AsRef<Path>>(path: P) -> Result<Self, StreamError<std::io::Error>> {
        Self::open(path, FileFormat::JsonLines)
    }

    /// Skip the first N lines (headers)
    pub fn with_skip_lines(mut self, lines: usize) -> Self {
        self.skip_lines = lines;
        self
    }

    /// Spacing used when a CSV trace has no timestamp column
    pub fn with_sample_interval_ms(mut self, interval_ms: u64) -> Self {
        self.sample_interval_ms = interval_ms;
        self
    }

    /// Read and parse counters so far
    pub fn stats(&self) -> &FileStreamStats {
        &self.stats
    }

    fn refill_buffer(&mut self) -> Result<bool, StreamError<std::io::Error>> {
        if self.eof {
            return Ok(false);
        }

        if self.buffer_pos < self.buffer_len {
            let remaining = self.buffer_len - self.buffer_pos;
            self.buffer.copy_within(self.buffer_pos..self.buffer_len, 0);
            self.buffer_len = remaining;
        } else {
            self.buffer_len = 0;
        }
        self.buffer_pos = 0;

        let bytes_read = self
            .file
            .read(&mut self.buffer[self.buffer_len..])
            .map_err(StreamError::Transport)?;

        if bytes_read == 0 {
            self.eof = true;
            return Ok(self.buffer_len > 0);
        }

        self.buffer_len += bytes_read;
        self.stats.bytes_read += bytes_read;
        Ok(true)
    }

    /// Fill `line_buffer` with the next line; false at end of file
    fn read_line(&mut self) -> Result<bool, StreamError<std::io::Error>> {
        self.line_buffer.clear();
        let mut pending: heapless::Vec<u8, LINE_CAPACITY> = heapless::Vec::new();

        loop {
            while self.buffer_pos < self.buffer_len {
                let byte = self.buffer[self.buffer_pos];
                self.buffer_pos += 1;

                if byte == b'\n' {
                    self.stats.lines_processed += 1;

                    if self.lines_skipped < self.skip_lines {
                        self.lines_skipped += 1;
                        pending.clear();
                        continue;
                    }

                    return self.finish_line(&pending);
                } else if byte != b'\r' && pending.push(byte).is_err() {
                    self.discard_line()?;
                    self.stats.lines_processed += 1;

                    if self.lines_skipped < self.skip_lines {
                        self.lines_skipped += 1;
                        pending.clear();
                        continue;
                    }

                    return Err(StreamError::Overflow);
                }
            }

            if !self.refill_buffer()? {
                if pending.is_empty() {
                    return Ok(false);
                }
                self.stats.lines_processed += 1;
                return self.finish_line(&pending);
            }
        }
    }

    /// Drop the rest of the current line, up to and including its newline
    fn discard_line(&mut self) -> Result<(), StreamError<std::io::Error>> {
        loop {
            while self.buffer_pos < self.buffer_len {
                let byte = self.buffer[self.buffer_pos];
                self.buffer_pos += 1;
                if byte == b'\n' {
                    return Ok(());
                }
            }

            if !self.refill_buffer()? {
                return Ok(());
            }
        }
    }

    fn finish_line(&mut self, bytes: &[u8]) -> Result<bool, StreamError<std::io::Error>> {
        let text = core::str::from_utf8(bytes).map_err(|_| StreamError::Format("Invalid UTF-8"))?;
        self.line_buffer
            .push_str(text)
            .map_err(|_| StreamError::Overflow)?;
        Ok(true)
    }

    fn parse_csv(&self, line: &str) -> Result<AccelerationSample, &'static str> {
        let mut fields: heapless::Vec<&str, 4> = heapless::Vec::new();
        for field in line.split(',') {
            fields.push(field.trim()).map_err(|_| "Too many CSV fields")?;
        }

        match fields.as_slice() {
            [timestamp, x, y, z] => {
                let timestamp = timestamp.parse::<Timestamp>().map_err(|_| "Invalid timestamp")?;
                Ok(AccelerationSample::new(parse_axis(x)?, parse_axis(y)?, parse_axis(z)?, timestamp))
            }
            [x, y, z] => {
                let timestamp = self.stats.samples_read as u64 * self.sample_interval_ms;
                Ok(AccelerationSample::new(parse_axis(x)?, parse_axis(y)?, parse_axis(z)?, timestamp))
            }
            _ => Err("Expected 3 or 4 CSV fields"),
        }
    }

    fn parse_json(&self, line: &str) -> Result<AccelerationSample, &'static str> {
        serde_json::from_str(line).map_err(|_| "Invalid JSON sample")
    }
}

fn parse_axis(field: &str) -> Result<f32, &'static str> {
    field.parse::<f32>().map_err(|_| "Invalid axis value")
}

impl Stream for FileStream {
    type Item = AccelerationSample;
    type Error = StreamError<std::io::Error>;

    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error> {
        loop {
            if !self.read_line()? {
                return Err(nb::Error::Other(StreamError::EndOfStream));
            }

            let line = self.line_buffer.clone();
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parsed = match self.format {
                FileFormat::Csv => self.parse_csv(line),
                FileFormat::JsonLines => self.parse_json(line),
            };

            match parsed {
                Ok(sample) => {
                    self.stats.samples_read += 1;
                    return Ok(sample);
                }
                Err(reason) => {
                    self.stats.parse_errors += 1;
                    log::warn!("Skipping trace line {}: {}", self.stats.lines_processed, reason);
                }
            }
        }
    }
}
