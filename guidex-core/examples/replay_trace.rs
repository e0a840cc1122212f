//! Replay a recorded accelerometer trace and print every detected fall
//!
//! ```text
//! cargo run -p guidex-core --example replay_trace --features stream-file -- walk.csv
//! ```

use std::path::PathBuf;

use guidex_core::{
    stream::{replay, FileFormat, FileStream},
    DetectorConfig, FallDetector,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: replay_trace <trace.csv|trace.jsonl>");
            std::process::exit(2);
        }
    };

    let format = FileFormat::from_path(&path).unwrap_or(FileFormat::Csv);
    let mut stream = FileStream::open(&path, format)?;
    let mut detector = FallDetector::new(DetectorConfig::default())?;

    let falls = replay(&mut detector, &mut stream, |event| println!("{}", event))?;

    let stats = detector.stats();
    println!(
        "{} falls in {} samples ({} suppressed, {} rejected, {} unparsable lines)",
        falls,
        stats.samples_processed,
        stats.suppressed,
        stats.rejected,
        stream.stats().parse_errors
    );
    Ok(())
}
