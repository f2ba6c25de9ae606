//! Benchmark and result file writers.

use crate::batch::executor::BatchTiming;
use crate::table::MatchResult;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const BENCHMARK_HEADER: &str = "batch_size,total_ns";

/// CSV sink for batch timings, one row per timed batch
pub struct BenchmarkWriter<W: Write> {
    writer: W,
}

impl BenchmarkWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> io::Result<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> BenchmarkWriter<W> {
    /// Wrap a writer and emit the header row
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{}", BENCHMARK_HEADER)?;
        Ok(Self { writer })
    }

    pub fn record(&mut self, timing: &BatchTiming) -> io::Result<()> {
        writeln!(
            self.writer,
            "{},{}",
            timing.batch_size,
            timing.elapsed.as_nanos()
        )
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Write the terminal pointer of each result, one per line, in query order
pub fn write_results<W: Write>(writer: &mut W, results: &[MatchResult]) -> io::Result<()> {
    for result in results {
        writeln!(writer, "{}", result.pointer)?;
    }
    writer.flush()
}

pub fn write_results_file(path: &Path, results: &[MatchResult]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_results(&mut writer, results)
}
