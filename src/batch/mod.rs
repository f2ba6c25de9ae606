pub mod executor;
pub mod progress;
pub mod report;

pub use executor::{BatchExecutor, BatchTiming};
pub use progress::SweepProgress;
pub use report::{write_results_file, BenchmarkWriter};
