//! Progress display for the batch-size sweep; silent when the `progress`
//! feature is disabled

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

pub struct SweepProgress {
    #[cfg(feature = "progress")]
    bar: Option<ProgressBar>,
}

impl SweepProgress {
    /// `total` is the number of timed batches in the sweep
    #[cfg(feature = "progress")]
    pub fn new(total: u64, enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        });
        Self { bar }
    }

    #[cfg(not(feature = "progress"))]
    pub fn new(_total: u64, _enabled: bool) -> Self {
        Self {}
    }

    /// Record one finished batch
    pub fn batch_done(&self, _batch_size: usize) {
        #[cfg(feature = "progress")]
        if let Some(bar) = &self.bar {
            bar.set_message(format!("batch size {}", _batch_size));
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        #[cfg(feature = "progress")]
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
