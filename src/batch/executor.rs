use crate::config::RunConfig;
use crate::engine::Engine;
use crate::error::{try_alloc, MatchError, Result};
use crate::table::MatchResult;
use crate::workload::Workload;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Wall-clock cost of one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTiming {
    pub batch_size: usize,
    pub iteration: u32,
    pub elapsed: Duration,
}

/// Data-parallel harness driving many independent queries through one engine.
///
/// Queries share the engine read-only and each writes only its own result
/// slot, so batches need no synchronization beyond the pool's fan-out/join.
pub struct BatchExecutor<'a> {
    engine: Engine<'a>,
    pool: ThreadPool,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(engine: Engine<'a>, threads: usize) -> Result<Self> {
        if engine.table().level_count() == 0 {
            return Err(MatchError::InvalidConfig("table has no levels".into()));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("nfamatch-worker-{}", i))
            .build()
            .map_err(|e| MatchError::InvalidConfig(e.to_string()))?;
        Ok(Self { engine, pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Evaluate a flat batch of queries; slot `i` receives query `i`'s result.
    ///
    /// Returns the elapsed wall-clock time of the parallel region only.
    pub fn run_batch(&self, queries: &[u16], results: &mut [MatchResult]) -> Result<Duration> {
        let levels = self.engine.table().level_count();
        if queries.len() != results.len() * levels {
            return Err(MatchError::QueryLength {
                expected: results.len() * levels,
                actual: queries.len(),
            });
        }

        let engine = self.engine;
        let start = Instant::now();
        self.pool.install(|| {
            results
                .par_iter_mut()
                .zip(queries.par_chunks(levels))
                .try_for_each(|(slot, query)| {
                    *slot = engine.evaluate(query)?;
                    Ok::<(), MatchError>(())
                })
        })?;
        Ok(start.elapsed())
    }

    /// Evaluate every workload query once, in workload order
    pub fn match_all(&self, workload: &Workload) -> Result<Vec<MatchResult>> {
        let mut results = try_alloc::<MatchResult>(workload.len())?;
        let elapsed = self.run_batch(workload.operands(), &mut results)?;
        info!(
            queries = workload.len(),
            elapsed_ns = elapsed.as_nanos() as u64,
            "workload matched"
        );
        Ok(results)
    }

    /// Time batches of randomly sampled queries over the configured sweep.
    ///
    /// Each batch draws `batch_size` queries uniformly with replacement.
    /// `on_timing` sees every batch as soon as it completes.
    pub fn sweep<F>(&self, workload: &Workload, config: &RunConfig, mut on_timing: F) -> Result<()>
    where
        F: FnMut(BatchTiming) -> Result<()>,
    {
        if workload.is_empty() {
            return Err(MatchError::InvalidConfig("workload is empty".into()));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let levels = workload.levels();

        for batch_size in config.batch_sizes() {
            let mut queries = try_alloc::<u16>(batch_size * levels)?;
            let mut results = try_alloc::<MatchResult>(batch_size)?;

            info!(
                batch_size,
                queries_bytes = batch_size * workload.record_size() as usize,
                results_bytes = batch_size * std::mem::size_of::<u16>(),
                "starting batch size"
            );

            for iteration in 0..config.iterations {
                sample_batch(workload, &mut queries, &mut rng);
                let elapsed = self.run_batch(&queries, &mut results)?;
                debug!(batch_size, iteration, elapsed_ns = elapsed.as_nanos() as u64);

                on_timing(BatchTiming {
                    batch_size,
                    iteration,
                    elapsed,
                })?;
            }
        }

        Ok(())
    }
}

/// Fill `buf` with queries drawn uniformly with replacement from `workload`
pub fn sample_batch<R: Rng>(workload: &Workload, buf: &mut [u16], rng: &mut R) {
    let levels = workload.levels();
    for slot in buf.chunks_exact_mut(levels) {
        let index = rng.gen_range(0..workload.len());
        slot.copy_from_slice(workload.query(index));
    }
}
