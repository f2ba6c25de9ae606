//! Query workloads: fixed-size records of per-level operands.
//!
//! Layout: `record_size: u32`, `count: u32`, then `count` records of
//! `record_size` bytes. Each record starts with one little-endian `u16` per
//! level; any remaining bytes of a record are padding.

use crate::engine::schema::LEVEL_COUNT;
use crate::error::{try_alloc, MatchError, Result};
use crate::table::LevelTable;
use crate::utils::ByteCursor;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::info;

const HEADER_SIZE: u64 = 8;

/// Decoded query vectors, stored flat with a stride of `levels`
#[derive(Debug, Clone)]
pub struct Workload {
    levels: usize,
    record_size: u32,
    operands: Vec<u16>,
}

impl Workload {
    /// Build a workload from in-memory queries
    pub fn from_queries<Q: AsRef<[u16]>>(levels: usize, queries: &[Q]) -> Result<Self> {
        let mut operands = try_alloc::<u16>(queries.len() * levels)?;
        for (slot, query) in operands.chunks_exact_mut(levels.max(1)).zip(queries) {
            let query = query.as_ref();
            if query.len() != levels {
                return Err(MatchError::QueryLength {
                    expected: levels,
                    actual: query.len(),
                });
            }
            slot.copy_from_slice(query);
        }
        Ok(Self {
            levels,
            record_size: (levels * 2) as u32,
            operands,
        })
    }

    /// Load a production workload (22 operands per query) from disk
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_levels(path, LEVEL_COUNT)
    }

    pub fn open_with_levels(path: &Path, levels: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| MatchError::io(path, e))?;
        let len = file.metadata().map_err(|e| MatchError::io(path, e))?.len();
        if len < HEADER_SIZE {
            return Err(MatchError::CorruptWorkload {
                expected: HEADER_SIZE,
                actual: len,
            });
        }

        let mmap = unsafe { Mmap::map(&file).map_err(|e| MatchError::io(path, e))? };
        let workload = Self::from_bytes(&mmap, levels)?;

        info!(
            path = %path.display(),
            queries = workload.len(),
            record_size = workload.record_size,
            "workload loaded"
        );
        Ok(workload)
    }

    /// Decode a workload, rejecting it if the declared size disagrees with the data
    pub fn from_bytes(bytes: &[u8], levels: usize) -> Result<Self> {
        let mut cursor = ByteCursor::new(bytes);
        let header = (cursor.read_u32_le(), cursor.read_u32_le());
        let (record_size, count) = match header {
            (Some(size), Some(count)) => (size, count),
            _ => {
                return Err(MatchError::CorruptWorkload {
                    expected: HEADER_SIZE,
                    actual: bytes.len() as u64,
                });
            }
        };

        let expected = record_size as u64 * count as u64;
        let actual = cursor.remaining() as u64;
        if expected != actual {
            return Err(MatchError::CorruptWorkload { expected, actual });
        }

        if (record_size as usize) < levels * 2 {
            return Err(MatchError::InvalidRecordSize {
                record_size,
                levels,
            });
        }

        let mut operands = try_alloc::<u16>(count as usize * levels)?;
        for query in operands.chunks_exact_mut(levels.max(1)) {
            let mut record = cursor
                .take(record_size as usize)
                .map(ByteCursor::new)
                .ok_or(MatchError::CorruptWorkload { expected, actual })?;
            for op in query.iter_mut() {
                // Record size was checked to hold every operand
                *op = record.read_u16_le().unwrap_or_default();
            }
        }

        Ok(Self {
            levels,
            record_size,
            operands,
        })
    }

    /// Check that every query's first operand addresses a level-0 bucket.
    ///
    /// The first operand doubles as the starting edge index, so this is the
    /// only runtime input that can point outside the table.
    pub fn validate_against(&self, table: &LevelTable) -> Result<()> {
        if table.level_count() != self.levels {
            return Err(MatchError::QueryLength {
                expected: table.level_count(),
                actual: self.levels,
            });
        }
        if self.levels == 0 {
            return Ok(());
        }

        let root = table.level(0);
        for query in self.iter() {
            let start = query[0] as usize;
            if root.bucket(start).is_none() {
                return Err(MatchError::MalformedTable {
                    level: 0,
                    index: start,
                });
            }
        }
        Ok(())
    }

    /// Operands of query `index`
    #[inline]
    pub fn query(&self, index: usize) -> &[u16] {
        let start = index * self.levels;
        &self.operands[start..start + self.levels]
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u16]> + '_ {
        self.operands.chunks_exact(self.levels.max(1))
    }

    /// All operands, query after query
    pub fn operands(&self) -> &[u16] {
        &self.operands
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn record_size(&self) -> u32 {
        self.record_size
    }

    pub fn len(&self) -> usize {
        if self.levels == 0 {
            0
        } else {
            self.operands.len() / self.levels
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
