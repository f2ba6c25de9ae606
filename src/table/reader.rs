use crate::engine::schema::LEVEL_COUNT;
use crate::error::{MatchError, Result};
use crate::table::types::*;
use crate::utils::ByteCursor;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

const NO_TERMINATOR: u32 = u32::MAX;

/// Edge sequence of one level with precomputed bucket bounds
#[derive(Debug, Clone)]
pub struct Level {
    edges: Vec<Edge>,
    /// For each edge index, the index of the first terminator at or after it
    bucket_end: Vec<u32>,
}

impl Level {
    pub fn new(edges: Vec<Edge>) -> Self {
        let mut bucket_end = vec![NO_TERMINATOR; edges.len()];
        let mut end = NO_TERMINATOR;
        for (i, edge) in edges.iter().enumerate().rev() {
            if edge.is_terminator {
                end = i as u32;
            }
            bucket_end[i] = end;
        }
        Self { edges, bucket_end }
    }

    /// The bucket starting at `start`, terminator included.
    ///
    /// `None` when `start` is past the end or no terminator follows it.
    #[inline]
    pub fn bucket(&self, start: usize) -> Option<&[Edge]> {
        match self.bucket_end.get(start) {
            Some(&end) if end != NO_TERMINATOR => Some(&self.edges[start..=end as usize]),
            _ => None,
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of terminated buckets
    pub fn bucket_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_terminator).count()
    }
}

/// Read-only decision table, loaded once and shared by every query
#[derive(Debug, Clone)]
pub struct LevelTable {
    hash: u64,
    levels: Vec<Level>,
}

impl LevelTable {
    /// Build a table from decoded levels and validate every pointer
    pub fn new(hash: u64, levels: Vec<Vec<Edge>>) -> Result<Self> {
        let table = Self {
            hash,
            levels: levels.into_iter().map(Level::new).collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// Load a production table (22 levels) from disk
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_levels(path, LEVEL_COUNT)
    }

    /// Load a table with an explicit level count from disk
    pub fn open_with_levels(path: &Path, level_count: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| MatchError::io(path, e))?;
        let len = file.metadata().map_err(|e| MatchError::io(path, e))?.len();
        if len < HASH_SIZE as u64 {
            return Err(MatchError::CorruptTable {
                expected: HASH_SIZE as u64,
                actual: len,
            });
        }

        let mmap = unsafe { Mmap::map(&file).map_err(|e| MatchError::io(path, e))? };
        let table = Self::from_bytes(&mmap, level_count)?;

        info!(
            path = %path.display(),
            hash = table.hash,
            size = len - HASH_SIZE as u64,
            edges = table.edge_count(),
            "level table loaded"
        );
        Ok(table)
    }

    /// Decode a table from its binary representation
    pub fn from_bytes(bytes: &[u8], level_count: usize) -> Result<Self> {
        let actual = bytes.len() as u64;
        let mut cursor = ByteCursor::new(bytes);

        let hash = cursor.read_u64_le().ok_or(MatchError::CorruptTable {
            expected: HASH_SIZE as u64,
            actual,
        })?;

        let mut levels = Vec::with_capacity(level_count);
        for level in 0..level_count {
            let count = cursor.read_u64_le().ok_or(MatchError::CorruptTable {
                expected: (cursor.position() + WORD_SIZE) as u64,
                actual,
            })?;

            // Size the whole block before allocating anything for it
            let block = count
                .checked_add(padding_words((count % WORDS_PER_CACHE_LINE as u64) as usize) as u64)
                .and_then(|words| words.checked_mul(WORD_SIZE as u64))
                .unwrap_or(u64::MAX);
            if block > cursor.remaining() as u64 {
                return Err(MatchError::CorruptTable {
                    expected: (cursor.position() as u64).saturating_add(block),
                    actual,
                });
            }

            let count = count as usize;
            let mut edges = Vec::new();
            edges
                .try_reserve_exact(count)
                .map_err(|_| MatchError::ResourceExhausted {
                    bytes: count * std::mem::size_of::<Edge>(),
                })?;
            for _ in 0..count {
                // Bounds were checked against the whole block above
                let raw = cursor.read_u64_le().ok_or(MatchError::CorruptTable {
                    expected: (cursor.position() + WORD_SIZE) as u64,
                    actual,
                })?;
                edges.push(Edge::decode(raw));
            }
            cursor.take(padding_words(count) * WORD_SIZE);

            debug!(level, edges = count, "decoded level");
            levels.push(edges);
        }

        if cursor.remaining() > 0 {
            warn!(bytes = cursor.remaining(), "ignoring trailing bytes after last level");
        }

        Self::new(hash, levels)
    }

    /// Every non-terminal pointer must address a terminated bucket of the next level
    fn validate(&self) -> Result<()> {
        for (level, pair) in self.levels.windows(2).enumerate() {
            let next = &pair[1];
            for edge in pair[0].edges() {
                if next.bucket(edge.pointer as usize).is_none() {
                    return Err(MatchError::MalformedTable {
                        level: level + 1,
                        index: edge.pointer as usize,
                    });
                }
            }
        }
        Ok(())
    }

    /// Compare the stored integrity hash with an expected value
    pub fn verify_hash(&self, expected: u64) -> Result<()> {
        if self.hash != expected {
            return Err(MatchError::HashMismatch {
                expected,
                actual: self.hash,
            });
        }
        Ok(())
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn level(&self, level: usize) -> &Level {
        &self.levels[level]
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Total edges across all levels
    pub fn edge_count(&self) -> usize {
        self.levels.iter().map(Level::len).sum()
    }
}
