//! Error taxonomy shared by the codec, the engine and the batch executor.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or evaluating a level table
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Stream(#[from] io::Error),

    #[error("corrupted level table: expected {expected} bytes, got {actual} bytes")]
    CorruptTable { expected: u64, actual: u64 },

    #[error("corrupted workload: expected {expected} bytes, got {actual} bytes")]
    CorruptWorkload { expected: u64, actual: u64 },

    #[error("workload record of {record_size} bytes cannot hold {levels} operands")]
    InvalidRecordSize { record_size: u32, levels: usize },

    #[error("malformed level table: no terminated bucket at level {level}, index {index}")]
    MalformedTable { level: usize, index: usize },

    #[error("edge {index} of level {level} does not fit the packed layout")]
    FieldOverflow { level: usize, index: usize },

    #[error("query has {actual} operands, table has {expected} levels")]
    QueryLength { expected: usize, actual: usize },

    #[error("level table hash mismatch: expected {expected:#018x}, got {actual:#018x}")]
    HashMismatch { expected: u64, actual: u64 },

    #[error("criterion schema has {schema} entries, table has {table} levels")]
    SchemaMismatch { schema: usize, table: usize },

    #[error("out of memory allocating {bytes} bytes")]
    ResourceExhausted { bytes: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MatchError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

/// Allocate a zero-filled vector, reporting allocation failure instead of aborting
pub(crate) fn try_alloc<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| MatchError::ResourceExhausted {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buf.resize(len, T::default());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_workload_message_has_both_sizes() {
        let err = MatchError::CorruptWorkload {
            expected: 88,
            actual: 90,
        };
        let msg = err.to_string();
        assert!(msg.contains("88"));
        assert!(msg.contains("90"));
    }

    #[test]
    fn test_try_alloc_reports_exhaustion() {
        let err = try_alloc::<u64>(usize::MAX / 2).unwrap_err();
        assert!(matches!(err, MatchError::ResourceExhausted { .. }));
    }

    #[test]
    fn test_try_alloc_zero_fills() {
        let buf = try_alloc::<u16>(5).unwrap();
        assert_eq!(buf, vec![0u16; 5]);
    }
}
