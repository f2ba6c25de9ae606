use crate::error::{MatchError, Result};
use crate::table::reader::Level;
use crate::table::types::*;
use crate::utils::{write_u16_le, write_u32_le, write_u64_le};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

impl AsRef<[Edge]> for Level {
    fn as_ref(&self) -> &[Edge] {
        self.edges()
    }
}

/// Encoder for the binary level-table format consumed by both the software
/// engine and the hardware path
pub struct LevelTableWriter {
    hash: u64,
}

impl LevelTableWriter {
    /// `hash` is stored verbatim as the table's integrity word
    pub fn new(hash: u64) -> Self {
        Self { hash }
    }

    /// Encode levels into a byte buffer
    pub fn encode<L: AsRef<[Edge]>>(&self, levels: &[L]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf, levels)?;
        Ok(buf)
    }

    /// Encode levels into a file
    pub fn write_file<L: AsRef<[Edge]>>(&self, path: &Path, levels: &[L]) -> Result<()> {
        let file = File::create(path).map_err(|e| MatchError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer, levels)?;
        writer.flush().map_err(|e| MatchError::io(path, e))?;
        Ok(())
    }

    fn write<W: Write, L: AsRef<[Edge]>>(&self, writer: &mut W, levels: &[L]) -> Result<()> {
        write_u64_le(writer, self.hash)?;

        for (level, edges) in levels.iter().enumerate() {
            let edges = edges.as_ref();
            write_u64_le(writer, edges.len() as u64)?;

            for (index, edge) in edges.iter().enumerate() {
                if !fits_layout(edge) {
                    return Err(MatchError::FieldOverflow { level, index });
                }
                write_u64_le(writer, edge.encode())?;
            }

            for _ in 0..padding_words(edges.len()) {
                write_u64_le(writer, 0)?;
            }
        }
        Ok(())
    }
}

fn fits_layout(edge: &Edge) -> bool {
    edge.operand_a as u64 <= MASK_OPERAND
        && edge.operand_b as u64 <= MASK_OPERAND
        && edge.pointer as u64 <= MASK_POINTER
        && edge.hw_weight as u64 <= MASK_WEIGHT
}

/// Encoder for query workloads
pub struct WorkloadWriter {
    record_size: u32,
}

impl WorkloadWriter {
    /// Records padded with zeros to `record_size` bytes
    pub fn new(record_size: u32) -> Self {
        Self { record_size }
    }

    /// Records holding exactly `levels` operands
    pub fn packed(levels: usize) -> Self {
        Self::new((levels * 2) as u32)
    }

    pub fn encode<Q: AsRef<[u16]>>(&self, queries: &[Q]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf, queries)?;
        Ok(buf)
    }

    pub fn write_file<Q: AsRef<[u16]>>(&self, path: &Path, queries: &[Q]) -> Result<()> {
        let file = File::create(path).map_err(|e| MatchError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer, queries)?;
        writer.flush().map_err(|e| MatchError::io(path, e))?;
        Ok(())
    }

    fn write<W: Write, Q: AsRef<[u16]>>(&self, writer: &mut W, queries: &[Q]) -> Result<()> {
        write_u32_le(writer, self.record_size)?;
        write_u32_le(writer, queries.len() as u32)?;

        for query in queries {
            let operands = query.as_ref();
            let used = operands.len() * 2;
            if used > self.record_size as usize {
                return Err(MatchError::InvalidRecordSize {
                    record_size: self.record_size,
                    levels: operands.len(),
                });
            }
            for &op in operands {
                write_u16_le(writer, op)?;
            }
            writer.write_all(&vec![0u8; self.record_size as usize - used])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let levels = vec![vec![Edge::new(1, 2, 3, true)]];
        let bytes = LevelTableWriter::new(0x0102).encode(&levels).unwrap();

        // hash + one cache line (count, edge, 6 padding words)
        assert_eq!(bytes.len(), 8 + 64);
        assert_eq!(&bytes[0..8], &0x0102u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &1u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &Edge::new(1, 2, 3, true).encode().to_le_bytes());
        assert!(bytes[24..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rejects_wide_fields() {
        let levels = vec![vec![Edge::new(1, 0, 0, true), Edge::new(1 << 14, 0, 0, true)]];
        let err = LevelTableWriter::new(0).encode(&levels).unwrap_err();
        assert!(matches!(err, MatchError::FieldOverflow { level: 0, index: 1 }));

        let levels = vec![vec![Edge::new(0, 0, 1 << 15, true)]];
        assert!(LevelTableWriter::new(0).encode(&levels).is_err());
    }

    #[test]
    fn test_workload_layout_with_padding() {
        let bytes = WorkloadWriter::new(8).encode(&[[1u16, 2], [3, 4]]).unwrap();
        assert_eq!(&bytes[0..4], &8u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(bytes.len(), 8 + 2 * 8);
        assert_eq!(&bytes[8..12], &[1, 0, 2, 0]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);
        assert_eq!(&bytes[16..20], &[3, 0, 4, 0]);
    }

    #[test]
    fn test_workload_record_too_small() {
        let err = WorkloadWriter::new(2).encode(&[[1u16, 2]]).unwrap_err();
        assert!(matches!(err, MatchError::InvalidRecordSize { .. }));
    }
}
