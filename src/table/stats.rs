use crate::engine::schema::{max_weight, Criterion, Structure};
use crate::table::reader::LevelTable;
use crate::table::types::HASH_SIZE;
use anyhow::{Context, Result};
use std::path::Path;

/// Shape of one level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStats {
    pub level: usize,
    pub edges: usize,
    pub buckets: usize,
    pub weight: u32,
    pub structure: Structure,
    pub wildcard: bool,
}

/// Summary of a loaded table against its schema
#[derive(Debug, Clone)]
pub struct TableStats {
    pub hash: u64,
    /// Bytes on disk after the hash
    pub raw_size: u64,
    pub levels: Vec<LevelStats>,
}

impl TableStats {
    pub fn collect(table: &LevelTable, schema: &[Criterion], file_size: u64) -> Self {
        let levels = table
            .levels()
            .iter()
            .zip(schema)
            .enumerate()
            .map(|(level, (l, c))| LevelStats {
                level,
                edges: l.len(),
                buckets: l.bucket_count(),
                weight: c.weight,
                structure: c.structure,
                wildcard: c.wildcard_enabled,
            })
            .collect();

        Self {
            hash: table.hash(),
            raw_size: file_size.saturating_sub(HASH_SIZE as u64),
            levels,
        }
    }

    pub fn total_edges(&self) -> usize {
        self.levels.iter().map(|l| l.edges).sum()
    }
}

/// Display level-table statistics
pub fn show_stats(path: &Path, schema: &[Criterion]) -> Result<()> {
    let table = LevelTable::open_with_levels(path, schema.len())
        .with_context(|| format!("Failed to load level table {}", path.display()))?;
    let file_size = std::fs::metadata(path)?.len();
    let stats = TableStats::collect(&table, schema, file_size);

    println!("Level Table Statistics");
    println!("======================");
    println!();
    println!("Path:             {}", path.display());
    println!("Hash:             {:#018x}", stats.hash);
    println!("Size:             {}", format_size(stats.raw_size));
    println!("Levels:           {}", stats.levels.len());
    println!("Edges:            {}", stats.total_edges());
    println!("Max score:        {}", max_weight(schema));
    println!();
    println!(
        "  {:>5} {:>8} {:>8} {:>8} {:>9} {:>8}",
        "level", "edges", "buckets", "weight", "structure", "wildcard"
    );

    for l in &stats.levels {
        let structure = match l.structure {
            Structure::Simple => "simple",
            Structure::Pair => "pair",
        };
        println!(
            "  {:>5} {:>8} {:>8} {:>8} {:>9} {:>8}",
            l.level,
            l.edges,
            l.buckets,
            l.weight,
            structure,
            if l.wildcard { "yes" } else { "no" }
        );
    }

    Ok(())
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::schema::Comparator;
    use crate::table::types::Edge;

    #[test]
    fn test_collect() {
        let table = LevelTable::new(
            9,
            vec![
                vec![Edge::new(1, 0, 0, false), Edge::new(2, 0, 1, true)],
                vec![Edge::new(1, 0, 5, true), Edge::new(2, 0, 6, true)],
            ],
        )
        .unwrap();
        let schema = [
            Criterion::simple(Comparator::Equal, 4, true),
            Criterion::range(2, false),
        ];

        let stats = TableStats::collect(&table, &schema, 8 + 128);
        assert_eq!(stats.hash, 9);
        assert_eq!(stats.raw_size, 128);
        assert_eq!(stats.total_edges(), 4);
        assert_eq!(stats.levels[0].buckets, 1);
        assert_eq!(stats.levels[1].buckets, 2);
        assert_eq!(stats.levels[1].structure, Structure::Pair);
        assert!(stats.levels[0].wildcard);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
