//! Best-match search over a level table.
//!
//! The search walks one bucket per level, recursing into the next level for
//! every matching edge. Every edge of a bucket is examined: several rules can
//! share a predecessor, and only the highest total weight wins. Ties on the
//! terminal level go to the edge evaluated last.

use crate::engine::matcher::matcher;
use crate::engine::schema::Criterion;
use crate::error::{MatchError, Result};
use crate::table::{LevelTable, MatchResult};

/// Read-only search context shared by all concurrently running queries
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    table: &'a LevelTable,
    schema: &'a [Criterion],
}

impl<'a> Engine<'a> {
    pub fn new(table: &'a LevelTable, schema: &'a [Criterion]) -> Result<Self> {
        if schema.len() != table.level_count() {
            return Err(MatchError::SchemaMismatch {
                schema: schema.len(),
                table: table.level_count(),
            });
        }
        Ok(Self { table, schema })
    }

    pub fn table(&self) -> &'a LevelTable {
        self.table
    }

    pub fn schema(&self) -> &'a [Criterion] {
        self.schema
    }

    /// Evaluate a query from the bucket addressed by its first operand
    pub fn evaluate(&self, query: &[u16]) -> Result<MatchResult> {
        let start = query.first().copied().unwrap_or_default() as usize;
        self.evaluate_from(query, start)
    }

    /// Evaluate a query from an explicit level-0 bucket
    pub fn evaluate_from(&self, query: &[u16], start: usize) -> Result<MatchResult> {
        let mut best = MatchResult::default();
        if self.table.level_count() > 0 {
            self.search(query, 0, start, 0, &mut best)?;
        }
        Ok(best)
    }

    /// Search the bucket at `start` of `level` and everything reachable from it.
    ///
    /// `best` is only ever overwritten by a terminal candidate whose weight is
    /// at least its current weight.
    pub fn search(
        &self,
        query: &[u16],
        level: usize,
        start: usize,
        weight: u32,
        best: &mut MatchResult,
    ) -> Result<()> {
        if query.len() != self.table.level_count() {
            return Err(MatchError::QueryLength {
                expected: self.table.level_count(),
                actual: query.len(),
            });
        }
        if level >= self.table.level_count() {
            return Ok(());
        }
        self.descend(query, level, start, weight, best)
    }

    fn descend(
        &self,
        query: &[u16],
        level: usize,
        start: usize,
        weight: u32,
        best: &mut MatchResult,
    ) -> Result<()> {
        let bucket = self
            .table
            .level(level)
            .bucket(start)
            .ok_or(MatchError::MalformedTable { level, index: start })?;
        let criterion = &self.schema[level];
        let operand = query[level];
        let terminal = level + 1 == self.table.level_count();

        for edge in bucket {
            let eval = matcher(criterion, operand, edge.operand_a, edge.operand_b);
            if !eval.matched {
                continue;
            }

            let next = if eval.used_wildcard {
                weight
            } else {
                weight.saturating_add(criterion.weight)
            };

            if terminal {
                if next >= best.weight {
                    *best = MatchResult {
                        weight: next,
                        pointer: edge.pointer,
                    };
                }
            } else {
                self.descend(query, level + 1, edge.pointer as usize, next, best)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::schema::{Comparator, DEFAULT_SCHEMA, LEVEL_COUNT};
    use crate::table::types::Edge;

    fn eq(weight: u32, wildcard: bool) -> Criterion {
        Criterion::simple(Comparator::Equal, weight, wildcard)
    }

    /// Two levels: level 0 has one bucket `[a=5 -> 0, a=0 (wildcard) -> 1]`,
    /// level 1 has buckets `[a=10 -> 100]` and `[a=20 -> 200]`
    fn example_table() -> LevelTable {
        LevelTable::new(
            0,
            vec![
                vec![Edge::new(5, 0, 0, false), Edge::new(0, 0, 1, true)],
                vec![Edge::new(10, 0, 100, true), Edge::new(20, 0, 200, true)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let table = example_table();
        let schema = [eq(5, true), eq(3, true)];
        let engine = Engine::new(&table, &schema).unwrap();

        let result = engine.evaluate_from(&[5, 10], 0).unwrap();
        assert_eq!(result, MatchResult { weight: 8, pointer: 100 });

        let result = engine.evaluate_from(&[99, 20], 0).unwrap();
        assert_eq!(result, MatchResult { weight: 3, pointer: 200 });
    }

    #[test]
    fn test_both_paths_explored() {
        // Query [5, 20]: exact edge leads to bucket 0 (no match), the
        // wildcard edge leads to bucket 1 (match without level-0 weight)
        let table = example_table();
        let schema = [eq(5, true), eq(3, true)];
        let engine = Engine::new(&table, &schema).unwrap();

        let result = engine.evaluate_from(&[5, 20], 0).unwrap();
        assert_eq!(result, MatchResult { weight: 3, pointer: 200 });
    }

    #[test]
    fn test_tie_goes_to_later_edge() {
        let table = LevelTable::new(
            0,
            vec![
                vec![Edge::new(1, 0, 0, true)],
                vec![Edge::new(7, 0, 11, false), Edge::new(7, 0, 22, true)],
            ],
        )
        .unwrap();
        let schema = [eq(4, false), eq(2, false)];
        let engine = Engine::new(&table, &schema).unwrap();

        let result = engine.evaluate_from(&[1, 7], 0).unwrap();
        assert_eq!(result, MatchResult { weight: 6, pointer: 22 });
    }

    #[test]
    fn test_tie_across_subtrees_goes_to_later_path() {
        // Two level-0 edges reach different buckets with equal totals
        let table = LevelTable::new(
            0,
            vec![
                vec![Edge::new(0, 0, 0, false), Edge::new(0, 0, 1, true)],
                vec![Edge::new(3, 0, 30, true), Edge::new(3, 0, 40, true)],
            ],
        )
        .unwrap();
        let schema = [eq(8, true), eq(1, false)];
        let engine = Engine::new(&table, &schema).unwrap();

        let result = engine.evaluate_from(&[9, 3], 0).unwrap();
        assert_eq!(result, MatchResult { weight: 1, pointer: 40 });
    }

    #[test]
    fn test_wildcard_adds_no_weight() {
        let table = LevelTable::new(
            0,
            vec![vec![Edge::new(0, 0, 0, true)], vec![Edge::new(4, 0, 77, true)]],
        )
        .unwrap();
        let schema = [eq(1000, true), eq(1, false)];
        let engine = Engine::new(&table, &schema).unwrap();

        let result = engine.evaluate_from(&[1234, 4], 0).unwrap();
        assert_eq!(result, MatchResult { weight: 1, pointer: 77 });
    }

    #[test]
    fn test_exhaustive_not_first_match() {
        // Wildcard sibling matches first with a lower score
        let table = LevelTable::new(
            0,
            vec![
                vec![Edge::new(2, 0, 0, true)],
                vec![Edge::new(0, 0, 10, false), Edge::new(6, 0, 20, true)],
            ],
        )
        .unwrap();
        let schema = [eq(1, false), eq(16, true)];
        let engine = Engine::new(&table, &schema).unwrap();

        let result = engine.evaluate_from(&[2, 6], 0).unwrap();
        assert_eq!(result, MatchResult { weight: 17, pointer: 20 });
    }

    #[test]
    fn test_higher_score_not_replaced_by_later_lower() {
        let table = LevelTable::new(
            0,
            vec![
                vec![Edge::new(2, 0, 0, true)],
                vec![Edge::new(6, 0, 10, false), Edge::new(0, 0, 20, true)],
            ],
        )
        .unwrap();
        let schema = [eq(1, false), eq(16, true)];
        let engine = Engine::new(&table, &schema).unwrap();

        let result = engine.evaluate_from(&[2, 6], 0).unwrap();
        assert_eq!(result, MatchResult { weight: 17, pointer: 10 });
    }

    #[test]
    fn test_no_match_keeps_initial_result() {
        let table = example_table();
        let schema = [eq(5, false), eq(3, false)];
        let engine = Engine::new(&table, &schema).unwrap();

        let result = engine.evaluate_from(&[1, 1], 0).unwrap();
        assert_eq!(result, MatchResult::default());
    }

    #[test]
    fn test_evaluate_starts_at_first_operand() {
        let table = LevelTable::new(
            0,
            vec![
                vec![Edge::new(0, 0, 0, true), Edge::new(1, 0, 0, true)],
                vec![Edge::new(9, 0, 5, true)],
            ],
        )
        .unwrap();
        let schema = [eq(2, false), eq(1, false)];
        let engine = Engine::new(&table, &schema).unwrap();

        // Operand 1 selects the second bucket, whose edge also compares against 1
        let result = engine.evaluate(&[1, 9]).unwrap();
        assert_eq!(result, MatchResult { weight: 3, pointer: 5 });
    }

    #[test]
    fn test_bad_start_is_an_error() {
        let table = example_table();
        let schema = [eq(5, true), eq(3, true)];
        let engine = Engine::new(&table, &schema).unwrap();

        let err = engine.evaluate_from(&[5, 10], 2).unwrap_err();
        assert!(matches!(err, MatchError::MalformedTable { level: 0, index: 2 }));
    }

    #[test]
    fn test_query_length_checked() {
        let table = example_table();
        let schema = [eq(5, true), eq(3, true)];
        let engine = Engine::new(&table, &schema).unwrap();

        assert!(matches!(
            engine.evaluate(&[5]),
            Err(MatchError::QueryLength { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_schema_mismatch() {
        let table = example_table();
        let err = Engine::new(&table, &DEFAULT_SCHEMA).unwrap_err();
        assert!(matches!(err, MatchError::SchemaMismatch { schema: 22, table: 2 }));
    }

    #[test]
    fn test_default_schema_exact_rule_scores_every_weight() {
        // One rule chain, every operand literal: an exact query collects all weights
        let rule: Vec<u16> = (0..LEVEL_COUNT as u16).map(|i| i + 1).collect();
        let levels: Vec<Vec<Edge>> = rule
            .iter()
            .enumerate()
            .map(|(level, &op)| {
                let pointer = if level + 1 == LEVEL_COUNT { 4321 } else { 0 };
                vec![Edge::new(op, op, pointer, true)]
            })
            .collect();
        let table = LevelTable::new(0, levels).unwrap();
        let engine = Engine::new(&table, &DEFAULT_SCHEMA).unwrap();

        let result = engine.evaluate_from(&rule, 0).unwrap();
        let total: u32 = DEFAULT_SCHEMA.iter().map(|c| c.weight).sum();
        assert_eq!(result, MatchResult { weight: total, pointer: 4321 });
    }
}
