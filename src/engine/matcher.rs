use super::functor::{functor, Evaluation};
use super::schema::{Criterion, Structure};

/// Evaluate one level's criterion for a candidate edge.
///
/// `Simple` levels return functor A verbatim. `Pair` levels combine both
/// functors with the level's combinator and report a wildcard if either side
/// used one.
#[inline]
pub fn matcher(criterion: &Criterion, query: u16, operand_a: u16, operand_b: u16) -> Evaluation {
    let a = functor(
        criterion.function_a,
        criterion.wildcard_enabled,
        operand_a,
        query,
    );

    match criterion.structure {
        Structure::Simple => a,
        Structure::Pair => {
            let b = functor(
                criterion.function_b,
                criterion.wildcard_enabled,
                operand_b,
                query,
            );
            Evaluation {
                matched: criterion.pair_combinator.combine(a.matched, b.matched),
                used_wildcard: a.used_wildcard || b.used_wildcard,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::schema::{Comparator, PairCombinator};

    #[test]
    fn test_simple_ignores_operand_b() {
        let c = Criterion::simple(Comparator::Equal, 8, false);
        assert!(matcher(&c, 3, 3, 999).matched);
        assert!(!matcher(&c, 3, 999, 3).matched);
    }

    #[test]
    fn test_combinators_exhaustive() {
        // functor A: query == operand_a, functor B: query == operand_b.
        // Query 1 with operands chosen to drive each side true or false.
        let table = [
            (PairCombinator::And, [false, false, false, true]),
            (PairCombinator::Or, [false, true, true, true]),
            (PairCombinator::Xor, [false, true, true, false]),
            (PairCombinator::Nand, [true, true, true, false]),
            (PairCombinator::Nor, [true, false, false, false]),
            (PairCombinator::None, [false, false, false, false]),
        ];

        for (combinator, expected) in table {
            let c = Criterion::pair(Comparator::Equal, Comparator::Equal, combinator, 1, false);
            for (i, (a, b)) in [(false, false), (false, true), (true, false), (true, true)]
                .into_iter()
                .enumerate()
            {
                let op_a = if a { 1 } else { 2 };
                let op_b = if b { 1 } else { 2 };
                assert_eq!(
                    matcher(&c, 1, op_a, op_b).matched,
                    expected[i],
                    "{:?} a={} b={}",
                    combinator,
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_range_is_inclusive() {
        let c = Criterion::range(256, false);
        assert!(matcher(&c, 10, 10, 20).matched);
        assert!(matcher(&c, 20, 10, 20).matched);
        assert!(matcher(&c, 15, 10, 20).matched);
        assert!(!matcher(&c, 9, 10, 20).matched);
        assert!(!matcher(&c, 21, 10, 20).matched);
    }

    #[test]
    fn test_pair_wildcard_from_either_side() {
        let c = Criterion::range(256, true);

        // Open lower bound
        let eval = matcher(&c, 5, 0, 20);
        assert!(eval.matched);
        assert!(eval.used_wildcard);

        // Open upper bound
        let eval = matcher(&c, 500, 10, 0);
        assert!(eval.matched);
        assert!(eval.used_wildcard);

        // Wildcard on one side does not rescue the other side
        let eval = matcher(&c, 30, 0, 20);
        assert!(!eval.matched);
        assert!(eval.used_wildcard);
    }
}
