//! Per-level matching criteria.
//!
//! Each level of a table is evaluated against one [`Criterion`]: how many
//! comparisons it runs, which comparators, how two results are combined,
//! how much a non-wildcard match scores and whether a zero operand acts as
//! "don't care".

use serde::{Deserialize, Serialize};

/// Number of criteria (levels) in a production table
pub const LEVEL_COUNT: usize = 22;

/// Shape of a level's comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Structure {
    /// One comparison against `operand_a`
    Simple,
    /// Two comparisons (`operand_a`, `operand_b`) joined by a combinator
    Pair,
}

/// Scalar comparator applied as `query <op> rule`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    None,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl Comparator {
    pub const ALL: [Comparator; 7] = [
        Comparator::None,
        Comparator::Equal,
        Comparator::NotEqual,
        Comparator::Greater,
        Comparator::GreaterEqual,
        Comparator::Less,
        Comparator::LessEqual,
    ];

    #[inline]
    pub fn compare(self, query: u16, rule: u16) -> bool {
        match self {
            Comparator::None => false,
            Comparator::Equal => query == rule,
            Comparator::NotEqual => query != rule,
            Comparator::Greater => query > rule,
            Comparator::GreaterEqual => query >= rule,
            Comparator::Less => query < rule,
            Comparator::LessEqual => query <= rule,
        }
    }
}

/// Boolean combinator for [`Structure::Pair`] levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairCombinator {
    None,
    And,
    Or,
    Xor,
    Nand,
    Nor,
}

impl PairCombinator {
    #[inline]
    pub fn combine(self, a: bool, b: bool) -> bool {
        match self {
            PairCombinator::None => false,
            PairCombinator::And => a && b,
            PairCombinator::Or => a || b,
            PairCombinator::Xor => a ^ b,
            PairCombinator::Nand => !(a && b),
            PairCombinator::Nor => !(a || b),
        }
    }
}

/// Static configuration of one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub structure: Structure,
    pub function_a: Comparator,
    pub function_b: Comparator,
    pub pair_combinator: PairCombinator,
    /// Score added when the level matches without wildcarding
    pub weight: u32,
    /// A rule operand of zero satisfies the comparison
    pub wildcard_enabled: bool,
}

impl Criterion {
    /// Single comparison level
    pub const fn simple(function: Comparator, weight: u32, wildcard_enabled: bool) -> Self {
        Self {
            structure: Structure::Simple,
            function_a: function,
            function_b: Comparator::None,
            pair_combinator: PairCombinator::None,
            weight,
            wildcard_enabled,
        }
    }

    /// Two comparison level
    pub const fn pair(
        function_a: Comparator,
        function_b: Comparator,
        combinator: PairCombinator,
        weight: u32,
        wildcard_enabled: bool,
    ) -> Self {
        Self {
            structure: Structure::Pair,
            function_a,
            function_b,
            pair_combinator: combinator,
            weight,
            wildcard_enabled,
        }
    }

    /// Inclusive range test: `operand_a <= query <= operand_b`
    pub const fn range(weight: u32, wildcard_enabled: bool) -> Self {
        Self::pair(
            Comparator::GreaterEqual,
            Comparator::LessEqual,
            PairCombinator::And,
            weight,
            wildcard_enabled,
        )
    }
}

use self::Comparator::Equal as EQ;

/// The compiled-in schema for production tables, indexed by level
pub const DEFAULT_SCHEMA: [Criterion; LEVEL_COUNT] = [
    Criterion::simple(EQ, 0, false),
    Criterion::simple(EQ, 0, false),
    Criterion::simple(EQ, 512, true),
    Criterion::simple(EQ, 524288, true),
    Criterion::range(256, true),
    Criterion::range(262144, true),
    Criterion::simple(EQ, 65536, true),
    Criterion::simple(EQ, 64, true),
    Criterion::range(1, true),
    Criterion::simple(EQ, 128, true),
    Criterion::simple(EQ, 131072, true),
    Criterion::simple(EQ, 16, true),
    Criterion::simple(EQ, 16384, true),
    Criterion::simple(EQ, 2, true),
    Criterion::simple(EQ, 4, true),
    Criterion::simple(EQ, 4096, true),
    Criterion::simple(EQ, 2048, true),
    Criterion::simple(EQ, 32768, true),
    Criterion::simple(EQ, 32, true),
    Criterion::simple(EQ, 0, false),
    Criterion::simple(EQ, 8192, true),
    Criterion::simple(EQ, 8, true),
];

/// Sum of all level weights, the best score any path can reach
pub fn max_weight(schema: &[Criterion]) -> u64 {
    schema.iter().map(|c| c.weight as u64).sum()
}
