//! Packed edge records and the on-disk layout of level tables.
//!
//! An edge is one 64-bit little-endian word, from bit 0 upward:
//!
//! | bits  | field       |
//! |-------|-------------|
//! | 0-13  | operand A   |
//! | 14-27 | operand B   |
//! | 28-42 | pointer     |
//! | 43-62 | weight (hw) |
//! | 63    | terminator  |

/// Width of a rule operand in bits
pub const OPERAND_WIDTH: u32 = 14;
/// Width of an edge pointer in bits
pub const POINTER_WIDTH: u32 = 15;
/// Width of the hardware weight field in bits
pub const WEIGHT_WIDTH: u32 = 20;

pub const MASK_OPERAND: u64 = (1 << OPERAND_WIDTH) - 1;
pub const MASK_POINTER: u64 = (1 << POINTER_WIDTH) - 1;
pub const MASK_WEIGHT: u64 = (1 << WEIGHT_WIDTH) - 1;

pub const SHIFT_OPERAND_A: u32 = 0;
pub const SHIFT_OPERAND_B: u32 = OPERAND_WIDTH;
pub const SHIFT_POINTER: u32 = 2 * OPERAND_WIDTH;
pub const SHIFT_WEIGHT: u32 = SHIFT_POINTER + POINTER_WIDTH;
pub const SHIFT_TERMINATOR: u32 = SHIFT_WEIGHT + WEIGHT_WIDTH;

/// Bytes in one packed edge (and in the per-level count word)
pub const WORD_SIZE: usize = 8;
/// Cache line width the edge blocks are aligned to
pub const CACHE_LINE_WIDTH: usize = 64;
/// Words per cache line
pub const WORDS_PER_CACHE_LINE: usize = CACHE_LINE_WIDTH / WORD_SIZE;
/// Size of the leading integrity hash
pub const HASH_SIZE: usize = 8;

/// One transition record of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edge {
    pub operand_a: u16,
    pub operand_b: u16,
    /// Next level's bucket start, or the rule id on the terminal level
    pub pointer: u16,
    /// Weight carried for the hardware path; the software engine scores
    /// from the criterion schema instead
    pub hw_weight: u32,
    /// Last edge of its bucket
    pub is_terminator: bool,
}

impl Edge {
    pub fn new(operand_a: u16, operand_b: u16, pointer: u16, is_terminator: bool) -> Self {
        Self {
            operand_a,
            operand_b,
            pointer,
            hw_weight: 0,
            is_terminator,
        }
    }

    /// Pack into a wire word. Fields wider than their slot are truncated.
    #[inline]
    pub fn encode(&self) -> u64 {
        ((self.operand_a as u64 & MASK_OPERAND) << SHIFT_OPERAND_A)
            | ((self.operand_b as u64 & MASK_OPERAND) << SHIFT_OPERAND_B)
            | ((self.pointer as u64 & MASK_POINTER) << SHIFT_POINTER)
            | ((self.hw_weight as u64 & MASK_WEIGHT) << SHIFT_WEIGHT)
            | ((self.is_terminator as u64) << SHIFT_TERMINATOR)
    }

    /// Unpack a wire word
    #[inline]
    pub fn decode(raw: u64) -> Self {
        Self {
            operand_a: ((raw >> SHIFT_OPERAND_A) & MASK_OPERAND) as u16,
            operand_b: ((raw >> SHIFT_OPERAND_B) & MASK_OPERAND) as u16,
            pointer: ((raw >> SHIFT_POINTER) & MASK_POINTER) as u16,
            hw_weight: ((raw >> SHIFT_WEIGHT) & MASK_WEIGHT) as u32,
            is_terminator: (raw >> SHIFT_TERMINATOR) & 1 == 1,
        }
    }
}

/// Dummy words following a level of `edge_count` edges.
///
/// The count word is part of the block, so `count + edges + padding` is a
/// whole number of cache lines.
#[inline]
pub fn padding_words(edge_count: usize) -> usize {
    match (edge_count + 1) % WORDS_PER_CACHE_LINE {
        0 => 0,
        rem => WORDS_PER_CACHE_LINE - rem,
    }
}

/// Best terminal candidate of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub weight: u32,
    /// Rule identifier of the winning terminal edge
    pub pointer: u16,
}
