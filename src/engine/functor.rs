use super::schema::Comparator;

/// Outcome of one comparison or one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    pub matched: bool,
    pub used_wildcard: bool,
}

impl Evaluation {
    pub const MISS: Evaluation = Evaluation {
        matched: false,
        used_wildcard: false,
    };
}

/// Compare a query operand against a rule operand.
///
/// With wildcarding enabled a rule operand of zero always matches and is
/// flagged so the caller can withhold the level's weight. [`Comparator::None`]
/// never matches and never wildcards.
#[inline]
pub fn functor(function: Comparator, wildcard_enabled: bool, rule: u16, query: u16) -> Evaluation {
    if function == Comparator::None {
        return Evaluation::MISS;
    }

    let base = function.compare(query, rule);

    if wildcard_enabled {
        let used_wildcard = rule == 0;
        Evaluation {
            matched: used_wildcard || base,
            used_wildcard,
        }
    } else {
        Evaluation {
            matched: base,
            used_wildcard: false,
        }
    }
}
