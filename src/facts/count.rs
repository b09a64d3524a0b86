use super::EpistemicBool;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the stored value of an [`UncertainCount`] bounds the actual count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountRelation {
    Equal,
    AtLeast,
    AtMost,
    #[default]
    Unknown,
}

impl CountRelation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::AtLeast => "\u{2265}",
            Self::AtMost => "\u{2264}",
            Self::Unknown => "?",
        }
    }

    /// Whether the stored value is an upper bound of the actual count.
    pub fn bounds_above(self) -> bool {
        matches!(self, Self::Equal | Self::AtMost)
    }

    /// Whether the stored value is a lower bound of the actual count.
    pub fn bounds_below(self) -> bool {
        matches!(self, Self::Equal | Self::AtLeast)
    }
}

/// A non-negative count that may be exact, bounded on one side, or unknown.
///
/// Row counts and missing-value counts are tracked this way. The value is
/// never negative: arithmetic that would go below zero clamps, and an
/// "at most" bound below zero collapses to exactly zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UncertainCount {
    value: u64,
    relation: CountRelation,
}

impl UncertainCount {
    /// Creates a count from a possibly negative value, clamping it to zero.
    pub fn new(value: i64, relation: CountRelation) -> Self {
        if value >= 0 {
            return Self {
                value: value.unsigned_abs(),
                relation,
            };
        }
        let relation = match relation {
            CountRelation::AtMost => CountRelation::Equal,
            other => other,
        };
        Self { value: 0, relation }
    }

    pub fn equal(value: u64) -> Self {
        Self {
            value,
            relation: CountRelation::Equal,
        }
    }

    pub fn at_least(value: u64) -> Self {
        Self {
            value,
            relation: CountRelation::AtLeast,
        }
    }

    pub fn at_most(value: u64) -> Self {
        Self {
            value,
            relation: CountRelation::AtMost,
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn relation(&self) -> CountRelation {
        self.relation
    }

    pub fn is_known(&self) -> bool {
        self.relation != CountRelation::Unknown
    }

    /// Upper bound of the actual count, if one is known.
    pub fn upper_bound(&self) -> Option<u64> {
        self.relation.bounds_above().then_some(self.value)
    }

    /// Lower bound of the actual count; zero when nothing better is known.
    pub fn lower_bound(&self) -> u64 {
        if self.relation.bounds_below() {
            self.value
        } else {
            0
        }
    }

    /// The actual count grew by an amount nobody knows.
    pub fn increase_by_unknown_amount(&mut self) -> &mut Self {
        self.relation = match self.relation {
            CountRelation::Equal | CountRelation::AtLeast => CountRelation::AtLeast,
            CountRelation::AtMost | CountRelation::Unknown => CountRelation::Unknown,
        };
        self
    }

    /// The actual count shrank by an amount nobody knows.
    pub fn reduce_by_unknown_amount(&mut self) -> &mut Self {
        self.relation = match self.relation {
            CountRelation::Equal | CountRelation::AtMost => CountRelation::AtMost,
            CountRelation::AtLeast | CountRelation::Unknown => CountRelation::Unknown,
        };
        self
    }

    /// Shifts the count by a known amount, clamping at zero.
    pub fn add(&mut self, delta: i64) -> &mut Self {
        let shifted = i128::from(self.value) + i128::from(delta);
        *self = if shifted < 0 {
            Self::new(-1, self.relation)
        } else {
            Self {
                value: u64::try_from(shifted).unwrap_or(u64::MAX),
                relation: self.relation,
            }
        };
        self
    }

    pub fn subtract(&mut self, delta: i64) -> &mut Self {
        self.add(delta.saturating_neg())
    }

    /// Sum of two uncertain counts, e.g. the height of two stacked tables.
    #[must_use]
    pub fn add_count(&self, other: &Self) -> Self {
        use CountRelation::{AtLeast, AtMost, Equal, Unknown};

        let relation = match (self.relation, other.relation) {
            (Equal, Equal) => Equal,
            (Equal | AtLeast, Equal | AtLeast) => AtLeast,
            (Equal | AtMost, Equal | AtMost) => AtMost,
            _ => Unknown,
        };
        Self {
            value: self.value.saturating_add(other.value),
            relation,
        }
    }

    /// Is the actual count at least `n`?
    pub fn is_at_least(&self, n: u64) -> EpistemicBool {
        if n == 0 {
            return EpistemicBool::Yes;
        }
        match self.relation {
            CountRelation::Equal => EpistemicBool::from_bool(self.value >= n),
            CountRelation::AtLeast if self.value >= n => EpistemicBool::Yes,
            CountRelation::AtMost if self.value < n => EpistemicBool::No,
            _ => EpistemicBool::Unknown,
        }
    }

    /// Is the actual count at most `n`?
    pub fn is_at_most(&self, n: u64) -> EpistemicBool {
        match self.relation {
            CountRelation::Equal => EpistemicBool::from_bool(self.value <= n),
            CountRelation::AtMost if self.value <= n => EpistemicBool::Yes,
            CountRelation::AtLeast if self.value > n => EpistemicBool::No,
            _ => EpistemicBool::Unknown,
        }
    }

    pub fn is_zero(&self) -> EpistemicBool {
        self.is_at_most(0)
    }
}

impl fmt::Display for UncertainCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.relation {
            CountRelation::Unknown => f.write_str("?"),
            relation => write!(f, "{} {}", relation.as_str(), self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELATIONS: [CountRelation; 4] = [
        CountRelation::Equal,
        CountRelation::AtLeast,
        CountRelation::AtMost,
        CountRelation::Unknown,
    ];

    #[test]
    fn test_increase_widens() {
        assert_eq!(
            *UncertainCount::equal(3).increase_by_unknown_amount(),
            UncertainCount::at_least(3)
        );
        assert_eq!(
            UncertainCount::at_most(3)
                .increase_by_unknown_amount()
                .relation(),
            CountRelation::Unknown
        );
    }

    #[test]
    fn test_reduce_widens() {
        assert_eq!(
            *UncertainCount::equal(3).reduce_by_unknown_amount(),
            UncertainCount::at_most(3)
        );
        assert_eq!(
            UncertainCount::at_least(3)
                .reduce_by_unknown_amount()
                .relation(),
            CountRelation::Unknown
        );
    }

    #[test]
    fn test_widening_never_gains_a_bound() {
        for relation in RELATIONS {
            let mut count = UncertainCount::new(5, relation);
            for step in 0..4 {
                let before = count;
                if step % 2 == 0 {
                    count.increase_by_unknown_amount();
                    assert!(
                        !count.relation.bounds_above(),
                        "after an increase no upper bound can survive: {before} -> {count}"
                    );
                    assert!(
                        !count.relation.bounds_below() || before.relation.bounds_below(),
                        "an increase cannot invent a lower bound: {before} -> {count}"
                    );
                } else {
                    count.reduce_by_unknown_amount();
                    assert!(
                        !count.relation.bounds_below(),
                        "after a reduction no lower bound can survive: {before} -> {count}"
                    );
                    assert!(
                        !count.relation.bounds_above() || before.relation.bounds_above(),
                        "a reduction cannot invent an upper bound: {before} -> {count}"
                    );
                }
                assert_eq!(count.value(), before.value());
            }
        }
    }

    #[test]
    fn test_negative_values_clamp() {
        assert_eq!(
            UncertainCount::new(-4, CountRelation::AtMost),
            UncertainCount::equal(0)
        );
        assert_eq!(
            UncertainCount::new(-4, CountRelation::AtLeast),
            UncertainCount::at_least(0)
        );

        let mut count = UncertainCount::at_most(2);
        count.subtract(5);
        assert_eq!(count, UncertainCount::equal(0));

        let mut count = UncertainCount::equal(2);
        count.add(3);
        assert_eq!(count, UncertainCount::equal(5));
    }

    #[test]
    fn test_at_least_queries() {
        use EpistemicBool::{No, Unknown, Yes};

        assert_eq!(UncertainCount::equal(0).is_at_least(1), No);
        assert_eq!(UncertainCount::equal(2).is_at_least(1), Yes);
        assert_eq!(UncertainCount::at_least(1).is_at_least(1), Yes);
        assert_eq!(UncertainCount::at_least(0).is_at_least(1), Unknown);
        assert_eq!(UncertainCount::at_most(0).is_at_least(1), No);
        assert_eq!(UncertainCount::at_most(4).is_at_least(1), Unknown);
        assert_eq!(UncertainCount::unknown().is_at_least(1), Unknown);
        assert_eq!(UncertainCount::unknown().is_at_least(0), Yes);
    }

    #[test]
    fn test_at_most_queries() {
        use EpistemicBool::{No, Unknown, Yes};

        assert_eq!(UncertainCount::equal(3).is_at_most(3), Yes);
        assert_eq!(UncertainCount::at_most(3).is_at_most(5), Yes);
        assert_eq!(UncertainCount::at_least(6).is_at_most(5), No);
        assert_eq!(UncertainCount::at_least(2).is_at_most(5), Unknown);
        assert_eq!(UncertainCount::at_most(0).is_zero(), Yes);
    }

    #[test]
    fn test_add_count_joins_relations() {
        let sum = UncertainCount::equal(2).add_count(&UncertainCount::at_least(3));
        assert_eq!(sum, UncertainCount::at_least(5));

        let sum = UncertainCount::at_least(2).add_count(&UncertainCount::at_most(3));
        assert_eq!(sum.relation(), CountRelation::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(UncertainCount::equal(10).to_string(), "= 10");
        assert_eq!(UncertainCount::at_most(10).to_string(), "\u{2264} 10");
        assert_eq!(UncertainCount::unknown().to_string(), "?");
    }
}
