use super::EpistemicBool;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a claimed set relates to the actual set it describes.
///
/// The tag is read as "the actual set is ... the claim":
///
/// - `Equal`: the claim is exact
/// - `Subset`: the actual set is a subset of the claim, claimed members may be missing
/// - `Superset`: the actual set may contain members the claim does not list
/// - `Unknown`: neither direction is guaranteed
///
/// The same tag qualifies dictionaries, numeric and object ranges, and the
/// column set of a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetRelation {
    #[default]
    Equal,
    Subset,
    Superset,
    Unknown,
}

impl SetRelation {
    /// Lattice join of two relations.
    ///
    /// `Equal` is neutral, equal arguments are idempotent and two disagreeing
    /// directions collapse to `Unknown`, as does anything merged with `Unknown`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Equal, x) | (x, Self::Equal) => x,
            (Self::Subset, Self::Subset) => Self::Subset,
            (Self::Superset, Self::Superset) => Self::Superset,
            _ => Self::Unknown,
        }
    }

    /// Swaps the direction, e.g. when the roles of claim and actual set are exchanged.
    #[must_use]
    pub fn invert(self) -> Self {
        match self {
            Self::Subset => Self::Superset,
            Self::Superset => Self::Subset,
            other => other,
        }
    }

    /// Whether the actual set may hold members the claim does not list.
    pub fn may_contain_more(self) -> bool {
        matches!(self, Self::Superset | Self::Unknown)
    }

    /// Whether the claim may list members the actual set does not hold.
    pub fn may_contain_less(self) -> bool {
        matches!(self, Self::Subset | Self::Unknown)
    }

    /// Answers "is `x` in the actual set?" given whether `x` is in the claim.
    pub fn contains(self, in_claim: bool) -> EpistemicBool {
        if in_claim {
            if self.may_contain_less() {
                EpistemicBool::Unknown
            } else {
                EpistemicBool::Yes
            }
        } else if self.may_contain_more() {
            EpistemicBool::Unknown
        } else {
            EpistemicBool::No
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::Subset => "\u{2286}",
            Self::Superset => "\u{2287}",
            Self::Unknown => "?",
        }
    }
}

impl fmt::Display for SetRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
