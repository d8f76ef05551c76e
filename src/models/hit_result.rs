//! The closed set of judgement outcomes and their scoring classification.
//!
//! Every classification is read from one static table built at compile time;
//! nothing is recomputed per call site.

use crate::error::{InvariantViolation, fail_fast};
use serde::{Deserialize, Serialize};

/// Outcome of judging one (sub-)object.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitResult {
    /// Not judged yet.
    None = 0,
    /// Judged, but irrelevant to scoring.
    Ignore,
    /// Missed. The Miss window also bounds how early a hit is considered.
    Miss,
    Meh,
    Ok,
    Good,
    Great,
    Perfect,
    SmallTickMiss,
    SmallTickHit,
    LargeTickMiss,
    LargeTickHit,
    SmallBonus,
    LargeBonus,
}

#[derive(Clone, Copy)]
struct Classification {
    affects_combo: bool,
    is_bonus: bool,
    is_hit: bool,
    rank: u8,
    description: &'static str,
}

const fn class(
    affects_combo: bool,
    is_bonus: bool,
    is_hit: bool,
    rank: u8,
    description: &'static str,
) -> Classification {
    Classification {
        affects_combo,
        is_bonus,
        is_hit,
        rank,
        description,
    }
}

// Indexed by discriminant.
const TABLE: [Classification; HitResult::COUNT] = [
    class(false, false, false, 13, ""),       // None
    class(false, false, false, 12, ""),       // Ignore
    class(true, false, false, 5, "Miss"),     // Miss
    class(true, false, true, 4, "Meh"),       // Meh
    class(true, false, true, 3, "OK"),        // Ok
    class(true, false, true, 2, "Good"),      // Good
    class(true, false, true, 1, "Great"),     // Great
    class(true, false, true, 0, "Perfect"),   // Perfect
    class(false, false, false, 11, ""),       // SmallTickMiss
    class(false, false, true, 7, "S Tick"),   // SmallTickHit
    class(true, false, false, 10, ""),        // LargeTickMiss
    class(true, false, true, 6, "L Tick"),    // LargeTickHit
    class(false, true, true, 9, "S Bonus"),   // SmallBonus
    class(false, true, true, 8, "L Bonus"),   // LargeBonus
];

impl HitResult {
    pub const COUNT: usize = 14;

    /// All variants in declaration order.
    pub const ALL: [HitResult; HitResult::COUNT] = [
        Self::None,
        Self::Ignore,
        Self::Miss,
        Self::Meh,
        Self::Ok,
        Self::Good,
        Self::Great,
        Self::Perfect,
        Self::SmallTickMiss,
        Self::SmallTickHit,
        Self::LargeTickMiss,
        Self::LargeTickHit,
        Self::SmallBonus,
        Self::LargeBonus,
    ];

    /// Results that can own a hit window, best first.
    pub const TIMED: [HitResult; 6] = [
        Self::Perfect,
        Self::Great,
        Self::Good,
        Self::Ok,
        Self::Meh,
        Self::Miss,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    const fn class(self) -> Classification {
        TABLE[self as usize]
    }

    /// Checked conversion from a raw discriminant.
    pub fn try_from_index(index: u8) -> Result<Self, InvariantViolation> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(InvariantViolation::UnknownHitResult(index))
    }

    /// Conversion from a raw discriminant; an unknown value aborts.
    pub fn from_index(index: u8) -> Self {
        Self::try_from_index(index).unwrap_or_else(|v| fail_fast(v))
    }

    /// Whether this result increases or breaks the combo.
    pub const fn affects_combo(self) -> bool {
        self.class().affects_combo
    }

    /// Whether this result counts towards bonus score only.
    pub const fn is_bonus(self) -> bool {
        self.class().is_bonus
    }

    /// Whether this result is a successful hit.
    pub const fn is_hit(self) -> bool {
        self.class().is_hit
    }

    /// Display rank, lower is better.
    pub const fn rank(self) -> u8 {
        self.class().rank
    }

    pub const fn is_scorable(self) -> bool {
        self.rank() < Self::Ignore.rank()
    }

    pub const fn affects_accuracy(self) -> bool {
        self.is_scorable() && !self.is_bonus()
    }

    pub const fn description(self) -> &'static str {
        self.class().description
    }

    /// Whether `self` ranks strictly better than `other`.
    pub const fn is_better_than(self, other: HitResult) -> bool {
        self.rank() < other.rank()
    }

    /// Best result of the same family, used as the accuracy maximum.
    pub const fn max_counterpart(self) -> HitResult {
        match self {
            Self::Miss | Self::Meh | Self::Ok | Self::Good | Self::Great | Self::Perfect => {
                Self::Perfect
            }
            Self::LargeTickMiss | Self::LargeTickHit => Self::LargeTickHit,
            Self::SmallTickMiss | Self::SmallTickHit => Self::SmallTickHit,
            other => other,
        }
    }
}

impl std::fmt::Display for HitResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.description() {
            "" => write!(f, "{self:?}"),
            text => f.write_str(text),
        }
    }
}
