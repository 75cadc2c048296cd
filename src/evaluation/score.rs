use std::fmt::Display;
use std::ops::Neg;

/// The score represents the relative value of the position in centipawns (100
/// units = 1 pawn) from White's point of view: positive values favor White,
/// negative ones favor Black.
///
/// [`Score::WIN`] and [`Score::LOSE`] are reported for positions where the
/// side to move has no legal moves during the search. They are constants:
/// a quicker mate does not score better than a slower one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    value: i32,
}

impl Score {
    /// Bound of the search window, larger than any reachable score.
    pub const INFINITY: Self = Self {
        value: 2_000_000_000,
    };
    #[allow(missing_docs)]
    pub const LOSE: Self = Self { value: -32_000 };
    #[allow(missing_docs)]
    pub const WIN: Self = Self { value: 32_000 };

    /// Creates a new score in centipawn units.
    #[must_use]
    pub const fn cp(value: i32) -> Self {
        Self { value }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn value(self) -> i32 {
        self.value
    }
}

impl Neg for Score {
    type Output = Self;

    /// Mirrors evaluation to other player's perspective.
    fn neg(self) -> Self::Output {
        Self { value: -self.value }
    }
}

impl From<i32> for Score {
    fn from(value: i32) -> Self {
        Self { value }
    }
}

impl Display for Score {
    /// Formats the score as centipawn units for UCI interface.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cp {}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cp() {
        let cp = Score::cp(42);
        assert_eq!(cp, Score { value: 42 });
        assert_eq!(cp.value(), 42);
        assert_eq!(Score::from(42), cp);

        assert!(Score::cp(42) < Score::cp(43));
        assert!(Score::cp(0) > Score::cp(-42));
    }

    #[test]
    fn bounds() {
        assert!(Score::LOSE < Score::cp(-10_000));
        assert!(Score::WIN > Score::cp(10_000));
        assert!(-Score::INFINITY < Score::LOSE);
        assert!(Score::INFINITY > Score::WIN);
        assert_eq!(-Score::WIN, Score::LOSE);
    }

    #[test]
    fn display() {
        assert_eq!(Score::cp(123).to_string(), "cp 123");
        assert_eq!(Score::cp(-5).to_string(), "cp -5");
        assert_eq!(Score::LOSE.to_string(), "cp -32000");
    }
}
