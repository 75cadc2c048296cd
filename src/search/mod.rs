//! Move selection for the automated opponent: depth-limited [`minimax`] search
//! with alpha-beta pruning over the static [`crate::evaluation`], and
//! difficulty tiers built on top of it.

use std::fmt;

use anyhow::bail;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::chess::core::{Move, Player};
use crate::chess::position::Position;
use crate::evaluation::Score;

mod minimax;

pub use minimax::{choose_move, search};

/// Search depth in plies.
pub type Depth = u8;

/// Strength of the automated opponent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Difficulty {
    /// Plays a random legal move.
    Easy,
    /// Searches two plies deep.
    #[default]
    Medium,
    /// Searches three plies deep.
    Hard,
}

impl Difficulty {
    /// All tiers from the weakest to the strongest.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Search depth of the tier, [`None`] if it does not search at all.
    #[must_use]
    pub const fn depth(self) -> Option<Depth> {
        match self {
            Self::Easy => None,
            Self::Medium => Some(2),
            Self::Hard => Some(3),
        }
    }
}

impl TryFrom<&str> for Difficulty {
    type Error = anyhow::Error;

    fn try_from(input: &str) -> anyhow::Result<Self> {
        match input.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => bail!("difficulty should be one of easy, medium or hard, got '{input}'"),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        })
    }
}

/// The move picked by the automated opponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    #[allow(missing_docs)]
    pub best_move: Move,
    /// Score of the position after [`SearchResult::best_move`]; [`None`] when
    /// the move was not searched.
    pub score: Option<Score>,
    /// Depth of the search, [`None`] when the move was not searched.
    pub depth: Option<Depth>,
}

/// Picks a move for `player` at given difficulty, reporting the score when the
/// tier searches. Returns [`None`] if `player` has no legal moves.
pub fn analyze<R: Rng + ?Sized>(
    position: &Position,
    difficulty: Difficulty,
    player: Player,
    rng: &mut R,
) -> Option<SearchResult> {
    match difficulty.depth() {
        None => {
            let moves = position.all_legal_moves(player);
            let best_move = *moves.choose(rng)?;
            log::debug!("{player:?} plays random move {best_move}");
            Some(SearchResult {
                best_move,
                score: None,
                depth: None,
            })
        },
        Some(depth) => analyze_at_depth(position, depth, player, rng),
    }
}

/// Searches the moves of `player` at an explicit depth instead of a
/// difficulty tier.
pub fn analyze_at_depth<R: Rng + ?Sized>(
    position: &Position,
    depth: Depth,
    player: Player,
    rng: &mut R,
) -> Option<SearchResult> {
    minimax::best_move(position, depth, player, rng).map(|(best_move, score)| SearchResult {
        best_move,
        score: Some(score),
        depth: Some(depth),
    })
}

/// Picks a move for `player` at given difficulty.
pub fn select_move<R: Rng + ?Sized>(
    position: &Position,
    difficulty: Difficulty,
    player: Player,
    rng: &mut R,
) -> Option<Move> {
    analyze(position, difficulty, player, rng).map(|result| result.best_move)
}
