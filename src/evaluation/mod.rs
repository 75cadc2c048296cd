//! This module implements "static" [evaluation], i.e. predicting the relative
//! value/score of given position without [`crate::search`].
//!
//! The evaluation is a sum of material and positional ([`pst`]) terms of every
//! piece on the board. For convenience, the score is returned in centipawn
//! units.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation

use crate::chess::core::Player;
use crate::chess::position::Position;

mod material;
mod pst;
mod score;

pub use score::Score;

/// Evaluates the position from White's point of view: positive scores favor
/// White, negative scores favor Black. Whose turn it is does not matter.
///
/// ```
/// use pawnstorm::chess::position::Position;
/// use pawnstorm::evaluation::{evaluate, Score};
///
/// assert_eq!(evaluate(&Position::starting()), Score::cp(0));
/// ```
#[must_use]
pub fn evaluate(position: &Position) -> Score {
    let positional: i32 = position
        .pieces()
        .map(|(square, piece)| match piece.owner {
            Player::White => pst::bonus(piece, square),
            Player::Black => -pst::bonus(piece, square),
        })
        .sum();
    Score::cp(material::material_advantage(position) + positional)
}
