//! Provides a very basic evaluation based on material advantage using
//! "[standard piece valuations]". The king is given a value exceeding all
//! other pieces combined.
//!
//! [standard piece valuations]: https://en.wikipedia.org/wiki/Chess_piece_relative_value

use crate::chess::core::{PieceKind, Player};
use crate::chess::position::Position;

const PAWN_VALUE: i32 = 100;
const KNIGHT_VALUE: i32 = 300;
const BISHOP_VALUE: i32 = 300;
const ROOK_VALUE: i32 = 500;
const QUEEN_VALUE: i32 = 900;
const KING_VALUE: i32 = 9000;

/// Value of a single piece in centipawns.
pub(crate) const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => KING_VALUE,
    }
}

/// Difference between White and Black material.
pub(crate) fn material_advantage(position: &Position) -> i32 {
    position
        .pieces()
        .map(|(_, piece)| match piece.owner {
            Player::White => piece_value(piece.kind),
            Player::Black => -piece_value(piece.kind),
        })
        .sum()
}
