//! Attack queries: which squares each piece family reaches and whether a
//! square is attacked by a player. Queries walk the board from the target
//! square outwards and never build move lists.

use std::iter;

use crate::chess::core::{Piece, PieceKind, Player, Square};
use crate::chess::position::Position;

/// Knight jumps as `(rows, columns)` deltas.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// King steps as `(rows, columns)` deltas.
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Directions rooks (and queens) slide in.
pub const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Directions bishops (and queens) slide in.
pub const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Squares from `from` (exclusive) to the edge of the board in given
/// direction.
pub(super) fn ray(from: Square, (rows, columns): (i8, i8)) -> impl Iterator<Item = Square> {
    iter::successors(from.offset(rows, columns), move |square| {
        square.offset(rows, columns)
    })
}

/// Returns `true` if any piece of `by` could capture on `target` (ignoring
/// whether doing so would expose its own king).
#[must_use]
pub fn is_attacked(position: &Position, target: Square, by: Player) -> bool {
    let holds = |square: Option<Square>, kind| {
        square.and_then(|square| position.at(square)) == Some(Piece::new(by, kind))
    };
    // Pawns attack diagonally forward, so the attackers stand diagonally
    // behind the target from their point of view.
    let behind = -by.push_direction();
    if holds(target.offset(behind, -1), PieceKind::Pawn)
        || holds(target.offset(behind, 1), PieceKind::Pawn)
    {
        return true;
    }
    if KNIGHT_OFFSETS
        .iter()
        .any(|&(rows, columns)| holds(target.offset(rows, columns), PieceKind::Knight))
    {
        return true;
    }
    if KING_OFFSETS
        .iter()
        .any(|&(rows, columns)| holds(target.offset(rows, columns), PieceKind::King))
    {
        return true;
    }
    let slider_hits = |directions: &[(i8, i8)], kind| {
        directions.iter().any(|&direction| {
            match ray(target, direction).find_map(|square| position.at(square)) {
                Some(piece) => {
                    piece.owner == by && (piece.kind == kind || piece.kind == PieceKind::Queen)
                },
                None => false,
            }
        })
    };
    slider_hits(&ORTHOGONAL_DIRECTIONS, PieceKind::Rook)
        || slider_hits(&DIAGONAL_DIRECTIONS, PieceKind::Bishop)
}

/// Looks up the king of `player`. Positions without one (e.g. set up by hand)
/// yield [`None`] instead of failing.
#[must_use]
pub fn find_king(position: &Position, player: Player) -> Option<Square> {
    let king = Piece::new(player, PieceKind::King);
    position
        .pieces()
        .find_map(|(square, piece)| (piece == king).then_some(square))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn attacked_squares(position: &Position, by: Player) -> Vec<String> {
        Square::iter()
            .filter(|square| is_attacked(position, *square, by))
            .map(|square| square.to_string())
            .collect()
    }

    #[test]
    fn rays() {
        assert_eq!(
            ray(Square::C3, (-1, 1)).collect::<Vec<_>>(),
            vec![Square::D4, Square::E5, Square::F6, Square::G7, Square::H8]
        );
        assert_eq!(ray(Square::A1, (1, 0)).count(), 0);
        assert_eq!(ray(Square::A1, (0, 1)).count(), 7);
    }

    #[test]
    fn pawn_attacks() {
        let position = Position::from_fen("k7/8/8/8/4P3/8/8/K7 w - - 0 1").unwrap();
        assert!(is_attacked(&position, Square::D5, Player::White));
        assert!(is_attacked(&position, Square::F5, Player::White));
        assert!(!is_attacked(&position, Square::E5, Player::White));
        assert!(!is_attacked(&position, Square::D3, Player::White));
        let position = Position::from_fen("k7/8/8/4p3/8/8/8/K7 w - - 0 1").unwrap();
        assert!(is_attacked(&position, Square::D4, Player::Black));
        assert!(is_attacked(&position, Square::F4, Player::Black));
        assert!(!is_attacked(&position, Square::D6, Player::Black));
    }

    #[test]
    fn knight_and_king_attacks() {
        let position = Position::from_fen("7k/8/8/8/8/8/8/N6K w - - 0 1").unwrap();
        assert_eq!(
            attacked_squares(&position, Player::White),
            vec!["b3", "c2", "g2", "h2", "g1"]
        );
    }

    #[test]
    fn sliding_attacks_stop_at_blockers() {
        let position = Position::from_fen("7k/8/8/8/1p6/8/8/R2nK3 w - - 0 1").unwrap();
        // The rook is blocked by the knight on d1 and sees the a-file.
        assert!(is_attacked(&position, Square::C1, Player::White));
        assert!(is_attacked(&position, Square::D1, Player::White));
        assert!(is_attacked(&position, Square::A8, Player::White));
        // The king on e1 defends f1, the rook does not see through d1.
        assert!(is_attacked(&position, Square::F1, Player::White));
        assert!(!is_attacked(&position, Square::H1, Player::White));
        // Bishop-like attack of a queen.
        let position = Position::from_fen("7k/8/8/8/8/8/1q6/K7 w - - 0 1").unwrap();
        assert!(is_attacked(&position, Square::A1, Player::Black));
        assert!(is_attacked(&position, Square::H8, Player::Black));
        assert!(!is_attacked(&position, Square::C4, Player::Black));
    }

    #[test]
    fn kings() {
        let position = Position::starting();
        assert_eq!(find_king(&position, Player::White), Some(Square::E1));
        assert_eq!(find_king(&position, Player::Black), Some(Square::E8));
        assert_eq!(find_king(&Position::empty(), Player::White), None);
    }
}
