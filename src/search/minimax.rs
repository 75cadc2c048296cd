//! Implementation of [Minimax] algorithm with [Alpha-Beta pruning].
//!
//! White is the maximizing player and Black is the minimizing one, matching
//! the sign convention of [`crate::evaluation::evaluate`]. Every node works on
//! its own copy of the position and receives the search window by value, so
//! there is no state shared between the branches.
//!
//! [Minimax]: https://en.wikipedia.org/wiki/Minimax
//! [Alpha-Beta pruning]: https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chess::core::{Move, Player};
use crate::chess::position::{ApplyMode, Position};
use crate::evaluation::{evaluate, Score};
use crate::search::Depth;

const fn player(maximizing: bool) -> Player {
    if maximizing {
        Player::White
    } else {
        Player::Black
    }
}

/// Returns the minimax value of the position searched `depth` plies deep
/// within the `(alpha, beta)` window. `maximizing` tells whose turn it is
/// (White when `true`): the position's own side to move is not consulted.
///
/// Children are produced with [`ApplyMode::Simulation`], so castling rights
/// and the en passant target stay as they were at the root of the search.
///
/// A side without legal moves scores [`Score::LOSE`] if it is White and
/// [`Score::WIN`] if it is Black, regardless of whether it is checkmate or
/// stalemate.
#[must_use]
pub fn search(
    position: &Position,
    depth: Depth,
    mut alpha: Score,
    mut beta: Score,
    maximizing: bool,
) -> Score {
    if depth == 0 {
        return evaluate(position);
    }
    let moves = position.all_legal_moves(player(maximizing));
    if moves.is_empty() {
        return if maximizing { Score::LOSE } else { Score::WIN };
    }
    if maximizing {
        let mut best = -Score::INFINITY;
        for next_move in &moves {
            let child = position.apply(next_move, ApplyMode::Simulation);
            best = best.max(search(&child, depth - 1, alpha, beta, false));
            alpha = alpha.max(best);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = Score::INFINITY;
        for next_move in &moves {
            let child = position.apply(next_move, ApplyMode::Simulation);
            best = best.min(search(&child, depth - 1, alpha, beta, true));
            beta = beta.min(best);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

/// Picks the best move for `player` together with the score it leads to. The
/// candidates are shuffled first, so that equally good moves are chosen at
/// random. Returns [`None`] if `player` has no legal moves.
pub(super) fn best_move<R: Rng + ?Sized>(
    position: &Position,
    depth: Depth,
    player: Player,
    rng: &mut R,
) -> Option<(Move, Score)> {
    let mut moves = position.all_legal_moves(player);
    moves.shuffle(rng);
    let mut best: Option<(Move, Score)> = None;
    for next_move in moves {
        let child = position.apply(&next_move, ApplyMode::Simulation);
        let score = search(
            &child,
            depth.saturating_sub(1),
            -Score::INFINITY,
            Score::INFINITY,
            player.opponent() == Player::White,
        );
        let improves = best.map_or(true, |(_, best_score)| match player {
            Player::White => score > best_score,
            Player::Black => score < best_score,
        });
        if improves {
            best = Some((next_move, score));
        }
    }
    if let Some((next_move, score)) = best {
        log::debug!("{player:?} chose {next_move} ({score}) at depth {depth}");
    }
    best
}

/// Chooses a move for `player` by searching every legal move one ply less
/// than `depth` deep. White picks the highest score, Black the lowest.
///
/// ```
/// use pawnstorm::chess::core::Player;
/// use pawnstorm::chess::position::Position;
/// use pawnstorm::search::choose_move;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// // White mates in one with Rd8.
/// let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/3R2K1 w - - 0 1").unwrap();
/// let next_move = choose_move(&position, 2, Player::White, &mut rng).unwrap();
/// assert_eq!(next_move.to_string(), "d1d8");
/// ```
#[must_use]
pub fn choose_move<R: Rng + ?Sized>(
    position: &Position,
    depth: Depth,
    player: Player,
    rng: &mut R,
) -> Option<Move> {
    best_move(position, depth, player, rng).map(|(next_move, _)| next_move)
}
