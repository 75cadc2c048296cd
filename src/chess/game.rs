//! The record of a game being played: the authoritative position and the moves
//! that led to it.

use anyhow::bail;

use crate::chess::core::{Move, Player, Square};
use crate::chess::movegen::PieceMoves;
use crate::chess::position::Position;

/// Whether the game goes on and, if not, how it ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    #[allow(missing_docs)]
    InProgress,
    /// The side to move is in check and has no legal moves.
    Checkmate {
        #[allow(missing_docs)]
        winner: Player,
    },
    /// The side to move is not in check but has no legal moves.
    Stalemate,
}

/// A game in progress. Only real moves are ever applied to its position, and
/// only after they are checked to be legal.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    history: Vec<Move>,
}

impl Game {
    /// Starts a new game from the standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::from_position(Position::starting())
    }

    /// Continues the game from an arbitrary position.
    #[must_use]
    pub const fn from_position(position: Position) -> Self {
        Self {
            position,
            history: Vec::new(),
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Moves played so far, in order.
    #[must_use]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Legal moves of the piece on `square`; empty if it does not belong to
    /// the side to move.
    #[must_use]
    pub fn legal_moves(&self, square: Square) -> PieceMoves {
        self.position.legal_moves(square)
    }

    /// Checks the side to move for checkmate and stalemate.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        let player = self.position.side_to_move();
        if self.position.is_checkmate(player) {
            GameStatus::Checkmate {
                winner: player.opponent(),
            }
        } else if self.position.is_stalemate(player) {
            GameStatus::Stalemate
        } else {
            GameStatus::InProgress
        }
    }

    /// Plays the move and reports the status of the game afterwards.
    ///
    /// # Errors
    ///
    /// The game is already over or the move is not legal for the side to move.
    pub fn play(&mut self, next_move: &Move) -> anyhow::Result<GameStatus> {
        let status = self.status();
        if status != GameStatus::InProgress {
            bail!("the game is over: {status:?}");
        }
        if !self.legal_moves(next_move.from()).contains(next_move) {
            bail!("illegal move {next_move} in position {}", self.position);
        }
        self.position.make_move(next_move);
        self.history.push(*next_move);
        Ok(self.status())
    }

    /// Parses the move in UCI notation and plays it.
    ///
    /// # Errors
    ///
    /// See [`Position::parse_move`] and [`Game::play`].
    pub fn play_uci(&mut self, uci: &str) -> anyhow::Result<GameStatus> {
        let next_move = self.position.parse_move(uci)?;
        self.play(&next_move)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
