//! Provides fully-specified [Chess Position] implementation: stores information
//! about the board and tracks the state of castling, en passant and move
//! counters.
//!
//! Move making (both "real" moves and lightweight simulations used for king
//! safety checks and search) is implemented here as a way to produce new
//! [`Position`]s.
//!
//! [Chess Position]: https://www.chessprogramming.org/Chess_Position

use std::fmt::{self, Write};
use std::num::NonZeroU16;

use anyhow::{bail, Context};

use crate::chess::attacks;
use crate::chess::core::{
    CastleRights,
    Move,
    MoveKind,
    Piece,
    PieceKind,
    Player,
    Rank,
    Square,
    BOARD_SIZE,
    BOARD_WIDTH,
};

/// Piece placement, indexed by [`Square`].
pub(super) type Board = [Option<Piece>; BOARD_SIZE as usize];

/// Pieces on the first and the last ranks from a to h in the starting
/// position.
const BACKRANK: [PieceKind; BOARD_WIDTH as usize] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Distinguishes moves that are actually played from the ones that are only
/// tried out on a copy of the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    /// Only relocates the pieces: castling rights, en passant target, move
    /// counters and the side to move are left untouched. Used for king safety
    /// checks and search.
    Simulation,
    /// Full bookkeeping of a move played in the game.
    Real,
}

/// State of the chess game: board, castling rights, en passant target and
/// move counters. It has 1:1 relationship with [Forsyth-Edwards Notation]
/// (FEN).
///
/// [`Position::try_from()`] provides a convenient interface for creating a
/// [`Position`]. It will clean up the input (trim newlines and whitespace) and
/// attempt to parse in either FEN or a version of [Extended Position
/// Description] (EPD) without operations.
///
/// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
/// [Extended Position Description]: https://www.chessprogramming.org/Extended_Position_Description
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    side_to_move: Player,
    castling: CastleRights,
    en_passant_square: Option<Square>,
    /// [Halfmove Clock][^ply] keeps track of the number of (half-)moves
    /// since the last capture or pawn move.
    ///
    /// [Halfmove Clock]: https://www.chessprogramming.org/Halfmove_Clock
    /// [^ply]: "Half-move" or ["ply"](https://www.chessprogramming.org/Ply) means a move of only
    ///     one side.
    halfmove_clock: u8,
    fullmove_counter: NonZeroU16,
}

impl Position {
    /// Creates the starting position of the standard chess variant.
    ///
    /// ```
    /// use pawnstorm::chess::position::Position;
    ///
    /// let starting_position = Position::starting();
    /// assert_eq!(
    ///     &starting_position.to_string(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    /// );
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        let mut position = Self {
            castling: CastleRights::ALL,
            ..Self::empty()
        };
        for square in Square::iter() {
            let file = square.file() as usize;
            position.board[square.index()] = match square.rank() {
                Rank::Eight => Some(Piece::new(Player::Black, BACKRANK[file])),
                Rank::Seven => Some(Piece::new(Player::Black, PieceKind::Pawn)),
                Rank::Two => Some(Piece::new(Player::White, PieceKind::Pawn)),
                Rank::One => Some(Piece::new(Player::White, BACKRANK[file])),
                _ => None,
            };
        }
        position
    }

    /// Creates an empty board with White to move. It is not a valid chess
    /// position but is a starting point for setting up pieces with
    /// [`Position::place`].
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            board: [None; BOARD_SIZE as usize],
            side_to_move: Player::White,
            castling: CastleRights::NONE,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_counter: NonZeroU16::MIN,
        }
    }

    /// Puts a piece on the square (or clears it when `piece` is [`None`]). No
    /// validation is performed: the result might not be a legal position.
    pub fn place(&mut self, square: Square, piece: Option<Piece>) {
        self.board[square.index()] = piece;
    }

    /// Returns the piece on given square, if any.
    #[must_use]
    pub const fn at(&self, square: Square) -> Option<Piece> {
        self.board[square.index()]
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn castling(&self) -> CastleRights {
        self.castling
    }

    /// The square a pawn has just passed over with a double push.
    #[must_use]
    pub const fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn halfmove_clock(&self) -> u8 {
        self.halfmove_clock
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn fullmove_counter(&self) -> u16 {
        self.fullmove_counter.get()
    }

    /// Iterates over occupied squares and pieces standing on them.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.at(square).map(|piece| (square, piece)))
    }

    /// Returns `true` if the king of `player` is attacked by the opponent. A
    /// position without such king is never in check.
    #[must_use]
    pub fn is_in_check(&self, player: Player) -> bool {
        attacks::find_king(self, player)
            .is_some_and(|king| attacks::is_attacked(self, king, player.opponent()))
    }

    /// Returns a new position with the move applied to it. See [`ApplyMode`]
    /// for the difference between real and simulated moves.
    ///
    /// The move is expected to come from the move generator: applying
    /// arbitrary moves produces arbitrary (but memory-safe) positions.
    #[must_use]
    pub fn apply(&self, next_move: &Move, mode: ApplyMode) -> Self {
        let mut next = self.clone();
        next.apply_in_place(next_move, mode);
        next
    }

    /// Plays the move in this position: this is the [`ApplyMode::Real`]
    /// version of [`Position::apply`] that does not copy the board.
    pub fn make_move(&mut self, next_move: &Move) {
        self.apply_in_place(next_move, ApplyMode::Real);
    }

    fn apply_in_place(&mut self, next_move: &Move, mode: ApplyMode) {
        let (from, to) = (next_move.from(), next_move.to());
        let Some(piece) = self.board[from.index()].take() else {
            debug_assert!(false, "no piece to move on {from}");
            return;
        };
        let captured = self.board[to.index()];
        match next_move.kind() {
            MoveKind::EnPassantCapture => {
                // The captured pawn stands next to the mover, not on the target.
                if let Some(victim) = Square::from_coordinates(from.row(), to.column()) {
                    self.board[victim.index()] = None;
                }
            },
            MoveKind::CastleKingside => self.move_rook(from.row(), 7, 5),
            MoveKind::CastleQueenside => self.move_rook(from.row(), 0, 3),
            MoveKind::Plain | MoveKind::DoublePawnPush => (),
        }
        let promoted = piece.kind == PieceKind::Pawn && to.rank() == Rank::promotion(piece.owner);
        self.board[to.index()] = Some(if promoted {
            Piece::new(piece.owner, PieceKind::Queen)
        } else {
            piece
        });
        if mode == ApplyMode::Simulation {
            return;
        }
        self.castling
            .remove(CastleRights::lost_at(from) | CastleRights::lost_at(to));
        self.en_passant_square = match next_move.kind() {
            MoveKind::DoublePawnPush => {
                Square::from_coordinates((from.row() + to.row()) / 2, from.column())
            },
            _ => None,
        };
        let irreversible = piece.kind == PieceKind::Pawn || captured.is_some();
        self.halfmove_clock = if irreversible {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        if piece.owner == Player::Black {
            self.fullmove_counter = self.fullmove_counter.saturating_add(1);
        }
        self.side_to_move = piece.owner.opponent();
    }

    fn move_rook(&mut self, row: i8, from_column: i8, to_column: i8) {
        if let (Some(from), Some(to)) = (
            Square::from_coordinates(row, from_column),
            Square::from_coordinates(row, to_column),
        ) {
            self.board[to.index()] = self.board[from.index()].take();
        }
    }

    /// Checks that the position can be reached in a normal game to the extent
    /// that the move generator relies on.
    ///
    /// # Errors
    ///
    /// Describes the first problem found.
    pub fn validate(&self) -> anyhow::Result<()> {
        for player in [Player::White, Player::Black] {
            let count = |kind| {
                self.pieces()
                    .filter(|(_, piece)| *piece == Piece::new(player, kind))
                    .count()
            };
            let kings = count(PieceKind::King);
            if kings != 1 {
                bail!("expected exactly one {player:?} king, got {kings}");
            }
            let pawns = count(PieceKind::Pawn);
            if pawns > BOARD_WIDTH as usize {
                bail!("{player:?} can not have more than {BOARD_WIDTH} pawns, got {pawns}");
            }
            for (right, king, rook) in [
                (CastleRights::short(player), Square::E1, Square::H1),
                (CastleRights::long(player), Square::E1, Square::A1),
            ] {
                if !self.castling.contains(right) {
                    continue;
                }
                let (king, rook) = match player {
                    Player::White => (king, rook),
                    Player::Black => (mirror(king), mirror(rook)),
                };
                if self.at(king) != Some(Piece::new(player, PieceKind::King))
                    || self.at(rook) != Some(Piece::new(player, PieceKind::Rook))
                {
                    bail!("castle rights {right} require king on {king} and rook on {rook}");
                }
            }
        }
        if let Some((square, _)) = self.pieces().find(|(square, piece)| {
            piece.kind == PieceKind::Pawn && matches!(square.rank(), Rank::One | Rank::Eight)
        }) {
            bail!("pawns can not be placed on backranks, got one on {square}");
        }
        if let Some(en_passant_square) = self.en_passant_square {
            let they = self.side_to_move.opponent();
            let expected_rank = match self.side_to_move {
                Player::White => Rank::Six,
                Player::Black => Rank::Three,
            };
            if en_passant_square.rank() != expected_rank {
                bail!("en passant square should be on rank {expected_rank}, got {en_passant_square}");
            }
            if self.at(en_passant_square).is_some() {
                bail!("en passant square {en_passant_square} should be empty");
            }
            // A pawn that was just pushed by our opponent should be in front of
            // en_passant_square.
            let pushed_pawn = en_passant_square.offset(they.push_direction(), 0);
            if pushed_pawn.and_then(|square| self.at(square)) != Some(Piece::new(they, PieceKind::Pawn))
            {
                bail!("en passant square {en_passant_square} is not behind a pushed pawn");
            }
        }
        Ok(())
    }

    /// Parses board from Forsyth-Edwards Notation. It will also accept trimmed
    /// FEN (EPD with 4 parts).
    ///
    /// FEN ::=
    ///       Piece Placement
    ///   ' ' Side to move
    ///   ' ' Castling ability
    ///   ' ' En passant target square
    ///   ' ' Halfmove clock
    ///   ' ' Fullmove counter
    ///
    /// The last two parts (together) are optional and will default to "0 1".
    ///
    /// NOTE: This expects properly-formatted inputs: no extra symbols or
    /// additional whitespace. Use [`Position::try_from`] for cleaning up the
    /// input if it is coming from untrusted source and is likely to contain
    /// extra symbols.
    ///
    /// # Errors
    ///
    /// Malformed input or a position that fails [`Position::validate`].
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        let mut parts = input.split(' ');
        let mut result = Self::empty();
        let Some(pieces_placement) = parts.next() else {
            bail!("incorrect FEN: missing pieces placement");
        };
        let mut rows = 0;
        for rank_fen in pieces_placement.split('/') {
            if rows == BOARD_WIDTH {
                bail!("incorrect FEN: expected 8 ranks, got {pieces_placement}");
            }
            let mut column: u8 = 0;
            for symbol in rank_fen.chars() {
                if column >= BOARD_WIDTH {
                    bail!("incorrect FEN: rank {rank_fen} is longer than {BOARD_WIDTH} squares");
                }
                match symbol {
                    '0' => bail!("increment can not be 0"),
                    '1'..='8' => {
                        column += symbol as u8 - b'0';
                        continue;
                    },
                    _ => (),
                }
                let piece = Piece::try_from(symbol)?;
                result.board[usize::from(rows * BOARD_WIDTH + column)] = Some(piece);
                column += 1;
            }
            if column != BOARD_WIDTH {
                bail!("incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of length {column}");
            }
            rows += 1;
        }
        if rows != BOARD_WIDTH {
            bail!("incorrect FEN: there should be 8 ranks, got {pieces_placement}");
        }
        result.side_to_move = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing side to move"),
        };
        result.castling = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing castling rights"),
        };
        result.en_passant_square = match parts.next() {
            Some("-") => None,
            Some(value) => Some(value.try_into()?),
            None => bail!("incorrect FEN: missing en passant square"),
        };
        match parts.next() {
            Some(value) => {
                result.halfmove_clock = parse_counter(value)
                    .with_context(|| format!("incorrect FEN: halfmove clock can not be parsed {value}"))?;
                result.fullmove_counter = match parts.next() {
                    Some(value) => parse_counter(value).with_context(|| {
                        format!("incorrect FEN: fullmove counter can not be parsed {value}")
                    })?,
                    None => bail!("incorrect FEN: missing fullmove counter"),
                };
            },
            // This is a correct EPD.
            None => (),
        }
        if parts.next().is_some() {
            bail!("trailing symbols are not allowed in FEN");
        }
        result.validate().context("illegal position")?;
        Ok(result)
    }
}

/// Reflects a square across the horizontal axis (e1 <-> e8).
fn mirror(square: Square) -> Square {
    Square::from_coordinates(BOARD_WIDTH as i8 - 1 - square.row(), square.column())
        .unwrap_or(square)
}

fn parse_counter<T: std::str::FromStr>(value: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if !value.bytes().all(|c| c.is_ascii_digit()) {
        bail!("move counters can not contain anything other than digits");
    }
    Ok(value.parse::<T>()?)
}

impl TryFrom<&str> for Position {
    type Error = anyhow::Error;

    /// Parses a position in FEN or EPD, optionally prefixed with "fen " or
    /// "epd ". Surrounding whitespace is ignored.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        for prefix in ["fen ", "epd "] {
            if let Some(stripped) = input.strip_prefix(prefix) {
                return Self::from_fen(stripped);
            }
        }
        Self::from_fen(input)
    }
}

impl fmt::Display for Position {
    /// Prints board in Forsyth-Edwards Notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, squares) in self.board.chunks(BOARD_WIDTH as usize).enumerate() {
            if row != 0 {
                f.write_char('/')?;
            }
            let mut empty_squares = 0;
            for square in squares {
                match square {
                    Some(piece) => {
                        if empty_squares != 0 {
                            write!(f, "{empty_squares}")?;
                            empty_squares = 0;
                        }
                        write!(f, "{piece}")?;
                    },
                    None => empty_squares += 1,
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
        }
        write!(f, " {} {} ", self.side_to_move, self.castling)?;
        match self.en_passant_square {
            Some(square) => write!(f, "{square} "),
            None => write!(f, "- "),
        }?;
        write!(f, "{} {}", self.halfmove_clock, self.fullmove_counter)
    }
}

impl fmt::Debug for Position {
    /// Dumps the board in a simple format ('.' for empty square, FEN algebraic
    /// symbol for piece) a-la Stockfish "debug" command in UCI mode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for squares in self.board.chunks(BOARD_WIDTH as usize) {
            let line = squares
                .iter()
                .map(|square| square.map_or_else(|| ".".to_string(), |piece| piece.to_string()))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{line}")?;
        }
        writeln!(f, "Player to move: {:?}", &self.side_to_move)?;
        writeln!(f, "Fullmove counter: {}", &self.fullmove_counter)?;
        writeln!(f, "En Passant: {:?}", &self.en_passant_square)?;
        // bitflags' default fmt::Debug implementation is not very convenient:
        // dump FEN instead.
        writeln!(f, "Castling rights: {}", &self.castling)?;
        writeln!(f, "FEN: {self}")?;
        Ok(())
    }
}

/// [Perft] (*per*formance *t*esting) counts the leaf nodes of the legal move
/// tree of given depth. The numbers are well known for many positions, which
/// makes it the standard way of verifying move generation and move making.
///
/// ```
/// use pawnstorm::chess::position::{perft, Position};
///
/// assert_eq!(perft(&Position::starting(), 2), 400);
/// ```
///
/// [Perft]: https://www.chessprogramming.org/Perft
#[must_use]
pub fn perft(position: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = position.all_legal_moves(position.side_to_move());
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .map(|next_move| {
            let mut next = position.clone();
            next.make_move(next_move);
            perft(&next, depth - 1)
        })
        .sum()
}
