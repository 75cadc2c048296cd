//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};
use std::mem;

use anyhow::bail;
use itertools::Itertools;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Checks whether `(row, column)` coordinates are within the board. Every
/// coordinate-consuming operation goes through this check before touching the
/// board.
///
/// ```
/// use pawnstorm::chess::core::is_valid_square;
///
/// assert!(is_valid_square(0, 0));
/// assert!(is_valid_square(7, 7));
/// assert!(!is_valid_square(-1, 3));
/// assert!(!is_valid_square(4, 8));
/// ```
#[must_use]
pub const fn is_valid_square(row: i8, column: i8) -> bool {
    let width = BOARD_WIDTH as i8;
    0 <= row && row < width && 0 <= column && column < width
}

/// Board squares: from left to right, from the top (Black's back rank) to the
/// bottom (White's back rank). The square index is `row * 8 + column` where
/// row 0 is the eighth rank:
///
/// ```
/// use pawnstorm::chess::core::Square;
///
/// assert_eq!(Square::A8 as u8, 0);
/// assert_eq!(Square::H8 as u8, 7);
/// assert_eq!(Square::E1 as u8, 60);
/// assert_eq!(Square::H1 as u8, 63);
/// assert_eq!(Square::E1.row(), 7);
/// assert_eq!(Square::E1.column(), 4);
/// ```
///
/// Square is a compact representation using only one byte.
///
/// ```
/// use pawnstorm::chess::core::Square;
///
/// assert_eq!(std::mem::size_of::<Square>(), 1);
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A8, B8, C8, D8, E8, F8, G8, H8,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A1, B1, C1, D1, E1, F1, G1, H1,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub const fn new(file: File, rank: Rank) -> Self {
        let row = BOARD_WIDTH - 1 - rank as u8;
        unsafe { mem::transmute::<u8, Self>(row * BOARD_WIDTH + file as u8) }
    }

    /// Creates a square from board coordinates, rejecting anything outside the
    /// board.
    #[must_use]
    pub const fn from_coordinates(row: i8, column: i8) -> Option<Self> {
        if !is_valid_square(row, column) {
            return None;
        }
        let index = (row * BOARD_WIDTH as i8 + column) as u8;
        Some(unsafe { mem::transmute::<u8, Self>(index) })
    }

    /// Row of the square: 0 is Black's back rank, 7 is White's.
    #[must_use]
    pub const fn row(self) -> i8 {
        (self as u8 / BOARD_WIDTH) as i8
    }

    /// Column of the square: 0 is the a-file, 7 is the h-file.
    #[must_use]
    pub const fn column(self) -> i8 {
        (self as u8 % BOARD_WIDTH) as i8
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub const fn file(self) -> File {
        unsafe { mem::transmute::<u8, File>(self as u8 % BOARD_WIDTH) }
    }

    /// Returns rank on which the square is located.
    #[must_use]
    pub const fn rank(self) -> Rank {
        unsafe { mem::transmute::<u8, Rank>(BOARD_WIDTH - 1 - self as u8 / BOARD_WIDTH) }
    }

    /// Returns the square `rows` and `columns` away from this one, or [`None`]
    /// if that would leave the board.
    #[must_use]
    pub const fn offset(self, rows: i8, columns: i8) -> Option<Self> {
        Self::from_coordinates(self.row() + rows, self.column() + columns)
    }

    /// Iterates over all squares in index order (a8, b8, ..., h1).
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).map(|index| unsafe { mem::transmute::<u8, Self>(index) })
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    /// Creates a square given its index on the board.
    ///
    /// # Errors
    ///
    /// If given square index is outside 0..[`BOARD_SIZE`] range.
    fn try_from(square_index: u8) -> anyhow::Result<Self> {
        match square_index {
            0..BOARD_SIZE => Ok(unsafe { mem::transmute::<u8, Self>(square_index) }),
            _ => bail!("square index should be in 0..BOARD_SIZE, got {square_index}"),
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        let Some((file, rank)) = square.chars().collect_tuple() else {
            bail!(
                "square should be two-char, got {square} with {} chars",
                square.chars().count()
            );
        };
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Represents a column (vertical row) of the chessboard. In chess notation, it
/// is normally represented with a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(unsafe { mem::transmute::<u8, Self>(file as u8 - b'a') }),
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(column: u8) -> anyhow::Result<Self> {
        match column {
            0..BOARD_WIDTH => Ok(unsafe { mem::transmute::<u8, Self>(column) }),
            _ => bail!("file should be within 0..BOARD_WIDTH, got {column}"),
        }
    }
}

/// Represents a horizontal row of the chessboard. In chess notation, it is
/// represented with a number. The implementation assumes zero-based values
/// (i.e. rank 1 would be 0).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Rank {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Five = 4,
    Six = 5,
    Seven = 6,
    Eight = 7,
}

impl Rank {
    /// The rank king and rooks of `player` start on.
    #[must_use]
    pub const fn backrank(player: Player) -> Self {
        match player {
            Player::White => Self::One,
            Player::Black => Self::Eight,
        }
    }

    /// The rank pawns of `player` start on.
    #[must_use]
    pub const fn pawns_starting(player: Player) -> Self {
        match player {
            Player::White => Self::Two,
            Player::Black => Self::Seven,
        }
    }

    /// The farthest rank from `player`'s side: pawns reaching it promote.
    #[must_use]
    pub const fn promotion(player: Player) -> Self {
        Self::backrank(player.opponent())
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(unsafe { mem::transmute::<u8, Self>(rank as u8 - b'1') }),
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(row: u8) -> anyhow::Result<Self> {
        match row {
            0..BOARD_WIDTH => Ok(unsafe { mem::transmute::<u8, Self>(row) }),
            _ => bail!("rank should be within 0..BOARD_WIDTH, got {row}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Row delta of a pawn advance. White pawns move towards row 0.
    #[must_use]
    pub const fn push_direction(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("player should be 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl TryFrom<char> for PieceKind {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        match symbol {
            'p' => Ok(Self::Pawn),
            'n' => Ok(Self::Knight),
            'b' => Ok(Self::Bishop),
            'r' => Ok(Self::Rook),
            'q' => Ok(Self::Queen),
            'k' => Ok(Self::King),
            _ => bail!("piece kind should be within \"pnbrqk\", got '{symbol}'"),
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        })
    }
}

/// Represents a specific piece owned by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    #[allow(missing_docs)]
    pub owner: Player,
    #[allow(missing_docs)]
    pub kind: PieceKind,
}

impl Piece {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(owner: Player, kind: PieceKind) -> Self {
        Self { owner, kind }
    }
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    /// Parses a FEN piece symbol: uppercase letters are White pieces,
    /// lowercase letters are Black pieces.
    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let owner = if symbol.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        match PieceKind::try_from(symbol.to_ascii_lowercase()) {
            Ok(kind) => Ok(Self { owner, kind }),
            Err(_) => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.kind.to_string();
        match self.owner {
            Player::White => f.write_str(&symbol.to_ascii_uppercase()),
            Player::Black => f.write_str(&symbol),
        }
    }
}

bitflags::bitflags! {
    /// Track the ability to [castle] each side (kingside is often referred to
    /// as O-O or h-side castle, queenside -- O-O-O or a-side castle). When the
    /// king moves, player loses ability to castle both sides. When the rook
    /// moves or is captured on its original square, player loses ability to
    /// castle its corresponding side.
    ///
    /// These are the rights *remaining*: whether castling is legal right now
    /// also depends on the squares between the king and the rook being empty
    /// and not attacked.
    ///
    /// [castle]: https://www.chessprogramming.org/Castling
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CastleRights : u8 {
        #[allow(missing_docs)]
        const NONE = 0;
        #[allow(missing_docs)]
        const WHITE_SHORT = 0b1000;
        #[allow(missing_docs)]
        const WHITE_LONG = 0b0100;
        #[allow(missing_docs)]
        const WHITE_BOTH = Self::WHITE_SHORT.bits() | Self::WHITE_LONG.bits();
        #[allow(missing_docs)]
        const BLACK_SHORT = 0b0010;
        #[allow(missing_docs)]
        const BLACK_LONG = 0b0001;
        #[allow(missing_docs)]
        const BLACK_BOTH = Self::BLACK_SHORT.bits() | Self::BLACK_LONG.bits();
        #[allow(missing_docs)]
        const ALL = Self::WHITE_BOTH.bits() | Self::BLACK_BOTH.bits();
    }
}

impl CastleRights {
    /// Kingside right of `player`.
    #[must_use]
    pub const fn short(player: Player) -> Self {
        match player {
            Player::White => Self::WHITE_SHORT,
            Player::Black => Self::BLACK_SHORT,
        }
    }

    /// Queenside right of `player`.
    #[must_use]
    pub const fn long(player: Player) -> Self {
        match player {
            Player::White => Self::WHITE_LONG,
            Player::Black => Self::BLACK_LONG,
        }
    }

    /// Rights that are lost once anything moves from or to `square`: the
    /// original squares of kings and rooks.
    #[must_use]
    pub const fn lost_at(square: Square) -> Self {
        match square {
            Square::E1 => Self::WHITE_BOTH,
            Square::H1 => Self::WHITE_SHORT,
            Square::A1 => Self::WHITE_LONG,
            Square::E8 => Self::BLACK_BOTH,
            Square::H8 => Self::BLACK_SHORT,
            Square::A8 => Self::BLACK_LONG,
            _ => Self::NONE,
        }
    }
}

impl TryFrom<&str> for CastleRights {
    type Error = anyhow::Error;

    /// Parses [`CastleRights`] for both players from the FEN format. The user
    /// is responsible for providing valid input cleaned up from the actual FEN
    /// chunk.
    ///
    /// # Errors
    ///
    /// Returns [`anyhow::Error`] if given pattern does not match
    ///
    /// [`CastleRights`] := "-" | (K)? (Q)? (k)? (q)?
    fn try_from(input: &str) -> anyhow::Result<Self> {
        if input == "-" {
            return Ok(Self::NONE);
        }
        let mut rights = Self::NONE;
        // Each letter can appear at most once and only in the canonical order.
        let mut expected = [
            ('K', Self::WHITE_SHORT),
            ('Q', Self::WHITE_LONG),
            ('k', Self::BLACK_SHORT),
            ('q', Self::BLACK_LONG),
        ]
        .into_iter();
        for symbol in input.chars() {
            match expected.find(|(letter, _)| *letter == symbol) {
                Some((_, right)) => rights |= right,
                None => bail!("unknown castle rights: {input}"),
            }
        }
        if rights.is_empty() {
            bail!("unknown castle rights: {input}");
        }
        Ok(rights)
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_char('-');
        }
        for (letter, right) in [
            ('K', Self::WHITE_SHORT),
            ('Q', Self::WHITE_LONG),
            ('k', Self::BLACK_SHORT),
            ('q', Self::BLACK_LONG),
        ] {
            if self.contains(right) {
                f.write_char(letter)?;
            }
        }
        Ok(())
    }
}

/// What else happens on the board when a [`Move`] is made, apart from the
/// moving piece changing its square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Quiet move or a regular capture.
    Plain,
    /// Pawn advancement by 2 squares from the original rank (second for
    /// white and seventh for black). Sets the en passant target.
    DoublePawnPush,
    /// Capture of opponent's pawn "in passing": the captured pawn is not on
    /// the destination square.
    EnPassantCapture,
    /// Short castle or O-O. `from` and `to` squares correspond to the king.
    CastleKingside,
    /// Long castle or O-O-O. `from` and `to` squares correspond to the king.
    CastleQueenside,
}

/// Represents any kind of a legal chess move. A move is a pure value: it only
/// changes a [`crate::chess::position::Position`] when applied to it.
///
/// Pawns reaching the farthest rank are always promoted to a queen;
/// underpromotion is not supported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    kind: MoveKind,
    promotion: bool,
}

impl Move {
    /// Creates a non-promoting move.
    #[must_use]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            kind,
            promotion: false,
        }
    }

    /// Marks the move as a pawn promotion (to a queen).
    #[must_use]
    pub const fn with_promotion(self) -> Self {
        Self {
            promotion: true,
            ..self
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn to(&self) -> Square {
        self.to
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Returns `true` if a pawn reaches the last rank and becomes a queen.
    #[must_use]
    pub const fn is_promotion(&self) -> bool {
        self.promotion
    }

    /// Returns `true` for both kingside and queenside castling.
    #[must_use]
    pub const fn is_castle(&self) -> bool {
        matches!(
            self.kind,
            MoveKind::CastleKingside | MoveKind::CastleQueenside
        )
    }
}

impl fmt::Display for Move {
    /// Serializes a move in [UCI format].
    ///
    /// [UCI format]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if self.promotion {
            write!(f, "{}", PieceKind::Queen)?;
        }
        Ok(())
    }
}
