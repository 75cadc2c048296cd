//! Move generation: pseudo-legal moves of a single piece, the king safety
//! filter that turns them into legal moves, and the derived game-ending
//! conditions (checkmate and stalemate).
//!
//! The generator works on the "mailbox" board directly: sliding pieces walk
//! rays until they are blocked and everything else steps through fixed offset
//! tables. Legality is checked by simulating the move and asking the
//! [attack oracle](crate::chess::attacks) about the king.

use anyhow::bail;
use arrayvec::ArrayVec;

use crate::chess::attacks::{
    self,
    DIAGONAL_DIRECTIONS,
    KING_OFFSETS,
    KNIGHT_OFFSETS,
    ORTHOGONAL_DIRECTIONS,
};
use crate::chess::core::{
    CastleRights,
    File,
    Move,
    MoveKind,
    Piece,
    PieceKind,
    Player,
    Rank,
    Square,
};
use crate::chess::position::{ApplyMode, Position};

/// Moves of a single piece. A queen in the middle of an empty board has the
/// most: 27.
pub type PieceMoves = ArrayVec<Move, 32>;

/// Whether castling moves are considered. King safety checks never need them
/// (castling is not a capture), and excluding them there avoids asking the
/// attack oracle about castling paths again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Castling {
    #[allow(missing_docs)]
    Include,
    #[allow(missing_docs)]
    Exclude,
}

impl Position {
    /// Returns the moves of the piece on `from` that follow its movement
    /// rules, without checking whether they leave the own king attacked.
    /// Empty square yields no moves.
    #[must_use]
    pub fn pseudo_legal_moves(&self, from: Square, castling: Castling) -> PieceMoves {
        let mut moves = PieceMoves::new();
        let Some(piece) = self.at(from) else {
            return moves;
        };
        let owner = piece.owner;
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(from, owner, &mut moves),
            PieceKind::Knight => self.step_moves(from, owner, &KNIGHT_OFFSETS, &mut moves),
            PieceKind::Bishop => self.slide_moves(from, owner, &DIAGONAL_DIRECTIONS, &mut moves),
            PieceKind::Rook => self.slide_moves(from, owner, &ORTHOGONAL_DIRECTIONS, &mut moves),
            PieceKind::Queen => {
                self.slide_moves(from, owner, &ORTHOGONAL_DIRECTIONS, &mut moves);
                self.slide_moves(from, owner, &DIAGONAL_DIRECTIONS, &mut moves);
            },
            PieceKind::King => {
                self.step_moves(from, owner, &KING_OFFSETS, &mut moves);
                if castling == Castling::Include {
                    self.castle_moves(from, owner, &mut moves);
                }
            },
        }
        moves
    }

    /// Calculates legal moves of the piece on `from` (i.e. the moves that do
    /// not leave our king in check). Only the pieces of the side to move have
    /// legal moves.
    #[must_use]
    pub fn legal_moves(&self, from: Square) -> PieceMoves {
        self.legal_moves_for(from, self.side_to_move())
    }

    /// Same as [`Position::legal_moves`] for an explicitly given owner: search
    /// and game-end detection look at positions where the side to move is not
    /// tracked.
    pub(crate) fn legal_moves_for(&self, from: Square, player: Player) -> PieceMoves {
        if self.at(from).map(|piece| piece.owner) != Some(player) {
            return PieceMoves::new();
        }
        let mut moves = self.pseudo_legal_moves(from, Castling::Include);
        moves.retain(|next_move| {
            !self
                .apply(next_move, ApplyMode::Simulation)
                .is_in_check(player)
        });
        moves
    }

    /// Collects legal moves of all pieces of `player`.
    #[must_use]
    pub fn all_legal_moves(&self, player: Player) -> Vec<Move> {
        self.pieces()
            .filter(|(_, piece)| piece.owner == player)
            .flat_map(|(square, _)| self.legal_moves_for(square, player))
            .collect()
    }

    fn has_legal_moves(&self, player: Player) -> bool {
        self.pieces().any(|(square, piece)| {
            piece.owner == player && !self.legal_moves_for(square, player).is_empty()
        })
    }

    /// The king of `player` is attacked and there is no way out.
    #[must_use]
    pub fn is_checkmate(&self, player: Player) -> bool {
        self.is_in_check(player) && !self.has_legal_moves(player)
    }

    /// `player` is not in check but has no legal moves.
    #[must_use]
    pub fn is_stalemate(&self, player: Player) -> bool {
        !self.is_in_check(player) && !self.has_legal_moves(player)
    }

    /// Resolves a move in [UCI notation] to the legal move of the side to
    /// move.
    ///
    /// ```
    /// use pawnstorm::chess::core::MoveKind;
    /// use pawnstorm::chess::position::Position;
    ///
    /// let position = Position::starting();
    /// let next_move = position.parse_move("e2e4").unwrap();
    /// assert_eq!(next_move.kind(), MoveKind::DoublePawnPush);
    /// assert!(position.parse_move("e2e5").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Malformed input, underpromotion or a move that is not legal in this
    /// position.
    ///
    /// [UCI notation]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
    pub fn parse_move(&self, uci: &str) -> anyhow::Result<Move> {
        let (Some(from), Some(to), Some(promotion)) = (uci.get(0..2), uci.get(2..4), uci.get(4..))
        else {
            bail!("move should be in UCI format (e.g. e2e4), got '{uci}'");
        };
        let (from, to) = (Square::try_from(from)?, Square::try_from(to)?);
        let promotion = match promotion {
            "" => false,
            "q" => true,
            "r" | "b" | "n" => bail!("underpromotion is not supported: {uci}"),
            _ => bail!("unknown promotion in move {uci}"),
        };
        match self
            .legal_moves(from)
            .into_iter()
            .find(|candidate| candidate.to() == to)
        {
            Some(found) if found.is_promotion() == promotion => Ok(found),
            Some(_) if promotion => bail!("move {uci} is not a promotion"),
            Some(_) => bail!("promotion piece is missing in move {uci}"),
            None => bail!("illegal move {uci} in position {self}"),
        }
    }

    fn step_moves(
        &self,
        from: Square,
        owner: Player,
        offsets: &[(i8, i8)],
        moves: &mut PieceMoves,
    ) {
        for &(rows, columns) in offsets {
            let Some(to) = from.offset(rows, columns) else {
                continue;
            };
            if self.at(to).map_or(true, |piece| piece.owner != owner) {
                moves.push(Move::new(from, to, MoveKind::Plain));
            }
        }
    }

    fn slide_moves(
        &self,
        from: Square,
        owner: Player,
        directions: &[(i8, i8)],
        moves: &mut PieceMoves,
    ) {
        for &direction in directions {
            for to in attacks::ray(from, direction) {
                match self.at(to) {
                    None => moves.push(Move::new(from, to, MoveKind::Plain)),
                    Some(piece) => {
                        if piece.owner != owner {
                            moves.push(Move::new(from, to, MoveKind::Plain));
                        }
                        break;
                    },
                }
            }
        }
    }

    fn pawn_moves(&self, from: Square, owner: Player, moves: &mut PieceMoves) {
        let direction = owner.push_direction();
        if let Some(single) = from.offset(direction, 0) {
            if self.at(single).is_none() {
                push_pawn_move(moves, owner, Move::new(from, single, MoveKind::Plain));
                if from.rank() == Rank::pawns_starting(owner) {
                    if let Some(double) = single.offset(direction, 0) {
                        if self.at(double).is_none() {
                            moves.push(Move::new(from, double, MoveKind::DoublePawnPush));
                        }
                    }
                }
            }
        }
        let enemy_pawn = Some(Piece::new(owner.opponent(), PieceKind::Pawn));
        for columns in [-1, 1] {
            let Some(to) = from.offset(direction, columns) else {
                continue;
            };
            match self.at(to) {
                Some(target) if target.owner != owner => {
                    push_pawn_move(moves, owner, Move::new(from, to, MoveKind::Plain));
                },
                Some(_) => (),
                None => {
                    let victim = from.offset(0, columns).and_then(|square| self.at(square));
                    if self.en_passant_square() == Some(to) && victim == enemy_pawn {
                        moves.push(Move::new(from, to, MoveKind::EnPassantCapture));
                    }
                },
            }
        }
    }

    fn castle_moves(&self, from: Square, owner: Player, moves: &mut PieceMoves) {
        let rank = Rank::backrank(owner);
        if from != Square::new(File::E, rank) {
            return;
        }
        let rook = Some(Piece::new(owner, PieceKind::Rook));
        let empty = |files: &[File]| {
            files
                .iter()
                .all(|file| self.at(Square::new(*file, rank)).is_none())
        };
        let safe = |files: &[File]| {
            files.iter().all(|file| {
                !attacks::is_attacked(self, Square::new(*file, rank), owner.opponent())
            })
        };
        if self.castling().contains(CastleRights::short(owner))
            && self.at(Square::new(File::H, rank)) == rook
            && empty(&[File::F, File::G])
            && safe(&[File::E, File::F, File::G])
        {
            moves.push(Move::new(
                from,
                Square::new(File::G, rank),
                MoveKind::CastleKingside,
            ));
        }
        // The b-file square has to be empty but may be attacked: the king
        // never crosses it.
        if self.castling().contains(CastleRights::long(owner))
            && self.at(Square::new(File::A, rank)) == rook
            && empty(&[File::B, File::C, File::D])
            && safe(&[File::E, File::D, File::C])
        {
            moves.push(Move::new(
                from,
                Square::new(File::C, rank),
                MoveKind::CastleQueenside,
            ));
        }
    }
}

fn push_pawn_move(moves: &mut PieceMoves, owner: Player, pawn_move: Move) {
    if pawn_move.to().rank() == Rank::promotion(owner) {
        moves.push(pawn_move.with_promotion());
    } else {
        moves.push(pawn_move);
    }
}
