use itertools::Itertools;
use pawnstorm::chess::core::{Piece, PieceKind, Player, Square};
use pawnstorm::chess::game::{Game, GameStatus};
use pawnstorm::chess::position::{perft, Position};
use pretty_assertions::assert_eq;
use shakmaty::{CastlingMode, Chess, Position as ShakmatyPosition};

fn setup(fen: &str) -> Position {
    Position::from_fen(fen).unwrap()
}

fn legal_position(input: &str) {
    assert_eq!(setup(input).to_string(), input);
}

fn sorted_moves(position: &Position) -> Vec<String> {
    position
        .all_legal_moves(position.side_to_move())
        .iter()
        .map(ToString::to_string)
        .sorted()
        .collect()
}

/// Legal moves in UCI notation without underpromotions, which are never
/// generated.
fn reference_moves(position: &Chess) -> Vec<String> {
    position
        .legal_moves()
        .iter()
        .map(|m| m.to_uci(CastlingMode::Standard).to_string())
        .filter(|uci| uci.len() == 4 || uci.ends_with('q'))
        .sorted()
        .collect()
}

fn reference_position(fen: &str) -> Chess {
    let setup: shakmaty::fen::Fen = fen.parse().unwrap();
    setup.into_position(CastlingMode::Standard).unwrap()
}

#[test]
fn basic_positions() {
    legal_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    legal_position("2r3r1/p3k3/1p3pp1/1B5p/5P2/2P1p1P1/PP4KP/3R4 w - - 0 34");
    legal_position("rnbqk1nr/p3bppp/1p2p3/2ppP3/3P4/P7/1PP1NPPP/R1BQKBNR w KQkq c6 0 7");
    legal_position("r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7");
    legal_position("r3k3/5p2/2p5/p7/P3r3/2N2n2/1PP2P2/2K2B2 w q - 0 24");
    legal_position("8/8/8/8/2P5/3k4/8/KB6 b - c3 0 1");
    // Trimmed FEN gets default counters.
    assert_eq!(
        setup("rnbqkb1r/pp2pppp/3p1n2/8/3NP3/2N5/PPP2PPP/R1BQKB1R b KQkq -").to_string(),
        "rnbqkb1r/pp2pppp/3p1n2/8/3NP3/2N5/PPP2PPP/R1BQKB1R b KQkq - 0 1"
    );
}

#[test]
fn illegal_positions() {
    for fen in [
        // Kings.
        "3k4/8/8/8/8/8/8/8 w - - 0 1",
        "8/8/8/8/8/8/8/3K4 w - - 0 1",
        "1kkk4/8/8/8/8/8/8/1KKK4 w - - 0 1",
        // Pawns on the back rank.
        "3kP3/8/8/8/8/8/8/3K4 w - - 0 1",
        "3k4/8/8/8/8/8/8/3Kp3 w - - 0 1",
        // Castling without the rook.
        "r3k3/8/8/8/8/8/8/4K3 w k - 0 1",
        // En passant square without a pawn that just moved.
        "4k3/8/8/8/8/8/8/4K3 b - e3 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e6 0 1",
    ] {
        assert!(Position::from_fen(fen).is_err(), "{fen}");
    }
}

#[test]
fn malformed_fen() {
    for fen in [
        "",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
        "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w QKkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra",
    ] {
        assert!(Position::from_fen(fen).is_err(), "{fen}");
    }
}

#[test]
fn perft_starting_position() {
    let position = Position::starting();
    assert_eq!(perft(&position, 0), 1);
    assert_eq!(perft(&position, 1), 20);
    assert_eq!(perft(&position, 2), 400);
    assert_eq!(perft(&position, 3), 8_902);
    assert_eq!(perft(&position, 4), 197_281);
}

// Takes a while in Debug builds.
#[ignore]
#[test]
fn perft_starting_position_deep() {
    assert_eq!(perft(&Position::starting(), 5), 4_865_609);
}

#[test]
fn perft_kiwipete() {
    let position = setup("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    assert_eq!(perft(&position, 1), 48);
    assert_eq!(perft(&position, 2), 2_039);
    assert_eq!(perft(&position, 3), 97_862);
}

#[test]
fn perft_endgame() {
    let position = setup("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    assert_eq!(perft(&position, 1), 14);
    assert_eq!(perft(&position, 2), 191);
    assert_eq!(perft(&position, 3), 2_812);
    assert_eq!(perft(&position, 4), 43_238);
}

#[test]
fn matches_reference_move_generation() {
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        "2r3r1/p3k3/1p3pp1/1B5p/5P2/2P1p1P1/PP4KP/3R4 w - - 0 34",
    ] {
        let position = setup(fen);
        let reference = reference_position(fen);
        assert_eq!(sorted_moves(&position), reference_moves(&reference), "{fen}");

        // One more ply down every branch.
        for uci in reference_moves(&reference) {
            let mut next_position = position.clone();
            next_position.make_move(&position.parse_move(&uci).unwrap());
            let reference_move = reference
                .legal_moves()
                .into_iter()
                .find(|m| m.to_uci(CastlingMode::Standard).to_string() == uci)
                .unwrap();
            let mut next_reference = reference.clone();
            next_reference.play_unchecked(&reference_move);
            assert_eq!(
                sorted_moves(&next_position),
                reference_moves(&next_reference),
                "{fen} after {uci}"
            );
        }
    }
}

#[test]
fn castling() {
    let position = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let moves = sorted_moves(&position);
    assert!(moves.contains(&"e1g1".to_string()));
    assert!(moves.contains(&"e1c1".to_string()));

    // The king can not pass through an attacked square.
    let position = setup("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1");
    let moves = sorted_moves(&position);
    assert!(!moves.contains(&"e1g1".to_string()));
    assert!(moves.contains(&"e1c1".to_string()));

    let mut game = Game::from_position(setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"));
    let _ = game.play_uci("e1g1").unwrap();
    assert_eq!(
        game.position().to_string(),
        "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1"
    );
    let _ = game.play_uci("e8c8").unwrap();
    assert_eq!(
        game.position().to_string(),
        "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2"
    );
}

#[test]
fn en_passant() {
    let position = setup("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    assert_eq!(
        position
            .legal_moves(Square::E5)
            .iter()
            .map(ToString::to_string)
            .sorted()
            .collect::<Vec<_>>(),
        ["e5e6", "e5f6"]
    );
    let mut game = Game::from_position(position);
    let _ = game.play_uci("e5f6").unwrap();
    assert_eq!(game.position().at(Square::F5), None);
    assert_eq!(
        game.position().at(Square::F6),
        Some(Piece::new(Player::White, PieceKind::Pawn))
    );
    // The right to capture en passant expires after one move.
    let mut game = Game::new();
    for uci in ["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"] {
        let _ = game.play_uci(uci).unwrap();
    }
    assert!(game.play_uci("e5d6").is_err());
}

#[test]
fn promotion() {
    let mut game = Game::from_position(setup("8/3P4/8/8/8/8/8/k1K5 w - - 0 1"));
    assert!(game.play_uci("d7d8n").is_err());
    assert!(game.play_uci("d7d8").is_err());
    let _ = game.play_uci("d7d8q").unwrap();
    assert_eq!(
        game.position().at(Square::D8),
        Some(Piece::new(Player::White, PieceKind::Queen))
    );
}

#[test]
fn scholars_mate() {
    let mut game = Game::new();
    for uci in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6"] {
        assert_eq!(game.play_uci(uci).unwrap(), GameStatus::InProgress);
    }
    assert_eq!(
        game.play_uci("h5f7").unwrap(),
        GameStatus::Checkmate {
            winner: Player::White
        }
    );
    assert!(game.play_uci("e8f7").is_err());
    assert_eq!(game.history().len(), 7);
}

#[test]
fn stalemate() {
    let game = Game::from_position(setup("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"));
    assert_eq!(game.status(), GameStatus::Stalemate);
    assert!(game.position().is_stalemate(Player::Black));
    assert!(!game.position().is_checkmate(Player::Black));
}

#[test]
fn castling_rights_are_lost_for_good() {
    // The king leaves and comes back.
    let mut game = Game::from_position(setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"));
    for uci in ["e1f1", "e8f8", "f1e1", "f8e8"] {
        let _ = game.play_uci(uci).unwrap();
    }
    assert_eq!(
        game.position().to_string(),
        "r3k2r/8/8/8/8/8/8/R3K2R w - - 4 3"
    );
    assert!(game.play_uci("e1g1").is_err());
    assert!(game.play_uci("e1c1").is_err());

    // The rook leaves and comes back: only its side is lost.
    let mut game = Game::from_position(setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"));
    for uci in ["h1h2", "h8h7", "h2h1", "h7h8"] {
        let _ = game.play_uci(uci).unwrap();
    }
    assert_eq!(game.position().castling().to_string(), "Qq");
    assert!(!sorted_moves(game.position()).contains(&"e1g1".to_string()));
    assert!(game.play_uci("e1g1").is_err());
    let _ = game.play_uci("e1c1").unwrap();
    assert_eq!(
        game.position().to_string(),
        "r3k2r/8/8/8/8/8/8/2KR3R b q - 5 3"
    );
}

#[test]
fn castling_needs_clear_path() {
    let mut game = Game::new();
    assert!(!sorted_moves(game.position()).contains(&"e1g1".to_string()));
    for uci in ["g1f3", "g8f6", "g2g3", "g7g6"] {
        let _ = game.play_uci(uci).unwrap();
        assert!(!sorted_moves(game.position()).contains(&"e1g1".to_string()));
    }
    let _ = game.play_uci("f1g2").unwrap();
    let _ = game.play_uci("f8g7").unwrap();
    assert!(sorted_moves(game.position()).contains(&"e1g1".to_string()));
    let _ = game.play_uci("e1g1").unwrap();
    assert_eq!(
        game.position().to_string(),
        "rnbqk2r/ppppppbp/5np1/8/8/5NP1/PPPPPPBP/RNBQ1RK1 b kq - 3 4"
    );
}
