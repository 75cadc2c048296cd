//! The engine puts all pieces together. It implements a subset of the
//! [Universal Chess Interface] (UCI) for communication with the client (e.g.
//! a GUI or a script driving the game).
//!
//! [`Engine::uci_loop`] is the "main loop" of the engine which communicates
//! with the environment and executes commands from the input stream.
//!
//! [Universal Chess Interface]: https://www.chessprogramming.org/UCI

use std::io::{BufRead, Write};

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::chess::core::Player;
use crate::chess::game::Game;
use crate::chess::position::Position;
use crate::engine::uci::{Command, EngineOption};
use crate::search::{self, Depth, Difficulty};

mod uci;

/// The Engine connects everything together: it owns the game being played and
/// handles commands sent by the UCI client, including I/O.
pub struct Engine<'a, R: BufRead, W: Write> {
    game: Game,
    difficulty: Difficulty,
    rng: StdRng,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Engine<'a, R, W> {
    /// Creates a new instance of the engine with starting position, default
    /// difficulty and provided I/O.
    #[must_use]
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self {
            game: Game::new(),
            difficulty: Difficulty::default(),
            rng: StdRng::from_entropy(),
            input,
            output,
        }
    }

    /// Sets the strength used by `go` without explicit depth.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Makes the choice between equally good moves reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Continuously reads the input stream and executes sent UCI commands until
    /// "quit" is sent or the input is closed.
    ///
    /// The implementation here does not aim to be complete and exhaustive. If
    /// a command is not valid or unsupported, it is reported via `info string`
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Reading the input or writing the output failed.
    pub fn uci_loop(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Command::Uci => self.handle_uci()?,
                Command::IsReady => self.handle_isready()?,
                Command::SetOption { option } => self.handle_setoption(option),
                Command::SetPosition { fen, moves } => self.handle_position(fen, &moves)?,
                Command::NewGame => self.handle_ucinewgame(),
                Command::Go { depth } => self.handle_go(depth)?,
                Command::PrintBoard => write!(self.output, "{:?}", self.game.position())?,
                // The search is synchronous: there is nothing to stop.
                Command::Stop => (),
                Command::Quit => break,
                Command::Unknown(command) => {
                    log::warn!("unsupported command: {command}");
                    writeln!(self.output, "info string Unsupported command: {command}")?;
                },
            }
            self.output.flush()?;
        }
        Ok(())
    }

    /// Responds to the `uci` handshake command by identifying the engine and
    /// listing the options.
    fn handle_uci(&mut self) -> anyhow::Result<()> {
        writeln!(
            self.output,
            "id name {} {}",
            env!("CARGO_PKG_NAME"),
            crate::engine_version()
        )?;
        writeln!(self.output, "id author {}", crate::AUTHORS)?;
        writeln!(
            self.output,
            "option name Difficulty type combo default {} {}",
            Difficulty::default(),
            Difficulty::ALL
                .iter()
                .map(|difficulty| format!("var {difficulty}"))
                .join(" ")
        )?;
        writeln!(self.output, "uciok")?;
        Ok(())
    }

    /// Syncs with the UCI server by responding with `readyok`.
    fn handle_isready(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "readyok")?;
        Ok(())
    }

    fn handle_setoption(&mut self, option: EngineOption) {
        match option {
            EngineOption::Difficulty(difficulty) => {
                log::debug!("difficulty set to {difficulty}");
                self.difficulty = difficulty;
            },
        }
    }

    fn handle_ucinewgame(&mut self) {
        self.game = Game::new();
    }

    /// Changes the position of the board to the one specified in the command.
    /// Moves are played one by one until the first one that is not legal.
    fn handle_position(&mut self, fen: Option<String>, moves: &[String]) -> anyhow::Result<()> {
        let position = match fen {
            None => Position::starting(),
            Some(fen) => match Position::from_fen(&fen) {
                Ok(position) => position,
                Err(e) => {
                    writeln!(self.output, "info string Invalid position: {e:#}")?;
                    return Ok(());
                },
            },
        };
        self.game = Game::from_position(position);
        for next_move in moves {
            if let Err(e) = self.game.play_uci(next_move) {
                writeln!(self.output, "info string Unexpected UCI move: {e:#}")?;
                break;
            }
        }
        Ok(())
    }

    /// Picks the move for the side to move: at given depth if it is specified
    /// and at the engine's difficulty otherwise.
    fn handle_go(&mut self, depth: Option<Depth>) -> anyhow::Result<()> {
        let position = self.game.position();
        let player = position.side_to_move();
        let result = match depth {
            Some(depth) => search::analyze_at_depth(position, depth, player, &mut self.rng),
            None => search::analyze(position, self.difficulty, player, &mut self.rng),
        };
        let Some(result) = result else {
            writeln!(self.output, "bestmove 0000")?;
            return Ok(());
        };
        if let (Some(depth), Some(score)) = (result.depth, result.score) {
            // UCI scores are relative to the side to move.
            let score = match player {
                Player::White => score,
                Player::Black => -score,
            };
            writeln!(self.output, "info depth {depth} score {score}")?;
        }
        writeln!(self.output, "bestmove {}", result.best_move)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(input: &str) -> String {
        let mut input = input.as_bytes();
        let mut output = Vec::new();
        Engine::new(&mut input, &mut output)
            .with_seed(42)
            .uci_loop()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn handshake() {
        let output = run("uci\nisready\nquit\n");
        let lines: Vec<_> = output.lines().collect();
        assert!(lines[0].starts_with("id name pawnstorm"));
        assert!(lines[1].starts_with("id author"));
        assert_eq!(
            lines[2],
            "option name Difficulty type combo default medium var easy var medium var hard"
        );
        assert_eq!(&lines[3..], ["uciok", "readyok"]);
    }

    #[test]
    fn quit_stops_processing() {
        assert_eq!(run("quit\nisready\n"), "");
        assert_eq!(run("\n\nisready"), "readyok\n");
    }

    #[test]
    fn unknown_commands() {
        assert_eq!(
            run("xyzzy\nsetoption name Hash value 1\n"),
            "info string Unsupported command: xyzzy\ninfo string Unsupported command: \
             setoption name Hash value 1\n"
        );
    }

    #[test]
    fn position_and_print() {
        let output = run("position startpos moves e2e4 e7e5\nd\n");
        assert!(output.contains("Player to move: White"));
        assert!(output.ends_with(
            "FEN: rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2\n"
        ));
    }

    #[test]
    fn invalid_position_input() {
        let output = run("position fen 8/8/8/8/8/8/8/8 w - - 0 1\nd\n");
        assert!(output.starts_with("info string Invalid position"));
        // The previous position is kept.
        assert!(output.contains("FEN: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));

        let output = run("position startpos moves e2e4 e2e4 d7d5\nd\n");
        assert!(output.starts_with("info string Unexpected UCI move"));
        // Moves before the illegal one are played.
        assert!(output.contains("FEN: rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"));
    }

    #[test]
    fn moves_before_fen_are_rejected() {
        let output = run("position startpos moves e2e4 fen\nisready\n");
        assert_eq!(
            output,
            "info string Unsupported command: position startpos moves e2e4 fen\nreadyok\n"
        );
    }

    #[test]
    fn go_finds_mate() {
        let output = run("position fen 6k1/5ppp/8/8/8/8/8/3R2K1 w - - 0 1\ngo depth 2\n");
        assert_eq!(output, "info depth 2 score cp 32000\nbestmove d1d8\n");
        let output = run("position fen 3r2k1/8/8/8/8/8/5PPP/6K1 b - - 0 1\ngo depth 2\n");
        assert_eq!(output, "info depth 2 score cp 32000\nbestmove d8d1\n");
    }

    #[test]
    fn go_easy() {
        let output = run("setoption name Difficulty value easy\ngo\n");
        assert!(!output.contains("info depth"));
        let best_move = output.trim().strip_prefix("bestmove ").unwrap();
        assert!(Position::starting().parse_move(best_move).is_ok());
    }

    #[test]
    fn go_without_moves() {
        let output = run("position fen k7/8/1Q6/8/8/8/8/7K b - - 0 1\ngo\n");
        assert_eq!(output, "bestmove 0000\n");
    }

    #[test]
    fn new_game_resets_position() {
        let output = run("position startpos moves e2e4\nucinewgame\nd\n");
        assert!(output.ends_with(
            "FEN: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\n"
        ));
    }
}
