//! Parsing of the [Universal Chess Interface] commands the engine understands.
//!
//! [Universal Chess Interface]: https://www.chessprogramming.org/UCI

use crate::search::{Depth, Difficulty};

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    Uci,
    IsReady,
    SetOption {
        option: EngineOption,
    },
    SetPosition {
        fen: Option<String>,
        moves: Vec<String>,
    },
    NewGame,
    Go {
        depth: Option<Depth>,
    },
    /// Non-standard command printing the board, a-la Stockfish.
    PrintBoard,
    Stop,
    Quit,
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum EngineOption {
    Difficulty(Difficulty),
}

fn parse_go(parts: &[&str]) -> Command {
    let mut depth = None;
    let mut tokens = parts.iter().skip(1);
    while let Some(token) = tokens.next() {
        // Time controls are accepted but ignored: the search always runs to
        // the requested depth.
        match *token {
            "depth" => depth = tokens.next().and_then(|value| value.parse().ok()),
            "infinite" => (),
            _ => {
                let _ = tokens.next();
            },
        }
    }
    Command::Go { depth }
}

fn parse_setoption(parts: &[&str]) -> Command {
    let unknown = || Command::Unknown(parts.join(" "));
    if parts.len() < 3 || parts[1] != "name" {
        return unknown();
    }
    let name_end = parts
        .iter()
        .position(|&x| x == "value")
        .unwrap_or(parts.len());
    let option = parts[2..name_end].join(" ");
    let value = parts.get(name_end + 1..).map(|value| value.join(" "));
    match (option.as_str(), value) {
        ("Difficulty", Some(value)) => match Difficulty::try_from(value.as_str()) {
            Ok(difficulty) => Command::SetOption {
                option: EngineOption::Difficulty(difficulty),
            },
            Err(_) => unknown(),
        },
        _ => unknown(),
    }
}

fn parse_setposition(parts: &[&str]) -> Command {
    let fen_index = parts.iter().position(|&x| x == "fen");
    let moves_index = parts.iter().position(|&x| x == "moves");
    let fen = match fen_index {
        None => None,
        // FEN has to come before the moves.
        Some(index) => match parts.get(index + 1..moves_index.unwrap_or(parts.len())) {
            Some(fen) => Some(fen.join(" ")),
            None => return Command::Unknown(parts.join(" ")),
        },
    };
    let moves = moves_index.map_or_else(Vec::new, |moves_index| {
        parts[moves_index + 1..]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    });
    Command::SetPosition { fen, moves }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        let Some(&command) = parts.first() else {
            return Self::Unknown(input.to_string());
        };

        match command {
            "uci" => Self::Uci,
            "isready" => Self::IsReady,
            "setoption" => parse_setoption(&parts),
            "position" if parts.get(1) == Some(&"startpos") || parts.get(1) == Some(&"fen") => {
                parse_setposition(&parts)
            },
            "ucinewgame" => Self::NewGame,
            "go" => parse_go(&parts),
            "d" => Self::PrintBoard,
            "stop" => Self::Stop,
            "quit" => Self::Quit,
            _ => Self::Unknown(input.trim().to_string()),
        }
    }
}
