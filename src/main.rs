use std::io;

use clap::Parser;
use pawnstorm::search::Difficulty;
use pawnstorm::Engine;

/// Chess engine speaking a subset of the UCI protocol on standard input and
/// output.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Config {
    /// Strength of the engine when `go` does not specify the depth.
    #[arg(long, default_value = "medium", value_parser = parse_difficulty)]
    difficulty: Difficulty,
    /// Seed for picking between equally good moves. Random by default.
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_difficulty(input: &str) -> anyhow::Result<Difficulty> {
    Difficulty::try_from(input)
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
    pawnstorm::log_build_info();

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let mut engine = Engine::new(&mut input, &mut output).with_difficulty(config.difficulty);
    if let Some(seed) = config.seed {
        engine = engine.with_seed(seed);
    }
    engine.uci_loop()
}
