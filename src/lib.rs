//! Chess rules engine with an automated minimax opponent. The crate is split
//! into the rules of the game ([`chess`]), static position [`evaluation`] and
//! move [`search`]. The [`Engine`] drives all of them through a subset of the
//! UCI protocol.

pub mod chess;
pub mod evaluation;
pub mod search;

mod engine;

pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Build type and target. Produced by `build.rs`.
const FEATURES: &str = include_str!(concat!(env!("OUT_DIR"), "/features"));

const AUTHORS: &str = "the pawnstorm developers";

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Logs the engine version and the build configuration on startup.
pub fn log_build_info() {
    log::info!("pawnstorm {}", engine_version());
    log::info!(
        "release build: {}, features: {FEATURES}",
        !shadow_rs::is_debug()
    );
    if !shadow_rs::git_clean() {
        log::warn!("built with uncommitted changes");
    }
}
