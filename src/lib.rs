//! Ring Rush - A timed symbol-matching arcade game
//!
//! Core modules:
//! - `sim`: Deterministic gameplay engine (ring puzzles, mechanics, timer, bonus)
//! - `engine`: Session driver owning the sim state and external collaborators
//! - `renderer`: Logical draw data handed to an external rendering surface
//! - `audio`: Sound cue preloading/playback through an external backend
//! - `persistence`: File-backed config and leaderboard stores

pub mod audio;
pub mod engine;
pub mod highscores;
pub mod persistence;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::{Collaborators, Engine};
pub use highscores::{HighScoreEntry, HighScores, HighscoreStore};
pub use settings::{Difficulty, NameEntryMode, Settings, SymbolTheme, TimeBonusMode};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Ring geometry: four fixed directional slots
    pub const RING_SLOTS: usize = 4;

    /// Points per correct answer (before bonus multiplier)
    pub const POINTS_PER_CORRECT: u64 = 100;

    /// Timer economy: ratio of remaining time below which endurance bonus kicks in
    pub const TARGET_LOW_TIME_RATIO: f32 = 0.4;

    /// Bonus charge timings (seconds)
    pub const BONUS_ACTIVE_DURATION: f32 = 6.0;
    pub const BONUS_COOLDOWN_DURATION: f32 = 2.0;
    pub const BONUS_MULTIPLIER: u64 = 2;
    /// Weight of each new correct-answer color in the bonus tint blend
    pub const BONUS_TINT_WEIGHT: f32 = 0.35;

    /// Center swap transition (seconds)
    pub const SWAP_EXIT_DURATION: f32 = 0.26;
    pub const SWAP_ENTER_DURATION: f32 = 0.36;
    /// How far the outgoing prompt travels toward its slot (fraction of ring radius)
    pub const SWAP_EXIT_REACH: f32 = 0.85;
    /// Vertical offset the incoming prompt grows in from (fraction of ring radius)
    pub const SWAP_ENTER_OFFSET: f32 = 0.25;

    /// Spin shuffle transition
    pub const SPIN_DURATION: f32 = 0.9;
    pub const SPIN_TURNS: f32 = 2.0;
    /// Progress at which the hidden layout swap happens
    pub const SPIN_COMMIT_PROGRESS: f32 = 0.5;

    /// Leaderboard size
    pub const MAX_HIGH_SCORES: usize = 10;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
