//! Ring Rush - headless autoplay
//!
//! Plays one full session with an imperfect bot and logs the result.
//! Usage: `ring-rush [seed]`. Settings and high scores live under the
//! system temp dir so repeated runs build up a leaderboard.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use ring_rush::audio::NullAudio;
use ring_rush::consts::SIM_DT;
use ring_rush::persistence::{JsonFileConfig, JsonFileHighscores};
use ring_rush::renderer::NullSurface;
use ring_rush::sim::{BonusStage, Direction, GamePhase, InputAction, NameEntry};
use ring_rush::{Collaborators, Engine};

/// Safety cap on simulated frames (10 minutes at 60 Hz)
const MAX_FRAMES: u32 = 36_000;
/// Bot accuracy
const BOT_ACCURACY: f64 = 0.85;
/// Bot reaction time range (seconds)
const BOT_REACTION: (f32, f32) = (0.25, 0.9);
const BOT_NAME: &str = "BOT";

const SLOT_DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Left, Direction::Right, Direction::Down];

struct Bot {
    rng: Pcg32,
    /// Seconds until the next answer
    wait: f32,
}

impl Bot {
    fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed);
        let wait = rng.random_range(BOT_REACTION.0..BOT_REACTION.1);
        Self { rng, wait }
    }

    /// Decide on this frame's input, if any
    fn act(&mut self, engine: &Engine, dt: f32) -> Option<InputAction> {
        let state = engine.state();
        if state.level_up.is_some() || state.bonus.stage() == BonusStage::Ready {
            return Some(InputAction::Confirm);
        }
        if state.resolving() {
            return None;
        }
        self.wait -= dt;
        if self.wait > 0.0 {
            return None;
        }
        self.wait = self.rng.random_range(BOT_REACTION.0..BOT_REACTION.1);

        let answer = state.puzzle.answer_index()?;
        let slot = if self.rng.random_bool(BOT_ACCURACY) {
            answer
        } else {
            (answer + self.rng.random_range(1..4)) % 4
        };
        let dir = SLOT_DIRECTIONS[slot];
        let dir = if state.joystick_inverted { dir.inverted() } else { dir };
        Some(InputAction::Direction(dir))
    }
}

/// Inputs that spell `BOT_NAME` for whichever entry scheme is showing
fn name_inputs(entry: &NameEntry) -> Vec<InputAction> {
    let mut inputs = Vec::new();
    match entry {
        NameEntry::Letters { .. } => {
            for (i, c) in BOT_NAME.bytes().enumerate() {
                if i > 0 {
                    inputs.push(InputAction::Direction(Direction::Right));
                }
                let steps = (c - b'A') as usize;
                inputs.extend(std::iter::repeat_n(InputAction::Direction(Direction::Up), steps));
            }
        }
        NameEntry::Keyboard { .. } => {
            // Cursor starts on A; keys run A-Z across 10-wide rows
            let mut at = 0usize;
            for c in BOT_NAME.bytes() {
                let target = (c - b'A') as usize;
                let (row, col) = (target / 10, target % 10);
                let (cur_row, cur_col) = (at / 10, at % 10);
                inputs.extend(std::iter::repeat_n(InputAction::Direction(Direction::Down), row.saturating_sub(cur_row)));
                inputs.extend(std::iter::repeat_n(InputAction::Direction(Direction::Up), cur_row.saturating_sub(row)));
                inputs.extend(std::iter::repeat_n(InputAction::Direction(Direction::Right), col.saturating_sub(cur_col)));
                inputs.extend(std::iter::repeat_n(InputAction::Direction(Direction::Left), cur_col.saturating_sub(col)));
                inputs.push(InputAction::Confirm);
                at = target;
            }
            // END closes the short last row; moving down clamps the column into it
            inputs.extend(std::iter::repeat_n(InputAction::Direction(Direction::Down), 3 - at / 10));
            inputs.extend(std::iter::repeat_n(InputAction::Direction(Direction::Right), 7 - (at % 10).min(7)));
        }
    }
    inputs.push(InputAction::Confirm);
    inputs
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2024);
    let data_dir = std::env::temp_dir().join("ring-rush");
    log::info!("Ring Rush (headless) starting, seed {seed}, data in {}", data_dir.display());

    let mut engine = Engine::new(
        seed,
        Collaborators {
            audio: Box::new(NullAudio),
            renderer: Box::new(NullSurface::default()),
            config: Box::new(JsonFileConfig::new(data_dir.join("settings.json"))),
            scores: Box::new(JsonFileHighscores::open(data_dir.join("highscores.json"))),
        },
    );
    if let Err(e) = engine.save_settings() {
        log::warn!("Could not write settings: {e}");
    }
    engine.on_session_complete(|result| {
        log::info!(
            "Result: score {} | placement {:?} | streak {} | {} right / {} wrong",
            result.final_score,
            result.placement,
            result.best_streak,
            result.correct_answers,
            result.wrong_answers
        );
        for (i, entry) in result.leaderboard.iter().enumerate() {
            log::info!("  {:>2}. {:<10} {}", i + 1, entry.name, entry.score);
        }
    });

    engine.enter_attract();
    engine.handle_input(InputAction::Confirm);

    let mut bot = Bot::new(seed);
    let mut frames = 0;
    while engine.phase() == GamePhase::Playing && frames < MAX_FRAMES {
        if let Some(action) = bot.act(&engine, SIM_DT) {
            engine.handle_input(action);
        }
        engine.tick(SIM_DT);
        engine.present();
        frames += 1;
    }

    if let Some(entry) = engine.state().name_entry.clone() {
        for action in name_inputs(&entry) {
            engine.handle_input(action);
        }
    }
    if engine.phase() != GamePhase::Completed {
        log::warn!("Session did not complete within {MAX_FRAMES} frames");
    }
}
