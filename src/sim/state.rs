//! Game state and core session types
//!
//! Everything that lives for one session is created by `start_session` and
//! thrown away by the next one. Phase changes are the only places the
//! session-lifetime counters (score, streak, mechanic progress) get reset.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::anim::{AnimationSequencer, CommitIntent, SwapTarget};
use super::bonus::{BonusCharge, BonusTransition};
use super::layout::{self, MatchMode, RingLayout, SLOT_ANGLES};
use super::mechanics::{MechanicScheduler, MechanicType, MemoryVeil, RemapPair, ScheduleUpdate};
use super::name_entry::NameEntry;
use super::symbol::{PALETTE, Shape, Symbol};
use super::timer::{PauseGuard, PauseLayers, TimerEconomy};
use crate::consts::{MAX_HIGH_SCORES, RING_SLOTS};
use crate::highscores::HighScoreEntry;
use crate::polar_to_cartesian;
use crate::settings::Settings;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Nothing running yet
    Idle,
    /// Demo loop waiting for a confirm
    Attract,
    Playing,
    /// Session over, collecting a leaderboard name
    NameEntry,
    /// Result emitted; frozen until the next start
    Completed,
}

/// The puzzle currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    pub center: Symbol,
    pub ring: RingLayout,
    pub mode: MatchMode,
    /// Only set while the remap mechanic is active
    pub remap: Option<RemapPair>,
}

impl Puzzle {
    /// Shape the player must pick in standard mode
    pub fn expected_shape(&self) -> Shape {
        self.remap
            .map_or(self.center.shape, |r| r.expected_for(self.center.shape))
    }

    pub fn is_correct(&self, slot: Symbol) -> bool {
        layout::is_correct(slot, self.center, self.mode, self.expected_shape())
    }

    /// Index of the slot that answers this puzzle
    pub fn answer_index(&self) -> Option<usize> {
        self.ring.slots.iter().position(|s| self.is_correct(s.symbol()))
    }
}

/// Things the outer shell may want to react to (audio, HUD flashes)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SessionStarted,
    AnswerCorrect { slot: usize, points: u64, time_bonus: f32 },
    AnswerWrong { slot: usize, penalty: f32 },
    Bonus(BonusTransition),
    MechanicActivated(MechanicType),
    MechanicDeactivated(MechanicType),
    LevelUp { unlocked: usize },
    LevelUpAcknowledged,
    MemoryHidden,
    TimeUp { score: u64 },
    NameEntryStarted { rank: usize },
    SessionCompleted { placement: Option<usize> },
}

/// Final summary handed to the session listener, once per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub leaderboard: Vec<HighScoreEntry>,
    pub final_score: u64,
    /// 1-based leaderboard rank, if the score was entered
    pub placement: Option<usize>,
    pub did_qualify: bool,
    pub player_name: Option<String>,
    pub best_streak: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
}

/// Progressive level-up announcement; holds the clock paused until acknowledged
#[derive(Debug)]
pub struct LevelUpNotice {
    pub unlocked: usize,
    _pause: PauseGuard,
}

/// Complete session state
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub phase: GamePhase,
    pub settings: Settings,

    pub score: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,

    pub timer: TimerEconomy,
    pub bonus: BonusCharge,
    pub scheduler: MechanicScheduler,
    pub puzzle: Puzzle,
    /// Joystick flip: left/right and up/down swapped
    pub joystick_inverted: bool,
    pub memory: MemoryVeil,
    pub anim: AnimationSequencer,
    /// Shared with external pausing callers
    pub pause: PauseLayers,
    pub level_up: Option<LevelUpNotice>,

    pub name_entry: Option<NameEntry>,
    /// Rank reserved while the name is typed
    pub pending_placement: Option<usize>,
    pub result: Option<SessionResult>,

    /// Simulation tick counter (advances only while the clock runs)
    pub time_ticks: u64,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create an idle state with the given seed
    pub fn new(seed: u64, settings: Settings) -> Self {
        let settings = settings.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let center = random_center(&settings, None, &mut rng);
        let ring = layout::build(center, MatchMode::Standard, RING_SLOTS, settings.symbol_theme, &mut rng);
        Self {
            seed,
            rng,
            phase: GamePhase::Idle,
            timer: TimerEconomy::new(&settings),
            bonus: BonusCharge::new(settings.difficulty),
            scheduler: MechanicScheduler::new(),
            puzzle: Puzzle {
                center,
                ring,
                mode: MatchMode::Standard,
                remap: None,
            },
            settings,
            score: 0,
            streak: 0,
            best_streak: 0,
            correct_answers: 0,
            wrong_answers: 0,
            joystick_inverted: false,
            memory: MemoryVeil::Off,
            anim: AnimationSequencer::new(),
            pause: PauseLayers::new(),
            level_up: None,
            name_entry: None,
            pending_placement: None,
            result: None,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// New answers are dropped while true
    pub fn resolving(&self) -> bool {
        self.anim.blocks_input() || self.pause.is_paused() || self.level_up.is_some()
    }

    /// Score multiplier from the bonus meter
    pub fn multiplier(&self) -> u64 {
        self.bonus.multiplier()
    }

    // === Phase transitions ===

    /// Idle/Completed -> Attract
    pub fn enter_attract(&mut self) -> bool {
        match self.phase {
            GamePhase::Idle | GamePhase::Completed => {
                self.phase = GamePhase::Attract;
                true
            }
            _ => false,
        }
    }

    /// Any phase -> Playing with fresh per-session state
    pub fn start_session(&mut self) {
        self.anim.clear();
        self.level_up = None;
        self.score = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.correct_answers = 0;
        self.wrong_answers = 0;
        self.timer = TimerEconomy::new(&self.settings);
        self.bonus = BonusCharge::new(self.settings.difficulty);
        self.scheduler.reset();
        self.joystick_inverted = false;
        self.memory = MemoryVeil::Off;
        self.name_entry = None;
        self.pending_placement = None;
        self.result = None;
        self.time_ticks = 0;
        self.events.clear();

        let center = random_center(&self.settings, None, &mut self.rng);
        self.puzzle = self.build_puzzle(center, None);
        self.phase = GamePhase::Playing;
        self.push_event(GameEvent::SessionStarted);
        log::info!("Session started (seed {}, {:?})", self.seed, self.settings.difficulty);
    }

    /// Playing -> NameEntry when `placement` is a leaderboard rank, else -> Completed.
    /// Returns the result if the session completed straight away.
    pub fn end_session(
        &mut self,
        placement: Option<usize>,
        leaderboard: Vec<HighScoreEntry>,
    ) -> Option<SessionResult> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        self.anim.clear();
        self.level_up = None;
        self.push_event(GameEvent::TimeUp { score: self.score });
        log::info!("Time up: score {}, best streak {}", self.score, self.best_streak);

        match placement.filter(|rank| *rank <= MAX_HIGH_SCORES) {
            Some(rank) => {
                self.phase = GamePhase::NameEntry;
                self.name_entry = Some(NameEntry::new(self.settings.name_entry_mode));
                self.pending_placement = Some(rank);
                self.push_event(GameEvent::NameEntryStarted { rank });
                None
            }
            None => Some(self.complete(None, None, leaderboard)),
        }
    }

    /// NameEntry -> Completed once the entry has been saved at `rank`
    pub fn submit_name(
        &mut self,
        name: String,
        rank: Option<usize>,
        leaderboard: Vec<HighScoreEntry>,
    ) -> Option<SessionResult> {
        if self.phase != GamePhase::NameEntry {
            return None;
        }
        self.name_entry = None;
        self.pending_placement = None;
        Some(self.complete(rank, Some(name), leaderboard))
    }

    fn complete(
        &mut self,
        placement: Option<usize>,
        player_name: Option<String>,
        leaderboard: Vec<HighScoreEntry>,
    ) -> SessionResult {
        let result = SessionResult {
            leaderboard,
            final_score: self.score,
            placement,
            did_qualify: placement.is_some(),
            player_name,
            best_streak: self.best_streak,
            correct_answers: self.correct_answers,
            wrong_answers: self.wrong_answers,
        };
        self.phase = GamePhase::Completed;
        self.result = Some(result.clone());
        self.push_event(GameEvent::SessionCompleted { placement });
        result
    }

    // === Puzzle plumbing ===

    /// Match predicate implied by the active mechanics
    pub fn active_match_mode(&self) -> MatchMode {
        if self.scheduler.is_active(MechanicType::MatchColor) {
            MatchMode::MatchColor
        } else if self.scheduler.is_active(MechanicType::MatchShape) {
            MatchMode::MatchShape
        } else {
            MatchMode::Standard
        }
    }

    /// Pick a new center, never repeating the current shape
    pub fn next_center(&mut self) -> Symbol {
        let current = self.puzzle.center.shape;
        random_center(&self.settings, Some(current), &mut self.rng)
    }

    fn remap_for_next(&mut self, reroll: bool) -> Option<RemapPair> {
        if !self.scheduler.is_active(MechanicType::Remap) {
            return None;
        }
        match self.puzzle.remap {
            Some(pair) if !reroll => Some(pair),
            _ => Some(RemapPair::roll(self.settings.symbol_theme, &mut self.rng)),
        }
    }

    fn build_puzzle(&mut self, center: Symbol, remap: Option<RemapPair>) -> Puzzle {
        let mode = self.active_match_mode();
        let ring = layout::build(center, mode, RING_SLOTS, self.settings.symbol_theme, &mut self.rng);
        Puzzle {
            center,
            ring,
            mode,
            remap,
        }
    }

    /// Apply a queued intent at its commit point
    pub fn apply_intent(&mut self, intent: CommitIntent) {
        if let Some(center) = intent.center {
            self.puzzle.center = center;
            self.timer.reset_prompt_clock();
        }
        if let Some(mode) = intent.mode {
            self.puzzle.mode = mode;
        }
        if let Some(remap) = intent.remap {
            self.puzzle.remap = remap;
        }
        if let Some(ring) = intent.ring {
            self.puzzle.ring = ring;
        }
    }

    /// Build the next puzzle and schedule it behind a center swap. With
    /// memory active the ring arrives through a spin shuffle instead.
    pub fn queue_next_puzzle(&mut self, center: Symbol, target: SwapTarget, reroll_remap: bool) {
        let remap = self.remap_for_next(reroll_remap);
        let next = self.build_puzzle(center, remap);

        let mut swap_intent = CommitIntent {
            center: Some(next.center),
            ring: None,
            mode: Some(next.mode),
            remap: Some(next.remap),
        };
        if self.scheduler.is_active(MechanicType::Memory) {
            self.memory = MemoryVeil::Shuffling;
            let spin_intent = CommitIntent {
                ring: Some(next.ring),
                ..CommitIntent::default()
            };
            if let Some(cancelled) = self.anim.start_spin(spin_intent) {
                self.apply_intent(cancelled);
            }
        } else {
            swap_intent.ring = Some(next.ring);
        }
        if let Some(cancelled) = self.anim.start_swap(target, swap_intent) {
            self.apply_intent(cancelled);
        }
    }

    /// Rebuild the puzzle on the spot (settings refresh), flushing transitions
    pub fn rebuild_puzzle_now(&mut self) {
        let mut flushed = CommitIntent::default();
        if let Some(mut swap) = self.anim.swap.take() {
            flushed = flushed.merge(swap.take_intent().unwrap_or_default());
        }
        if let Some(mut spin) = self.anim.spin.take() {
            flushed = flushed.merge(spin.take_intent().unwrap_or_default());
        }
        self.apply_intent(flushed);

        let theme_shapes = self.settings.symbol_theme.shapes();
        let center = if theme_shapes.contains(&self.puzzle.center.shape) {
            self.puzzle.center
        } else {
            random_center(&self.settings, None, &mut self.rng)
        };
        // A remap pair from another theme can't be honoured
        let keep_remap = self
            .puzzle
            .remap
            .is_some_and(|r| theme_shapes.contains(&r.from) && theme_shapes.contains(&r.to));
        let remap = self.remap_for_next(!keep_remap);
        let next = self.build_puzzle(center, remap);

        if self.scheduler.is_active(MechanicType::Memory) {
            self.puzzle.center = next.center;
            self.puzzle.mode = next.mode;
            self.puzzle.remap = next.remap;
            self.memory = MemoryVeil::Shuffling;
            self.anim.start_spin(CommitIntent {
                ring: Some(next.ring),
                ..CommitIntent::default()
            });
        } else {
            self.memory = MemoryVeil::Off;
            self.puzzle = next;
        }
        self.timer.reset_prompt_clock();
    }

    /// Count a correct answer toward the mechanic schedule
    pub fn advance_mechanics(&mut self) -> ScheduleUpdate {
        self.scheduler.on_correct_answer(&self.settings, &mut self.rng)
    }

    /// Run activation/deactivation side effects for a scheduler step.
    /// Returns true if the remap pair must be re-rolled.
    pub fn apply_schedule(&mut self, update: &ScheduleUpdate) -> bool {
        for mechanic in &update.deactivated {
            match mechanic {
                MechanicType::Joystick => self.joystick_inverted = false,
                MechanicType::Memory => self.memory = MemoryVeil::Off,
                // Remap and match modes fall out of the next puzzle build
                MechanicType::Remap | MechanicType::MatchColor | MechanicType::MatchShape => {}
            }
            self.push_event(GameEvent::MechanicDeactivated(*mechanic));
        }
        for mechanic in &update.activated {
            if *mechanic == MechanicType::Joystick {
                self.joystick_inverted = true;
            }
            self.push_event(GameEvent::MechanicActivated(*mechanic));
        }
        if update.set_changed() {
            log::debug!("Active mechanics: {:?}", self.scheduler.active());
        }
        if let Some(unlocked) = update.level_up {
            log::info!("Level up: {unlocked} mechanics unlocked");
            self.level_up = Some(LevelUpNotice {
                unlocked,
                _pause: self.pause.acquire(),
            });
            self.push_event(GameEvent::LevelUp { unlocked });
        }
        update.activated.contains(&MechanicType::Remap) || update.refreshed.contains(&MechanicType::Remap)
    }

    /// Confirm on a level-up notice
    pub fn acknowledge_level_up(&mut self) -> bool {
        if self.level_up.take().is_some() {
            self.push_event(GameEvent::LevelUpAcknowledged);
            true
        } else {
            false
        }
    }

    /// Unit vector from the center toward a ring slot
    pub fn slot_direction(slot: usize) -> glam::Vec2 {
        SLOT_ANGLES
            .get(slot)
            .map_or(glam::Vec2::ZERO, |angle| polar_to_cartesian(1.0, *angle))
    }
}

fn random_center<R: Rng>(settings: &Settings, exclude: Option<Shape>, rng: &mut R) -> Symbol {
    let shapes: Vec<Shape> = settings
        .symbol_theme
        .shapes()
        .into_iter()
        .filter(|s| Some(*s) != exclude)
        .collect();
    let shape = shapes[rng.random_range(0..shapes.len())];
    let color = PALETTE[rng.random_range(0..PALETTE.len())];
    Symbol::new(shape, color)
}
