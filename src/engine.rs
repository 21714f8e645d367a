//! Session driver
//!
//! `Engine` owns the simulation state plus the four injected collaborators
//! (audio, rendering, config store, leaderboard) and is the only public way
//! to drive a session. All mutation happens inside `handle_input` and `tick`
//! on the caller's thread.

use crate::audio::{AudioBackend, AudioBank, NullAudio};
use crate::highscores::{HighScoreEntry, HighScores, HighscoreStore, now_millis};
use crate::persistence::{ConfigStore, MemoryConfig, StoreError};
use crate::renderer::{FrameView, NullSurface, RenderSurface};
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GamePhase, GameState, InputAction, InputOutcome, PauseGuard, SessionResult, TickOutcome};

/// External collaborators injected at construction
pub struct Collaborators {
    pub audio: Box<dyn AudioBackend>,
    pub renderer: Box<dyn RenderSurface>,
    pub config: Box<dyn ConfigStore>,
    pub scores: Box<dyn HighscoreStore>,
}

impl Collaborators {
    /// No sound, no drawing, in-memory storage
    pub fn headless() -> Self {
        Self {
            audio: Box::new(NullAudio),
            renderer: Box::new(NullSurface::default()),
            config: Box::new(MemoryConfig::default()),
            scores: Box::new(HighScores::new()),
        }
    }
}

/// Called once per completed session
pub type SessionListener = Box<dyn FnMut(&SessionResult)>;

pub struct Engine {
    state: GameState,
    audio: AudioBank,
    renderer: Box<dyn RenderSurface>,
    config: Box<dyn ConfigStore>,
    scores: Box<dyn HighscoreStore>,
    listeners: Vec<SessionListener>,
    /// Result already handed out for the current session
    emitted: bool,
    /// Events since the last `drain_events`
    events: Vec<GameEvent>,
}

impl Engine {
    pub fn new(seed: u64, collaborators: Collaborators) -> Self {
        let Collaborators {
            audio,
            renderer,
            config,
            scores,
        } = collaborators;

        let settings = config.load();
        let mut audio = AudioBank::new(audio);
        audio.preload();
        audio.set_master_volume(settings.master_volume);
        audio.set_muted(settings.muted);

        Self {
            state: GameState::new(seed, settings),
            audio,
            renderer,
            config,
            scores,
            listeners: Vec::new(),
            emitted: false,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn leaderboard(&self) -> Vec<HighScoreEntry> {
        self.scores.list()
    }

    /// Events gathered since the last call (audio has already been played)
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn flush_events(&mut self) {
        let events = self.state.drain_events();
        if events.is_empty() {
            return;
        }
        self.audio.play_events(&events);
        self.events.extend(events);
    }

    // === Control surface ===

    /// Begin a fresh session from any phase
    pub fn start(&mut self) {
        self.state.start_session();
        self.emitted = false;
        self.flush_events();
    }

    /// Show the demo loop; confirm from there starts a session
    pub fn enter_attract(&mut self) -> bool {
        self.state.enter_attract()
    }

    pub fn handle_input(&mut self, action: InputAction) -> InputOutcome {
        let outcome = sim::handle_input(&mut self.state, action);
        match &outcome {
            InputOutcome::StartRequested => self.start(),
            InputOutcome::NameSubmitted(name) => self.commit_name(name.clone()),
            _ => {}
        }
        self.flush_events();
        outcome
    }

    /// Advance one frame
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        let outcome = sim::tick(&mut self.state, dt);
        if outcome == TickOutcome::TimeUp {
            self.finish_session();
        }
        self.flush_events();
        outcome
    }

    /// Hold the clock until a matching `resume_layer`
    pub fn pause_layer(&mut self) {
        self.state.pause.push();
        log::debug!("Paused ({} layers)", self.state.pause.depth());
    }

    pub fn resume_layer(&mut self) {
        if !self.state.pause.release() {
            log::warn!("resume_layer with no pause held, ignored");
        }
    }

    /// Hold the clock for as long as the guard lives
    pub fn pause_scope(&self) -> PauseGuard {
        self.state.pause.acquire()
    }

    pub fn add_time(&mut self, seconds: f32) {
        self.state.timer.add(seconds);
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.state.timer.set(seconds);
    }

    pub fn reset_highscore(&mut self) {
        self.scores.clear();
        log::info!("High scores cleared");
    }

    pub fn on_session_complete(&mut self, listener: impl FnMut(&SessionResult) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Apply new settings to the running session without restarting it.
    /// A finished session only stores them for the next `start`.
    pub fn refresh_settings(&mut self, settings: Settings) {
        let settings = settings.sanitized();
        self.audio.set_master_volume(settings.master_volume);
        self.audio.set_muted(settings.muted);
        let state = &mut self.state;
        state.settings = settings;
        if matches!(state.phase, GamePhase::NameEntry | GamePhase::Completed) {
            log::info!("Settings stored for the next session ({:?})", state.settings.difficulty);
            return;
        }
        state.timer.apply_settings(&state.settings);
        if let Some(t) = state.bonus.apply_difficulty(state.settings.difficulty) {
            state.push_event(GameEvent::Bonus(t));
        }
        let update = state.scheduler.on_settings_changed(&state.settings);
        state.apply_schedule(&update);
        state.rebuild_puzzle_now();
        log::info!(
            "Settings applied ({:?}, {} active mechanics)",
            state.settings.difficulty,
            state.scheduler.active().len()
        );
        self.flush_events();
    }

    /// Re-read settings through the config collaborator
    pub fn reload_settings(&mut self) {
        let settings = self.config.load();
        self.refresh_settings(settings);
    }

    pub fn save_settings(&mut self) -> Result<(), StoreError> {
        self.config.save(&self.state.settings)
    }

    // === Rendering ===

    pub fn frame(&self) -> FrameView {
        FrameView::build(&self.state)
    }

    /// Push the current frame to the render surface
    pub fn present(&mut self) {
        let frame = self.frame();
        self.renderer.present(&frame);
    }

    // === Session end ===

    fn finish_session(&mut self) {
        let placement = self.scores.placement_for_score(self.state.score);
        let leaderboard = self.scores.list();
        if let Some(result) = self.state.end_session(placement, leaderboard) {
            self.emit(result);
        }
    }

    fn commit_name(&mut self, name: String) {
        let entry = HighScoreEntry {
            name: name.clone(),
            score: self.state.score,
            timestamp: now_millis(),
        };
        let rank = self.scores.save(entry);
        log::info!("High score saved for {name}: rank {rank:?}");
        let leaderboard = self.scores.list();
        if let Some(result) = self.state.submit_name(name, rank, leaderboard) {
            self.emit(result);
        }
    }

    fn emit(&mut self, result: SessionResult) {
        if self.emitted {
            return;
        }
        self.emitted = true;
        log::info!(
            "Session complete: score {}, placement {:?}",
            result.final_score,
            result.placement
        );
        for listener in &mut self.listeners {
            listener(&result);
        }
    }
}
