//! Sound cues played through an injected audio backend
//!
//! Every cue is loaded once up front. A cue whose load (or a later play)
//! fails is marked unavailable for the rest of the run and silently skipped,
//! so a missing asset never holds up scoring or input.

use std::collections::HashSet;

use thiserror::Error;

use crate::sim::{BonusStage, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    SessionStart,
    /// Correct answer
    Correct,
    /// Wrong answer
    Wrong,
    /// Bonus meter filled
    BonusReady,
    BonusActivate,
    /// Active bonus ran out
    BonusEnd,
    /// A mechanic came online
    MechanicUnlock,
    LevelUp,
    TimeUp,
    /// Score made the leaderboard
    HighScore,
}

impl SoundCue {
    pub const ALL: [SoundCue; 10] = [
        SoundCue::SessionStart,
        SoundCue::Correct,
        SoundCue::Wrong,
        SoundCue::BonusReady,
        SoundCue::BonusActivate,
        SoundCue::BonusEnd,
        SoundCue::MechanicUnlock,
        SoundCue::LevelUp,
        SoundCue::TimeUp,
        SoundCue::HighScore,
    ];

    /// Name the backend registers the cue under
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::SessionStart => "session_start",
            SoundCue::Correct => "correct",
            SoundCue::Wrong => "wrong",
            SoundCue::BonusReady => "bonus_ready",
            SoundCue::BonusActivate => "bonus_activate",
            SoundCue::BonusEnd => "bonus_end",
            SoundCue::MechanicUnlock => "mechanic_unlock",
            SoundCue::LevelUp => "level_up",
            SoundCue::TimeUp => "time_up",
            SoundCue::HighScore => "high_score",
        }
    }

    /// Asset path handed to `load`
    pub fn source(&self) -> String {
        format!("sounds/{}.ogg", self.name())
    }

    /// Per-cue mix level
    pub fn gain(&self) -> f32 {
        match self {
            SoundCue::Correct => 0.6,
            SoundCue::Wrong => 0.7,
            SoundCue::BonusActivate | SoundCue::LevelUp | SoundCue::HighScore => 0.9,
            SoundCue::TimeUp => 1.0,
            _ => 0.8,
        }
    }

    /// Cue for a gameplay event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<SoundCue> {
        match event {
            GameEvent::SessionStarted => Some(SoundCue::SessionStart),
            GameEvent::AnswerCorrect { .. } => Some(SoundCue::Correct),
            GameEvent::AnswerWrong { .. } => Some(SoundCue::Wrong),
            GameEvent::Bonus(t) => match t.to {
                BonusStage::Ready => Some(SoundCue::BonusReady),
                BonusStage::Active => Some(SoundCue::BonusActivate),
                BonusStage::Cooldown => Some(SoundCue::BonusEnd),
                BonusStage::Idle | BonusStage::Charging => None,
            },
            GameEvent::MechanicActivated(_) => Some(SoundCue::MechanicUnlock),
            GameEvent::LevelUp { .. } => Some(SoundCue::LevelUp),
            GameEvent::TimeUp { .. } => Some(SoundCue::TimeUp),
            GameEvent::NameEntryStarted { .. } => Some(SoundCue::HighScore),
            GameEvent::MechanicDeactivated(_)
            | GameEvent::LevelUpAcknowledged
            | GameEvent::MemoryHidden
            | GameEvent::SessionCompleted { .. } => None,
        }
    }
}

/// Per-play parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    /// 0.0 - 1.0, already scaled by the master volume
    pub volume: f32,
    /// Playback rate (1.0 = as recorded)
    pub rate: f32,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            rate: 1.0,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Sound asset not found: {0}")]
    NotFound(String),
    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Audio collaborator
pub trait AudioBackend {
    fn load(&mut self, name: &str, source: &str, gain: f32) -> Result<(), AudioError>;
    fn play(&mut self, name: &str, options: PlayOptions) -> Result<(), AudioError>;
}

/// Backend that accepts everything and plays nothing
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioBackend for NullAudio {
    fn load(&mut self, _name: &str, _source: &str, _gain: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(&mut self, _name: &str, _options: PlayOptions) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioBank {
    backend: Box<dyn AudioBackend>,
    unavailable: HashSet<SoundCue>,
    master_volume: f32,
    muted: bool,
}

impl AudioBank {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            unavailable: HashSet::new(),
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Load every cue; failures are logged and remembered
    pub fn preload(&mut self) {
        for cue in SoundCue::ALL {
            if let Err(e) = self.backend.load(cue.name(), &cue.source(), cue.gain()) {
                log::warn!("Sound '{}' unavailable: {e}", cue.name());
                self.unavailable.insert(cue);
            }
        }
        log::info!(
            "Audio ready ({}/{} cues)",
            SoundCue::ALL.len() - self.unavailable.len(),
            SoundCue::ALL.len()
        );
    }

    pub fn is_available(&self, cue: SoundCue) -> bool {
        !self.unavailable.contains(&cue)
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Play a cue unless it is unavailable or muted
    pub fn play(&mut self, cue: SoundCue) {
        let volume = self.effective_volume();
        if volume <= 0.0 || !self.is_available(cue) {
            return;
        }
        let options = PlayOptions {
            volume,
            ..PlayOptions::default()
        };
        if let Err(e) = self.backend.play(cue.name(), options) {
            log::warn!("Sound '{}' failed, disabling it: {e}", cue.name());
            self.unavailable.insert(cue);
        }
    }

    /// Play whatever cues a batch of events calls for
    pub fn play_events(&mut self, events: &[GameEvent]) {
        for cue in events.iter().filter_map(SoundCue::for_event) {
            self.play(cue);
        }
    }
}

impl std::fmt::Debug for AudioBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBank")
            .field("unavailable", &self.unavailable)
            .field("master_volume", &self.master_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BonusTransition;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records plays; fails loads for names in `missing`
    #[derive(Default)]
    struct Recorder {
        missing: Vec<&'static str>,
        played: Rc<RefCell<Vec<String>>>,
    }

    impl AudioBackend for Recorder {
        fn load(&mut self, name: &str, source: &str, _gain: f32) -> Result<(), AudioError> {
            if self.missing.iter().any(|m| *m == name) {
                Err(AudioError::NotFound(source.to_string()))
            } else {
                Ok(())
            }
        }

        fn play(&mut self, name: &str, _options: PlayOptions) -> Result<(), AudioError> {
            self.played.borrow_mut().push(name.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_failed_load_marks_cue_unavailable() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut bank = AudioBank::new(Box::new(Recorder {
            missing: vec!["wrong"],
            played: played.clone(),
        }));
        bank.preload();
        assert!(!bank.is_available(SoundCue::Wrong));
        assert!(bank.is_available(SoundCue::Correct));

        bank.play(SoundCue::Wrong);
        bank.play(SoundCue::Correct);
        assert_eq!(*played.borrow(), vec!["correct".to_string()]);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut bank = AudioBank::new(Box::new(Recorder {
            played: played.clone(),
            ..Recorder::default()
        }));
        bank.preload();
        bank.set_muted(true);
        bank.play(SoundCue::TimeUp);
        assert!(played.borrow().is_empty());
    }

    #[test]
    fn test_event_mapping() {
        let ready = GameEvent::Bonus(BonusTransition {
            from: BonusStage::Charging,
            to: BonusStage::Ready,
        });
        assert_eq!(SoundCue::for_event(&ready), Some(SoundCue::BonusReady));
        assert_eq!(SoundCue::for_event(&GameEvent::MemoryHidden), None);
        assert_eq!(
            SoundCue::for_event(&GameEvent::AnswerWrong { slot: 0, penalty: 2.0 }),
            Some(SoundCue::Wrong)
        );
    }
}
