//! File-backed and in-memory stores for settings and the leaderboard
//!
//! Reads never fail outward: a missing file means defaults, a corrupt file
//! means defaults plus a warning. Only writes report errors.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::highscores::{HighScoreEntry, HighScores, HighscoreStore};
use crate::settings::Settings;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent config collaborator
pub trait ConfigStore {
    /// Current settings, sanitized, defaults for anything missing
    fn load(&self) -> Settings;
    fn save(&mut self, settings: &Settings) -> Result<(), StoreError>;
}

fn read_optional(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            log::warn!("Failed to read {}: {e}", path.display());
            None
        }
    }
}

fn write_creating_dirs(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Settings persisted as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileConfig {
    path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileConfig {
    fn load(&self) -> Settings {
        match read_optional(&self.path) {
            Some(json) => Settings::from_json_str(&json),
            None => {
                log::info!("No settings at {}, using defaults", self.path.display());
                Settings::default()
            }
        }
    }

    fn save(&mut self, settings: &Settings) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(settings)?;
        write_creating_dirs(&self.path, &json)?;
        log::info!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

/// Settings held in memory (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    pub settings: Settings,
    /// Number of successful saves
    pub saves: u32,
}

impl MemoryConfig {
    pub fn new(settings: Settings) -> Self {
        Self { settings, saves: 0 }
    }
}

impl ConfigStore for MemoryConfig {
    fn load(&self) -> Settings {
        self.settings.sanitized()
    }

    fn save(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.settings = settings.clone();
        self.saves += 1;
        Ok(())
    }
}

/// Leaderboard persisted as a JSON file. The board is cached in memory and
/// written through on every change; write failures are logged.
#[derive(Debug, Clone)]
pub struct JsonFileHighscores {
    path: PathBuf,
    board: HighScores,
}

impl JsonFileHighscores {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let board = read_optional(&path).map_or_else(HighScores::new, |json| HighScores::from_json(&json));
        log::info!("Loaded {} high scores from {}", board.entries.len(), path.display());
        Self { path, board }
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        let json = self.board.to_json()?;
        write_creating_dirs(&self.path, &json)
    }

    fn flush_logged(&self) {
        if let Err(e) = self.flush() {
            log::warn!("Failed to write high scores to {}: {e}", self.path.display());
        }
    }
}

impl HighscoreStore for JsonFileHighscores {
    fn list(&self) -> Vec<HighScoreEntry> {
        self.board.list()
    }

    fn placement_for_score(&self, score: u64) -> Option<usize> {
        self.board.placement_for_score(score)
    }

    fn save(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let rank = self.board.add_score(entry);
        if rank.is_some() {
            self.flush_logged();
        }
        rank
    }

    fn clear(&mut self) {
        self.board.clear();
        self.flush_logged();
    }
}
