//! High score leaderboard
//!
//! Top 10 scores, sorted descending. The `HighscoreStore` trait is the
//! collaborator seam the engine talks to; `HighScores` is the in-memory
//! implementation and the payload the file store persists.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_HIGH_SCORES;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's name as committed from name entry
    pub name: String,
    /// Final score
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Leaderboard collaborator
pub trait HighscoreStore {
    /// Entries sorted descending by score, at most `MAX_HIGH_SCORES`
    fn list(&self) -> Vec<HighScoreEntry>;
    /// 1-based rank the score would earn, `None` if it would not place
    fn placement_for_score(&self, score: u64) -> Option<usize>;
    /// Insert an entry, returning its rank if it placed
    fn save(&mut self, entry: HighScoreEntry) -> Option<usize>;
    fn clear(&mut self);
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a stored leaderboard. Anything unreadable degrades to an empty
    /// board; malformed rows are dropped and the rest re-sorted.
    pub fn from_json(json: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("High score data unreadable ({e}), starting fresh");
                return Self::new();
            }
        };
        let Some(rows) = value.get("entries").unwrap_or(&value).as_array() else {
            log::warn!("High score data has no entry list, starting fresh");
            return Self::new();
        };

        let mut entries: Vec<HighScoreEntry> = rows
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect();
        if entries.len() != rows.len() {
            log::warn!("Dropped {} malformed high score entries", rows.len() - entries.len());
        }
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new entry to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score, ties keep older first)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HighscoreStore for HighScores {
    fn list(&self) -> Vec<HighScoreEntry> {
        self.entries.clone()
    }

    fn placement_for_score(&self, score: u64) -> Option<usize> {
        self.potential_rank(score)
    }

    fn save(&mut self, entry: HighScoreEntry) -> Option<usize> {
        self.add_score(entry)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Milliseconds since the Unix epoch, 0 if the clock is before it
pub fn now_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u64) -> HighScoreEntry {
        HighScoreEntry {
            name: name.to_string(),
            score,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let board = HighScores::new();
        assert!(!board.qualifies(0));
        assert_eq!(board.potential_rank(0), None);
        assert_eq!(board.potential_rank(1), Some(1));
    }

    #[test]
    fn test_add_keeps_descending_order_and_caps() {
        let mut board = HighScores::new();
        for i in 1..=12u64 {
            board.add_score(entry("P", i * 100));
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.entries[0].score, 1200);
        assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
        // Lowest surviving is 300; 300 does not beat it
        assert_eq!(board.placement_for_score(300), None);
        assert_eq!(board.placement_for_score(301), Some(10));
    }

    #[test]
    fn test_tie_ranks_below_existing() {
        let mut board = HighScores::new();
        board.add_score(entry("A", 500));
        assert_eq!(board.add_score(entry("B", 500)), Some(2));
        assert_eq!(board.entries[0].name, "A");
    }

    #[test]
    fn test_store_trait_save_and_clear() {
        let mut board = HighScores::new();
        let store: &mut dyn HighscoreStore = &mut board;
        assert_eq!(store.save(entry("AAA", 700)), Some(1));
        assert_eq!(store.save(entry("BBB", 900)), Some(1));
        assert_eq!(store.list()[1].name, "AAA");
        store.clear();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_from_json_degrades() {
        assert!(HighScores::from_json("not json").is_empty());
        assert!(HighScores::from_json("{\"entries\": 5}").is_empty());

        let mixed = r#"{"entries": [
            {"name": "LOW", "score": 10, "timestamp": 1.0},
            {"name": "BAD", "score": "lots"},
            {"name": "TOP", "score": 90, "timestamp": 2.0}
        ]}"#;
        let board = HighScores::from_json(mixed);
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.entries[0].name, "TOP");
    }

    #[test]
    fn test_json_round_trip_through_store_format() {
        let mut board = HighScores::new();
        board.add_score(entry("ACE", 1200));
        let json = board.to_json().unwrap();
        assert_eq!(HighScores::from_json(&json).entries, board.entries);
    }
}
