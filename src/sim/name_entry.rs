//! Leaderboard name entry
//!
//! Two input schemes driven by the same directional + confirm actions.

use super::tick::Direction;
use crate::settings::NameEntryMode;

/// Letter-slot width
pub const LETTER_SLOTS: usize = 3;
/// Longest name the keyboard accepts
pub const MAX_NAME_LEN: usize = 10;
/// Name committed when nothing was typed
pub const FALLBACK_NAME: &str = "ANON";

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ ";
const KEYBOARD_COLUMNS: usize = 10;

/// Keyboard keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    End,
}

fn keyboard_keys() -> Vec<Key> {
    ('A'..='Z')
        .chain('0'..='9')
        .map(Key::Char)
        .chain([Key::Delete, Key::End])
        .collect()
}

/// Result of feeding one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameEntryOutcome {
    Editing,
    Submitted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameEntry {
    /// Arcade-style: each slot cycles through letters
    Letters {
        /// Index into `LETTERS` per slot
        slots: [usize; LETTER_SLOTS],
        cursor: usize,
    },
    /// On-screen keyboard grid
    Keyboard { text: String, cursor: usize },
}

impl NameEntry {
    pub fn new(mode: NameEntryMode) -> Self {
        match mode {
            NameEntryMode::Letters => NameEntry::Letters {
                slots: [0; LETTER_SLOTS],
                cursor: 0,
            },
            NameEntryMode::Keyboard => NameEntry::Keyboard {
                text: String::new(),
                cursor: 0,
            },
        }
    }

    /// Name as currently typed
    pub fn current(&self) -> String {
        match self {
            NameEntry::Letters { slots, .. } => slots.iter().map(|&i| LETTERS[i] as char).collect(),
            NameEntry::Keyboard { text, .. } => text.clone(),
        }
    }

    /// Key under the keyboard cursor
    pub fn highlighted_key(&self) -> Option<Key> {
        match self {
            NameEntry::Keyboard { cursor, .. } => keyboard_keys().get(*cursor).copied(),
            NameEntry::Letters { .. } => None,
        }
    }

    fn finish(&self) -> NameEntryOutcome {
        let name = self.current().trim().to_string();
        if name.is_empty() {
            NameEntryOutcome::Submitted(FALLBACK_NAME.to_string())
        } else {
            NameEntryOutcome::Submitted(name)
        }
    }

    pub fn on_direction(&mut self, direction: Direction) {
        match self {
            NameEntry::Letters { slots, cursor } => match direction {
                Direction::Up => slots[*cursor] = (slots[*cursor] + 1) % LETTERS.len(),
                Direction::Down => slots[*cursor] = (slots[*cursor] + LETTERS.len() - 1) % LETTERS.len(),
                Direction::Left => *cursor = (*cursor + LETTER_SLOTS - 1) % LETTER_SLOTS,
                Direction::Right => *cursor = (*cursor + 1) % LETTER_SLOTS,
            },
            NameEntry::Keyboard { cursor, .. } => {
                let len = keyboard_keys().len();
                let rows = len.div_ceil(KEYBOARD_COLUMNS);
                let (row, col) = (*cursor / KEYBOARD_COLUMNS, *cursor % KEYBOARD_COLUMNS);
                let row_len = |r: usize| (len - r * KEYBOARD_COLUMNS).min(KEYBOARD_COLUMNS);
                let (row, col) = match direction {
                    Direction::Left => (row, (col + row_len(row) - 1) % row_len(row)),
                    Direction::Right => (row, (col + 1) % row_len(row)),
                    Direction::Up => {
                        let r = (row + rows - 1) % rows;
                        (r, col.min(row_len(r) - 1))
                    }
                    Direction::Down => {
                        let r = (row + 1) % rows;
                        (r, col.min(row_len(r) - 1))
                    }
                };
                *cursor = row * KEYBOARD_COLUMNS + col;
            }
        }
    }

    pub fn on_confirm(&mut self) -> NameEntryOutcome {
        let key = self.highlighted_key();
        if let NameEntry::Keyboard { text, .. } = self {
            match key {
                Some(Key::Char(c)) => {
                    if text.chars().count() < MAX_NAME_LEN {
                        text.push(c);
                    }
                    return NameEntryOutcome::Editing;
                }
                Some(Key::Delete) => {
                    text.pop();
                    return NameEntryOutcome::Editing;
                }
                Some(Key::End) | None => {}
            }
        }
        self.finish()
    }
}
