//! Game settings and preferences
//!
//! Loaded through the external config collaborator. Every recognized field is
//! read independently: a missing or wrong-typed value takes its default and an
//! out-of-range number is clamped, so one bad field never discards the rest.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    /// Mechanics unlock in stages as blocks are cleared
    Progressive,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Progressive => "progressive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "progressive" => Some(Difficulty::Progressive),
            _ => None,
        }
    }

    /// Simultaneous mechanic slots for the fixed difficulties.
    /// Progressive uses unlock tiers instead (see `MechanicScheduler`).
    pub fn mechanic_slots(&self) -> usize {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Progressive => 0,
        }
    }

    /// Correct answers needed to fill the bonus meter
    pub fn charge_threshold(&self) -> u32 {
        match self {
            Difficulty::Easy => 6,
            Difficulty::Medium => 8,
            Difficulty::Hard => 10,
            Difficulty::Progressive => 8,
        }
    }

    /// Charge lost on a wrong answer; `None` empties the meter
    pub fn wrong_charge_penalty(&self) -> Option<f32> {
        match self {
            Difficulty::Easy => Some(1.0),
            Difficulty::Medium | Difficulty::Progressive => Some(2.0),
            Difficulty::Hard => None,
        }
    }
}

/// How correct answers earn time back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeBonusMode {
    /// Reward fast reactions
    #[default]
    Classic,
    /// Reward answering while the clock is low
    Endurance,
    /// Average of both
    Hybrid,
}

impl TimeBonusMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(TimeBonusMode::Classic),
            "endurance" => Some(TimeBonusMode::Endurance),
            "hybrid" => Some(TimeBonusMode::Hybrid),
            _ => None,
        }
    }
}

/// Symbol set drawn on the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolTheme {
    #[default]
    Classic,
    Cosmic,
    Suits,
}

impl SymbolTheme {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "default" => Some(SymbolTheme::Classic),
            "cosmic" => Some(SymbolTheme::Cosmic),
            "suits" => Some(SymbolTheme::Suits),
            _ => None,
        }
    }
}

/// Input scheme for entering a leaderboard name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NameEntryMode {
    /// Fixed-width arcade letter slots
    #[default]
    Letters,
    /// On-screen keyboard grid
    Keyboard,
}

impl NameEntryMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "letters" | "arcade" => Some(NameEntryMode::Letters),
            "keyboard" => Some(NameEntryMode::Keyboard),
            _ => None,
        }
    }
}

/// Per-mechanic enable flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicToggles {
    pub remap: bool,
    pub memory: bool,
    pub joystick: bool,
    pub match_color: bool,
    pub match_shape: bool,
}

impl Default for MechanicToggles {
    fn default() -> Self {
        Self {
            remap: true,
            memory: true,
            joystick: true,
            match_color: true,
            match_shape: true,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    // === Timer economy ===
    /// Session length in seconds
    pub initial_time: f32,
    /// Seconds removed on a wrong answer
    pub wrong_answer_penalty: f32,
    pub max_time_bonus: f32,
    /// Always <= `max_time_bonus`
    pub min_time_bonus: f32,
    /// Reaction window (seconds) over which the classic bonus decays
    pub bonus_window: f32,
    pub time_bonus_mode: TimeBonusMode,

    // === Ring look ===
    /// Ring radius as a fraction of the play field's short side
    pub ring_radius_factor: f32,
    pub symbol_scale: f32,
    pub symbol_stroke: f32,
    pub symbol_theme: SymbolTheme,

    // === Mechanics ===
    pub difficulty: Difficulty,
    /// Correct answers per mechanic block
    pub mechanic_interval: u32,
    /// Pick mechanic sets at random instead of rotating
    pub mechanic_randomize: bool,
    pub mechanics: MechanicToggles,
    /// Seconds the ring stays visible before memory hides it
    pub memory_preview_duration: f32,

    // === Cosmetics ===
    pub particle_count: u32,
    pub ray_count: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,

    pub name_entry_mode: NameEntryMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_time: 60.0,
            wrong_answer_penalty: 2.0,
            max_time_bonus: 1.5,
            min_time_bonus: 0.25,
            bonus_window: 1.5,
            time_bonus_mode: TimeBonusMode::Classic,

            ring_radius_factor: 0.32,
            symbol_scale: 1.0,
            symbol_stroke: 4.0,
            symbol_theme: SymbolTheme::Classic,

            difficulty: Difficulty::Medium,
            mechanic_interval: 10,
            mechanic_randomize: false,
            mechanics: MechanicToggles::default(),
            memory_preview_duration: 2.0,

            particle_count: 120,
            ray_count: 12,

            master_volume: 0.8,
            muted: false,

            name_entry_mode: NameEntryMode::Letters,
        }
    }
}

/// Documented ranges for the numeric fields
mod ranges {
    pub const INITIAL_TIME: (f32, f32) = (10.0, 600.0);
    pub const WRONG_ANSWER_PENALTY: (f32, f32) = (0.0, 10.0);
    pub const MAX_TIME_BONUS: (f32, f32) = (0.0, 10.0);
    pub const BONUS_WINDOW: (f32, f32) = (0.1, 10.0);
    pub const RING_RADIUS_FACTOR: (f32, f32) = (0.15, 0.45);
    pub const SYMBOL_SCALE: (f32, f32) = (0.4, 2.0);
    pub const SYMBOL_STROKE: (f32, f32) = (1.0, 12.0);
    pub const MECHANIC_INTERVAL: (u32, u32) = (1, 100);
    pub const MEMORY_PREVIEW: (f32, f32) = (0.5, 10.0);
    pub const PARTICLE_COUNT: (u32, u32) = (0, 500);
    pub const RAY_COUNT: (u32, u32) = (0, 64);
    pub const MASTER_VOLUME: (f32, f32) = (0.0, 1.0);
}

fn read_f32(obj: &Map<String, Value>, key: &str, default: f32, (min, max): (f32, f32)) -> f32 {
    let Some(value) = obj.get(key) else {
        return default;
    };
    match value.as_f64().map(|v| v as f32) {
        Some(v) if v.is_finite() => {
            let clamped = v.clamp(min, max);
            if clamped != v {
                log::warn!("Setting {key}={v} out of range, clamped to {clamped}");
            }
            clamped
        }
        _ => {
            log::warn!("Setting {key} has invalid value {value}, using default {default}");
            default
        }
    }
}

fn read_u32(obj: &Map<String, Value>, key: &str, default: u32, (min, max): (u32, u32)) -> u32 {
    let Some(value) = obj.get(key) else {
        return default;
    };
    // Accept integral floats ("10.0") but nothing fractional or negative
    let parsed = value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| v.fract() == 0.0 && *v >= 0.0).map(|v| v as u64));
    match parsed {
        Some(v) => {
            let clamped = v.clamp(min as u64, max as u64) as u32;
            if clamped as u64 != v {
                log::warn!("Setting {key}={v} out of range, clamped to {clamped}");
            }
            clamped
        }
        None => {
            log::warn!("Setting {key} has invalid value {value}, using default {default}");
            default
        }
    }
}

fn read_bool(obj: &Map<String, Value>, key: &str, default: bool) -> bool {
    match obj.get(key) {
        None => default,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            log::warn!("Setting {key} has invalid value {other}, using default {default}");
            default
        }
    }
}

fn read_enum<T: Copy + std::fmt::Debug>(
    obj: &Map<String, Value>,
    key: &str,
    default: T,
    parse: fn(&str) -> Option<T>,
) -> T {
    match obj.get(key) {
        None => default,
        Some(value) => match value.as_str().and_then(parse) {
            Some(v) => v,
            None => {
                log::warn!("Setting {key} has invalid value {value}, using default {default:?}");
                default
            }
        },
    }
}

impl Settings {
    /// Build settings from loosely-typed JSON, field by field
    pub fn from_json_value(value: &Value) -> Self {
        let d = Self::default();
        let Some(obj) = value.as_object() else {
            log::warn!("Settings payload is not an object, using defaults");
            return d;
        };

        let max_time_bonus = read_f32(obj, "maxTimeBonus", d.max_time_bonus, ranges::MAX_TIME_BONUS);
        let min_time_bonus = read_f32(
            obj,
            "minTimeBonus",
            d.min_time_bonus.min(max_time_bonus),
            (0.0, max_time_bonus),
        );

        let toggles = match obj.get("mechanics").and_then(Value::as_object) {
            Some(m) => MechanicToggles {
                remap: read_bool(m, "remap", true),
                memory: read_bool(m, "memory", true),
                joystick: read_bool(m, "joystick", true),
                match_color: read_bool(m, "matchColor", true),
                match_shape: read_bool(m, "matchShape", true),
            },
            None => d.mechanics,
        };

        Self {
            initial_time: read_f32(obj, "initialTime", d.initial_time, ranges::INITIAL_TIME),
            wrong_answer_penalty: read_f32(
                obj,
                "wrongAnswerPenalty",
                d.wrong_answer_penalty,
                ranges::WRONG_ANSWER_PENALTY,
            ),
            max_time_bonus,
            min_time_bonus,
            bonus_window: read_f32(obj, "bonusWindow", d.bonus_window, ranges::BONUS_WINDOW),
            time_bonus_mode: read_enum(obj, "timeBonusMode", d.time_bonus_mode, TimeBonusMode::from_str),

            ring_radius_factor: read_f32(
                obj,
                "ringRadiusFactor",
                d.ring_radius_factor,
                ranges::RING_RADIUS_FACTOR,
            ),
            symbol_scale: read_f32(obj, "symbolScale", d.symbol_scale, ranges::SYMBOL_SCALE),
            symbol_stroke: read_f32(obj, "symbolStroke", d.symbol_stroke, ranges::SYMBOL_STROKE),
            symbol_theme: read_enum(obj, "symbolTheme", d.symbol_theme, SymbolTheme::from_str),

            difficulty: read_enum(obj, "difficulty", d.difficulty, Difficulty::from_str),
            mechanic_interval: read_u32(
                obj,
                "mechanicInterval",
                d.mechanic_interval,
                ranges::MECHANIC_INTERVAL,
            ),
            mechanic_randomize: read_bool(obj, "mechanicRandomize", d.mechanic_randomize),
            mechanics: toggles,
            memory_preview_duration: read_f32(
                obj,
                "memoryPreviewDuration",
                d.memory_preview_duration,
                ranges::MEMORY_PREVIEW,
            ),

            particle_count: read_u32(obj, "particleCount", d.particle_count, ranges::PARTICLE_COUNT),
            ray_count: read_u32(obj, "rayCount", d.ray_count, ranges::RAY_COUNT),

            master_volume: read_f32(obj, "masterVolume", d.master_volume, ranges::MASTER_VOLUME),
            muted: read_bool(obj, "muted", d.muted),

            name_entry_mode: read_enum(obj, "nameEntryMode", d.name_entry_mode, NameEntryMode::from_str),
        }
    }

    /// Parse settings JSON; unparseable input falls back to defaults
    pub fn from_json_str(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_json_value(&value),
            Err(e) => {
                log::warn!("Settings JSON unreadable ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Re-run the field checks on an already typed value (e.g. one built in code)
    pub fn sanitized(&self) -> Self {
        match serde_json::to_value(self) {
            Ok(value) => Self::from_json_value(&value),
            Err(e) => {
                log::warn!("Settings could not be re-validated ({e}), using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings = Settings::from_json_value(&json!({}));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_out_of_range_is_clamped_individually() {
        let settings = Settings::from_json_value(&json!({
            "initialTime": 5000.0,
            "bonusWindow": -3.0,
            "mechanicInterval": 0,
            "symbolScale": 1.25,
            "masterVolume": 1.7,
        }));
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.initial_time, 600.0);
        assert_eq!(settings.bonus_window, 0.1);
        assert_eq!(settings.mechanic_interval, 1);
        assert_eq!(settings.symbol_scale, 1.25);
        // Untouched fields keep their defaults
        assert_eq!(settings.wrong_answer_penalty, 2.0);
    }

    #[test]
    fn test_wrong_types_fall_back_to_defaults() {
        let settings = Settings::from_json_value(&json!({
            "initialTime": "ninety",
            "difficulty": "nightmare",
            "mechanicRandomize": 1,
            "timeBonusMode": "hybrid",
        }));
        assert_eq!(settings.initial_time, 60.0);
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert!(!settings.mechanic_randomize);
        assert_eq!(settings.time_bonus_mode, TimeBonusMode::Hybrid);
    }

    #[test]
    fn test_min_bonus_never_exceeds_max() {
        let settings = Settings::from_json_value(&json!({
            "maxTimeBonus": 0.5,
            "minTimeBonus": 3.0,
        }));
        assert_eq!(settings.max_time_bonus, 0.5);
        assert_eq!(settings.min_time_bonus, 0.5);

        let settings = Settings::from_json_value(&json!({ "maxTimeBonus": 0.1 }));
        assert!(settings.min_time_bonus <= settings.max_time_bonus);
    }

    #[test]
    fn test_mechanic_toggles() {
        let settings = Settings::from_json_value(&json!({
            "mechanics": { "memory": false, "matchShape": "no" }
        }));
        assert!(!settings.mechanics.memory);
        assert!(settings.mechanics.match_shape);
        assert!(settings.mechanics.remap);
    }

    #[test]
    fn test_unparseable_json_defaults() {
        assert_eq!(Settings::from_json_str("{not json"), Settings::default());
        assert_eq!(Settings::from_json_str("[1, 2]"), Settings::default());
    }

    #[test]
    fn test_serialized_round_trip_is_stable() {
        let mut settings = Settings::default();
        settings.difficulty = Difficulty::Progressive;
        settings.name_entry_mode = NameEntryMode::Keyboard;
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json_str(&json), settings);
    }
}
