//! Mechanic rotation
//!
//! Correct answers are counted into fixed-size blocks. Crossing a block
//! boundary picks a new set of active rule mechanics; within a block the
//! active set keeps its identity and only refreshes per-answer state (the
//! remap pair, the memory preview).

use rand::Rng;
use rand::seq::SliceRandom;

use super::symbol::Shape;
use crate::settings::{Difficulty, Settings, SymbolTheme};

/// Rule modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MechanicType {
    Remap,
    Memory,
    Joystick,
    MatchColor,
    MatchShape,
}

/// Text shown when a mechanic kicks in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MechanicBanner {
    pub title: &'static str,
    pub hint: &'static str,
}

impl MechanicType {
    /// Canonical pool order (also the rotation order)
    pub const ALL: [MechanicType; 5] = [
        MechanicType::Remap,
        MechanicType::Memory,
        MechanicType::Joystick,
        MechanicType::MatchColor,
        MechanicType::MatchShape,
    ];

    pub fn is_enabled(&self, settings: &Settings) -> bool {
        let m = &settings.mechanics;
        match self {
            MechanicType::Remap => m.remap,
            MechanicType::Memory => m.memory,
            MechanicType::Joystick => m.joystick,
            MechanicType::MatchColor => m.match_color,
            MechanicType::MatchShape => m.match_shape,
        }
    }

    /// Match-color and match-shape can't run together
    pub fn conflicts_with(&self, other: MechanicType) -> bool {
        matches!(
            (self, other),
            (MechanicType::MatchColor, MechanicType::MatchShape)
                | (MechanicType::MatchShape, MechanicType::MatchColor)
        )
    }

    pub fn banner(&self) -> MechanicBanner {
        match self {
            MechanicType::Remap => MechanicBanner {
                title: "REMAP",
                hint: "One shape now stands for another",
            },
            MechanicType::Memory => MechanicBanner {
                title: "MEMORY",
                hint: "Remember the ring before it hides",
            },
            MechanicType::Joystick => MechanicBanner {
                title: "JOYSTICK FLIP",
                hint: "Up is down, left is right",
            },
            MechanicType::MatchColor => MechanicBanner {
                title: "MATCH COLOR",
                hint: "Same color, different shape",
            },
            MechanicType::MatchShape => MechanicBanner {
                title: "MATCH SHAPE",
                hint: "Same shape, different color",
            },
        }
    }
}

/// Remap substitution: while the center shows `from`, the answer is `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapPair {
    pub from: Shape,
    pub to: Shape,
}

impl RemapPair {
    pub fn roll<R: Rng>(theme: SymbolTheme, rng: &mut R) -> Self {
        let shapes = theme.shapes();
        let from = rng.random_range(0..shapes.len());
        let offset = rng.random_range(1..shapes.len());
        Self {
            from: shapes[from],
            to: shapes[(from + offset) % shapes.len()],
        }
    }

    /// Shape the player must pick for a given center
    pub fn expected_for(&self, center: Shape) -> Shape {
        if center == self.from { self.to } else { center }
    }
}

/// Memory mechanic visibility of the ring
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MemoryVeil {
    /// Mechanic inactive; ring always visible
    #[default]
    Off,
    /// Waiting for a spin shuffle to deliver a fresh layout
    Shuffling,
    /// Layout visible for `remaining` more seconds
    Previewing { remaining: f32 },
    Hidden,
}

impl MemoryVeil {
    pub fn is_hidden(&self) -> bool {
        *self == MemoryVeil::Hidden
    }

    /// Spin finished: start the preview countdown
    pub fn begin_preview(&mut self, duration: f32) {
        if *self != MemoryVeil::Off {
            *self = MemoryVeil::Previewing { remaining: duration };
        }
    }

    /// Returns true on the tick the ring hides
    pub fn tick(&mut self, dt: f32) -> bool {
        if let MemoryVeil::Previewing { remaining } = *self {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                *self = MemoryVeil::Hidden;
                return true;
            }
            *self = MemoryVeil::Previewing { remaining };
        }
        false
    }
}

/// What changed after a scheduler step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub activated: Vec<MechanicType>,
    pub deactivated: Vec<MechanicType>,
    /// Still-active mechanics whose per-answer state should be re-rolled
    pub refreshed: Vec<MechanicType>,
    /// New progressive unlock count, to be announced
    pub level_up: Option<usize>,
    pub block_changed: bool,
}

impl ScheduleUpdate {
    pub fn set_changed(&self) -> bool {
        !self.activated.is_empty() || !self.deactivated.is_empty()
    }
}

/// Progressive unlock thresholds: blocks 1-4 → 1, 5-8 → 2, beyond → 4
pub fn progressive_tier(block: u32) -> usize {
    match block {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        _ => 4,
    }
}

#[derive(Debug, Clone, Default)]
pub struct MechanicScheduler {
    pub correct_count: u32,
    pub block: u32,
    /// Ordered by selection; never holds both match modes
    active: Vec<MechanicType>,
    /// Progressive difficulty: how many mechanics are unlocked
    pub unlocked: usize,
}

impl MechanicScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[MechanicType] {
        &self.active
    }

    pub fn is_active(&self, mechanic: MechanicType) -> bool {
        self.active.contains(&mechanic)
    }

    pub fn enabled_pool(settings: &Settings) -> Vec<MechanicType> {
        MechanicType::ALL
            .into_iter()
            .filter(|m| m.is_enabled(settings))
            .collect()
    }

    /// Active-set size bound for the current difficulty/unlock tier
    pub fn slot_count(&self, settings: &Settings) -> usize {
        let pool = Self::enabled_pool(settings).len();
        match settings.difficulty {
            Difficulty::Progressive => self.unlocked.min(pool),
            d => d.mechanic_slots().min(pool),
        }
    }

    /// Take candidates in order, skipping repeats and match-mode conflicts
    fn select(candidates: impl IntoIterator<Item = MechanicType>, slots: usize) -> Vec<MechanicType> {
        let mut chosen: Vec<MechanicType> = Vec::with_capacity(slots);
        for m in candidates {
            if chosen.len() >= slots {
                break;
            }
            if chosen.contains(&m) || chosen.iter().any(|c| c.conflicts_with(m)) {
                continue;
            }
            chosen.push(m);
        }
        chosen
    }

    fn pick_random<R: Rng>(pool: &[MechanicType], slots: usize, rng: &mut R) -> Vec<MechanicType> {
        let mut shuffled = pool.to_vec();
        shuffled.shuffle(rng);
        Self::select(shuffled, slots)
    }

    fn pick_rotation(pool: &[MechanicType], slots: usize, block: u32) -> Vec<MechanicType> {
        if pool.is_empty() {
            return Vec::new();
        }
        let offset = block as usize % pool.len();
        Self::select((0..pool.len()).map(|i| pool[(offset + i) % pool.len()]), slots)
    }

    /// Swap in a new active set and report the difference
    fn replace(&mut self, next: Vec<MechanicType>, update: &mut ScheduleUpdate) {
        update.deactivated = self.active.iter().copied().filter(|m| !next.contains(m)).collect();
        update.activated = next.iter().copied().filter(|m| !self.active.contains(m)).collect();
        update.refreshed = next
            .iter()
            .copied()
            .filter(|m| self.active.contains(m) && matches!(m, MechanicType::Remap | MechanicType::Memory))
            .collect();
        self.active = next;
    }

    /// Count a correct answer and rotate mechanics on block boundaries
    pub fn on_correct_answer<R: Rng>(&mut self, settings: &Settings, rng: &mut R) -> ScheduleUpdate {
        let mut update = ScheduleUpdate::default();
        let interval = settings.mechanic_interval.max(1);
        let pool = Self::enabled_pool(settings);

        self.correct_count += 1;
        let block = self.correct_count / interval;

        if block != self.block {
            self.block = block;
            update.block_changed = true;

            let next = match settings.difficulty {
                Difficulty::Progressive => {
                    let target = progressive_tier(block).min(pool.len());
                    if target > self.unlocked {
                        self.unlocked = target;
                        update.level_up = Some(target);
                    }
                    Self::pick_random(&pool, self.unlocked.min(pool.len()), rng)
                }
                difficulty => {
                    let slots = difficulty.mechanic_slots().min(pool.len());
                    if block == 0 || slots == 0 {
                        Vec::new()
                    } else if settings.mechanic_randomize {
                        Self::pick_random(&pool, slots, rng)
                    } else {
                        Self::pick_rotation(&pool, slots, block)
                    }
                }
            };
            log::debug!("Mechanic block {block}: {next:?}");
            self.replace(next, &mut update);
            return update;
        }

        let slots = self.slot_count(settings);
        if self.active.is_empty() && slots > 0 && block > 0 {
            let next = Self::pick_random(&pool, slots, rng);
            log::debug!("Mechanic set was empty in block {block}, picked {next:?}");
            self.replace(next, &mut update);
            return update;
        }

        update.refreshed = self
            .active
            .iter()
            .copied()
            .filter(|m| matches!(m, MechanicType::Remap | MechanicType::Memory))
            .collect();
        update
    }

    /// Drop mechanics the new settings no longer allow
    pub fn on_settings_changed(&mut self, settings: &Settings) -> ScheduleUpdate {
        let mut update = ScheduleUpdate::default();
        let pool = Self::enabled_pool(settings);
        if settings.difficulty == Difficulty::Progressive {
            self.unlocked = self.unlocked.min(pool.len());
        }
        let slots = self.slot_count(settings);

        let kept = Self::select(self.active.iter().copied().filter(|m| pool.contains(m)), slots);
        self.block = self.correct_count / settings.mechanic_interval.max(1);
        if kept != self.active {
            self.replace(kept, &mut update);
            update.refreshed.clear();
        }
        update
    }

    /// Fresh session
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
