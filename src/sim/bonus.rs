//! Bonus charge meter
//!
//! Correct answers fill the meter; a full meter can be activated for a
//! double-score window that drains the charge, followed by a short cooldown.

use glam::Vec3;

use super::symbol::Rgb;
use crate::consts::{BONUS_ACTIVE_DURATION, BONUS_COOLDOWN_DURATION, BONUS_MULTIPLIER, BONUS_TINT_WEIGHT};
use crate::settings::Difficulty;

/// Meter state (timers in seconds remaining)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BonusPhase {
    Idle,
    Charging,
    Ready,
    Active { remaining: f32 },
    Cooldown { remaining: f32 },
}

/// Coarse state without payload, for events and edge checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BonusStage {
    Idle,
    Charging,
    Ready,
    Active,
    Cooldown,
}

impl BonusPhase {
    pub fn stage(&self) -> BonusStage {
        match self {
            BonusPhase::Idle => BonusStage::Idle,
            BonusPhase::Charging => BonusStage::Charging,
            BonusPhase::Ready => BonusStage::Ready,
            BonusPhase::Active { .. } => BonusStage::Active,
            BonusPhase::Cooldown { .. } => BonusStage::Cooldown,
        }
    }
}

/// The only legal stage changes
pub const BONUS_EDGES: [(BonusStage, BonusStage); 6] = [
    (BonusStage::Idle, BonusStage::Charging),
    (BonusStage::Charging, BonusStage::Ready),
    (BonusStage::Charging, BonusStage::Idle),
    (BonusStage::Ready, BonusStage::Active),
    (BonusStage::Active, BonusStage::Cooldown),
    (BonusStage::Cooldown, BonusStage::Idle),
];

pub fn is_legal_edge(from: BonusStage, to: BonusStage) -> bool {
    BONUS_EDGES.contains(&(from, to))
}

/// A stage change reported to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusTransition {
    pub from: BonusStage,
    pub to: BonusStage,
}

#[derive(Debug, Clone)]
pub struct BonusCharge {
    pub phase: BonusPhase,
    /// In [0, threshold]
    pub charge: f32,
    pub threshold: f32,
    /// Charge removed by a wrong answer; `None` empties the meter
    pub wrong_penalty: Option<f32>,
    /// Cosmetic blend of the colors that filled the meter
    pub tint: Vec3,
}

impl BonusCharge {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            phase: BonusPhase::Idle,
            charge: 0.0,
            threshold: difficulty.charge_threshold().max(1) as f32,
            wrong_penalty: difficulty.wrong_charge_penalty(),
            tint: Vec3::ONE,
        }
    }

    /// Re-read the difficulty table, keeping progress within the new threshold
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) -> Option<BonusTransition> {
        self.threshold = difficulty.charge_threshold().max(1) as f32;
        self.wrong_penalty = difficulty.wrong_charge_penalty();
        self.charge = self.charge.clamp(0.0, self.threshold);
        if self.phase == BonusPhase::Charging && self.charge >= self.threshold {
            return self.set_phase(BonusPhase::Ready);
        }
        None
    }

    pub fn stage(&self) -> BonusStage {
        self.phase.stage()
    }

    pub fn multiplier(&self) -> u64 {
        match self.phase {
            BonusPhase::Active { .. } => BONUS_MULTIPLIER,
            _ => 1,
        }
    }

    /// Fill level 0-1 for the HUD
    pub fn ratio(&self) -> f32 {
        (self.charge / self.threshold).clamp(0.0, 1.0)
    }

    fn set_phase(&mut self, next: BonusPhase) -> Option<BonusTransition> {
        let (from, to) = (self.phase.stage(), next.stage());
        self.phase = next;
        if from == to {
            return None;
        }
        debug_assert!(is_legal_edge(from, to), "illegal bonus edge {from:?} -> {to:?}");
        Some(BonusTransition { from, to })
    }

    /// One charge unit for a correct answer
    pub fn on_correct(&mut self, color: Rgb) -> Option<BonusTransition> {
        match self.phase {
            BonusPhase::Active { .. } | BonusPhase::Cooldown { .. } | BonusPhase::Ready => None,
            BonusPhase::Idle | BonusPhase::Charging => {
                self.charge = (self.charge + 1.0).min(self.threshold);
                self.tint = self.tint.lerp(color.to_vec3(), BONUS_TINT_WEIGHT);
                if self.charge >= self.threshold {
                    // Idle -> Ready goes through Charging
                    let first = self.set_phase(BonusPhase::Charging);
                    let second = self.set_phase(BonusPhase::Ready);
                    second.or(first)
                } else {
                    self.set_phase(BonusPhase::Charging)
                }
            }
        }
    }

    /// Wrong-answer penalty. An active bonus ends on the spot.
    pub fn on_wrong(&mut self) -> Option<BonusTransition> {
        match self.phase {
            BonusPhase::Active { .. } => {
                self.charge = 0.0;
                self.set_phase(BonusPhase::Cooldown {
                    remaining: BONUS_COOLDOWN_DURATION,
                })
            }
            BonusPhase::Charging => {
                self.charge = match self.wrong_penalty {
                    Some(amount) => (self.charge - amount).max(0.0),
                    None => 0.0,
                };
                if self.charge <= 0.0 {
                    self.charge = 0.0;
                    self.tint = Vec3::ONE;
                    self.set_phase(BonusPhase::Idle)
                } else {
                    None
                }
            }
            // A full meter is banked; idle/cooldown hold nothing to lose
            BonusPhase::Idle | BonusPhase::Ready | BonusPhase::Cooldown { .. } => None,
        }
    }

    /// Confirm input. No-op unless the meter is exactly ready.
    pub fn activate(&mut self) -> Option<BonusTransition> {
        if self.phase != BonusPhase::Ready {
            return None;
        }
        self.set_phase(BonusPhase::Active {
            remaining: BONUS_ACTIVE_DURATION,
        })
    }

    /// Drain/cooldown clocks
    pub fn tick(&mut self, dt: f32) -> Option<BonusTransition> {
        match self.phase {
            BonusPhase::Active { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.charge = 0.0;
                    self.set_phase(BonusPhase::Cooldown {
                        remaining: BONUS_COOLDOWN_DURATION,
                    })
                } else {
                    self.charge = self.threshold * (remaining / BONUS_ACTIVE_DURATION);
                    self.phase = BonusPhase::Active { remaining };
                    None
                }
            }
            BonusPhase::Cooldown { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.charge = 0.0;
                    self.tint = Vec3::ONE;
                    self.set_phase(BonusPhase::Idle)
                } else {
                    self.phase = BonusPhase::Cooldown { remaining };
                    None
                }
            }
            _ => None,
        }
    }
}
