//! Countdown timer, time bonus economy and layered pausing

use std::cell::Cell;
use std::rc::Rc;

use crate::consts::TARGET_LOW_TIME_RATIO;
use crate::settings::{Settings, TimeBonusMode};

/// Session countdown plus the bonus/penalty formulas
#[derive(Debug, Clone)]
pub struct TimerEconomy {
    /// Seconds left; never negative
    pub remaining: f32,
    /// Session length used for the remaining-time ratio
    pub duration: f32,
    pub wrong_answer_penalty: f32,
    pub min_bonus: f32,
    pub max_bonus: f32,
    pub bonus_window: f32,
    pub mode: TimeBonusMode,
    /// Seconds since the current prompt appeared
    pub prompt_age: f32,
}

impl TimerEconomy {
    pub fn new(settings: &Settings) -> Self {
        let mut timer = Self {
            remaining: settings.initial_time,
            duration: settings.initial_time,
            wrong_answer_penalty: 0.0,
            min_bonus: 0.0,
            max_bonus: 0.0,
            bonus_window: 1.0,
            mode: TimeBonusMode::Classic,
            prompt_age: 0.0,
        };
        timer.apply_settings(settings);
        timer
    }

    /// Pick up new economy parameters without touching the running clock
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.duration = settings.initial_time.max(f32::EPSILON);
        self.wrong_answer_penalty = settings.wrong_answer_penalty.max(0.0);
        self.max_bonus = settings.max_time_bonus.max(0.0);
        self.min_bonus = settings.min_time_bonus.clamp(0.0, self.max_bonus);
        self.bonus_window = settings.bonus_window.max(f32::EPSILON);
        self.mode = settings.time_bonus_mode;
    }

    /// Advance the countdown. Returns true on the tick the clock hits zero.
    pub fn tick(&mut self, dt: f32) -> bool {
        // NaN and negative steps count as zero
        let dt = dt.max(0.0);
        if self.remaining <= 0.0 {
            return false;
        }
        self.prompt_age += dt;
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining <= 0.0
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Restart the reaction clock (a new prompt is on screen)
    pub fn reset_prompt_clock(&mut self) {
        self.prompt_age = 0.0;
    }

    /// Fraction of the session length still on the clock
    pub fn time_ratio(&self) -> f32 {
        (self.remaining / self.duration).clamp(0.0, 1.0)
    }

    /// 1 for an instant answer, 0 once the bonus window has passed
    pub fn reaction_ratio(&self) -> f32 {
        (1.0 - self.prompt_age / self.bonus_window).clamp(0.0, 1.0)
    }

    /// 0 above the low-time target, rising to 1 as the clock empties
    pub fn deficit_ratio(&self) -> f32 {
        ((TARGET_LOW_TIME_RATIO - self.time_ratio()) / TARGET_LOW_TIME_RATIO).clamp(0.0, 1.0)
    }

    /// Seconds earned by a correct answer right now
    pub fn compute_bonus(&self) -> f32 {
        let mix = match self.mode {
            TimeBonusMode::Classic => self.reaction_ratio(),
            TimeBonusMode::Endurance => self.deficit_ratio(),
            TimeBonusMode::Hybrid => (self.reaction_ratio() + self.deficit_ratio()) * 0.5,
        };
        let bonus = self.min_bonus + (self.max_bonus - self.min_bonus) * mix;
        bonus.clamp(self.min_bonus, self.max_bonus)
    }

    /// Explicit bonus addition
    pub fn add(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.remaining = (self.remaining + seconds).max(0.0);
        }
    }

    pub fn set(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.remaining = seconds.max(0.0);
        }
    }

    pub fn penalize(&mut self, amount: f32) {
        self.remaining = (self.remaining - amount.max(0.0)).max(0.0);
    }

    /// Fixed wrong-answer penalty
    pub fn penalize_wrong(&mut self) {
        self.penalize(self.wrong_answer_penalty);
    }
}

/// Reference-counted pause layers shared by every pausing caller.
///
/// The clock is paused while any layer is held.
#[derive(Debug, Clone, Default)]
pub struct PauseLayers {
    count: Rc<Cell<u32>>,
}

impl PauseLayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.count.get() > 0
    }

    pub fn depth(&self) -> u32 {
        self.count.get()
    }

    /// Manual layer; pair with `release`
    pub fn push(&self) {
        self.count.set(self.count.get().saturating_add(1));
    }

    /// Drop one manual layer. Returns false if nothing was held.
    pub fn release(&self) -> bool {
        let n = self.count.get();
        if n == 0 {
            return false;
        }
        self.count.set(n - 1);
        true
    }

    /// Scoped layer released when the guard drops
    pub fn acquire(&self) -> PauseGuard {
        self.push();
        PauseGuard {
            layers: self.clone(),
        }
    }

    /// Forget every layer (session reset)
    pub fn clear(&self) {
        self.count.set(0);
    }
}

/// One held pause layer
#[derive(Debug)]
#[must_use = "the pause layer is released as soon as the guard is dropped"]
pub struct PauseGuard {
    layers: PauseLayers,
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        self.layers.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn timer_with(mode: TimeBonusMode) -> TimerEconomy {
        let settings = Settings {
            time_bonus_mode: mode,
            ..Settings::default()
        };
        TimerEconomy::new(&settings)
    }

    #[test]
    fn test_countdown_floors_at_zero() {
        let mut timer = timer_with(TimeBonusMode::Classic);
        timer.set(0.5);
        assert!(!timer.tick(0.25));
        assert!(timer.tick(1.0));
        assert_eq!(timer.remaining, 0.0);
        // Already expired: no second game-over signal
        assert!(!timer.tick(1.0));
    }

    #[test]
    fn test_negative_or_nan_step_never_adds_time() {
        let mut timer = timer_with(TimeBonusMode::Classic);
        timer.set(10.0);
        assert!(!timer.tick(-3.0));
        assert!(!timer.tick(f32::NAN));
        assert_eq!(timer.remaining, 10.0);
        assert_eq!(timer.prompt_age, 0.0);
    }

    #[test]
    fn test_classic_rewards_fast_answers() {
        let mut timer = timer_with(TimeBonusMode::Classic);
        assert_eq!(timer.compute_bonus(), timer.max_bonus);
        timer.prompt_age = timer.bonus_window * 2.0;
        assert_eq!(timer.compute_bonus(), timer.min_bonus);
    }

    #[test]
    fn test_endurance_rewards_low_clock() {
        let mut timer = timer_with(TimeBonusMode::Endurance);
        assert_eq!(timer.compute_bonus(), timer.min_bonus);
        timer.set(0.0);
        assert_eq!(timer.compute_bonus(), timer.max_bonus);
    }

    #[test]
    fn test_hybrid_averages() {
        let mut timer = timer_with(TimeBonusMode::Hybrid);
        // Instant answer, full clock: reaction 1, deficit 0
        let expected = timer.min_bonus + (timer.max_bonus - timer.min_bonus) * 0.5;
        assert!((timer.compute_bonus() - expected).abs() < 1e-5);
        timer.set(0.0);
        assert!((timer.compute_bonus() - timer.max_bonus).abs() < 1e-5);
    }

    #[test]
    fn test_penalty_is_fixed_and_clamped() {
        let mut timer = timer_with(TimeBonusMode::Classic);
        timer.set(10.0);
        timer.penalize_wrong();
        assert_eq!(timer.remaining, 8.0);
        timer.set(1.0);
        timer.penalize_wrong();
        assert_eq!(timer.remaining, 0.0);
    }

    #[test]
    fn test_pause_layers_compose() {
        let layers = PauseLayers::new();
        layers.push();
        let guard = layers.acquire();
        assert_eq!(layers.depth(), 2);
        assert!(layers.release());
        // The scoped layer still holds the pause
        assert!(layers.is_paused());
        drop(guard);
        assert!(!layers.is_paused());
        assert!(!layers.release());
    }

    proptest! {
        #[test]
        fn prop_bonus_within_bounds(
            min in 0.0f32..5.0,
            spread in 0.0f32..5.0,
            window in 0.1f32..10.0,
            age in 0.0f32..20.0,
            remaining in 0.0f32..120.0,
            mode_idx in 0u8..3,
        ) {
            let settings = Settings {
                min_time_bonus: min,
                max_time_bonus: min + spread,
                bonus_window: window,
                time_bonus_mode: match mode_idx {
                    0 => TimeBonusMode::Classic,
                    1 => TimeBonusMode::Endurance,
                    _ => TimeBonusMode::Hybrid,
                },
                ..Settings::default()
            };
            let mut timer = TimerEconomy::new(&settings);
            timer.prompt_age = age;
            timer.set(remaining);
            let bonus = timer.compute_bonus();
            prop_assert!(bonus >= timer.min_bonus && bonus <= timer.max_bonus);
        }

        #[test]
        fn prop_tick_never_increases(start in 0.0f32..100.0, steps in proptest::collection::vec(0.0f32..1.0, 1..50)) {
            let mut timer = timer_with(TimeBonusMode::Classic);
            timer.set(start);
            let mut last = timer.remaining;
            for dt in steps {
                timer.tick(dt);
                prop_assert!(timer.remaining <= last && timer.remaining >= 0.0);
                last = timer.remaining;
            }
        }
    }
}
