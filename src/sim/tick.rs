//! Input resolution and per-frame simulation tick
//!
//! One call to `tick` advances every session clock by `dt`; inputs are
//! resolved synchronously between ticks. Nothing here blocks or queues input:
//! an answer that arrives while a transition is in flight is dropped.

use super::anim::{AnimEvent, SwapTarget};
use super::name_entry::NameEntryOutcome;
use super::state::{GameEvent, GamePhase, GameState};
use super::symbol::Rgb;
use crate::consts::{POINTS_PER_CORRECT, RING_SLOTS};

/// Directional input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Joystick flip
    pub fn inverted(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// One discrete input event (no key repeat)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Direction(Direction),
    Confirm,
}

/// Fixed direction -> slot table. Deliberately ignores the ring's cosmetic
/// rotation so physical controls stay put while the ring spins.
pub const DIRECTION_SLOTS: [(Direction, usize); RING_SLOTS] = [
    (Direction::Up, 0),
    (Direction::Left, 1),
    (Direction::Right, 2),
    (Direction::Down, 3),
];

pub fn slot_for_direction(direction: Direction, inverted: bool) -> usize {
    let direction = if inverted { direction.inverted() } else { direction };
    DIRECTION_SLOTS
        .iter()
        .find(|(d, _)| *d == direction)
        .map_or(0, |(_, slot)| *slot)
}

/// Result of an accepted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub slot: usize,
}

/// What an input did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Ignored,
    Answered(AnswerOutcome),
    BonusActivated,
    LevelUpAcknowledged,
    /// Attract confirm: the driver should start a session
    StartRequested,
    /// Name entry committed; the driver saves it
    NameSubmitted(String),
}

/// Map a direction to a slot and score it
pub fn resolve(state: &mut GameState, direction: Direction) -> Option<AnswerOutcome> {
    if state.phase != GamePhase::Playing || state.resolving() {
        return None;
    }
    if state.puzzle.ring.is_empty() {
        log::warn!("Answer {direction:?} with an empty ring, ignored");
        return None;
    }

    let slot = slot_for_direction(direction, state.joystick_inverted);
    let Some(assignment) = state.puzzle.ring.get(slot).copied() else {
        log::warn!("Answer {direction:?} maps to missing slot {slot}, ignored");
        return None;
    };

    let correct = state.puzzle.is_correct(assignment.symbol());
    if correct {
        on_correct(state, slot, assignment.color);
    } else {
        on_wrong(state, slot);
    }
    Some(AnswerOutcome { correct, slot })
}

fn on_correct(state: &mut GameState, slot: usize, color: Rgb) {
    let points = POINTS_PER_CORRECT * state.multiplier();
    state.score += points;

    let time_bonus = state.timer.compute_bonus();
    state.timer.add(time_bonus);

    state.streak += 1;
    state.best_streak = state.best_streak.max(state.streak);
    state.correct_answers += 1;

    if let Some(t) = state.bonus.on_correct(color) {
        state.push_event(GameEvent::Bonus(t));
    }

    let update = state.advance_mechanics();
    let reroll_remap = state.apply_schedule(&update);

    let center = state.next_center();
    let target = SwapTarget::Slot {
        index: slot,
        dir: GameState::slot_direction(slot),
    };
    state.queue_next_puzzle(center, target, reroll_remap);
    state.push_event(GameEvent::AnswerCorrect {
        slot,
        points,
        time_bonus,
    });
}

fn on_wrong(state: &mut GameState, slot: usize) {
    let penalty = state.timer.wrong_answer_penalty;
    state.timer.penalize_wrong();
    state.streak = 0;
    state.wrong_answers += 1;

    if let Some(t) = state.bonus.on_wrong() {
        state.push_event(GameEvent::Bonus(t));
    }

    let center = state.next_center();
    state.queue_next_puzzle(center, SwapTarget::Center, false);
    state.push_event(GameEvent::AnswerWrong { slot, penalty });
}

/// Route one input according to the current phase
pub fn handle_input(state: &mut GameState, action: InputAction) -> InputOutcome {
    match (state.phase, action) {
        (GamePhase::Attract, InputAction::Confirm) => InputOutcome::StartRequested,

        (GamePhase::Playing, InputAction::Confirm) => {
            if state.acknowledge_level_up() {
                return InputOutcome::LevelUpAcknowledged;
            }
            if state.pause.is_paused() {
                return InputOutcome::Ignored;
            }
            match state.bonus.activate() {
                Some(t) => {
                    state.push_event(GameEvent::Bonus(t));
                    InputOutcome::BonusActivated
                }
                None => InputOutcome::Ignored,
            }
        }
        (GamePhase::Playing, InputAction::Direction(d)) => {
            resolve(state, d).map_or(InputOutcome::Ignored, InputOutcome::Answered)
        }

        (GamePhase::NameEntry, action) => {
            let Some(entry) = state.name_entry.as_mut() else {
                return InputOutcome::Ignored;
            };
            match action {
                InputAction::Direction(d) => {
                    entry.on_direction(d);
                    InputOutcome::Ignored
                }
                InputAction::Confirm => match entry.on_confirm() {
                    NameEntryOutcome::Submitted(name) => InputOutcome::NameSubmitted(name),
                    NameEntryOutcome::Editing => InputOutcome::Ignored,
                },
            }
        }

        _ => InputOutcome::Ignored,
    }
}

/// What the driver must do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// Clock not running (wrong phase, paused or unusable step)
    Halted,
    /// Countdown exhausted; end the session
    TimeUp,
}

/// Advance the session by `dt` seconds
pub fn tick(state: &mut GameState, dt: f32) -> TickOutcome {
    if state.phase != GamePhase::Playing {
        return TickOutcome::Halted;
    }
    if state.pause.is_paused() {
        return TickOutcome::Halted;
    }
    // Time only moves forward; bonuses are the sole way to gain it
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Ignoring tick with dt {dt}");
        return TickOutcome::Halted;
    }
    state.time_ticks += 1;

    for event in state.anim.tick(dt) {
        match event {
            AnimEvent::SwapCommitted(intent) | AnimEvent::SpinCommitted(intent) => {
                state.apply_intent(intent);
            }
            AnimEvent::SpinFinished => {
                let preview = state.settings.memory_preview_duration;
                state.memory.begin_preview(preview);
            }
            AnimEvent::SwapFinished => {}
        }
    }

    if state.memory.tick(dt) {
        state.push_event(GameEvent::MemoryHidden);
    }

    if let Some(t) = state.bonus.tick(dt) {
        state.push_event(GameEvent::Bonus(t));
    }

    state.timer.tick(dt);
    if state.timer.is_expired() {
        return TickOutcome::TimeUp;
    }
    TickOutcome::Running
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SIM_DT, SWAP_EXIT_DURATION};
    use crate::settings::{MechanicToggles, Settings};
    use crate::sim::bonus::BonusStage;
    use crate::sim::layout::{MatchMode, RingAssignment, RingLayout, SlotRole};
    use crate::sim::mechanics::MechanicType;
    use crate::sim::symbol::{PALETTE, Shape, Symbol};

    fn direction_for_slot(slot: usize, inverted: bool) -> Direction {
        let d = DIRECTION_SLOTS.iter().find(|(_, s)| *s == slot).unwrap().0;
        if inverted { d.inverted() } else { d }
    }

    /// Run the clock until answers are accepted again
    fn settle(state: &mut GameState) {
        let mut guard = 0;
        while state.resolving() && guard < 1000 {
            tick(state, SIM_DT);
            guard += 1;
        }
    }

    fn answer(state: &mut GameState, correct: bool) -> AnswerOutcome {
        settle(state);
        let target = state.puzzle.answer_index().unwrap();
        let slot = if correct { target } else { (target + 1) % RING_SLOTS };
        let direction = direction_for_slot(slot, state.joystick_inverted);
        resolve(state, direction).unwrap()
    }

    fn playing(settings: Settings) -> GameState {
        let mut state = GameState::new(2024, settings);
        state.start_session();
        state
    }

    fn triangle_puzzle() -> crate::sim::state::Puzzle {
        let center = Symbol::new(Shape::Triangle, PALETTE[0]);
        let faces = [
            (Shape::Square, PALETTE[1], SlotRole::Filler),
            (Shape::Circle, PALETTE[2], SlotRole::Filler),
            (Shape::Triangle, PALETTE[0], SlotRole::Correct),
            (Shape::Diamond, PALETTE[3], SlotRole::Filler),
        ];
        crate::sim::state::Puzzle {
            center,
            ring: RingLayout {
                slots: faces
                    .iter()
                    .map(|&(shape, color, role)| RingAssignment { shape, color, role })
                    .collect(),
                correct_index: 2,
            },
            mode: MatchMode::Standard,
            remap: None,
        }
    }

    #[test]
    fn test_direction_table_and_inversion() {
        assert_eq!(slot_for_direction(Direction::Up, false), 0);
        assert_eq!(slot_for_direction(Direction::Left, false), 1);
        assert_eq!(slot_for_direction(Direction::Right, false), 2);
        assert_eq!(slot_for_direction(Direction::Down, false), 3);
        assert_eq!(slot_for_direction(Direction::Left, true), 2);
        assert_eq!(slot_for_direction(Direction::Up, true), 3);
    }

    #[test]
    fn test_correct_triangle_scores_and_swaps() {
        let mut state = playing(Settings::default());
        state.puzzle = triangle_puzzle();

        let outcome = resolve(&mut state, Direction::Right).unwrap();
        assert!(outcome.correct);
        assert_eq!(state.score, 100);
        assert_eq!(state.streak, 1);

        let swap = state.anim.swap.as_ref().unwrap();
        assert!(matches!(swap.target, SwapTarget::Slot { index: 2, .. }));

        // The new prompt lands at the commit point, and it's a different shape
        tick(&mut state, SWAP_EXIT_DURATION + 0.01);
        assert_ne!(state.puzzle.center.shape, Shape::Triangle);
        assert!(state.puzzle.answer_index().is_some());
    }

    #[test]
    fn test_wrong_answer_penalizes_and_resets_streak() {
        let mut state = playing(Settings::default());
        answer(&mut state, true);
        answer(&mut state, true);
        assert_eq!(state.streak, 2);
        settle(&mut state);

        let before = state.timer.remaining;
        let outcome = answer(&mut state, false);
        assert!(!outcome.correct);
        assert_eq!(state.streak, 0);
        assert!((before - state.timer.remaining - 2.0).abs() < 1e-4);
        assert!(matches!(state.anim.swap.as_ref().unwrap().target, SwapTarget::Center));
    }

    #[test]
    fn test_input_dropped_during_transition() {
        let mut state = playing(Settings::default());
        answer(&mut state, true);
        assert!(state.resolving());
        assert!(resolve(&mut state, Direction::Up).is_none());
        assert_eq!(state.correct_answers, 1);
    }

    #[test]
    fn test_empty_ring_is_noop() {
        let mut state = playing(Settings::default());
        state.puzzle.ring = RingLayout::default();
        assert!(resolve(&mut state, Direction::Up).is_none());
        assert_eq!(state.wrong_answers, 0);
    }

    #[test]
    fn test_bonus_activation_doubles_points() {
        let mut state = playing(Settings::default());
        let threshold = state.bonus.threshold as u32;
        for _ in 0..threshold {
            answer(&mut state, true);
        }
        assert_eq!(state.bonus.stage(), BonusStage::Ready);
        assert_eq!(handle_input(&mut state, InputAction::Confirm), InputOutcome::BonusActivated);
        assert_eq!(state.multiplier(), 2);

        let before = state.score;
        answer(&mut state, true);
        assert_eq!(state.score - before, 200);
    }

    #[test]
    fn test_joystick_flip_inverts_mapping() {
        let settings = Settings {
            mechanic_interval: 1,
            difficulty: crate::settings::Difficulty::Easy,
            mechanics: MechanicToggles {
                remap: false,
                memory: false,
                joystick: true,
                match_color: false,
                match_shape: false,
            },
            ..Settings::default()
        };
        let mut state = playing(settings);
        answer(&mut state, true);
        assert!(state.joystick_inverted);
        settle(&mut state);

        let target = state.puzzle.answer_index().unwrap();
        let raw = direction_for_slot(target, false);
        let outcome = resolve(&mut state, raw.inverted()).unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.slot, target);
    }

    #[test]
    fn test_match_color_mode_after_block() {
        let settings = Settings {
            mechanic_interval: 2,
            difficulty: crate::settings::Difficulty::Easy,
            mechanics: MechanicToggles {
                remap: false,
                memory: false,
                joystick: false,
                match_color: true,
                match_shape: false,
            },
            ..Settings::default()
        };
        let mut state = playing(settings);
        answer(&mut state, true);
        answer(&mut state, true);
        assert!(state.scheduler.is_active(MechanicType::MatchColor));
        settle(&mut state);
        assert_eq!(state.puzzle.mode, MatchMode::MatchColor);
        let idx = state.puzzle.answer_index().unwrap();
        let slot = state.puzzle.ring.slots[idx];
        assert_eq!(slot.color, state.puzzle.center.color);
        assert_ne!(slot.shape, state.puzzle.center.shape);
    }

    #[test]
    fn test_memory_hides_after_spin_and_preview() {
        let settings = Settings {
            mechanic_interval: 1,
            difficulty: crate::settings::Difficulty::Easy,
            memory_preview_duration: 1.0,
            mechanics: MechanicToggles {
                remap: false,
                memory: true,
                joystick: false,
                match_color: false,
                match_shape: false,
            },
            ..Settings::default()
        };
        let mut state = playing(settings);
        answer(&mut state, true);
        assert!(state.anim.spin.is_some());
        settle(&mut state);
        assert!(matches!(state.memory, crate::sim::mechanics::MemoryVeil::Previewing { .. }));

        for _ in 0..70 {
            tick(&mut state, SIM_DT);
        }
        assert!(state.memory.is_hidden());
        assert!(state.drain_events().contains(&GameEvent::MemoryHidden));

        // Hidden ring is still answerable
        let outcome = answer(&mut state, true);
        assert!(outcome.correct);
    }

    #[test]
    fn test_remap_changes_expected_shape() {
        let mut state = playing(Settings::default());
        let mut puzzle = triangle_puzzle();
        puzzle.remap = Some(crate::sim::mechanics::RemapPair {
            from: Shape::Triangle,
            to: Shape::Circle,
        });
        state.puzzle = puzzle;

        // Triangle slot is now wrong, circle slot is right; the layout's own
        // correct index still points at the triangle
        assert_eq!(state.puzzle.ring.correct_index, 2);
        assert_eq!(state.puzzle.answer_index(), Some(1));
        let outcome = resolve(&mut state, Direction::Left).unwrap();
        assert!(outcome.correct);
    }

    #[test]
    fn test_pause_halts_clock() {
        let mut state = playing(Settings::default());
        let guard = state.pause.acquire();
        let before = state.timer.remaining;
        assert_eq!(tick(&mut state, 1.0), TickOutcome::Halted);
        assert_eq!(state.timer.remaining, before);
        assert!(resolve(&mut state, Direction::Up).is_none());
        drop(guard);
        assert_eq!(tick(&mut state, 1.0), TickOutcome::Running);
        assert!(state.timer.remaining < before);
    }

    #[test]
    fn test_bad_dt_leaves_session_untouched() {
        let mut state = playing(Settings::default());
        answer(&mut state, true);
        let remaining = state.timer.remaining;
        let visual = state.anim.center_visual();

        assert_eq!(tick(&mut state, -5.0), TickOutcome::Halted);
        assert_eq!(state.timer.remaining, remaining);

        assert_eq!(tick(&mut state, f32::NAN), TickOutcome::Halted);
        assert_eq!(tick(&mut state, f32::INFINITY), TickOutcome::Halted);
        assert_eq!(state.timer.remaining, remaining);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.anim.center_visual(), visual);

        // A normal step still runs afterwards
        assert_eq!(tick(&mut state, SIM_DT), TickOutcome::Running);
        assert!(state.timer.remaining < remaining);
    }

    #[test]
    fn test_time_up_after_penalty_to_zero() {
        let mut state = playing(Settings::default());
        state.timer.set(1.0);
        answer(&mut state, false);
        assert_eq!(state.timer.remaining, 0.0);
        assert_eq!(tick(&mut state, SIM_DT), TickOutcome::TimeUp);
    }

    #[test]
    fn test_determinism() {
        let mut a = playing(Settings::default());
        let mut b = playing(Settings::default());
        for i in 0..40 {
            answer(&mut a, i % 5 != 0);
            answer(&mut b, i % 5 != 0);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.puzzle, b.puzzle);
        assert_eq!(a.scheduler.active(), b.scheduler.active());
    }
}
