//! Transition timing contract
//!
//! The renderer draws these transitions; the sim owns their clocks because
//! logical state changes are tied to fixed points inside them. Anything that
//! must change the puzzle during a transition is queued as a `CommitIntent`
//! and applied when the transition reaches its commit point, never mid-phase.

use glam::Vec2;

use super::layout::{MatchMode, RingLayout};
use super::mechanics::RemapPair;
use super::symbol::Symbol;
use crate::consts::{
    SPIN_COMMIT_PROGRESS, SPIN_DURATION, SPIN_TURNS, SWAP_ENTER_DURATION, SWAP_ENTER_OFFSET,
    SWAP_EXIT_DURATION, SWAP_EXIT_REACH,
};

#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let u = 1.0 - t.clamp(0.0, 1.0);
    1.0 - u * u * u
}

#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = 2.0 - 2.0 * t;
        1.0 - u * u * u / 2.0
    }
}

/// d/dt of `ease_in_out_cubic`
#[inline]
pub fn ease_in_out_cubic_deriv(t: f32) -> f32 {
    if !(0.0..=1.0).contains(&t) {
        return 0.0;
    }
    if t < 0.5 {
        12.0 * t * t
    } else {
        let u = 2.0 - 2.0 * t;
        3.0 * u * u
    }
}

/// Spin rotation (radians) `elapsed` seconds into a shuffle
pub fn spin_angle(elapsed: f32) -> f32 {
    std::f32::consts::TAU * SPIN_TURNS * ease_in_out_cubic(elapsed / SPIN_DURATION)
}

/// Spin angular velocity (radians/s) `elapsed` seconds into a shuffle
pub fn spin_velocity(elapsed: f32) -> f32 {
    std::f32::consts::TAU * SPIN_TURNS * ease_in_out_cubic_deriv(elapsed / SPIN_DURATION) / SPIN_DURATION
}

/// Puzzle changes waiting for a commit point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitIntent {
    pub center: Option<Symbol>,
    pub ring: Option<RingLayout>,
    pub mode: Option<MatchMode>,
    /// `Some(None)` clears the mapping
    pub remap: Option<Option<RemapPair>>,
}

impl CommitIntent {
    pub fn is_empty(&self) -> bool {
        self.center.is_none() && self.ring.is_none() && self.mode.is_none() && self.remap.is_none()
    }

    /// Layer `later` on top of `self`
    pub fn merge(mut self, later: CommitIntent) -> CommitIntent {
        if later.center.is_some() {
            self.center = later.center;
        }
        if later.ring.is_some() {
            self.ring = later.ring;
        }
        if later.mode.is_some() {
            self.mode = later.mode;
        }
        if later.remap.is_some() {
            self.remap = later.remap;
        }
        self
    }
}

/// Where the outgoing prompt flies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwapTarget {
    /// Toward the chosen ring slot (unit direction)
    Slot { index: usize, dir: Vec2 },
    /// Collapse in place (wrong answer)
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPhase {
    Exit,
    Enter,
}

/// Where/how to draw the center prompt this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterVisual {
    /// Offset from the field center in ring-radius units
    pub offset: Vec2,
    pub scale: f32,
    pub opacity: f32,
}

impl Default for CenterVisual {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

/// Two-phase center swap
#[derive(Debug, Clone)]
pub struct CenterSwap {
    pub target: SwapTarget,
    pub phase: SwapPhase,
    elapsed: f32,
    intent: Option<CommitIntent>,
}

impl CenterSwap {
    pub fn new(target: SwapTarget, intent: CommitIntent) -> Self {
        Self {
            target,
            phase: SwapPhase::Exit,
            elapsed: 0.0,
            intent: Some(intent),
        }
    }

    /// Progress through the current phase, 0-1
    pub fn phase_progress(&self) -> f32 {
        let duration = match self.phase {
            SwapPhase::Exit => SWAP_EXIT_DURATION,
            SwapPhase::Enter => SWAP_ENTER_DURATION,
        };
        (self.elapsed / duration).clamp(0.0, 1.0)
    }

    pub fn is_committed(&self) -> bool {
        self.phase == SwapPhase::Enter
    }

    pub fn visual(&self) -> CenterVisual {
        let t = self.phase_progress();
        match self.phase {
            SwapPhase::Exit => {
                let e = ease_in_cubic(t);
                let dir = match self.target {
                    SwapTarget::Slot { dir, .. } => dir,
                    SwapTarget::Center => Vec2::ZERO,
                };
                CenterVisual {
                    offset: dir * SWAP_EXIT_REACH * e,
                    scale: 1.0 - 0.65 * e,
                    opacity: 1.0 - e,
                }
            }
            SwapPhase::Enter => {
                let e = ease_out_cubic(t);
                CenterVisual {
                    offset: Vec2::new(0.0, -SWAP_ENTER_OFFSET) * (1.0 - e),
                    scale: 0.6 + 0.4 * e,
                    opacity: e,
                }
            }
        }
    }

    /// Take the queued intent without waiting (used when cancelling)
    pub fn take_intent(&mut self) -> Option<CommitIntent> {
        self.intent.take()
    }
}

/// Full-ring spin with a hidden layout swap at the halfway mark
#[derive(Debug, Clone)]
pub struct SpinShuffle {
    elapsed: f32,
    intent: Option<CommitIntent>,
}

impl SpinShuffle {
    pub fn new(intent: CommitIntent) -> Self {
        Self {
            elapsed: 0.0,
            intent: Some(intent),
        }
    }

    pub fn progress(&self) -> f32 {
        (self.elapsed / SPIN_DURATION).clamp(0.0, 1.0)
    }

    pub fn angle(&self) -> f32 {
        spin_angle(self.elapsed.min(SPIN_DURATION))
    }

    /// Instantaneous angular velocity for motion blur
    pub fn angular_velocity(&self) -> f32 {
        spin_velocity(self.elapsed)
    }

    pub fn take_intent(&mut self) -> Option<CommitIntent> {
        self.intent.take()
    }
}

/// Something that happened while advancing transitions
#[derive(Debug, Clone, PartialEq)]
pub enum AnimEvent {
    SwapCommitted(CommitIntent),
    SwapFinished,
    SpinCommitted(CommitIntent),
    SpinFinished,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationSequencer {
    pub swap: Option<CenterSwap>,
    pub spin: Option<SpinShuffle>,
}

impl AnimationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a swap, cancelling any previous one. A cancelled swap that had
    /// not reached its commit point hands back its intent.
    pub fn start_swap(&mut self, target: SwapTarget, intent: CommitIntent) -> Option<CommitIntent> {
        let cancelled = self.swap.take().and_then(|mut s| s.take_intent());
        self.swap = Some(CenterSwap::new(target, intent));
        cancelled
    }

    /// Start a spin, cancelling any previous one (same intent hand-back)
    pub fn start_spin(&mut self, intent: CommitIntent) -> Option<CommitIntent> {
        let cancelled = self.spin.take().and_then(|mut s| s.take_intent());
        self.spin = Some(SpinShuffle::new(intent));
        cancelled
    }

    /// Input is dropped until the swap commits and any spin completes
    pub fn blocks_input(&self) -> bool {
        self.swap.as_ref().is_some_and(|s| !s.is_committed()) || self.spin.is_some()
    }

    pub fn center_visual(&self) -> CenterVisual {
        self.swap.as_ref().map(CenterSwap::visual).unwrap_or_default()
    }

    /// Cosmetic ring rotation (radians); zero when not spinning
    pub fn ring_rotation(&self) -> f32 {
        self.spin.as_ref().map_or(0.0, SpinShuffle::angle)
    }

    pub fn ring_angular_velocity(&self) -> f32 {
        self.spin.as_ref().map_or(0.0, SpinShuffle::angular_velocity)
    }

    pub fn clear(&mut self) {
        self.swap = None;
        self.spin = None;
    }

    pub fn tick(&mut self, dt: f32) -> Vec<AnimEvent> {
        let mut events = Vec::new();

        if let Some(swap) = &mut self.swap {
            swap.elapsed += dt;
            if swap.phase == SwapPhase::Exit && swap.elapsed >= SWAP_EXIT_DURATION {
                swap.elapsed -= SWAP_EXIT_DURATION;
                swap.phase = SwapPhase::Enter;
                events.push(AnimEvent::SwapCommitted(swap.take_intent().unwrap_or_default()));
            }
            if swap.phase == SwapPhase::Enter && swap.elapsed >= SWAP_ENTER_DURATION {
                self.swap = None;
                events.push(AnimEvent::SwapFinished);
            }
        }

        if let Some(spin) = &mut self.spin {
            let before = spin.progress();
            spin.elapsed += dt;
            let after = spin.progress();
            if before < SPIN_COMMIT_PROGRESS && after >= SPIN_COMMIT_PROGRESS {
                events.push(AnimEvent::SpinCommitted(spin.take_intent().unwrap_or_default()));
            }
            if after >= 1.0 {
                self.spin = None;
                events.push(AnimEvent::SpinFinished);
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::symbol::{PALETTE, Shape};

    #[test]
    fn test_swap_commits_at_exit_end() {
        let mut seq = AnimationSequencer::new();
        let intent = CommitIntent {
            center: Some(Symbol::new(Shape::Circle, PALETTE[0])),
            ..Default::default()
        };
        seq.start_swap(SwapTarget::Center, intent.clone());
        assert!(seq.blocks_input());

        assert!(seq.tick(SWAP_EXIT_DURATION * 0.5).is_empty());
        let events = seq.tick(SWAP_EXIT_DURATION * 0.6);
        assert_eq!(events, vec![AnimEvent::SwapCommitted(intent)]);
        assert!(!seq.blocks_input());

        let events = seq.tick(SWAP_ENTER_DURATION);
        assert_eq!(events, vec![AnimEvent::SwapFinished]);
        assert!(seq.swap.is_none());
    }

    #[test]
    fn test_exit_moves_toward_slot() {
        let mut swap = CenterSwap::new(
            SwapTarget::Slot {
                index: 0,
                dir: Vec2::Y,
            },
            CommitIntent::default(),
        );
        swap.elapsed = SWAP_EXIT_DURATION;
        let v = swap.visual();
        assert!((v.offset.y - SWAP_EXIT_REACH).abs() < 1e-5);
        assert!(v.opacity.abs() < 1e-5);
        assert!(v.scale < 1.0);
    }

    #[test]
    fn test_cancelled_swap_returns_uncommitted_intent() {
        let mut seq = AnimationSequencer::new();
        let first = CommitIntent {
            mode: Some(MatchMode::MatchColor),
            ..Default::default()
        };
        seq.start_swap(SwapTarget::Center, first.clone());
        let cancelled = seq.start_swap(SwapTarget::Center, CommitIntent::default());
        assert_eq!(cancelled, Some(first));
    }

    #[test]
    fn test_spin_commits_at_half() {
        let mut seq = AnimationSequencer::new();
        let ring = RingLayout::default();
        seq.start_spin(CommitIntent {
            ring: Some(ring),
            ..Default::default()
        });
        assert!(seq.tick(SPIN_DURATION * 0.4).is_empty());
        let events = seq.tick(SPIN_DURATION * 0.2);
        assert!(matches!(events[0], AnimEvent::SpinCommitted(_)));
        let events = seq.tick(SPIN_DURATION);
        assert_eq!(events, vec![AnimEvent::SpinFinished]);
        assert_eq!(seq.ring_rotation(), 0.0);
    }

    #[test]
    fn test_spin_velocity_is_easing_derivative() {
        // Two full turns in total, fastest at the midpoint
        assert!((spin_angle(SPIN_DURATION) - std::f32::consts::TAU * 2.0).abs() < 1e-4);
        assert_eq!(spin_velocity(0.0), 0.0);
        let peak = spin_velocity(SPIN_DURATION * 0.5);
        let expected = std::f32::consts::TAU * SPIN_TURNS * 3.0 / SPIN_DURATION;
        assert!((peak - expected).abs() < 1e-3);

        // Numeric derivative agrees
        let t = SPIN_DURATION * 0.3;
        let h = 1e-3;
        let numeric = (spin_angle(t + h) - spin_angle(t - h)) / (2.0 * h);
        assert!((numeric - spin_velocity(t)).abs() / spin_velocity(t) < 0.01);
    }

    #[test]
    fn test_intent_merge_prefers_later() {
        let a = CommitIntent {
            mode: Some(MatchMode::MatchColor),
            remap: Some(None),
            ..Default::default()
        };
        let b = CommitIntent {
            mode: Some(MatchMode::Standard),
            ..Default::default()
        };
        let merged = a.merge(b);
        assert_eq!(merged.mode, Some(MatchMode::Standard));
        assert_eq!(merged.remap, Some(None));
    }
}
