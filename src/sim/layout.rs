//! Ring layout generation
//!
//! Builds the shape/color assignment for the ring slots around the center
//! prompt. Whatever the match mode, a generated layout has exactly one slot
//! that satisfies the mode's correctness predicate.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::symbol::{DEFAULT_SHAPES, PALETTE, Rgb, Shape, Symbol};
use crate::consts::RING_SLOTS;
use crate::settings::SymbolTheme;

/// Which rule decides the correct slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMode {
    /// Shape identity (possibly remap-substituted)
    #[default]
    Standard,
    /// Different shape, same color as the center
    MatchColor,
    /// Same shape, different color from the center
    MatchShape,
}

/// Why a slot holds what it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotRole {
    /// Satisfies the layout's match mode. Under an active remap this is the
    /// center's own shape, which is then the wrong pick.
    Correct,
    /// Right on the wrong dimension (match modes only)
    Bait,
    Filler,
}

/// One ring slot's face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingAssignment {
    pub shape: Shape,
    pub color: Rgb,
    pub role: SlotRole,
}

impl RingAssignment {
    pub fn symbol(&self) -> Symbol {
        Symbol::new(self.shape, self.color)
    }
}

/// Ordered ring slots plus the index of the `Correct` role.
///
/// `correct_index` ignores remap. Use `Puzzle::answer_index` for the slot
/// the player has to pick.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RingLayout {
    pub slots: Vec<RingAssignment>,
    pub correct_index: usize,
}

impl RingLayout {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RingAssignment> {
        self.slots.get(index)
    }
}

/// Angle (radians, y-up) of each ring slot: top, left, right, bottom
pub const SLOT_ANGLES: [f32; RING_SLOTS] = [
    std::f32::consts::FRAC_PI_2,
    std::f32::consts::PI,
    0.0,
    std::f32::consts::PI * 1.5,
];

/// Correctness predicate for one slot
pub fn is_correct(slot: Symbol, center: Symbol, mode: MatchMode, expected_shape: Shape) -> bool {
    match mode {
        MatchMode::Standard => slot.shape == expected_shape,
        MatchMode::MatchColor => slot.shape != center.shape && slot.color == center.color,
        MatchMode::MatchShape => slot.shape == center.shape && slot.color != center.color,
    }
}

/// Pick a value from the first tier that has one outside `forbidden` and
/// `avoid`; if every tier is exhausted, allow repeats of `avoid` values.
fn pick<T: Copy + PartialEq, R: Rng>(
    tiers: &[&[T]],
    forbidden: &[T],
    avoid: &[T],
    rng: &mut R,
) -> Option<T> {
    let fresh = tiers.iter().map(|tier| {
        tier.iter()
            .copied()
            .filter(|v| !forbidden.contains(v) && !avoid.contains(v))
            .collect::<Vec<_>>()
    });
    let repeat = tiers.iter().map(|tier| {
        tier.iter()
            .copied()
            .filter(|v| !forbidden.contains(v))
            .collect::<Vec<_>>()
    });

    let candidates = fresh.chain(repeat).find(|c| !c.is_empty())?;
    Some(candidates[rng.random_range(0..candidates.len())])
}

/// Build a ring layout for `center` under `mode`.
///
/// The correct slot is recorded after the final Fisher-Yates shuffle.
pub fn build<R: Rng>(
    center: Symbol,
    mode: MatchMode,
    slot_count: usize,
    theme: SymbolTheme,
    rng: &mut R,
) -> RingLayout {
    if slot_count == 0 {
        return RingLayout::default();
    }

    let theme_shapes = theme.shapes();
    let shape_tiers: [&[Shape]; 2] = [&theme_shapes, &DEFAULT_SHAPES];
    let color_tiers: [&[Rgb]; 1] = [&PALETTE];

    let mut slots = Vec::with_capacity(slot_count);
    let mut used_shapes = Vec::with_capacity(slot_count);
    let mut used_colors = Vec::with_capacity(slot_count);
    let center_shape = [center.shape];
    let center_color = [center.color];

    // Correct slot plus (for match modes) the bait
    let (correct, bait) = match mode {
        MatchMode::Standard => (Some(center), None),
        MatchMode::MatchColor => {
            let correct = pick(&shape_tiers, &center_shape, &[], rng).map(|s| Symbol::new(s, center.color));
            let bait = pick(&color_tiers, &center_color, &[], rng).map(|c| Symbol::new(center.shape, c));
            (correct, bait)
        }
        MatchMode::MatchShape => {
            let correct = pick(&color_tiers, &center_color, &[], rng).map(|c| Symbol::new(center.shape, c));
            let bait = pick(&shape_tiers, &center_shape, &[], rng).map(|s| Symbol::new(s, center.color));
            (correct, bait)
        }
    };

    let Some(correct) = correct else {
        log::warn!("No candidate for the correct slot (center {:?}, {mode:?})", center);
        return RingLayout::default();
    };
    let mut place = |symbol: Symbol, role: SlotRole, slots: &mut Vec<RingAssignment>| {
        used_shapes.push(symbol.shape);
        used_colors.push(symbol.color);
        slots.push(RingAssignment {
            shape: symbol.shape,
            color: symbol.color,
            role,
        });
    };
    place(correct, SlotRole::Correct, &mut slots);
    if slot_count > 1 {
        if let Some(bait) = bait {
            place(bait, SlotRole::Bait, &mut slots);
        }
    }

    // Fillers: hard-exclude whatever would make them correct, avoid repeats
    let shape_forbidden: &[Shape] = if mode == MatchMode::MatchColor { &[] } else { &center_shape };
    let color_forbidden: &[Rgb] = if mode == MatchMode::MatchColor { &center_color } else { &[] };
    while slots.len() < slot_count {
        let shape = pick(&shape_tiers, shape_forbidden, &used_shapes, rng);
        let color = pick(&color_tiers, color_forbidden, &used_colors, rng);
        let (Some(shape), Some(color)) = (shape, color) else {
            log::warn!("Ring filler pool exhausted at {} of {slot_count} slots", slots.len());
            break;
        };
        used_shapes.push(shape);
        used_colors.push(color);
        slots.push(RingAssignment {
            shape,
            color,
            role: SlotRole::Filler,
        });
    }

    slots.shuffle(rng);
    let correct_index = slots
        .iter()
        .position(|s| s.role == SlotRole::Correct)
        .unwrap_or_default();

    RingLayout { slots, correct_index }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn mode_from(i: u8) -> MatchMode {
        match i % 3 {
            0 => MatchMode::Standard,
            1 => MatchMode::MatchColor,
            _ => MatchMode::MatchShape,
        }
    }

    fn theme_from(i: u8) -> SymbolTheme {
        match i % 3 {
            0 => SymbolTheme::Classic,
            1 => SymbolTheme::Cosmic,
            _ => SymbolTheme::Suits,
        }
    }

    proptest! {
        #[test]
        fn prop_exactly_one_correct_slot(
            seed in any::<u64>(),
            shape_idx in 0usize..4,
            color_idx in 0usize..PALETTE.len(),
            mode_idx in 0u8..3,
            theme_idx in 0u8..3,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let theme = theme_from(theme_idx);
            let mode = mode_from(mode_idx);
            let center = Symbol::new(theme.shapes()[shape_idx], PALETTE[color_idx]);

            let layout = build(center, mode, RING_SLOTS, theme, &mut rng);
            prop_assert_eq!(layout.slots.len(), RING_SLOTS);

            let correct: Vec<usize> = layout
                .slots
                .iter()
                .enumerate()
                .filter(|(_, s)| is_correct(s.symbol(), center, mode, center.shape))
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(correct, vec![layout.correct_index]);
            prop_assert_eq!(layout.slots[layout.correct_index].role, SlotRole::Correct);

            let baits = layout.slots.iter().filter(|s| s.role == SlotRole::Bait).count();
            prop_assert_eq!(baits, if mode == MatchMode::Standard { 0 } else { 1 });
        }

        #[test]
        fn prop_remap_target_appears_once(
            seed in any::<u64>(),
            shape_idx in 0usize..4,
            target_offset in 1usize..4,
            theme_idx in 0u8..3,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let theme = theme_from(theme_idx);
            let shapes = theme.shapes();
            let center = Symbol::new(shapes[shape_idx], PALETTE[0]);
            let target = shapes[(shape_idx + target_offset) % 4];

            let layout = build(center, MatchMode::Standard, RING_SLOTS, theme, &mut rng);
            let hits = layout
                .slots
                .iter()
                .filter(|s| is_correct(s.symbol(), center, MatchMode::Standard, target))
                .count();
            prop_assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_standard_slots_are_unique() {
        let mut rng = Pcg32::seed_from_u64(7);
        let center = Symbol::new(Shape::Triangle, PALETTE[2]);
        let layout = build(center, MatchMode::Standard, RING_SLOTS, SymbolTheme::Classic, &mut rng);

        let mut shapes: Vec<_> = layout.slots.iter().map(|s| s.shape).collect();
        shapes.sort_by_key(|s| *s as u8);
        shapes.dedup();
        assert_eq!(shapes.len(), RING_SLOTS);
        assert_eq!(layout.slots[layout.correct_index].symbol(), center);
        assert!(
            layout
                .slots
                .iter()
                .filter(|s| s.role == SlotRole::Filler)
                .all(|s| s.color != center.color)
        );
    }

    #[test]
    fn test_match_color_bait_shares_shape() {
        let mut rng = Pcg32::seed_from_u64(11);
        let center = Symbol::new(Shape::Circle, PALETTE[4]);
        let layout = build(center, MatchMode::MatchColor, RING_SLOTS, SymbolTheme::Classic, &mut rng);

        let bait = layout.slots.iter().find(|s| s.role == SlotRole::Bait).unwrap();
        assert_eq!(bait.shape, center.shape);
        assert_ne!(bait.color, center.color);
        let correct = layout.slots[layout.correct_index];
        assert_ne!(correct.shape, center.shape);
        assert_eq!(correct.color, center.color);
    }

    #[test]
    fn test_match_shape_bait_shares_color() {
        let mut rng = Pcg32::seed_from_u64(13);
        let center = Symbol::new(Shape::Star, PALETTE[1]);
        let layout = build(center, MatchMode::MatchShape, RING_SLOTS, SymbolTheme::Cosmic, &mut rng);

        let bait = layout.slots.iter().find(|s| s.role == SlotRole::Bait).unwrap();
        assert_ne!(bait.shape, center.shape);
        assert_eq!(bait.color, center.color);
    }

    #[test]
    fn test_foreign_center_falls_back_to_default_shapes() {
        // A center outside the theme still yields one correct slot
        let mut rng = Pcg32::seed_from_u64(3);
        let center = Symbol::new(Shape::Heart, PALETTE[0]);
        let layout = build(center, MatchMode::Standard, RING_SLOTS, SymbolTheme::Classic, &mut rng);
        let hits = layout
            .slots
            .iter()
            .filter(|s| is_correct(s.symbol(), center, MatchMode::Standard, center.shape))
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_zero_slots_is_empty() {
        let mut rng = Pcg32::seed_from_u64(1);
        let center = Symbol::new(Shape::Square, PALETTE[0]);
        assert!(build(center, MatchMode::Standard, 0, SymbolTheme::Classic, &mut rng).is_empty());
    }
}
