//! Logical per-frame draw data
//!
//! Field coordinates: origin at the play-field center, +Y up, one unit is the
//! field's short side. Colors are 0-1 RGB. The surface decides pixels.

use glam::{Vec2, Vec3};

use crate::polar_to_cartesian;
use crate::sim::bonus::BonusStage;
use crate::sim::layout::SLOT_ANGLES;
use crate::sim::mechanics::MechanicBanner;
use crate::sim::name_entry::{Key, NameEntry};
use crate::sim::{GamePhase, GameState, Shape, Symbol};

/// Symbol size as a fraction of the ring radius (before `symbol_scale`)
const SYMBOL_SIZE_FRACTION: f32 = 0.34;

/// One symbol to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolSprite {
    pub shape: Shape,
    pub color: Vec3,
    pub position: Vec2,
    /// Half-extent in field units
    pub size: f32,
    /// Outline width in pixels (from settings)
    pub stroke: f32,
    pub opacity: f32,
}

impl SymbolSprite {
    fn new(symbol: Symbol, position: Vec2, size: f32, stroke: f32, opacity: f32) -> Self {
        Self {
            shape: symbol.shape,
            color: symbol.color.to_vec3(),
            position,
            size,
            stroke,
            opacity,
        }
    }
}

/// Name entry overlay
#[derive(Debug, Clone, PartialEq)]
pub struct NameEntryView {
    pub text: String,
    /// Letter-slot cursor or keyboard key label
    pub highlight: String,
    pub rank: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudView {
    pub score: u64,
    pub time_remaining: f32,
    /// 0-1 of the session length
    pub time_ratio: f32,
    pub streak: u32,
    pub multiplier: u64,
    pub bonus_stage: BonusStage,
    pub bonus_fill: f32,
    pub bonus_tint: Vec3,
    pub banners: Vec<MechanicBanner>,
    /// Unlocked mechanic count while a level-up notice waits for confirm
    pub level_up: Option<usize>,
    pub paused: bool,
}

/// Everything a surface needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub phase: GamePhase,
    pub ring_radius: f32,
    /// Cosmetic spin; input mapping ignores it
    pub ring_rotation: f32,
    /// For motion blur
    pub ring_angular_velocity: f32,
    pub center: SymbolSprite,
    /// Indexed by slot
    pub ring: Vec<SymbolSprite>,
    pub hud: HudView,
    pub name_entry: Option<NameEntryView>,
    pub particle_count: u32,
    pub ray_count: u32,
}

fn key_label(key: Key) -> String {
    match key {
        Key::Char(c) => c.to_string(),
        Key::Delete => "DEL".to_string(),
        Key::End => "END".to_string(),
    }
}

fn name_entry_view(entry: &NameEntry, rank: Option<usize>) -> NameEntryView {
    let highlight = match entry {
        NameEntry::Letters { cursor, .. } => format!("slot {}", cursor + 1),
        NameEntry::Keyboard { .. } => entry.highlighted_key().map(key_label).unwrap_or_default(),
    };
    NameEntryView {
        text: entry.current(),
        highlight,
        rank,
    }
}

impl FrameView {
    pub fn build(state: &GameState) -> Self {
        let settings = &state.settings;
        let ring_radius = settings.ring_radius_factor;
        let size = ring_radius * SYMBOL_SIZE_FRACTION * settings.symbol_scale;
        let stroke = settings.symbol_stroke;

        let visual = state.anim.center_visual();
        let center = SymbolSprite::new(
            state.puzzle.center,
            visual.offset * ring_radius,
            size * visual.scale,
            stroke,
            visual.opacity,
        );

        let rotation = state.anim.ring_rotation();
        let veil = if state.memory.is_hidden() { 0.0 } else { 1.0 };
        let ring = state
            .puzzle
            .ring
            .slots
            .iter()
            .zip(SLOT_ANGLES)
            .map(|(slot, angle)| {
                let position = polar_to_cartesian(ring_radius, angle + rotation);
                SymbolSprite::new(slot.symbol(), position, size, stroke, veil)
            })
            .collect();

        let hud = HudView {
            score: state.score,
            time_remaining: state.timer.remaining,
            time_ratio: state.timer.time_ratio(),
            streak: state.streak,
            multiplier: state.multiplier(),
            bonus_stage: state.bonus.stage(),
            bonus_fill: state.bonus.ratio(),
            bonus_tint: state.bonus.tint,
            banners: state.scheduler.active().iter().map(|m| m.banner()).collect(),
            level_up: state.level_up.as_ref().map(|n| n.unlocked),
            paused: state.pause.is_paused(),
        };

        Self {
            phase: state.phase,
            ring_radius,
            ring_rotation: rotation,
            ring_angular_velocity: state.anim.ring_angular_velocity(),
            center,
            ring,
            hud,
            name_entry: state
                .name_entry
                .as_ref()
                .map(|e| name_entry_view(e, state.pending_placement)),
            particle_count: settings.particle_count,
            ray_count: settings.ray_count,
        }
    }
}
