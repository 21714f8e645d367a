//! Symbols: themed shapes and palette colors

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::settings::SymbolTheme;

/// Shape identifier across all themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    // Classic
    Triangle,
    Square,
    Circle,
    Diamond,
    // Cosmic
    Star,
    Moon,
    Sun,
    Comet,
    // Suits
    Heart,
    Spade,
    Club,
    Gem,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Triangle => "triangle",
            Shape::Square => "square",
            Shape::Circle => "circle",
            Shape::Diamond => "diamond",
            Shape::Star => "star",
            Shape::Moon => "moon",
            Shape::Sun => "sun",
            Shape::Comet => "comet",
            Shape::Heart => "heart",
            Shape::Spade => "spade",
            Shape::Club => "club",
            Shape::Gem => "gem",
        }
    }
}

/// Shapes used when a theme can't supply enough distinct ones
pub const DEFAULT_SHAPES: [Shape; 4] = [Shape::Triangle, Shape::Square, Shape::Circle, Shape::Diamond];

impl SymbolTheme {
    /// The four shapes drawn for this theme
    pub fn shapes(&self) -> [Shape; 4] {
        match self {
            SymbolTheme::Classic => DEFAULT_SHAPES,
            SymbolTheme::Cosmic => [Shape::Star, Shape::Moon, Shape::Sun, Shape::Comet],
            SymbolTheme::Suits => [Shape::Heart, Shape::Spade, Shape::Club, Shape::Gem],
        }
    }
}

/// 3-channel symbol color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized 0-1 channels for blending/rendering
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }
}

/// Symbol colors
pub const PALETTE: [Rgb; 6] = [
    Rgb::from_rgb(0xef, 0x44, 0x44), // red
    Rgb::from_rgb(0xf9, 0x73, 0x16), // orange
    Rgb::from_rgb(0xfa, 0xcc, 0x15), // yellow
    Rgb::from_rgb(0x22, 0xc5, 0x5e), // green
    Rgb::from_rgb(0x3b, 0x82, 0xf6), // blue
    Rgb::from_rgb(0xa8, 0x55, 0xf7), // violet
];

/// A shape + color pair (the center prompt, or a ring slot's face)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub shape: Shape,
    pub color: Rgb,
}

impl Symbol {
    pub const fn new(shape: Shape, color: Rgb) -> Self {
        Self { shape, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_themes_have_distinct_shapes() {
        for theme in [SymbolTheme::Classic, SymbolTheme::Cosmic, SymbolTheme::Suits] {
            let shapes = theme.shapes();
            for (i, a) in shapes.iter().enumerate() {
                assert!(shapes[i + 1..].iter().all(|b| b != a), "{theme:?} repeats {a:?}");
            }
        }
    }

    #[test]
    fn test_color_vec3_is_normalized() {
        assert_eq!(Rgb::from_rgb(255, 0, 51).to_vec3(), Vec3::new(1.0, 0.0, 0.2));
        for color in PALETTE {
            let v = color.to_vec3();
            assert!(v.min_element() >= 0.0 && v.max_element() <= 1.0);
        }
    }
}
