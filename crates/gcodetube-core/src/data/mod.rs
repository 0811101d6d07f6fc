//! Data models shared by the interpreter and the mesh builder
//!
//! This module provides:
//! - Unit systems a command stream can switch to
//! - RGB colors
//! - Path points (one per rendered segment)
//! - Axis-aligned bounding boxes

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate unit system selected by G20/G21
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Millimetres, the only system the interpreter works in
    #[default]
    Millimeters,
    /// Inches
    Inches,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Millimeters => write!(f, "millimetre"),
            Units::Inches => write!(f, "inch"),
        }
    }
}

/// Linear RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    /// Create a color from components
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parse a `#RRGGBB` (or `RRGGBB`) string
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    /// Linear blend towards `other`; `t` is clamped to `0.0..=1.0`
    pub fn lerp(self, other: Color, t: f32) -> Self {
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One sample along the extruded path
///
/// Produced by the interpreter for every motion with a non-zero length. The
/// position is where the segment starts; the radius and color describe the
/// segment that leaves it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    /// Position in millimetres
    pub position: Vec3,
    /// Tube radius, never negative
    pub radius: f32,
    /// Segment color
    pub color: Color,
    /// Zero-based source line of the motion command
    pub line_number: usize,
}

impl PathPoint {
    pub fn new(position: Vec3, radius: f32, color: Color, line_number: usize) -> Self {
        debug_assert!(radius >= 0.0, "PathPoint radius must not be negative: {radius}");
        Self {
            position,
            radius,
            color,
            line_number,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Degenerate box around a single point
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grow the box to contain `point`
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Smallest box containing both boxes
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_display() {
        assert_eq!(Units::Millimeters.to_string(), "millimetre");
        assert_eq!(Units::Inches.to_string(), "inch");
    }

    #[test]
    fn test_color_parse_hex() {
        let teal = Color::parse_hex("#29BEB0").unwrap();
        assert!((teal.r - 41.0 / 255.0).abs() < 1e-6);
        assert!((teal.g - 190.0 / 255.0).abs() < 1e-6);
        assert!((teal.b - 176.0 / 255.0).abs() < 1e-6);
        assert_eq!(Color::parse_hex("ff0000"), Some(Color::new(1.0, 0.0, 0.0)));
        assert_eq!(Color::parse_hex("#12345"), None);
        assert_eq!(Color::parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_color_lerp_clamps() {
        let black = Color::new(0.0, 0.0, 0.0);
        let mid = black.lerp(Color::WHITE, 0.5);
        assert_eq!(mid, Color::new(0.5, 0.5, 0.5));
        assert_eq!(black.lerp(Color::WHITE, 4.0), Color::WHITE);
    }

    #[test]
    fn test_bounding_box_include() {
        let mut bounds = BoundingBox::from_point(Vec3::new(1.0, 2.0, 3.0));
        bounds.include(Vec3::new(-1.0, 5.0, 0.0));

        assert_eq!(bounds.min, Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 5.0, 3.0));
        assert_eq!(bounds.size(), Vec3::new(2.0, 3.0, 3.0));
        assert!(bounds.contains(Vec3::new(0.0, 3.0, 1.0)));
        assert!(!bounds.contains(Vec3::new(0.0, 6.0, 1.0)));
    }
}
