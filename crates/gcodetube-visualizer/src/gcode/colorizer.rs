//! Segment colorizers
//!
//! The interpreter asks a colorizer for the color of every segment it emits.
//! Calls arrive in non-decreasing line order, which lets stateful colorizers
//! walk their tables forward only.

use gcodetube_core::{Color, Vec3};
use serde::{Deserialize, Serialize};

use super::metadata::MinMaxValues;

/// Default segment color (#29BEB0)
pub const DEFAULT_COLOR: u32 = 0x29BEB0;

/// Everything known about a segment when it is colored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentMetadata {
    pub segment_start: Vec3,
    pub segment_end: Vec3,
    pub radius: f32,
    /// Feed rate in effect for the move
    pub speed: f64,
    /// Hot-end temperature in effect for the move
    pub temperature: f64,
    pub line_number: usize,
}

/// Picks a color for each emitted segment
pub trait SegmentColorizer {
    fn color(&mut self, segment: &SegmentMetadata) -> Color;
}

/// One color for every segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleColorizer {
    color: Color,
}

impl SimpleColorizer {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Default for SimpleColorizer {
    fn default() -> Self {
        Self::new(Color::from_hex(DEFAULT_COLOR))
    }
}

impl SegmentColorizer for SimpleColorizer {
    fn color(&mut self, _segment: &SegmentMetadata) -> Color {
        self.color
    }
}

/// Color applied up to and including `to_line`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineColor {
    pub to_line: usize,
    pub color: Color,
}

/// Colors line ranges from an ordered table
///
/// Each line gets the color of the first entry whose `to_line` is not below
/// it. Lines past the last entry get the default color.
#[derive(Debug, Clone, PartialEq)]
pub struct LineColorizer {
    entries: Vec<LineColor>,
    cursor: usize,
    default_color: Color,
}

impl LineColorizer {
    /// Build from entries sorted by `to_line`
    pub fn new(entries: Vec<LineColor>) -> Self {
        Self::with_default(entries, Color::from_hex(DEFAULT_COLOR))
    }

    pub fn with_default(entries: Vec<LineColor>, default_color: Color) -> Self {
        debug_assert!(
            entries.windows(2).all(|pair| pair[0].to_line <= pair[1].to_line),
            "LineColorizer entries must be sorted by to_line"
        );
        Self {
            entries,
            cursor: 0,
            default_color,
        }
    }
}

impl SegmentColorizer for LineColorizer {
    fn color(&mut self, segment: &SegmentMetadata) -> Color {
        while self
            .entries
            .get(self.cursor)
            .is_some_and(|entry| entry.to_line < segment.line_number)
        {
            self.cursor += 1;
        }

        self.entries
            .get(self.cursor)
            .map_or(self.default_color, |entry| entry.color)
    }
}

/// Named color gradients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RampPreset {
    #[default]
    CoolToWarm,
    Rainbow,
}

impl RampPreset {
    fn stops(self) -> &'static [(f32, u32)] {
        match self {
            RampPreset::CoolToWarm => &[
                (0.0, 0x3C4EC2),
                (0.2, 0x9BBCFF),
                (0.5, 0xDCDCDC),
                (0.8, 0xF6A385),
                (1.0, 0xB40426),
            ],
            RampPreset::Rainbow => &[
                (0.0, 0x0000FF),
                (0.2, 0x00FFFF),
                (0.5, 0x00FF00),
                (0.8, 0xFFFF00),
                (1.0, 0xFF0000),
            ],
        }
    }
}

/// Piecewise-linear gradient mapping a value range onto colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    preset: RampPreset,
    min: f64,
    max: f64,
}

impl ColorRamp {
    pub fn new(preset: RampPreset, min: f64, max: f64) -> Self {
        Self { preset, min, max }
    }

    /// Color for `value`; values outside the range are clamped
    ///
    /// An empty range samples the bottom of the ramp.
    pub fn sample(&self, value: f64) -> Color {
        let span = self.max - self.min;
        let t = if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };

        let stops = self.preset.stops();
        let upper = stops
            .iter()
            .position(|(at, _)| *at >= t)
            .unwrap_or(stops.len() - 1)
            .max(1);
        let (from_at, from_hex) = stops[upper - 1];
        let (to_at, to_hex) = stops[upper];
        let local = (t - from_at) / (to_at - from_at);

        Color::from_hex(from_hex).lerp(Color::from_hex(to_hex), local)
    }
}

/// Colors segments by feed rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedColorizer {
    ramp: ColorRamp,
}

impl SpeedColorizer {
    pub fn new(preset: RampPreset, min_speed: f64, max_speed: f64) -> Self {
        Self {
            ramp: ColorRamp::new(preset, min_speed, max_speed),
        }
    }

    /// Calibrate against the feed rates found by a metadata scan
    pub fn from_values(preset: RampPreset, values: &MinMaxValues) -> Self {
        Self::new(preset, values.min_speed.unwrap_or(0.0), values.max_speed)
    }
}

impl SegmentColorizer for SpeedColorizer {
    fn color(&mut self, segment: &SegmentMetadata) -> Color {
        self.ramp.sample(segment.speed)
    }
}

/// Colors segments by hot-end temperature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempColorizer {
    ramp: ColorRamp,
}

impl TempColorizer {
    pub fn new(preset: RampPreset, min_temp: f64, max_temp: f64) -> Self {
        Self {
            ramp: ColorRamp::new(preset, min_temp, max_temp),
        }
    }

    /// Calibrate against the temperatures found by a metadata scan
    pub fn from_values(preset: RampPreset, values: &MinMaxValues) -> Self {
        Self::new(preset, values.min_temp.unwrap_or(0.0), values.max_temp)
    }
}

impl SegmentColorizer for TempColorizer {
    fn color(&mut self, segment: &SegmentMetadata) -> Color {
        self.ramp.sample(segment.temperature)
    }
}
