//! G-Code interpreter and machine state tracking
//!
//! Walks a command stream line by line and turns motion commands into path
//! points. The interpreter is a lazy iterator: nothing is read until the
//! consumer asks for the next event.

use glam::DVec3;
use gcodetube_core::{BoundingBox, GcodeError, PathPoint, Units, Vec3};
use tracing::{debug, trace};

use super::colorizer::{SegmentColorizer, SegmentMetadata};
use super::command::{layer_marker, CommandCode, GcodeLine, Operand};

/// Per-axis distance mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisModes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
    /// Extrusion axis; also switched on its own by M82/M83
    pub e: bool,
}

impl AxisModes {
    fn all(relative: bool) -> Self {
        Self {
            x: relative,
            y: relative,
            z: relative,
            e: relative,
        }
    }
}

/// Machine state carried from line to line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpreterState {
    /// Last absolute position
    pub position: DVec3,
    /// Last absolute extrusion value
    pub extrusion: f64,
    /// Last feed rate
    pub feed_rate: f64,
    /// Hot-end temperature
    pub temperature: f64,
    /// Which axes are in relative mode
    pub relative: AxisModes,
}

impl Default for InterpreterState {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            extrusion: 0.0,
            feed_rate: 0.0,
            temperature: 0.0,
            relative: AxisModes::default(),
        }
    }
}

/// A point together with what the interpreter knew when emitting it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    /// The point at the start of the segment
    pub point: PathPoint,
    /// Where the segment ends
    pub segment_end: Vec3,
    /// Extent of all extruding segments so far
    pub bounds: Option<BoundingBox>,
}

impl PathSample {
    pub fn line_number(&self) -> usize {
        self.point.line_number
    }
}

/// What the interpreter produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpreterEvent {
    /// A motion with non-zero length
    Segment(PathSample),
    /// A `;LAYER:<n>` marker
    LayerMarker { layer: i64, line_number: usize },
}

/// Lazy, single-pass interpreter over G-Code text
///
/// Yields one event per emitted segment or layer marker. After the first
/// error the iterator is exhausted.
pub struct CommandInterpreter<'a, C: SegmentColorizer + ?Sized> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    state: InterpreterState,
    colorizer: &'a mut C,
    travel_width: f32,
    bounds: Option<BoundingBox>,
    pending: Option<InterpreterEvent>,
    failed: bool,
}

impl<'a, C: SegmentColorizer + ?Sized> CommandInterpreter<'a, C> {
    /// Create an interpreter over `text`
    pub fn new(text: &'a str, colorizer: &'a mut C, travel_width: f32) -> Self {
        debug!(
            "Starting G-code interpretation, input size: {} bytes",
            text.len()
        );
        Self {
            lines: text.lines().enumerate(),
            state: InterpreterState::default(),
            colorizer,
            travel_width,
            bounds: None,
            pending: None,
            failed: false,
        }
    }

    /// Current machine state
    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    /// Extent of all extruding segments read so far
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    fn interpret_line(
        &mut self,
        line_number: usize,
        raw: &str,
    ) -> Result<Option<PathSample>, GcodeError> {
        let Some(line) = GcodeLine::parse(raw) else {
            return Ok(None);
        };

        match line.code {
            CommandCode::Rapid | CommandCode::Linear => self.motion(&line, line_number, raw),
            CommandCode::SetPosition => {
                let position = self.state.position;
                self.state.position = DVec3::new(
                    line.value_or('X', position.x),
                    line.value_or('Y', position.y),
                    line.value_or('Z', position.z),
                );
                self.state.extrusion = line.value_or('E', self.state.extrusion);
                Ok(None)
            }
            CommandCode::SetTemperature | CommandCode::WaitTemperature => {
                self.state.temperature = line.value_or('S', 0.0);
                Ok(None)
            }
            CommandCode::Absolute => {
                self.state.relative = AxisModes::all(false);
                Ok(None)
            }
            CommandCode::Relative => {
                self.state.relative = AxisModes::all(true);
                Ok(None)
            }
            CommandCode::ExtruderAbsolute => {
                self.state.relative.e = false;
                Ok(None)
            }
            CommandCode::ExtruderRelative => {
                self.state.relative.e = true;
                Ok(None)
            }
            CommandCode::Millimeters => Ok(None),
            CommandCode::Inches => Err(GcodeError::UnsupportedUnitSystem {
                line_number,
                units: Units::Inches,
                line: raw.to_string(),
            }),
            CommandCode::Other => Ok(None),
        }
    }

    fn motion(
        &mut self,
        line: &GcodeLine<'_>,
        line_number: usize,
        raw: &str,
    ) -> Result<Option<PathSample>, GcodeError> {
        let axis = |letter: char, last: f64, relative: bool| match line.operand(letter) {
            Operand::Absent => Ok(last),
            Operand::Value(value) if relative => Ok(last + value),
            Operand::Value(value) => Ok(value),
            Operand::Malformed => Err(GcodeError::MalformedOperand {
                line_number,
                operand: letter,
                line: raw.to_string(),
            }),
        };

        let start = self.state.position;
        let modes = self.state.relative;
        let end = DVec3::new(
            axis('X', start.x, modes.x)?,
            axis('Y', start.y, modes.y)?,
            axis('Z', start.z, modes.z)?,
        );
        let extrusion = axis('E', self.state.extrusion, modes.e)?;
        let feed_rate = line.value_or('F', self.state.feed_rate);

        let last_extrusion = self.state.extrusion;
        self.state.position = end;
        self.state.extrusion = extrusion;
        self.state.feed_rate = feed_rate;

        let length = start.distance(end);
        if length == 0.0 {
            trace!("Line {}: zero-length move skipped", line_number);
            return Ok(None);
        }

        let extruded = ((extrusion - last_extrusion) / length * 10.0).max(0.0) as f32;
        let radius = if extruded == 0.0 {
            self.travel_width
        } else {
            let end = end.as_vec3();
            match self.bounds.as_mut() {
                Some(bounds) => bounds.include(end),
                None => self.bounds = Some(BoundingBox::from_point(end)),
            }
            extruded
        };

        let color = self.colorizer.color(&SegmentMetadata {
            segment_start: start.as_vec3(),
            segment_end: end.as_vec3(),
            radius,
            speed: feed_rate,
            temperature: self.state.temperature,
            line_number,
        });

        Ok(Some(PathSample {
            point: PathPoint::new(start.as_vec3(), radius, color, line_number),
            segment_end: end.as_vec3(),
            bounds: self.bounds,
        }))
    }
}

impl<C: SegmentColorizer + ?Sized> Iterator for CommandInterpreter<'_, C> {
    type Item = Result<InterpreterEvent, GcodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.take() {
            return Some(Ok(event));
        }
        if self.failed {
            return None;
        }

        while let Some((line_number, raw)) = self.lines.next() {
            let marker = layer_marker(raw);
            let segment = match self.interpret_line(line_number, raw) {
                Ok(segment) => segment.map(InterpreterEvent::Segment),
                Err(err) => {
                    debug!("G-code interpretation aborted: {}", err);
                    self.failed = true;
                    return Some(Err(err));
                }
            };

            match (marker, segment) {
                (Some(layer), segment) => {
                    self.pending = segment;
                    return Some(Ok(InterpreterEvent::LayerMarker { layer, line_number }));
                }
                (None, Some(segment)) => return Some(Ok(segment)),
                (None, None) => {}
            }
        }

        None
    }
}
