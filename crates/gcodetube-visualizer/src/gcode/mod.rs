//! G-Code interpretation
//!
//! This module provides:
//! - Line tokenising and layer marker detection
//! - The command interpreter (machine state and path points)
//! - Segment colorizers
//! - Feed rate and temperature range scanning

pub mod colorizer;
pub mod command;
pub mod metadata;
pub mod parser;

pub use colorizer::{
    ColorRamp, LineColor, LineColorizer, RampPreset, SegmentColorizer, SegmentMetadata,
    SimpleColorizer, SpeedColorizer, TempColorizer,
};
pub use command::{CommandCode, GcodeLine, Operand};
pub use metadata::MinMaxValues;
pub use parser::{AxisModes, CommandInterpreter, InterpreterEvent, InterpreterState, PathSample};
