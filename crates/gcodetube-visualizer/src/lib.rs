//! # gcodetube Visualizer
//!
//! Turns 3D-printer G-code into chunked tube meshes ready for upload.
//! Includes the command interpreter, segment colorizers, the tube chunk
//! mesh builder, and the chunk manager with global and per-layer slicing.

pub mod gcode;
pub mod visualizer;

pub use gcode::{
    ColorRamp, CommandInterpreter, InterpreterEvent, InterpreterState, LineColor, LineColorizer,
    MinMaxValues, PathSample, RampPreset, SegmentColorizer, SegmentMetadata, SimpleColorizer,
    SpeedColorizer, TempColorizer,
};

pub use visualizer::{ChunkManager, LayerRange, TubeChunk, TubeVertex};
