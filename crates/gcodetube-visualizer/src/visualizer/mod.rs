//! Tube mesh generation
//!
//! This module provides:
//! - Tube chunk meshes (rings, walls, caps, windowed indices)
//! - Layer bookkeeping in global point space
//! - The chunk manager that ties interpretation and meshing together

pub mod chunk_manager;
pub mod layers;
pub mod tube_chunk;

pub use chunk_manager::ChunkManager;
pub use layers::{LayerKey, LayerRange, LayerTable};
pub use tube_chunk::{TubeChunk, TubeVertex};
