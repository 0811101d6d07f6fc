//! # gcodetube Core
//!
//! Core types shared across gcodetube.
//! Provides the path point and color models, the tube configuration,
//! and the error hierarchy used by every other crate.

pub mod config;
pub mod data;
pub mod error;

pub use config::{LayerDetection, TubeConfig};
pub use data::{BoundingBox, Color, PathPoint, Units};
pub use error::{Error, GcodeError, MeshError, Result};

// Re-exported so dependents agree on the vector type
pub use glam::Vec3;
