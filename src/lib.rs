//! # gcodetube
//!
//! Turns a G-code toolpath into renderable tube geometry:
//! - Interprets motion, unit, positioning and temperature commands
//! - Builds tubes whose radius follows the extruded volume
//! - Splits the geometry into chunks sized for a single draw call
//! - Slices the visible part of the print by point index or by layer
//!
//! ## Architecture
//!
//! 1. **gcodetube-core** - Points, colors, bounds, tube configuration and errors
//! 2. **gcodetube-visualizer** - G-code interpreter, colorizers, tube chunks, chunk manager
//! 3. **gcodetube-settings** - Configuration files and per-user persistence
//! 4. **gcodetube** - Binary that loads a file and reports the resulting mesh

pub use gcodetube_core::{
    BoundingBox, Color, Error, GcodeError, LayerDetection, MeshError, PathPoint, Result,
    TubeConfig, Units,
};
pub use gcodetube_settings::{Config, LogFormat, LoggingSettings, SettingsPersistence};
pub use gcodetube_visualizer::{
    ChunkManager, ColorRamp, LayerRange, LineColor, LineColorizer, MinMaxValues, RampPreset,
    SegmentColorizer, SimpleColorizer, SpeedColorizer, TempColorizer, TubeChunk, TubeVertex,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging from the logging settings
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))?;

    match settings.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}
