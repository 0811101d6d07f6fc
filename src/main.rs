use anyhow::{bail, Context};
use gcodetube::{init_logging, ChunkManager, Config, SettingsPersistence};
use std::path::PathBuf;
use tracing::info;

const USAGE: &str = "usage: gcodetube <file.gcode> [config.toml|config.json]";

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(SettingsPersistence::load_or_default()?.into_config()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(gcode_path) = args.next() else {
        bail!(USAGE);
    };
    let config = load_config(args.next())?;

    init_logging(&config.logging)?;

    let source = tokio::fs::read_to_string(&gcode_path)
        .await
        .with_context(|| format!("failed to read {}", gcode_path.display()))?;
    info!(
        "Loaded {} ({} bytes)",
        gcode_path.display(),
        source.len()
    );

    let mut manager = ChunkManager::new(source, config.tube)?;
    manager
        .parse()
        .await
        .with_context(|| format!("failed to interpret {}", gcode_path.display()))?;

    let min_max = manager.min_max_values();
    info!(
        points = manager.points_count(),
        chunks = manager.chunks().len(),
        layers = manager.layer_count(),
        indices = manager.index_count(),
        "Tube mesh built"
    );
    if let Some(bounds) = manager.bounds() {
        info!(
            min = ?bounds.min,
            max = ?bounds.max,
            size = ?bounds.size(),
            "Extrusion bounds"
        );
    }
    info!(
        min_speed = ?min_max.min_speed,
        max_speed = min_max.max_speed,
        min_temp = ?min_max.min_temp,
        max_temp = min_max.max_temp,
        "Speed and temperature ranges"
    );

    Ok(())
}
