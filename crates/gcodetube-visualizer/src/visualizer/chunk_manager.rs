//! # Chunk Manager
//!
//! Drives the interpreter over a whole file and routes the resulting points
//! into bounded tube chunks. Every chunk after the first starts with a copy
//! of the previous chunk's last point so the tube stays continuous across
//! chunk boundaries.
//!
//! Slicing works in global point space and is translated into a local
//! window per chunk.

use std::time::Instant;

use gcodetube_core::{BoundingBox, LayerDetection, MeshError, Result, TubeConfig};
use tracing::{debug, info};

use super::layers::{LayerKey, LayerRange, LayerTable};
use super::tube_chunk::TubeChunk;
use crate::gcode::{
    CommandInterpreter, InterpreterEvent, MinMaxValues, SegmentColorizer, SimpleColorizer,
};

/// Owns the chunks built from one G-Code file
pub struct ChunkManager {
    source: String,
    config: TubeConfig,
    colorizer: Box<dyn SegmentColorizer + Send>,
    chunks: Vec<TubeChunk>,
    layers: LayerTable,
    bounds: Option<BoundingBox>,
    min_max: MinMaxValues,
}

impl ChunkManager {
    /// Prepare `source` for parsing
    ///
    /// Scans the feed rate and temperature ranges right away so a ramp
    /// colorizer can be calibrated before [`parse`](Self::parse).
    pub fn new(source: impl Into<String>, config: TubeConfig) -> Result<Self> {
        config.validate()?;
        let source = source.into();
        let min_max = MinMaxValues::scan(&source);

        Ok(Self {
            source,
            config,
            colorizer: Box::new(SimpleColorizer::default()),
            chunks: Vec::new(),
            layers: LayerTable::new(),
            bounds: None,
            min_max,
        })
    }

    /// Replace the colorizer used by the next parse
    pub fn set_colorizer(&mut self, colorizer: impl SegmentColorizer + Send + 'static) {
        self.colorizer = Box::new(colorizer);
    }

    /// Builder form of [`set_colorizer`](Self::set_colorizer)
    pub fn with_colorizer(mut self, colorizer: impl SegmentColorizer + Send + 'static) -> Self {
        self.set_colorizer(colorizer);
        self
    }

    /// Interpret the source and build all chunks
    ///
    /// Yields to the runtime every `yield_interval` points. The source text
    /// is released once parsing starts. Any interpreter error aborts the parse
    /// and leaves the manager without chunks.
    pub async fn parse(&mut self) -> Result<()> {
        let source = std::mem::take(&mut self.source);
        let started = Instant::now();
        info!("Parsing G-code: {} bytes", source.len());

        self.chunks.clear();
        self.layers.clear();
        self.bounds = None;

        let radial_segments = self.config.radial_segments;
        let per_chunk = self.config.points_per_chunk;
        let yield_interval = self.config.yield_interval;
        let detection = self.config.layer_detection;

        let mut chunks = Vec::new();
        let mut layers = LayerTable::new();
        let mut bounds = None;
        let mut current = TubeChunk::new(radial_segments)?;
        let mut count = 0usize;

        let interpreter = CommandInterpreter::new(
            &source,
            self.colorizer.as_mut(),
            self.config.travel_width,
        );

        for event in interpreter {
            match event? {
                InterpreterEvent::LayerMarker { layer, line_number } => {
                    if detection == LayerDetection::Marker {
                        debug!("Layer {} starts at point {} (line {})", layer, count, line_number);
                        layers.transition(None, LayerKey::Marker(layer), count);
                    }
                }
                InterpreterEvent::Segment(sample) => {
                    if count > 0 && count % per_chunk == 0 {
                        current.finish_towards(sample.point.position);
                        let next = TubeChunk::continue_from(&current)?;
                        chunks.push(std::mem::replace(&mut current, next));
                        debug!("Started chunk {} at point {}", chunks.len(), count);
                    }

                    current.add(sample.point)?;
                    count += 1;
                    bounds = sample.bounds;

                    let (from_z, to_z) = (sample.point.position.z, sample.segment_end.z);
                    if detection == LayerDetection::Height && from_z != to_z {
                        layers.transition(
                            Some(LayerKey::height(from_z)),
                            LayerKey::height(to_z),
                            count,
                        );
                    }

                    if count % yield_interval == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            }
        }

        current.finish();
        chunks.push(current);
        layers.finalize(count);

        self.chunks = chunks;
        self.layers = layers;
        self.bounds = bounds;

        info!(
            "Parsed {} points into {} chunks and {} layers in {:?}",
            count,
            self.chunks.len(),
            self.layers.layers().len(),
            started.elapsed()
        );
        Ok(())
    }

    /// Show only global points `start..end`
    ///
    /// Missing bounds default to the whole model. Negative bounds are
    /// rejected before any chunk is touched; an empty or inverted range
    /// hides everything.
    pub fn slice(&mut self, start: Option<i64>, end: Option<i64>) -> Result<()> {
        if start.is_some_and(|v| v < 0) || end.is_some_and(|v| v < 0) {
            return Err(MeshError::InvalidSliceRange { start, end }.into());
        }

        let total = self.points_count();
        let start = start.map_or(0, |v| v as usize);
        let end = end.map_or(total, |v| (v as usize).min(total));
        let per_chunk = self.config.points_per_chunk;

        if start >= end {
            for chunk in &mut self.chunks {
                chunk.slice(Some(0), Some(0))?;
            }
            debug!("Slice {}..{} is empty", start, end);
            return Ok(());
        }

        let object_start = start / per_chunk;
        let object_end = end.div_ceil(per_chunk) - 1;

        for (i, chunk) in self.chunks.iter_mut().enumerate() {
            if i < object_start || i > object_end {
                chunk.slice(Some(0), Some(0))?;
                continue;
            }

            // chunks after the first hold the continuity point in slot 0
            let base = i * per_chunk;
            let offset = usize::from(i > 0);
            let from = (i == object_start).then(|| (start - base + offset) as i64);
            let to = (i == object_end).then(|| (end - base + offset) as i64);
            chunk.slice(from, to)?;
        }

        debug!(
            "Sliced {}..{} over chunks {}..={}",
            start, end, object_start, object_end
        );
        Ok(())
    }

    /// Show only layers `start_layer..=end_layer`
    ///
    /// Unknown layer indices fall back to the start or end of the model.
    pub fn slice_by_layer(
        &mut self,
        start_layer: Option<usize>,
        end_layer: Option<usize>,
    ) -> Result<()> {
        let start = start_layer
            .and_then(|index| self.layers.get(index))
            .map(|layer| layer.start as i64);
        let end = end_layer
            .and_then(|index| self.layers.get(index))
            .map(|layer| layer.end as i64 + 1);
        self.slice(start, end)
    }

    /// Number of distinct points across all chunks
    pub fn points_count(&self) -> usize {
        let total: usize = self.chunks.iter().map(TubeChunk::points_count).sum();
        total.saturating_sub(self.chunks.len().saturating_sub(1))
    }

    /// Number of layers, not counting the leading entry
    pub fn layer_count(&self) -> usize {
        self.layers.layer_count()
    }

    /// Layer ranges in global point space, sorted by start
    pub fn layers(&self) -> &[LayerRange] {
        self.layers.layers()
    }

    pub fn chunks(&self) -> &[TubeChunk] {
        &self.chunks
    }

    /// Total indices currently selected across all chunks
    pub fn index_count(&self) -> usize {
        self.chunks.iter().map(TubeChunk::index_count).sum()
    }

    /// Extent of all extruding segments
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Feed rate and temperature ranges of the source
    pub fn min_max_values(&self) -> MinMaxValues {
        self.min_max
    }

    pub fn config(&self) -> &TubeConfig {
        &self.config
    }

    /// Release every chunk and the layer table
    pub fn dispose(&mut self) {
        for chunk in &mut self.chunks {
            chunk.dispose();
        }
        self.chunks.clear();
        self.layers.clear();
        self.source = String::new();
        self.bounds = None;
        debug!("Chunk manager disposed");
    }
}
