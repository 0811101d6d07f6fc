//! Layer boundary bookkeeping in global point space

use std::collections::HashMap;

use tracing::debug;

/// Identity of a layer while the stream is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKey {
    /// Index carried by a `;LAYER:<n>` marker
    Marker(i64),
    /// Z height (bit pattern of the `f32`)
    Height(u32),
}

impl LayerKey {
    pub fn height(z: f32) -> Self {
        // fold -0.0 into 0.0 so both land on the same layer
        LayerKey::Height((z + 0.0).to_bits())
    }
}

/// Inclusive range of global point indices belonging to one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerRange {
    pub start: usize,
    pub end: usize,
}

/// Layer table built while points are routed into chunks
#[derive(Debug, Clone, Default)]
pub struct LayerTable {
    entries: HashMap<LayerKey, LayerRange>,
    open: Option<LayerKey>,
    layers: Vec<LayerRange>,
}

impl LayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the open layer (or `from`, when given) and open `to`
    ///
    /// `next_point` is the global index the next point will get. The closed
    /// layer ends just before it, the opened one starts at it. Reopening a key
    /// moves its start.
    pub fn transition(&mut self, from: Option<LayerKey>, to: LayerKey, next_point: usize) {
        if let Some(closing) = from.or(self.open) {
            self.entries.entry(closing).or_default().end = next_point.saturating_sub(1);
        }
        self.entries.entry(to).or_default().start = next_point;
        self.open = Some(to);
    }

    /// Sort the layers by start and end the last one at `points_count - 1`
    pub fn finalize(&mut self, points_count: usize) {
        let mut layers: Vec<LayerRange> = self.entries.values().copied().collect();
        layers.sort_by_key(|layer| layer.start);
        if let Some(last) = layers.last_mut() {
            last.end = points_count.saturating_sub(1);
        }
        debug!("Layer table finalized with {} entries", layers.len());
        self.layers = layers;
    }

    /// Finalized layers, sorted by start
    pub fn layers(&self) -> &[LayerRange] {
        &self.layers
    }

    pub fn get(&self, index: usize) -> Option<&LayerRange> {
        self.layers.get(index)
    }

    /// Number of layers, not counting the leading entry
    pub fn layer_count(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
