//! # Tube Chunk Mesh
//!
//! Sweeps a circular cross-section along a run of path points. Every point
//! gets a ring of `radial_segments + 1` vertices (the seam vertex is
//! duplicated so the ring can be stitched without wrap-around) plus a hub
//! vertex used by the end caps.
//!
//! The vertex buffer only grows while points are added and is frozen by
//! [`TubeChunk::finish`]. Slicing rebuilds the index buffer alone, so a
//! renderer can keep its vertex upload and swap indices.
//!
//! Index layout for a window of `n` ring pairs over `R` sides:
//! - walls are double-sided and span `R + 1` columns per ring pair, so
//!   `(R + 1) * 12 * n` indices. The last column stitches the seam copy back
//!   to column 0; those two quads have zero area and only keep the wall
//!   size a whole number of columns.
//! - a window covering the whole chunk is closed by a hub fan at each end,
//!   `R * 6` indices together. A trimmed window stays open so neighbouring
//!   windows and chunks join without discs in between.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use gcodetube_core::{MeshError, PathPoint, Vec3};
use tracing::trace;

/// Vertex layout: position, normal, color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Ring orientation at a point
#[derive(Debug, Clone, Copy)]
struct Frame {
    position: Vec3,
    tangent: Vec3,
    normal: Vec3,
}

/// Tube geometry for one run of path points
#[derive(Debug, Clone)]
pub struct TubeChunk {
    radial_segments: u32,
    points: Vec<PathPoint>,
    vertices: Vec<TubeVertex>,
    indices: Vec<u32>,
    window: (usize, usize),
    last_frame: Option<Frame>,
    /// Position before the first point, when this chunk continues another
    lead_in: Option<Vec3>,
    /// Position after the last point, when the path continues in another chunk
    lead_out: Option<Vec3>,
    finished: bool,
}

impl TubeChunk {
    /// Create an empty chunk
    pub fn new(radial_segments: u32) -> Result<Self, MeshError> {
        Self::with_capacity(radial_segments, 0)
    }

    /// Create an empty chunk with room for `points` points
    pub fn with_capacity(radial_segments: u32, points: usize) -> Result<Self, MeshError> {
        if radial_segments < 3 {
            return Err(MeshError::InvalidRadialSegments(radial_segments));
        }
        let stride = radial_segments as usize + 2;
        Ok(Self {
            radial_segments,
            points: Vec::with_capacity(points),
            vertices: Vec::with_capacity(points * stride),
            indices: Vec::new(),
            window: (0, 0),
            last_frame: None,
            lead_in: None,
            lead_out: None,
            finished: false,
        })
    }

    /// Start the chunk that follows `previous`
    ///
    /// The new chunk begins with a copy of the last point of `previous` and
    /// inherits its ring frame, so the tube runs on without a twist.
    pub fn continue_from(previous: &TubeChunk) -> Result<Self, MeshError> {
        let mut chunk = Self::with_capacity(previous.radial_segments, previous.points.len())?;
        let count = previous.points.len();
        if let Some(last) = previous.last_point() {
            chunk.lead_in = count
                .checked_sub(2)
                .map(|k| previous.points[k].position);
            chunk.last_frame = previous.last_frame;
            chunk.points.push(*last);
        }
        Ok(chunk)
    }

    /// Append a point
    ///
    /// The ring of the previous point is built now that its outgoing
    /// direction is known; the ring of this point waits for the next one or
    /// for [`finish`](Self::finish).
    pub fn add(&mut self, point: PathPoint) -> Result<(), MeshError> {
        if self.finished {
            return Err(MeshError::ChunkSealed);
        }
        self.points.push(point);
        if self.points.len() >= 2 {
            self.build_ring(self.points.len() - 2);
        }
        Ok(())
    }

    /// Seal the chunk when the path goes on to `next` in another chunk
    pub fn finish_towards(&mut self, next: Vec3) {
        if !self.finished {
            self.lead_out = Some(next);
        }
        self.finish();
    }

    /// Seal the chunk and index the full range
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        if !self.points.is_empty() {
            self.build_ring(self.points.len() - 1);
        }
        self.finished = true;
        self.window = (0, self.ring_count());
        self.rebuild_indices();
    }

    /// Restrict rendering to points `from..to` (local indices)
    ///
    /// Missing bounds default to the full range and `to` is clamped to the
    /// number of built rings. A window with fewer than two points renders
    /// nothing. Negative bounds are rejected and leave the chunk untouched.
    pub fn slice(&mut self, from: Option<i64>, to: Option<i64>) -> Result<(), MeshError> {
        if from.is_some_and(|v| v < 0) || to.is_some_and(|v| v < 0) {
            return Err(MeshError::InvalidSliceRange {
                start: from,
                end: to,
            });
        }

        let rings = self.ring_count();
        let to = to.map_or(rings, |v| (v as usize).min(rings));
        let from = from.map_or(0, |v| (v as usize).min(to));

        self.window = (from, to);
        self.rebuild_indices();
        trace!(
            "Chunk sliced to {}..{}, {} indices",
            from,
            to,
            self.indices.len()
        );
        Ok(())
    }

    /// Release all buffers; the chunk stays sealed
    pub fn dispose(&mut self) {
        self.points = Vec::new();
        self.vertices = Vec::new();
        self.indices = Vec::new();
        self.window = (0, 0);
        self.last_frame = None;
        self.lead_in = None;
        self.lead_out = None;
        self.finished = true;
    }

    pub fn points_count(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn last_point(&self) -> Option<&PathPoint> {
        self.points.last()
    }

    pub fn radial_segments(&self) -> u32 {
        self.radial_segments
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current local window
    pub fn window(&self) -> (usize, usize) {
        self.window
    }

    pub fn vertices(&self) -> &[TubeVertex] {
        &self.vertices
    }

    /// Vertex buffer as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    fn stride(&self) -> usize {
        self.radial_segments as usize + 2
    }

    fn ring_count(&self) -> usize {
        self.vertices.len() / self.stride()
    }

    /// Averaged direction of the path through point `k`
    fn tangent_at(&self, k: usize) -> Vec3 {
        let here = self.points[k].position;
        let before = match k {
            0 => self.lead_in,
            _ => Some(self.points[k - 1].position),
        };
        let after = self
            .points
            .get(k + 1)
            .map(|next| next.position)
            .or(self.lead_out);
        let incoming = before.map_or(Vec3::ZERO, |p| (here - p).normalize_or_zero());
        let outgoing = after.map_or(Vec3::ZERO, |p| (p - here).normalize_or_zero());

        [(incoming + outgoing).normalize_or_zero(), outgoing, incoming]
            .into_iter()
            .find(|t| *t != Vec3::ZERO)
            .or_else(|| self.last_frame.map(|frame| frame.tangent))
            .unwrap_or(Vec3::X)
    }

    fn build_ring(&mut self, k: usize) {
        let point = self.points[k];
        let tangent = self.tangent_at(k);
        let normal = match self.last_frame {
            Some(previous) => transport_normal(&previous, point.position, tangent),
            None => initial_normal(tangent),
        };
        let binormal = tangent.cross(normal).normalize_or_zero();
        let color = point.color.to_array();

        let ring_start = self.vertices.len();
        for j in 0..self.radial_segments {
            let angle = j as f32 / self.radial_segments as f32 * TAU;
            let offset = normal * angle.cos() + binormal * angle.sin();
            self.vertices.push(TubeVertex {
                position: (point.position + offset * point.radius).to_array(),
                normal: offset.to_array(),
                color,
            });
        }
        // seam
        self.vertices.push(self.vertices[ring_start]);

        let hub_normal = if k == 0 { -tangent } else { tangent };
        self.vertices.push(TubeVertex {
            position: point.position.to_array(),
            normal: hub_normal.to_array(),
            color,
        });

        self.last_frame = Some(Frame {
            position: point.position,
            tangent,
            normal,
        });
    }

    fn rebuild_indices(&mut self) {
        self.indices.clear();
        let (from, to) = self.window;
        if to < from + 2 {
            return;
        }

        let sides = self.radial_segments as usize;
        let stride = self.stride();
        let rings = self.ring_count();
        let ring = |k: usize, j: usize| (k * stride + j) as u32;
        let hub = |k: usize| (k * stride + sides + 1) as u32;
        let capped = from == 0 && to == rings;

        self.indices.reserve(
            (to - from - 1) * (sides + 1) * 12 + if capped { sides * 6 } else { 0 },
        );

        if capped {
            for j in 0..sides {
                self.indices
                    .extend_from_slice(&[hub(0), ring(0, j + 1), ring(0, j)]);
            }
        }

        for k in from..to - 1 {
            for j in 0..=sides {
                let next = (j + 1) % (sides + 1);
                let (a, b) = (ring(k, j), ring(k, next));
                let (c, d) = (ring(k + 1, j), ring(k + 1, next));
                self.indices.extend_from_slice(&[a, b, d, a, d, c]);
            }
            for j in 0..=sides {
                let next = (j + 1) % (sides + 1);
                let (a, b) = (ring(k, j), ring(k, next));
                let (c, d) = (ring(k + 1, j), ring(k + 1, next));
                self.indices.extend_from_slice(&[a, d, b, a, c, d]);
            }
        }

        if capped {
            let last = to - 1;
            for j in 0..sides {
                self.indices
                    .extend_from_slice(&[hub(last), ring(last, j), ring(last, j + 1)]);
            }
        }
    }
}

/// Any unit vector perpendicular to `tangent`
fn initial_normal(tangent: Vec3) -> Vec3 {
    let arbitrary = if tangent.x.abs() < 0.9 {
        Vec3::X
    } else {
        Vec3::Y
    };
    tangent.cross(arbitrary).normalize()
}

/// Carry the previous ring normal to the next point (double reflection)
fn transport_normal(previous: &Frame, position: Vec3, tangent: Vec3) -> Vec3 {
    let v1 = position - previous.position;
    let c1 = v1.dot(v1);

    let reflected = if c1 < 1e-10 {
        previous.normal
    } else {
        let r_l = previous.normal - (2.0 / c1) * v1.dot(previous.normal) * v1;
        let t_l = previous.tangent - (2.0 / c1) * v1.dot(previous.tangent) * v1;
        let v2 = tangent - t_l;
        let c2 = v2.dot(v2);
        if c2 < 1e-10 {
            r_l
        } else {
            r_l - (2.0 / c2) * v2.dot(r_l) * v2
        }
    };

    // keep the normal perpendicular when the tangent jumped
    let normal = (reflected - tangent * tangent.dot(reflected)).normalize_or_zero();
    if normal == Vec3::ZERO {
        initial_normal(tangent)
    } else {
        normal
    }
}
