//! Mesh assembly: tapered branch cylinders merged into one buffer, plus one
//! instanced leaf quad per branch tip.

use crate::error::{TreeError, ensure_finite};
use crate::skeleton::{Segment, TreeSkeleton};
use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Configuration for mesh assembly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Number of sides around each branch cylinder.
    pub radial_segments: u32,
    /// Segments shorter than this are skipped.
    pub min_segment_length: f32,
    /// Width of the leaf quad.
    pub leaf_width: f32,
    /// Height of the leaf quad, measured along the branch direction.
    pub leaf_height: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            radial_segments: 8,
            min_segment_length: 0.001,
            leaf_width: 0.05,
            leaf_height: 0.08,
        }
    }
}

impl MeshConfig {
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.radial_segments < 3 {
            return Err(TreeError::InvalidParameter(format!(
                "radial_segments must be at least 3, got {}",
                self.radial_segments
            )));
        }
        for (name, value) in [
            ("min_segment_length", self.min_segment_length),
            ("leaf_width", self.leaf_width),
            ("leaf_height", self.leaf_height),
        ] {
            if ensure_finite(name, value)? < 0.0 {
                return Err(TreeError::InvalidParameter(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Vertices emitted per branch segment: a side strip of `r + 1` columns by
    /// two rings, and two caps of `r` centre points plus `r + 1` rim points.
    pub fn vertices_per_segment(&self) -> usize {
        6 * self.radial_segments as usize + 4
    }

    /// Indices emitted per branch segment: two triangles per side, one per cap slice.
    pub fn indices_per_segment(&self) -> usize {
        12 * self.radial_segments as usize
    }
}

/// Plain, GPU-ready triangle buffers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) {
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push(uv);
    }

    /// A `width x height` quad in the XY plane, facing `+Z`, centred on the origin.
    pub fn quad(width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let mut quad = Self::default();
        for (x, y, u, v) in [
            (-hw, -hh, 0.0, 0.0),
            (hw, -hh, 1.0, 0.0),
            (hw, hh, 1.0, 1.0),
            (-hw, hh, 0.0, 1.0),
        ] {
            quad.push_vertex(Vec3::new(x, y, 0.0), Vec3::Z, [u, v]);
        }
        quad.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
        quad
    }
}

/// Placement of one leaf quad.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeafInstance {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl LeafInstance {
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

/// All leaves of a tree, drawn with one instanced call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeafBatch {
    /// The shared leaf geometry.
    pub quad: MeshBuffers,
    pub instances: Vec<LeafInstance>,
}

impl LeafBatch {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// The renderable tree: every branch in one merged mesh plus the leaf batch.
///
/// The default value is the empty tree: renderable, with nothing in it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeMesh {
    pub branches: MeshBuffers,
    pub leaves: LeafBatch,
}

impl TreeMesh {
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.leaves.is_empty()
    }
}

/// Builds [`TreeMesh`]es from skeletons.
#[derive(Clone, Debug, Default)]
pub struct MeshAssembler {
    config: MeshConfig,
}

impl MeshAssembler {
    pub fn new(config: MeshConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Converts `skeleton` into geometry.
    ///
    /// `rng` supplies the roll of each leaf around its branch, so a seeded
    /// generator gives a reproducible mesh.
    pub fn build<R: Rng + ?Sized>(&self, skeleton: &TreeSkeleton, rng: &mut R) -> TreeMesh {
        if skeleton.is_empty() {
            return TreeMesh::default();
        }

        let mut branches = MeshBuffers::default();
        let mut skipped = 0usize;
        for segment in &skeleton.segments {
            let length = segment.length();
            if length < self.config.min_segment_length || length <= f32::EPSILON {
                skipped += 1;
                continue;
            }
            self.push_frustum(&mut branches, segment);
        }

        let instances: Vec<LeafInstance> = skeleton
            .terminal_indices()
            .into_iter()
            .map(|i| self.place_leaf(&skeleton.segments[i], rng.gen_range(0.0..TAU)))
            .collect();
        let leaves = LeafBatch {
            quad: if instances.is_empty() {
                MeshBuffers::default()
            } else {
                MeshBuffers::quad(self.config.leaf_width, self.config.leaf_height)
            },
            instances,
        };

        log::debug!(
            "assembled {} vertices, {} triangles and {} leaves ({skipped} degenerate segments skipped)",
            branches.vertex_count(),
            branches.triangle_count(),
            leaves.len()
        );
        TreeMesh { branches, leaves }
    }

    /// Appends a capped cone frustum for `segment` to `out`.
    ///
    /// The frustum is built along local `+Y`, bottom ring at `-h/2` with
    /// `start_radius` and top ring at `+h/2` with `end_radius`, then rotated onto
    /// the segment direction and moved to its midpoint.
    fn push_frustum(&self, out: &mut MeshBuffers, segment: &Segment) {
        let radial = self.config.radial_segments;
        let height = segment.length();
        let half = height / 2.0;
        let (top, bottom) = (segment.end_radius, segment.start_radius);
        let slope = (bottom - top) / height;

        let rotation = Quat::from_rotation_arc(Vec3::Y, segment.direction());
        let center = (segment.from + segment.to) / 2.0;
        let base = out.positions.len() as u32;
        let emit = |out: &mut MeshBuffers, p: Vec3, n: Vec3, uv: [f32; 2]| {
            out.push_vertex(rotation * p + center, rotation * n, uv);
        };

        // Side: two rings, top (v = 0) then bottom (v = 1).
        for ring in 0..2 {
            let v = ring as f32;
            let radius = top + v * (bottom - top);
            let y = half - v * height;
            for x in 0..=radial {
                let u = x as f32 / radial as f32;
                let (sin, cos) = (u * TAU).sin_cos();
                emit(
                    out,
                    Vec3::new(radius * sin, y, radius * cos),
                    Vec3::new(sin, slope, cos).normalize(),
                    [u, 1.0 - v],
                );
            }
        }
        for x in 0..radial {
            let a = base + x;
            let b = base + radial + 1 + x;
            let c = b + 1;
            let d = a + 1;
            out.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        // Caps.
        for (radius, sign) in [(top, 1.0f32), (bottom, -1.0f32)] {
            let center_start = out.positions.len() as u32;
            for _ in 0..radial {
                emit(out, Vec3::Y * half * sign, Vec3::Y * sign, [0.5, 0.5]);
            }
            let rim_start = out.positions.len() as u32;
            for x in 0..=radial {
                let u = x as f32 / radial as f32;
                let (sin, cos) = (u * TAU).sin_cos();
                emit(
                    out,
                    Vec3::new(radius * sin, half * sign, radius * cos),
                    Vec3::Y * sign,
                    [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
                );
            }
            for x in 0..radial {
                let c = center_start + x;
                let i = rim_start + x;
                if sign > 0.0 {
                    out.indices.extend_from_slice(&[i, i + 1, c]);
                } else {
                    out.indices.extend_from_slice(&[i + 1, i, c]);
                }
            }
        }
    }

    /// Positions a leaf half its height beyond the tip, rolled by `roll`
    /// radians around the branch direction.
    fn place_leaf(&self, segment: &Segment, roll: f32) -> LeafInstance {
        let dir = segment.direction();
        let align = Quat::from_rotation_arc(Vec3::Y, dir);
        LeafInstance {
            translation: segment.to + dir * (self.config.leaf_height / 2.0),
            rotation: (Quat::from_axis_angle(dir, roll) * align).normalize(),
        }
    }
}
