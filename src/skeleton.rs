//! The branch graph: tapered segments linked to the segment they grow from.

use bevy_heavy::ComputeMassProperties3d as _;
use bevy_math::primitives::ConicalFrustum;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One straight, tapered piece of branch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point (the end closer to the root).
    pub from: Vec3,

    /// End point.
    pub to: Vec3,

    /// Radius at `from`.
    pub start_radius: f32,

    /// Radius at `to`.
    pub end_radius: f32,

    /// Index of the segment this one grows out of, i.e. the segment whose `to`
    /// the turtle was standing on when this one was drawn.
    pub parent: Option<usize>,
}

impl Segment {
    pub fn length(&self) -> f32 {
        self.from.distance(self.to)
    }

    /// Unit vector from `from` to `to`, or `+Y` for a zero-length segment.
    pub fn direction(&self) -> Vec3 {
        (self.to - self.from).normalize_or(Vec3::Y)
    }

    /// The segment as a frustum aligned along Y, with the wide end at the bottom
    /// when the branch tapers.
    pub fn to_frustum(&self) -> ConicalFrustum {
        ConicalFrustum {
            radius_top: self.end_radius,
            radius_bottom: self.start_radius,
            height: self.length(),
        }
    }
}

/// The branch graph produced by one interpretation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSkeleton {
    /// Segments in the order they were drawn.
    pub segments: Vec<Segment>,

    /// `]` symbols that found an empty branch stack.
    pub unmatched_pops: usize,

    /// Branch points still on the stack when the command string ended.
    pub residual_branches: usize,
}

impl TreeSkeleton {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns `true` if every `[` in the commands had a matching `]` and vice versa.
    pub fn is_balanced(&self) -> bool {
        self.unmatched_pops == 0 && self.residual_branches == 0
    }

    /// Indices of branch tips: segments that no other segment grows out of.
    pub fn terminal_indices(&self) -> Vec<usize> {
        let mut has_child = vec![false; self.segments.len()];
        for parent in self.segments.iter().filter_map(|s| s.parent) {
            if let Some(flag) = has_child.get_mut(parent) {
                *flag = true;
            }
        }
        has_child
            .iter()
            .enumerate()
            .filter_map(|(i, &child)| (!child).then_some(i))
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.terminal_indices().len()
    }

    /// Number of segments that start a chain (no parent).
    pub fn root_count(&self) -> usize {
        self.segments.iter().filter(|s| s.parent.is_none()).count()
    }

    /// Total mass of all branch frustums at the given wood density (kg/m³).
    ///
    /// Not used by the mesh pipeline; it is an estimate for callers that want
    /// to weigh or balance a generated tree.
    pub fn wood_mass(&self, density: f32) -> f32 {
        self.segments
            .iter()
            .map(|s| s.to_frustum().mass(density))
            .sum()
    }

    /// Axis-aligned bounds over all segment endpoints.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.segments.first()?;
        let init = (first.from.min(first.to), first.from.max(first.to));
        Some(self.segments.iter().fold(init, |(lo, hi), s| {
            (lo.min(s.from).min(s.to), hi.max(s.from).max(s.to))
        }))
    }
}
