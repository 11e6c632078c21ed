use cms_geom::{Aabb, Vec3};

use crate::constants::{MAX_INDICES_PER_CELL, MAX_VERTICES_PER_CELL};
use crate::error::CmsError;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OutputVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl OutputVertex {
    #[inline]
    pub const fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// Destination for emitted triangles. Each call appends three fresh vertices.
pub trait MeshSink {
    fn push_triangle(&mut self, tri: [OutputVertex; 3]);
}

/// Worst-case buffer sizes for a number of cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshCapacity {
    pub vertices: usize,
    pub indices: usize,
}

impl MeshCapacity {
    /// Fails when the bound overflows `usize` or cannot be addressed by `u32` indices.
    pub fn for_cells(cells: usize) -> Result<MeshCapacity, CmsError> {
        let vertices = cells
            .checked_mul(MAX_VERTICES_PER_CELL)
            .ok_or(CmsError::CapacityOverflow { cells })?;
        let indices = cells
            .checked_mul(MAX_INDICES_PER_CELL)
            .ok_or(CmsError::CapacityOverflow { cells })?;
        if vertices > u32::MAX as usize {
            return Err(CmsError::CapacityOverflow { cells });
        }
        Ok(MeshCapacity { vertices, indices })
    }
}

#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    pub vertices: Vec<OutputVertex>,
    pub indices: Vec<u32>,
    limit: Option<MeshCapacity>,
}

impl MeshBuild {
    /// Empty build that debug-asserts it never grows past `cap`. Storage grows on
    /// demand; the bound is not allocated up front.
    pub fn bounded(cap: MeshCapacity) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            limit: Some(cap),
        }
    }

    /// Reserves exactly `cap` and bounds the build to it.
    pub fn with_capacity(cap: MeshCapacity) -> Self {
        Self {
            vertices: Vec::with_capacity(cap.vertices),
            indices: Vec::with_capacity(cap.indices),
            limit: Some(cap),
        }
    }

    /// Clears all arrays but retains capacity for reuse.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends `other`, rebasing its indices past the current vertices.
    pub fn append(&mut self, other: &MeshBuild) {
        let base = self.vertices.len() as u32;
        self.check_room(other.vertices.len(), other.indices.len());
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|&i| i + base));
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Iterates triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [OutputVertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.vertices[t[0] as usize],
                self.vertices[t[1] as usize],
                self.vertices[t[2] as usize],
            ]
        })
    }

    #[inline]
    fn check_room(&self, vertices: usize, indices: usize) {
        if let Some(cap) = self.limit {
            debug_assert!(
                self.vertices.len() + vertices <= cap.vertices
                    && self.indices.len() + indices <= cap.indices,
                "mesh build exceeded its reserved capacity"
            );
        }
    }
}

impl MeshSink for MeshBuild {
    #[inline]
    fn push_triangle(&mut self, tri: [OutputVertex; 3]) {
        self.check_room(3, 3);
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&tri);
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32) -> OutputVertex {
        OutputVertex::new(Vec3::splat(x), Vec3::Y)
    }

    #[test]
    fn append_rebases_indices() {
        let mut a = MeshBuild::default();
        a.push_triangle([v(0.0), v(1.0), v(2.0)]);
        let mut b = MeshBuild::default();
        b.push_triangle([v(3.0), v(4.0), v(5.0)]);
        a.append(&b);
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(a.triangle_count(), 2);
        assert_eq!(a.bounds(), Aabb::new(Vec3::ZERO, Vec3::splat(5.0)));
    }

    #[test]
    fn capacity_is_per_cell_worst_case() {
        let cap = MeshCapacity::for_cells(10).unwrap();
        assert_eq!(cap.vertices, 720);
        assert_eq!(cap.indices, 720);
        assert!(MeshCapacity::for_cells(usize::MAX).is_err());
        assert!(MeshCapacity::for_cells(u32::MAX as usize / 72 + 1).is_err());
    }

    #[test]
    fn clear_keeps_allocation() {
        let mut m = MeshBuild::with_capacity(MeshCapacity::for_cells(1).unwrap());
        m.push_triangle([v(0.0), v(1.0), v(2.0)]);
        let cap = m.vertices.capacity();
        m.clear_keep_capacity();
        assert!(m.is_empty());
        assert_eq!(m.vertices.capacity(), cap);
    }
}
