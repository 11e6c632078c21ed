//! Fan triangulation of solved components into a `MeshSink`.

use cms_geom::Vec3;

use crate::mesh_build::{MeshSink, OutputVertex};
use crate::segment::{EdgeVertex, Segment};
use crate::trace::Component;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShadingMode {
    /// Every vertex of a triangle carries the triangle's face normal.
    Flat,
    /// Vertices keep their interpolated Hermite normals.
    #[default]
    Smooth,
}

/// Maps unit-cell coordinates of one cell to world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellFrame {
    /// Lattice coordinate of corner 0.
    pub corner: Vec3,
    pub stride: f32,
    pub voxel_size: f32,
    pub offset: Vec3,
}

impl CellFrame {
    /// Adjacent cells evaluate a shared lattice point to the same bits: `corner`
    /// holds integers and `local` is 0 or 1 on the shared axis.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.offset + (self.corner + local * self.stride) * self.voxel_size
    }
}

/// Outward face normal of the fan triangle `(a, b, c)`.
#[inline]
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    -(b - a).cross(c - a).normalized()
}

struct Fan<'a, S: MeshSink> {
    frame: &'a CellFrame,
    shading: ShadingMode,
    sink: &'a mut S,
    emitted: usize,
}

impl<S: MeshSink> Fan<'_, S> {
    fn triangle(&mut self, a: &EdgeVertex, b: &EdgeVertex, c: &EdgeVertex) {
        let pa = self.frame.to_world(a.position);
        let pb = self.frame.to_world(b.position);
        let pc = self.frame.to_world(c.position);
        let tri = match self.shading {
            ShadingMode::Flat => {
                let n = face_normal(pa, pb, pc);
                [
                    OutputVertex::new(pa, n),
                    OutputVertex::new(pb, n),
                    OutputVertex::new(pc, n),
                ]
            }
            ShadingMode::Smooth => [
                OutputVertex::new(pa, a.normal),
                OutputVertex::new(pb, b.normal),
                OutputVertex::new(pc, c.normal),
            ],
        };
        self.sink.push_triangle(tri);
        self.emitted += 1;
    }
}

/// Emits one fan around `center` for `component` and returns the triangle count.
/// Segments carrying a sharp vertex split into two triangles.
pub fn emit_component<S: MeshSink>(
    segments: &[Segment],
    component: &Component,
    center: &EdgeVertex,
    frame: &CellFrame,
    shading: ShadingMode,
    sink: &mut S,
) -> usize {
    let mut fan = Fan {
        frame,
        shading,
        sink,
        emitted: 0,
    };
    for &si in component.segments() {
        let seg = &segments[si as usize];
        let (a, b) = (&seg.a.vertex, &seg.b.vertex);
        match &seg.sharp {
            Some(s) => {
                fan.triangle(center, a, s);
                fan.triangle(center, s, b);
            }
            None => fan.triangle(center, a, b),
        }
    }
    fan.emitted
}
