//! Per-cell pipeline: gather corners, march faces, trace loops, solve, emit.

use cms_geom::Vec3;
use cms_volume::{HermiteVolume, VoxelSample};

use crate::config::CmsConfig;
use crate::constants::CELL_CORNERS;
use crate::emit::{CellFrame, emit_component};
use crate::face::Face;
use crate::mesh_build::MeshSink;
use crate::segment::{SegmentList, generate_face_segments};
use crate::sharp::{SolverParams, solve_component};
use crate::tables::CORNER_OFFSETS;
use crate::trace::trace_components;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl CellCoord {
    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    #[inline]
    fn axis(self, axis: usize) -> usize {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// True when this cell's `face` lies on the outer boundary of an `n^3` cell block.
    #[inline]
    pub fn touches(self, face: Face, cells_per_axis: usize) -> bool {
        let c = self.axis(face.normal_axis());
        if face.is_positive() {
            c + 1 == cells_per_axis
        } else {
            c == 0
        }
    }
}

/// The eight resolved corner samples of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellCorners {
    pub samples: [VoxelSample; CELL_CORNERS],
}

impl CellCorners {
    /// Reads the corners at `coord * stride + offset * stride`. Corners lying on a
    /// flagged volume-boundary face are resampled from the `2 * stride` lattice.
    pub fn gather(volume: &HermiteVolume, coord: CellCoord, config: &CmsConfig) -> Self {
        let s = config.stride;
        let max = config.cells_per_axis * s;
        let base = [coord.x * s, coord.y * s, coord.z * s];
        let mut samples = [VoxelSample::default(); CELL_CORNERS];
        for (out, off) in samples.iter_mut().zip(CORNER_OFFSETS.iter()) {
            let g = [
                base[0] + off[0] * s,
                base[1] + off[1] * s,
                base[2] + off[2] * s,
            ];
            let axes = resample_axes(coord, off, config);
            *out = if axes == [false; 3] {
                volume.get(g[0], g[1], g[2])
            } else {
                coarse_sample(volume, g, axes, s, max)
            };
        }
        CellCorners { samples }
    }

    #[inline]
    pub fn is_uniform(&self) -> bool {
        let solid = self.samples[0].is_solid();
        self.samples.iter().all(|c| c.is_solid() == solid)
    }
}

/// In-plane axes of every flagged boundary face the corner lies on, minus the
/// normal axes of those faces (a coordinate on a boundary plane stays put).
fn resample_axes(coord: CellCoord, off: &[usize; 3], config: &CmsConfig) -> [bool; 3] {
    if config.subsample_faces.is_empty() {
        return [false; 3];
    }
    let mut tangent = [false; 3];
    let mut pinned = [false; 3];
    for face in config.subsample_faces.iter() {
        if !coord.touches(face, config.cells_per_axis) {
            continue;
        }
        let n = face.normal_axis();
        let on_face = if face.is_positive() { off[n] == 1 } else { off[n] == 0 };
        if !on_face {
            continue;
        }
        let (u, v) = face.tangent_axes();
        tangent[u] = true;
        tangent[v] = true;
        pinned[n] = true;
    }
    [
        tangent[0] && !pinned[0],
        tangent[1] && !pinned[1],
        tangent[2] && !pinned[2],
    ]
}

/// Multilinear average of the coarse lattice points around `g` along `axes`.
fn coarse_sample(
    volume: &HermiteVolume,
    g: [usize; 3],
    axes: [bool; 3],
    stride: usize,
    max: usize,
) -> VoxelSample {
    let coarse = stride * 2;
    let mut taps = [[(0usize, 0.0f32); 2]; 3];
    let mut counts = [1usize; 3];
    for a in 0..3 {
        taps[a][0] = (g[a], 1.0);
        // Off-lattice points with a coarse neighbour on both sides average the pair.
        if axes[a] && g[a] % coarse != 0 && g[a] + stride <= max {
            taps[a] = [(g[a] - stride, 0.5), (g[a] + stride, 0.5)];
            counts[a] = 2;
        }
    }

    let mut density = 0.0f32;
    let mut normal = Vec3::ZERO;
    for &(x, wx) in &taps[0][..counts[0]] {
        for &(y, wy) in &taps[1][..counts[1]] {
            for &(z, wz) in &taps[2][..counts[2]] {
                let w = wx * wy * wz;
                let c = volume.get(x, y, z);
                density += c.density * w;
                normal += c.normal * w;
            }
        }
    }
    VoxelSample::new(density, normal.normalized())
}

/// What one cell contributed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellReport {
    pub segments: usize,
    pub sharp_segments: usize,
    pub components: usize,
    pub sharp_components: usize,
    pub triangles: usize,
}

impl CellReport {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.segments > 0
    }
}

pub(crate) fn cell_frame(coord: CellCoord, config: &CmsConfig) -> CellFrame {
    let s = config.stride;
    CellFrame {
        corner: Vec3::new(
            (coord.x * s) as f32,
            (coord.y * s) as f32,
            (coord.z * s) as f32,
        ),
        stride: s as f32,
        voxel_size: config.voxel_size,
        offset: config.world_offset(),
    }
}

/// Meshes the cell at `coord` into `sink`. The volume must satisfy `config.validate`.
pub fn mesh_cell<S: MeshSink>(
    volume: &HermiteVolume,
    coord: CellCoord,
    config: &CmsConfig,
    sink: &mut S,
) -> CellReport {
    let params = config.solver_params();
    let corners = CellCorners::gather(volume, coord, config);
    mesh_corners(&corners, &cell_frame(coord, config), config, &params, sink)
}

pub(crate) fn mesh_corners<S: MeshSink>(
    corners: &CellCorners,
    frame: &CellFrame,
    config: &CmsConfig,
    params: &SolverParams,
    sink: &mut S,
) -> CellReport {
    let mut report = CellReport::default();
    if corners.is_uniform() {
        return report;
    }

    let mut segments = SegmentList::default();
    for face in Face::ALL {
        generate_face_segments(&corners.samples, face, params.sharp_angle_rad, &mut segments);
    }
    report.segments = segments.len();
    report.sharp_segments = segments
        .as_slice()
        .iter()
        .filter(|s| s.sharp.is_some())
        .count();

    let mut components = trace_components(&mut segments);
    report.components = components.len();
    for comp in components.as_mut_slice() {
        let solved = solve_component(segments.as_slice(), comp, params);
        comp.vertex = solved.vertex;
        comp.sharp = solved.sharp;
        if solved.sharp {
            report.sharp_components += 1;
        }
        let center = comp.vertex;
        report.triangles += emit_component(
            segments.as_slice(),
            comp,
            &center,
            frame,
            config.shading,
            sink,
        );
    }
    report
}
