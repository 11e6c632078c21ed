use std::time::Instant;

use cms_volume::HermiteVolume;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::cell::{CellCoord, CellCorners, CellReport, cell_frame, mesh_corners};
use crate::config::CmsConfig;
use crate::error::CmsError;
use crate::mesh_build::{MeshBuild, MeshCapacity};

/// How the cells of one pass are scheduled. Every variant yields identical buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Executor {
    /// One thread, cells in z, y, x order.
    #[default]
    Sequential,
    /// z-slabs on the global rayon pool, concatenated in z order.
    Parallel,
    /// Like `Parallel`, on a dedicated pool of `threads` workers (0 = rayon default).
    Pool { threads: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshStats {
    pub cells: usize,
    pub active_cells: usize,
    pub components: usize,
    pub sharp_components: usize,
    pub sharp_segments: usize,
    pub triangles: usize,
    pub vertices: usize,
    pub elapsed_ms: u32,
}

impl MeshStats {
    fn add_cell(&mut self, r: &CellReport) {
        self.cells += 1;
        if r.is_active() {
            self.active_cells += 1;
        }
        self.components += r.components;
        self.sharp_components += r.sharp_components;
        self.sharp_segments += r.sharp_segments;
        self.triangles += r.triangles;
    }

    fn merge(&mut self, o: &MeshStats) {
        self.cells += o.cells;
        self.active_cells += o.active_cells;
        self.components += o.components;
        self.sharp_components += o.sharp_components;
        self.sharp_segments += o.sharp_segments;
        self.triangles += o.triangles;
    }
}

#[derive(Clone, Debug)]
pub struct ExtractOutput {
    pub mesh: MeshBuild,
    pub stats: MeshStats,
}

fn elapsed_ms(start: Instant) -> u32 {
    start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

/// Meshes every cell of one z layer, y then x.
fn mesh_slab(
    volume: &HermiteVolume,
    config: &CmsConfig,
    z: usize,
    out: &mut MeshBuild,
) -> MeshStats {
    let params = config.solver_params();
    let n = config.cells_per_axis;
    let mut stats = MeshStats::default();
    for y in 0..n {
        for x in 0..n {
            let coord = CellCoord::new(x, y, z);
            let corners = CellCorners::gather(volume, coord, config);
            let r = mesh_corners(&corners, &cell_frame(coord, config), config, &params, out);
            stats.add_cell(&r);
        }
    }
    stats
}

fn mesh_slabs_parallel(
    volume: &HermiteVolume,
    config: &CmsConfig,
    slab_cap: MeshCapacity,
) -> Vec<(MeshBuild, MeshStats)> {
    (0..config.cells_per_axis)
        .into_par_iter()
        .map(|z| {
            let mut build = MeshBuild::bounded(slab_cap);
            let stats = mesh_slab(volume, config, z, &mut build);
            (build, stats)
        })
        .collect()
}

/// Concatenates slabs in z order; each slab's indices are rebased by the
/// running vertex total.
fn merge_slabs(slabs: Vec<(MeshBuild, MeshStats)>) -> (MeshBuild, MeshStats) {
    let vertices: usize = slabs.iter().map(|(b, _)| b.vertices.len()).sum();
    let indices: usize = slabs.iter().map(|(b, _)| b.indices.len()).sum();
    let mut mesh = MeshBuild::with_capacity(MeshCapacity { vertices, indices });
    let mut stats = MeshStats::default();
    for (build, s) in &slabs {
        mesh.append(build);
        stats.merge(s);
    }
    (mesh, stats)
}

/// Runs one full pass over the configured cells of `volume`.
pub fn extract(
    volume: &HermiteVolume,
    config: &CmsConfig,
    executor: Executor,
) -> Result<ExtractOutput, CmsError> {
    let start = Instant::now();
    config.validate(volume)?;
    let n = config.cells_per_axis;
    let cells = config
        .cell_count()
        .ok_or(CmsError::CapacityOverflow { cells: n })?;
    let total_cap = MeshCapacity::for_cells(cells)?;
    let slab_cap = MeshCapacity::for_cells(n * n)?;

    let (mesh, mut stats) = match executor {
        Executor::Sequential => {
            let mut mesh = MeshBuild::bounded(total_cap);
            let mut stats = MeshStats::default();
            for z in 0..n {
                let s = mesh_slab(volume, config, z, &mut mesh);
                stats.merge(&s);
            }
            (mesh, stats)
        }
        Executor::Parallel => merge_slabs(mesh_slabs_parallel(volume, config, slab_cap)),
        Executor::Pool { threads } => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("cms-mesh-{i}"))
                .build()
                .map_err(|e| CmsError::ThreadPool(e.to_string()))?;
            let slabs = pool.install(|| mesh_slabs_parallel(volume, config, slab_cap));
            merge_slabs(slabs)
        }
    };

    stats.vertices = mesh.vertices.len();
    stats.elapsed_ms = elapsed_ms(start);
    log::debug!(
        "cms extract components={} sharp_components={} sharp_segments={} active_cells={}",
        stats.components,
        stats.sharp_components,
        stats.sharp_segments,
        stats.active_cells
    );
    log::info!(
        target: "perf",
        "ms={} cms_extract executor={:?} cells={} stride={} tris={} verts={}",
        stats.elapsed_ms,
        executor,
        stats.cells,
        config.stride,
        stats.triangles,
        stats.vertices
    );
    Ok(ExtractOutput { mesh, stats })
}
