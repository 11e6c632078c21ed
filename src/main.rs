//! `cms`: samples an analytic field and extracts its isosurface with
//! cubical marching squares.
#![forbid(unsafe_code)]

mod config;
mod fields;
mod obj;

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use cms_mesh_cpu::{Executor, extract};

use crate::config::{AppConfig, load_config_from_path};
use crate::fields::{Shape, build_volume};

#[derive(Parser, Debug)]
#[command(name = "cms")]
#[command(about = "Extract a sharp-featured isosurface from a sampled field")]
struct Cli {
    /// TOML file with [mesh], [field] and [output] sections
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    shape: Option<Shape>,

    /// Cells along each axis
    #[arg(long)]
    cells: Option<usize>,

    /// Lattice step per cell (power of two)
    #[arg(long)]
    stride: Option<usize>,

    /// Crease threshold in degrees; 180 disables creases
    #[arg(long)]
    sharp_angle: Option<f32>,

    #[arg(long)]
    iterations: Option<u32>,

    #[arg(long)]
    step: Option<f32>,

    /// Face normals instead of interpolated normals
    #[arg(long)]
    flat: bool,

    /// Dedicated worker count; 0 uses the global pool, 1 runs sequentially
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    seed: Option<i32>,

    #[arg(long)]
    voxel_size: Option<f32>,

    /// Centre the mesh on the origin
    #[arg(long)]
    centered: bool,

    /// Write a Wavefront OBJ here
    #[arg(long)]
    out: Option<PathBuf>,

    /// Share coincident positions in the OBJ
    #[arg(long)]
    weld: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut AppConfig) {
        if let Some(shape) = self.shape {
            cfg.field.shape = shape;
        }
        if let Some(seed) = self.seed {
            cfg.field.seed = seed;
        }
        if let Some(cells) = self.cells {
            cfg.mesh.cells = cells;
        }
        if let Some(stride) = self.stride {
            cfg.mesh.stride = stride;
        }
        if let Some(angle) = self.sharp_angle {
            cfg.mesh.sharp_angle = angle;
        }
        if let Some(iterations) = self.iterations {
            cfg.mesh.iterations = iterations;
        }
        if let Some(step) = self.step {
            cfg.mesh.step = step;
        }
        if let Some(threads) = self.threads {
            cfg.mesh.threads = threads;
        }
        if let Some(size) = self.voxel_size {
            cfg.output.voxel_size = size;
        }
        cfg.mesh.flat |= self.flat;
        cfg.output.centered |= self.centered;
        cfg.output.weld |= self.weld;
    }
}

fn executor(threads: usize) -> Executor {
    match threads {
        0 => Executor::Parallel,
        1 => Executor::Sequential,
        n => Executor::Pool { threads: n },
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut app = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => AppConfig::default(),
    };
    cli.apply(&mut app);
    let cms = app.cms_config();
    let field = app.field_params();

    let t0 = Instant::now();
    let volume = build_volume(&field, cms.cells_per_axis, cms.stride)?;
    log::info!(
        target: "perf",
        "ms={} sample_field shape={:?} dims={:?}",
        t0.elapsed().as_millis(),
        field.shape,
        volume.dims()
    );

    let out = extract(&volume, &cms, executor(app.mesh.threads))?;
    let s = out.stats;
    log::info!(
        "cells={} active={} components={} sharp_components={} sharp_segments={} tris={} verts={}",
        s.cells,
        s.active_cells,
        s.components,
        s.sharp_components,
        s.sharp_segments,
        s.triangles,
        s.vertices
    );

    if let Some(path) = &cli.out {
        let mut w = BufWriter::new(File::create(path)?);
        obj::write_obj(&out.mesh, app.output.weld, &mut w)?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run(Cli::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from([
            "cms",
            "--shape",
            "torus",
            "--cells",
            "8",
            "--sharp-angle",
            "180",
            "--flat",
        ]);
        let mut app: AppConfig = toml::from_str("[mesh]\ncells = 64\nstep = 0.1").unwrap();
        cli.apply(&mut app);
        assert_eq!(app.field.shape, Shape::Torus);
        assert_eq!(app.mesh.cells, 8);
        assert_eq!(app.mesh.step, 0.1);
        assert_eq!(app.mesh.sharp_angle, 180.0);
        assert!(app.mesh.flat);
    }

    #[test]
    fn thread_count_picks_executor() {
        assert_eq!(executor(0), Executor::Parallel);
        assert_eq!(executor(1), Executor::Sequential);
        assert_eq!(executor(4), Executor::Pool { threads: 4 });
    }

    #[test]
    fn small_cube_end_to_end() {
        let cli = Cli::parse_from(["cms", "--cells", "8", "--shape", "cube"]);
        let mut app = AppConfig::default();
        cli.apply(&mut app);
        let vol = build_volume(&app.field_params(), 8, 1).unwrap();
        let out = extract(&vol, &app.cms_config(), Executor::Sequential).unwrap();
        assert!(out.stats.triangles > 0);
        let mut buf = Vec::new();
        obj::write_obj(&out.mesh, true, &mut buf).unwrap();
        assert!(!buf.is_empty());
    }
}
