use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use cms_geom::Vec3;
use cms_mesh_cpu::{
    BoundaryRule, CmsConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_SHARP_ANGLE_DEG, DEFAULT_STEP_SIZE,
    Face, FaceMask, ShadingMode,
};

use crate::fields::{FieldParams, Shape};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mesh: Mesh,
    #[serde(default)]
    pub field: Field,
    #[serde(default)]
    pub output: Output,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Mesh {
    #[serde(default = "default_cells")]
    pub cells: usize,
    #[serde(default = "default_stride")]
    pub stride: usize,
    #[serde(default = "default_sharp_angle")]
    pub sharp_angle: f32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_step")]
    pub step: f32,
    #[serde(default)]
    pub flat: bool,
    #[serde(default)]
    pub boundary: Boundary,
    /// Boundary faces read from the next coarser lattice.
    #[serde(default)]
    pub subsample: Vec<SeamFace>,
    /// Worker count; 0 uses the global rayon pool.
    #[serde(default)]
    pub threads: usize,
}
fn default_cells() -> usize {
    CmsConfig::default().cells_per_axis
}
fn default_stride() -> usize {
    CmsConfig::default().stride
}
fn default_sharp_angle() -> f32 {
    DEFAULT_SHARP_ANGLE_DEG
}
fn default_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}
fn default_step() -> f32 {
    DEFAULT_STEP_SIZE
}
impl Default for Mesh {
    fn default() -> Self {
        Self {
            cells: default_cells(),
            stride: default_stride(),
            sharp_angle: default_sharp_angle(),
            iterations: default_iterations(),
            step: default_step(),
            flat: false,
            boundary: Boundary::default(),
            subsample: Vec::new(),
            threads: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    #[default]
    Edge,
    Face,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeamFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl SeamFace {
    fn face(self) -> Face {
        match self {
            SeamFace::PosX => Face::PosX,
            SeamFace::NegX => Face::NegX,
            SeamFace::PosY => Face::PosY,
            SeamFace::NegY => Face::NegY,
            SeamFace::PosZ => Face::PosZ,
            SeamFace::NegZ => Face::NegZ,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub shape: Shape,
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
}
fn default_seed() -> i32 {
    1337
}
fn default_frequency() -> f32 {
    0.02
}
fn default_octaves() -> u32 {
    4
}
fn default_amplitude() -> f32 {
    0.25
}
impl Default for Field {
    fn default() -> Self {
        Self {
            shape: Shape::default(),
            seed: default_seed(),
            frequency: default_frequency(),
            octaves: default_octaves(),
            amplitude: default_amplitude(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Output {
    #[serde(default = "default_voxel_size")]
    pub voxel_size: f32,
    #[serde(default)]
    pub origin: [f32; 3],
    #[serde(default)]
    pub centered: bool,
    /// Merge coincident vertices when writing OBJ.
    #[serde(default)]
    pub weld: bool,
}
fn default_voxel_size() -> f32 {
    CmsConfig::default().voxel_size
}
impl Default for Output {
    fn default() -> Self {
        Self {
            voxel_size: default_voxel_size(),
            origin: [0.0; 3],
            centered: false,
            weld: false,
        }
    }
}

impl AppConfig {
    pub fn cms_config(&self) -> CmsConfig {
        let m = &self.mesh;
        let subsample_faces = m
            .subsample
            .iter()
            .fold(FaceMask::EMPTY, |mask, f| mask.with(f.face()));
        CmsConfig {
            sharp_feature_angle_deg: m.sharp_angle,
            max_iterations: m.iterations,
            step_size: m.step,
            shading: if m.flat {
                ShadingMode::Flat
            } else {
                ShadingMode::Smooth
            },
            boundary_rule: match m.boundary {
                Boundary::Edge => BoundaryRule::CellEdge,
                Boundary::Face => BoundaryRule::CellFace,
            },
            subsample_faces,
            voxel_size: self.output.voxel_size,
            origin: Vec3::new(
                self.output.origin[0],
                self.output.origin[1],
                self.output.origin[2],
            ),
            centered: self.output.centered,
            ..CmsConfig::new(m.cells, m.stride)
        }
    }

    pub fn field_params(&self) -> FieldParams {
        let f = &self.field;
        FieldParams {
            shape: f.shape,
            seed: f.seed,
            frequency: f.frequency,
            octaves: f.octaves,
            amplitude: f.amplitude,
        }
    }
}

/// Reads `path`; a missing file yields the defaults.
pub fn load_config_from_path(path: &Path) -> Result<AppConfig, Box<dyn Error>> {
    if !path.exists() {
        log::warn!("{} not found; using defaults", path.display());
        return Ok(AppConfig::default());
    }
    let s = fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&s)?;
    Ok(cfg)
}
