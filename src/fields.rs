//! Analytic demo fields sampled into a `HermiteVolume`. Distances are in
//! lattice units; density is positive inside.

use clap::ValueEnum;
use cms_geom::Vec3;
use cms_volume::{HermiteVolume, VolumeError, lattice_dim};
use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;

// Central-difference step for the normals
const GRADIENT_EPS: f32 = 1e-3;
// Keeps surfaces off exact lattice points
const JITTER: f32 = 0.0137;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Sphere,
    Cube,
    Cylinder,
    Torus,
    Terrain,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldParams {
    pub shape: Shape,
    pub seed: i32,
    /// Base frequency of the terrain noise, per lattice unit.
    pub frequency: f32,
    pub octaves: u32,
    /// Terrain relief as a fraction of the lattice extent.
    pub amplitude: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            shape: Shape::Sphere,
            seed: 1337,
            frequency: 0.02,
            octaves: 4,
            amplitude: 0.25,
        }
    }
}

/// Samples `params.shape` on a lattice sized for `cells` cells at `stride`.
pub fn build_volume(
    params: &FieldParams,
    cells: usize,
    stride: usize,
) -> Result<HermiteVolume, VolumeError> {
    let dim = lattice_dim(cells, stride);
    let dims = (dim, dim, dim);
    let n = (dim - 1) as f32;
    let c = Vec3::splat(n * 0.5 + JITTER);
    match params.shape {
        Shape::Sphere => {
            let r = n * 0.35;
            HermiteVolume::from_density(dims, GRADIENT_EPS, |p| r - (p - c).length())
        }
        Shape::Cube => {
            let h = n * 0.3;
            HermiteVolume::from_density(dims, GRADIENT_EPS, |p| {
                let d = p - c;
                h - d.x.abs().max(d.y.abs()).max(d.z.abs())
            })
        }
        Shape::Cylinder => {
            let (r, h) = (n * 0.3, n * 0.35);
            HermiteVolume::from_density(dims, GRADIENT_EPS, |p| {
                let d = p - c;
                let radial = (d.x * d.x + d.z * d.z).sqrt();
                (r - radial).min(h - d.y.abs())
            })
        }
        Shape::Torus => {
            let (major, minor) = (n * 0.3, n * 0.12);
            HermiteVolume::from_density(dims, GRADIENT_EPS, |p| {
                let d = p - c;
                let ring = (d.x * d.x + d.z * d.z).sqrt() - major;
                minor - (ring * ring + d.y * d.y).sqrt()
            })
        }
        Shape::Terrain => {
            let terrain = Terrain::new(params, n);
            HermiteVolume::from_density(dims, GRADIENT_EPS, |p| terrain.density(p))
        }
    }
}

/// Height field with fractal relief; density is the height above `p`.
struct Terrain {
    noise: FastNoiseLite,
    octaves: u32,
    base: f32,
    relief: f32,
    top: f32,
}

impl Terrain {
    fn new(params: &FieldParams, extent: f32) -> Self {
        let mut noise = FastNoiseLite::with_seed(params.seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(params.frequency));
        Self {
            noise,
            octaves: params.octaves.max(1),
            base: extent * 0.45 + JITTER,
            relief: extent * params.amplitude,
            top: extent - 1.0,
        }
    }

    fn height(&self, x: f32, z: f32) -> f32 {
        let mut amp = 1.0_f32;
        let mut freq = 1.0_f32;
        let mut sum = 0.0_f32;
        let mut max_amp = 0.0_f32;
        for _ in 0..self.octaves {
            sum += self.noise.get_noise_2d(x * freq, z * freq) * amp;
            max_amp += amp;
            amp *= 0.5;
            freq *= 2.0;
        }
        (self.base + sum / max_amp * self.relief).min(self.top)
    }

    fn density(&self, p: Vec3) -> f32 {
        // Closed at the floor so the mesh does not run off the lattice.
        (self.height(p.x, p.z) - p.y).min(p.y - 0.5 - JITTER)
    }
}
