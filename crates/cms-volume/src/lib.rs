//! Dense Hermite volumes: one signed density plus surface normal per lattice point.
#![forbid(unsafe_code)]

use cms_geom::Vec3;

/// One Hermite sample. Density `>= 0` is solid; `normal` is the outward surface
/// normal (pointing toward decreasing density).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VoxelSample {
    pub density: f32,
    pub normal: Vec3,
}

impl VoxelSample {
    #[inline]
    pub const fn new(density: f32, normal: Vec3) -> Self {
        Self { density, normal }
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.density >= 0.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum VolumeError {
    /// A lattice axis has fewer than two samples, so it holds no cell.
    DimensionTooSmall { axis: usize, dim: usize },
    /// Sample buffer length disagrees with the lattice dimensions.
    SampleCount { expected: usize, actual: usize },
    /// `dim_x * dim_y * dim_z` does not fit in `usize`.
    Overflow,
}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeError::DimensionTooSmall { axis, dim } => {
                write!(f, "lattice axis {} has {} samples; need at least 2", axis, dim)
            }
            VolumeError::SampleCount { expected, actual } => {
                write!(f, "expected {} samples, got {}", expected, actual)
            }
            VolumeError::Overflow => write!(f, "lattice dimensions overflow usize"),
        }
    }
}

impl std::error::Error for VolumeError {}

/// Number of lattice points per axis needed for `cells_per_axis` cells read at `stride`.
#[inline]
pub fn lattice_dim(cells_per_axis: usize, stride: usize) -> usize {
    cells_per_axis * stride + 1
}

fn checked_len(dims: (usize, usize, usize)) -> Result<usize, VolumeError> {
    let (dx, dy, dz) = dims;
    for (axis, dim) in [dx, dy, dz].into_iter().enumerate() {
        if dim < 2 {
            return Err(VolumeError::DimensionTooSmall { axis, dim });
        }
    }
    dx.checked_mul(dy)
        .and_then(|v| v.checked_mul(dz))
        .ok_or(VolumeError::Overflow)
}

#[derive(Clone, Debug)]
pub struct HermiteVolume {
    dim_x: usize,
    dim_y: usize,
    dim_z: usize,
    samples: Vec<VoxelSample>,
}

impl HermiteVolume {
    pub fn from_samples(
        dims: (usize, usize, usize),
        samples: Vec<VoxelSample>,
    ) -> Result<Self, VolumeError> {
        let expected = checked_len(dims)?;
        if samples.len() != expected {
            return Err(VolumeError::SampleCount {
                expected,
                actual: samples.len(),
            });
        }
        Ok(HermiteVolume {
            dim_x: dims.0,
            dim_y: dims.1,
            dim_z: dims.2,
            samples,
        })
    }

    /// Fills the lattice from a per-point closure, x fastest.
    pub fn from_fn(
        dims: (usize, usize, usize),
        mut sample: impl FnMut(usize, usize, usize) -> VoxelSample,
    ) -> Result<Self, VolumeError> {
        let len = checked_len(dims)?;
        let (dx, dy, dz) = dims;
        let mut samples = Vec::with_capacity(len);
        for z in 0..dz {
            for y in 0..dy {
                for x in 0..dx {
                    samples.push(sample(x, y, z));
                }
            }
        }
        Ok(HermiteVolume {
            dim_x: dx,
            dim_y: dy,
            dim_z: dz,
            samples,
        })
    }

    /// Samples `density` at every lattice point (lattice units) and derives normals
    /// from central differences with step `gradient_epsilon`.
    pub fn from_density(
        dims: (usize, usize, usize),
        gradient_epsilon: f32,
        density: impl Fn(Vec3) -> f32,
    ) -> Result<Self, VolumeError> {
        let eps = gradient_epsilon.max(1e-4);
        Self::from_fn(dims, |x, y, z| {
            let p = Vec3::new(x as f32, y as f32, z as f32);
            let grad = Vec3::new(
                density(p + Vec3::X * eps) - density(p - Vec3::X * eps),
                density(p + Vec3::Y * eps) - density(p - Vec3::Y * eps),
                density(p + Vec3::Z * eps) - density(p - Vec3::Z * eps),
            );
            VoxelSample::new(density(p), (-grad).normalized())
        })
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.dim_x, self.dim_y, self.dim_z)
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.dim_x + z * self.dim_x * self.dim_y
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.dim_x && y < self.dim_y && z < self.dim_z
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> VoxelSample {
        self.samples[self.idx(x, y, z)]
    }

    /// All samples in `idx` order.
    #[inline]
    pub fn samples(&self) -> &[VoxelSample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True when both solid and empty samples are present.
    pub fn has_surface(&self) -> bool {
        let mut solid = false;
        let mut empty = false;
        for s in &self.samples {
            if s.is_solid() {
                solid = true;
            } else {
                empty = true;
            }
            if solid && empty {
                return true;
            }
        }
        false
    }
}
