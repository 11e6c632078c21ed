use cms_geom::Vec3;
use cms_volume::HermiteVolume;

use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_SHARP_ANGLE_DEG, DEFAULT_STEP_SIZE};
use crate::emit::ShadingMode;
use crate::error::CmsError;
use crate::face::FaceMask;
use crate::sharp::{BoundaryRule, SolverParams};

/// Parameters of one extraction pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CmsConfig {
    pub cells_per_axis: usize,
    /// Lattice step between cell corners; selects the level of detail.
    pub stride: usize,
    pub sharp_feature_angle_deg: f32,
    pub max_iterations: u32,
    pub step_size: f32,
    pub shading: ShadingMode,
    pub boundary_rule: BoundaryRule,
    /// Volume-boundary faces whose corners are read from the next coarser lattice.
    pub subsample_faces: FaceMask,
    pub voxel_size: f32,
    pub origin: Vec3,
    /// Shift output so the meshed region is centred on `origin`.
    pub centered: bool,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            cells_per_axis: 32,
            stride: 1,
            sharp_feature_angle_deg: DEFAULT_SHARP_ANGLE_DEG,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_size: DEFAULT_STEP_SIZE,
            shading: ShadingMode::Smooth,
            boundary_rule: BoundaryRule::CellEdge,
            subsample_faces: FaceMask::EMPTY,
            voxel_size: 1.0,
            origin: Vec3::ZERO,
            centered: false,
        }
    }
}

impl CmsConfig {
    pub fn new(cells_per_axis: usize, stride: usize) -> Self {
        Self {
            cells_per_axis,
            stride,
            ..Self::default()
        }
    }

    /// Largest cube of cells at `stride` that fits inside `volume`.
    pub fn for_volume(volume: &HermiteVolume, stride: usize) -> Self {
        let (dx, dy, dz) = volume.dims();
        let stride = stride.max(1);
        let cells = dx.min(dy).min(dz).saturating_sub(1) / stride;
        Self::new(cells, stride)
    }

    pub fn validate(&self, volume: &HermiteVolume) -> Result<(), CmsError> {
        if !self.stride.is_power_of_two() {
            return Err(CmsError::InvalidStride(self.stride));
        }
        if self.cells_per_axis == 0 {
            return Err(CmsError::InvalidCellCount(self.cells_per_axis));
        }
        let required = self
            .cells_per_axis
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(1))
            .ok_or(CmsError::CapacityOverflow {
                cells: self.cells_per_axis,
            })?;
        let (dx, dy, dz) = volume.dims();
        for (axis, actual) in [dx, dy, dz].into_iter().enumerate() {
            if actual < required {
                return Err(CmsError::VolumeTooSmall {
                    axis,
                    required,
                    actual,
                });
            }
        }
        let angle = self.sharp_feature_angle_deg;
        if !(0.0..=180.0).contains(&angle) {
            return Err(CmsError::InvalidAngle(angle));
        }
        if !self.step_size.is_finite() || self.step_size < 0.0 {
            return Err(CmsError::InvalidStepSize(self.step_size));
        }
        Ok(())
    }

    /// `cells_per_axis^3`, or `None` on overflow.
    pub fn cell_count(&self) -> Option<usize> {
        let n = self.cells_per_axis;
        n.checked_mul(n).and_then(|v| v.checked_mul(n))
    }

    pub fn solver_params(&self) -> SolverParams {
        SolverParams {
            sharp_angle_rad: self.sharp_feature_angle_deg.to_radians(),
            max_iterations: self.max_iterations,
            step_size: self.step_size,
            boundary_rule: self.boundary_rule,
        }
    }

    /// World-space offset applied after scaling, including the centring shift.
    pub(crate) fn world_offset(&self) -> Vec3 {
        if self.centered {
            let half = 0.5 * (self.cells_per_axis * self.stride) as f32 * self.voxel_size;
            self.origin - Vec3::splat(half)
        } else {
            self.origin
        }
    }
}
