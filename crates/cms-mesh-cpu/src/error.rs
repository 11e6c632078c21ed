#[derive(Clone, Debug, PartialEq)]
pub enum CmsError {
    /// Stride must be a power of two, at least 1.
    InvalidStride(usize),
    InvalidCellCount(usize),
    /// The volume lacks the `cells_per_axis * stride + 1` lattice points an axis needs.
    VolumeTooSmall {
        axis: usize,
        required: usize,
        actual: usize,
    },
    /// Sharp-feature angle outside `[0, 180]` degrees.
    InvalidAngle(f32),
    InvalidStepSize(f32),
    /// Output buffers for this many cells overflow `u32` indices.
    CapacityOverflow { cells: usize },
    ThreadPool(String),
}

impl std::fmt::Display for CmsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CmsError::InvalidStride(s) => write!(f, "stride {} is not a power of two", s),
            CmsError::InvalidCellCount(n) => write!(f, "cells per axis must be at least 1, got {}", n),
            CmsError::VolumeTooSmall {
                axis,
                required,
                actual,
            } => write!(
                f,
                "volume axis {} has {} samples; {} required",
                axis, actual, required
            ),
            CmsError::InvalidAngle(a) => {
                write!(f, "sharp feature angle {} outside [0, 180] degrees", a)
            }
            CmsError::InvalidStepSize(s) => write!(f, "step size {} must be finite and >= 0", s),
            CmsError::CapacityOverflow { cells } => {
                write!(f, "mesh buffers for {} cells overflow u32 indices", cells)
            }
            CmsError::ThreadPool(e) => write!(f, "failed to build mesher thread pool: {}", e),
        }
    }
}

impl std::error::Error for CmsError {}
