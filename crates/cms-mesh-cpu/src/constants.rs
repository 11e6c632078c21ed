//! Shared constants for cms-mesh-cpu. Centralizes the per-cell bounds.

pub const CELL_CORNERS: usize = 8;
pub const CELL_EDGES: usize = 12;
pub const CELL_FACES: usize = 6;
pub(crate) const FACE_CORNERS_PER_FACE: usize = 4;

// Marching-squares lookup: 2^4 sign configurations per face
pub(crate) const SEGMENT_TABLE_SIZE: usize = 16;
pub const MAX_SEGMENTS_PER_FACE: usize = 2;

/// Every crossing edge starts exactly one segment, so a cell never holds more
/// segments than it has edges.
pub const MAX_CELL_SEGMENTS: usize = CELL_FACES * MAX_SEGMENTS_PER_FACE;
/// Each loop needs at least three segments.
pub const MAX_CELL_COMPONENTS: usize = 4;

pub const MAX_TRIANGLES_PER_SEGMENT: usize = 2;
pub const MAX_TRIANGLES_PER_CELL: usize = MAX_CELL_SEGMENTS * MAX_TRIANGLES_PER_SEGMENT;
/// Triangles never share vertices, so vertices and indices have the same bound.
pub const MAX_VERTICES_PER_CELL: usize = MAX_TRIANGLES_PER_CELL * 3;
pub const MAX_INDICES_PER_CELL: usize = MAX_TRIANGLES_PER_CELL * 3;

// Below this a direction or a 2D line determinant is treated as zero
pub(crate) const DEGENERATE_EPS: f32 = 1e-6;

pub const DEFAULT_SHARP_ANGLE_DEG: f32 = 40.0;
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;
pub const DEFAULT_STEP_SIZE: f32 = 0.05;
