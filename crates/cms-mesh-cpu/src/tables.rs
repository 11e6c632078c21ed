//! Fixed unit-cell topology and the marching-squares segment table.
//!
//! Corner numbering:
//!
//! ```text
//!        7-------6
//!       /|      /|        y
//!      3-------2 |        |
//!      | 4-----|-5        o-- x
//!      |/      |/        /
//!      0-------1        z
//! ```
//!
//! Corners 0..4 sit on `z = 0`, corners 4..8 repeat them on `z = 1`.

use cms_geom::Vec3;

use crate::constants::{CELL_CORNERS, CELL_EDGES, CELL_FACES, FACE_CORNERS_PER_FACE, SEGMENT_TABLE_SIZE};

pub const CORNER_OFFSETS: [[usize; 3]; CELL_CORNERS] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

pub const CORNER_POSITIONS: [Vec3; CELL_CORNERS] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
];

/// Corner pairs, always running from the lower to the higher corner along the
/// edge axis so neighbouring cells interpolate a shared lattice edge the same way.
pub const EDGES: [[usize; 2]; CELL_EDGES] = [
    [0, 1],
    [1, 2],
    [3, 2],
    [0, 3],
    [4, 5],
    [5, 6],
    [7, 6],
    [4, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Per `Face` index: bottom-left, bottom-right, top-right, top-left, wound
/// counter-clockwise as seen from outside the cell.
pub const FACE_CORNERS: [[usize; FACE_CORNERS_PER_FACE]; CELL_FACES] = [
    [3, 7, 6, 2], // PosY
    [0, 1, 5, 4], // NegY
    [1, 2, 6, 5], // PosX
    [0, 4, 7, 3], // NegX
    [4, 5, 6, 7], // PosZ
    [0, 3, 2, 1], // NegZ
];

/// Per `Face` index: local edge `k` joins face corners `k` and `k+1`.
pub const FACE_EDGES: [[usize; FACE_CORNERS_PER_FACE]; CELL_FACES] = [
    [11, 6, 10, 2], // PosY
    [0, 9, 4, 8],   // NegY
    [1, 10, 5, 9],  // PosX
    [8, 7, 11, 3],  // NegX
    [4, 5, 6, 7],   // PosZ
    [3, 2, 1, 0],   // NegZ
];

/// Marching-squares segments as `(start, end)` local edge numbers, indexed by
/// the face sign configuration (bit `k` set when face corner `k` is solid).
///
/// Segments keep the solid side on their left when the face is viewed from
/// outside, so loops chain end-to-start across faces. The saddles (5 and 10)
/// cut the two solid corners off separately.
pub const SEGMENT_TABLE: [&[(u8, u8)]; SEGMENT_TABLE_SIZE] = [
    &[],
    &[(0, 3)],
    &[(1, 0)],
    &[(1, 3)],
    &[(2, 1)],
    &[(0, 3), (2, 1)],
    &[(2, 0)],
    &[(2, 3)],
    &[(3, 2)],
    &[(0, 2)],
    &[(1, 0), (3, 2)],
    &[(1, 2)],
    &[(3, 1)],
    &[(0, 1)],
    &[(3, 0)],
    &[],
];
