use crate::tables::{FACE_CORNERS, FACE_EDGES};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Axis (0 = x, 1 = y, 2 = z) the face is perpendicular to.
    #[inline]
    pub fn normal_axis(self) -> usize {
        match self {
            Face::PosX | Face::NegX => 0,
            Face::PosY | Face::NegY => 1,
            Face::PosZ | Face::NegZ => 2,
        }
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Face::PosX | Face::PosY | Face::PosZ)
    }

    /// In-plane axes in ascending order. Both faces of a shared cell wall use
    /// the same pair, which keeps the 2D projection identical on either side.
    #[inline]
    pub fn tangent_axes(self) -> (usize, usize) {
        match self {
            Face::PosX | Face::NegX => (1, 2),
            Face::PosY | Face::NegY => (0, 2),
            Face::PosZ | Face::NegZ => (0, 1),
        }
    }

    /// Cell corner indices, counter-clockwise as seen from outside the cell.
    #[inline]
    pub fn corners(self) -> &'static [usize; 4] {
        &FACE_CORNERS[self.index()]
    }

    /// Cell edge indices; edge `k` joins `corners()[k]` and `corners()[(k+1)%4]`.
    #[inline]
    pub fn edges(self) -> &'static [usize; 4] {
        &FACE_EDGES[self.index()]
    }
}

/// Set of cell faces, one bit per `Face::index()`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct FaceMask(u8);

impl FaceMask {
    pub const EMPTY: FaceMask = FaceMask(0);
    pub const ALL: FaceMask = FaceMask(0b11_1111);

    #[inline]
    pub fn with(self, face: Face) -> FaceMask {
        FaceMask(self.0 | (1 << face.index()))
    }

    #[inline]
    pub fn contains(self, face: Face) -> bool {
        self.0 & (1 << face.index()) != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}
