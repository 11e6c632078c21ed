//! Face segment generation: marching squares on one cell face.

use cms_geom::{Vec2, Vec3};
use cms_volume::VoxelSample;

use crate::constants::{CELL_CORNERS, DEGENERATE_EPS, MAX_CELL_SEGMENTS};
use crate::face::Face;
use crate::tables::{CORNER_POSITIONS, EDGES, SEGMENT_TABLE};

/// Surface crossing in unit-cell coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl EdgeVertex {
    #[inline]
    pub const fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SegmentEnd {
    /// Cell edge index `[0..12)` the vertex lies on.
    pub edge: u8,
    pub vertex: EdgeVertex,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Segment {
    pub a: SegmentEnd,
    pub b: SegmentEnd,
    /// Intersection of the two endpoint tangents when the face sees a sharp turn.
    pub sharp: Option<EdgeVertex>,
}

impl Segment {
    #[inline]
    pub fn flipped(self) -> Segment {
        Segment {
            a: self.b,
            b: self.a,
            sharp: self.sharp,
        }
    }
}

/// Inline segment storage for one cell.
#[derive(Clone, Copy, Debug)]
pub struct SegmentList {
    items: [Segment; MAX_CELL_SEGMENTS],
    len: usize,
}

impl Default for SegmentList {
    fn default() -> Self {
        Self {
            items: [Segment::default(); MAX_CELL_SEGMENTS],
            len: 0,
        }
    }
}

impl SegmentList {
    #[inline]
    pub fn push(&mut self, seg: Segment) {
        assert!(
            self.len < MAX_CELL_SEGMENTS,
            "segment table produced more than {} segments for one cell",
            MAX_CELL_SEGMENTS
        );
        self.items[self.len] = seg;
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Segment] {
        &self.items[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Segment] {
        &mut self.items[..self.len]
    }
}

/// 4-bit sign configuration of a face; bit `k` is set when face corner `k` is solid.
#[inline]
pub fn face_config(samples: &[VoxelSample; CELL_CORNERS], face: Face) -> usize {
    face.corners()
        .iter()
        .enumerate()
        .fold(0, |acc, (k, &c)| {
            if samples[c].is_solid() { acc | (1 << k) } else { acc }
        })
}

/// Linear zero crossing along cell edge `edge`.
pub fn edge_vertex(samples: &[VoxelSample; CELL_CORNERS], edge: usize) -> EdgeVertex {
    let [ia, ib] = EDGES[edge];
    let (sa, sb) = (samples[ia], samples[ib]);
    let denom = sb.density - sa.density;
    let t = if denom.abs() < DEGENERATE_EPS {
        0.5
    } else {
        (-sa.density / denom).clamp(0.0, 1.0)
    };
    EdgeVertex {
        position: CORNER_POSITIONS[ia].lerp(CORNER_POSITIONS[ib], t),
        normal: sa.normal.lerp(sb.normal, t).normalized(),
    }
}

/// Tangent-line intersection for a segment whose endpoint normals turn by at
/// least `threshold_rad` inside the face plane.
///
/// Endpoints are put in a fixed order before solving so the cell on the other
/// side of the face reproduces the same point bit for bit.
pub fn face_sharp_vertex(
    face: Face,
    a: &EdgeVertex,
    b: &EdgeVertex,
    threshold_rad: f32,
) -> Option<EdgeVertex> {
    let (u, v) = face.tangent_axes();
    let project = |p: Vec3| Vec2::new(p.axis(u), p.axis(v));

    let (mut pa, mut na) = (project(a.position), project(a.normal));
    let (mut pb, mut nb) = (project(b.position), project(b.normal));
    if (pb.x, pb.y) < (pa.x, pa.y) {
        std::mem::swap(&mut pa, &mut pb);
        std::mem::swap(&mut na, &mut nb);
    }
    if na.length() < DEGENERATE_EPS || nb.length() < DEGENERATE_EPS {
        return None;
    }
    let (na, nb) = (na.normalized(), nb.normalized());
    let angle = na.dot(nb).clamp(-1.0, 1.0).acos();
    if angle < threshold_rad {
        return None;
    }

    let (ta, tb) = (na.perp(), nb.perp());
    let det = ta.perp_dot(tb);
    if det.abs() < DEGENERATE_EPS {
        return None;
    }
    let s = (pb - pa).perp_dot(tb) / det;
    let hit = pa + ta * s;
    if !(hit.x.is_finite() && hit.y.is_finite()) {
        return None;
    }

    let plane = a.position.axis(face.normal_axis());
    let position = Vec3::ZERO
        .with_axis(u, hit.x.clamp(0.0, 1.0))
        .with_axis(v, hit.y.clamp(0.0, 1.0))
        .with_axis(face.normal_axis(), plane);
    Some(EdgeVertex {
        position,
        normal: (a.normal + b.normal).normalized(),
    })
}

/// Appends the 0..=2 segments crossing `face` to `out` and returns how many were added.
pub fn generate_face_segments(
    samples: &[VoxelSample; CELL_CORNERS],
    face: Face,
    threshold_rad: f32,
    out: &mut SegmentList,
) -> usize {
    let entries = SEGMENT_TABLE[face_config(samples, face)];
    let edges = face.edges();
    for &(la, lb) in entries {
        let ea = edges[la as usize];
        let eb = edges[lb as usize];
        let va = edge_vertex(samples, ea);
        let vb = edge_vertex(samples, eb);
        out.push(Segment {
            a: SegmentEnd {
                edge: ea as u8,
                vertex: va,
            },
            b: SegmentEnd {
                edge: eb as u8,
                vertex: vb,
            },
            sharp: face_sharp_vertex(face, &va, &vb, threshold_rad),
        });
    }
    entries.len()
}
