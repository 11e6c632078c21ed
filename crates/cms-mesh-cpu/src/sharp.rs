//! Representative vertex per component: boundary average, or a relaxed
//! feature point when the boundary normals disagree strongly enough.

use cms_geom::Vec3;

use crate::constants::{CELL_CORNERS, MAX_CELL_SEGMENTS};
use crate::segment::{EdgeVertex, Segment};
use crate::tables::CORNER_POSITIONS;
use crate::trace::Component;

/// Which candidate points count as lying on the cell boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoundaryRule {
    /// At least two coordinates are exactly 0 or 1 (the point sits on a cell edge).
    #[default]
    CellEdge,
    /// At least one coordinate is exactly 0 or 1 (the point sits on a cell face).
    CellFace,
}

impl BoundaryRule {
    #[inline]
    pub fn accepts(self, p: Vec3) -> bool {
        let on = [p.x, p.y, p.z]
            .into_iter()
            .filter(|&c| c == 0.0 || c == 1.0)
            .count();
        match self {
            BoundaryRule::CellEdge => on >= 2,
            BoundaryRule::CellFace => on >= 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverParams {
    pub sharp_angle_rad: f32,
    pub max_iterations: u32,
    pub step_size: f32,
    pub boundary_rule: BoundaryRule,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolvedVertex {
    pub vertex: EdgeVertex,
    pub sharp: bool,
}

// One A endpoint per segment
const MAX_CANDIDATES: usize = MAX_CELL_SEGMENTS;

struct Candidates {
    items: [EdgeVertex; MAX_CANDIDATES],
    len: usize,
}

impl Candidates {
    fn collect(segments: &[Segment], component: &Component, rule: BoundaryRule) -> Self {
        let mut out = Candidates {
            items: [EdgeVertex::default(); MAX_CANDIDATES],
            len: 0,
        };
        for &si in component.segments() {
            let seg = &segments[si as usize];
            let a = seg.a.vertex;
            if rule.accepts(a.position) {
                out.items[out.len] = a;
                out.len += 1;
            }
        }
        out
    }

    fn as_slice(&self) -> &[EdgeVertex] {
        &self.items[..self.len]
    }
}

/// Solves one component. Always returns a point inside `[0,1]^3`; a component
/// with no accepted boundary points yields the zero vertex and no feature.
pub fn solve_component(
    segments: &[Segment],
    component: &Component,
    params: &SolverParams,
) -> SolvedVertex {
    let candidates = Candidates::collect(segments, component, params.boundary_rule);
    let points = candidates.as_slice();
    if points.is_empty() {
        return SolvedVertex::default();
    }

    let inv = 1.0 / points.len() as f32;
    let mut center = Vec3::ZERO;
    let mut normal = Vec3::ZERO;
    for p in points {
        center += p.position;
        normal += p.normal;
    }
    let center = center * inv;
    let normal = normal.normalized();

    let mut min_dot = 1.0f32;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            min_dot = min_dot.min(a.normal.dot(b.normal));
        }
    }
    let sharp = min_dot.clamp(-1.0, 1.0).acos() >= params.sharp_angle_rad;
    if !sharp {
        return SolvedVertex {
            vertex: EdgeVertex::new(center.clamp01(), normal),
            sharp: false,
        };
    }

    let forces = corner_forces(points);
    let mut pos = center;
    for _ in 0..params.max_iterations {
        pos += trilinear(&forces, pos) * params.step_size;
    }
    // Oversized steps can diverge; keep the boundary average then.
    if !pos.is_finite() {
        pos = center;
    }
    SolvedVertex {
        vertex: EdgeVertex::new(pos.clamp01(), normal),
        sharp: true,
    }
}

/// Linearised plane pull at every cell corner.
fn corner_forces(points: &[EdgeVertex]) -> [Vec3; CELL_CORNERS] {
    let mut forces = [Vec3::ZERO; CELL_CORNERS];
    for (f, corner) in forces.iter_mut().zip(CORNER_POSITIONS.iter()) {
        for p in points {
            *f -= p.normal * p.normal.dot(*corner - p.position);
        }
    }
    forces
}

/// Interpolates corner values along z, then y, then x.
fn trilinear(c: &[Vec3; CELL_CORNERS], p: Vec3) -> Vec3 {
    let f0 = c[0].lerp(c[4], p.z);
    let f1 = c[1].lerp(c[5], p.z);
    let f2 = c[2].lerp(c[6], p.z);
    let f3 = c[3].lerp(c[7], p.z);
    let g0 = f0.lerp(f3, p.y);
    let g1 = f1.lerp(f2, p.y);
    g0.lerp(g1, p.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentEnd;

    fn end(edge: u8, position: Vec3, normal: Vec3) -> SegmentEnd {
        SegmentEnd {
            edge,
            vertex: EdgeVertex::new(position, normal),
        }
    }

    #[test]
    fn boundary_rules() {
        let on_edge = Vec3::new(0.0, 1.0, 0.3);
        let on_face = Vec3::new(0.4, 1.0, 0.3);
        let inside = Vec3::splat(0.5);
        assert!(BoundaryRule::CellEdge.accepts(on_edge));
        assert!(!BoundaryRule::CellEdge.accepts(on_face));
        assert!(BoundaryRule::CellFace.accepts(on_face));
        assert!(!BoundaryRule::CellFace.accepts(inside));
    }

    #[test]
    fn trilinear_hits_corners() {
        let mut c = [Vec3::ZERO; CELL_CORNERS];
        for (i, v) in c.iter_mut().enumerate() {
            *v = Vec3::splat(i as f32);
        }
        for (i, p) in CORNER_POSITIONS.iter().enumerate() {
            assert_eq!(trilinear(&c, *p), Vec3::splat(i as f32));
        }
    }

    #[test]
    fn forces_vanish_on_the_plane() {
        // One plane x = 0.25 with normal +x: corners on either side are pushed toward it.
        let p = [EdgeVertex::new(Vec3::new(0.25, 0.0, 0.0), Vec3::X)];
        let f = corner_forces(&p);
        assert_eq!(f[0], Vec3::new(0.25, 0.0, 0.0));
        assert_eq!(f[1], Vec3::new(-0.75, 0.0, 0.0));
        assert_eq!(trilinear(&f, Vec3::new(0.25, 0.5, 0.5)).length(), 0.0);
    }

    #[test]
    fn sharp_corner_relaxes_toward_plane_intersection() {
        // Two planes x = 0.5 and y = 0.5 meeting along a vertical crease.
        let segments = [
            Segment {
                a: end(0, Vec3::new(0.5, 0.0, 0.0), Vec3::X),
                b: end(1, Vec3::new(1.0, 0.5, 0.0), Vec3::Y),
                sharp: None,
            },
            Segment {
                a: end(1, Vec3::new(1.0, 0.5, 0.0), Vec3::Y),
                b: end(0, Vec3::new(0.5, 0.0, 0.0), Vec3::X),
                sharp: None,
            },
        ];
        let mut list = crate::segment::SegmentList::default();
        for s in segments {
            list.push(s);
        }
        let comps = crate::trace::trace_components(&mut list);
        let params = SolverParams {
            sharp_angle_rad: 40f32.to_radians(),
            max_iterations: 200,
            step_size: 0.1,
            boundary_rule: BoundaryRule::CellEdge,
        };
        let solved = solve_component(list.as_slice(), &comps.as_slice()[0], &params);
        assert!(solved.sharp);
        let p = solved.vertex.position;
        assert!((p.x - 0.5).abs() < 1e-3, "x = {}", p.x);
        assert!((p.y - 0.5).abs() < 1e-3, "y = {}", p.y);

        let smooth = SolverParams {
            sharp_angle_rad: 95f32.to_radians(),
            ..params
        };
        let flat = solve_component(list.as_slice(), &comps.as_slice()[0], &smooth);
        assert!(!flat.sharp);
        assert_eq!(flat.vertex.position, Vec3::new(0.75, 0.25, 0.0));
    }

    #[test]
    fn face_crease_points_stay_out_of_the_average() {
        let crease = EdgeVertex::new(Vec3::new(0.0, 0.0, 0.0), Vec3::Z);
        let mut list = crate::segment::SegmentList::default();
        list.push(Segment {
            a: end(0, Vec3::new(0.5, 0.0, 0.0), Vec3::X),
            b: end(1, Vec3::new(0.0, 0.5, 0.0), Vec3::Y),
            sharp: Some(crease),
        });
        list.push(Segment {
            a: end(1, Vec3::new(0.0, 0.5, 0.0), Vec3::Y),
            b: end(0, Vec3::new(0.5, 0.0, 0.0), Vec3::X),
            sharp: Some(crease),
        });
        let comps = crate::trace::trace_components(&mut list);
        let params = SolverParams {
            sharp_angle_rad: 100f32.to_radians(),
            max_iterations: 0,
            step_size: 0.05,
            boundary_rule: BoundaryRule::CellFace,
        };
        let solved = solve_component(list.as_slice(), &comps.as_slice()[0], &params);
        // The crease point lies on a face but only A endpoints are averaged.
        assert!(!solved.sharp);
        assert_eq!(solved.vertex.position, Vec3::new(0.25, 0.25, 0.0));
    }

    #[test]
    fn no_boundary_points_gives_zero_vertex() {
        let mut list = crate::segment::SegmentList::default();
        list.push(Segment {
            a: end(0, Vec3::splat(0.5), Vec3::X),
            b: end(1, Vec3::splat(0.5), Vec3::Y),
            sharp: None,
        });
        list.push(Segment {
            a: end(1, Vec3::splat(0.5), Vec3::Y),
            b: end(0, Vec3::splat(0.5), Vec3::X),
            sharp: None,
        });
        let comps = crate::trace::trace_components(&mut list);
        let params = SolverParams {
            sharp_angle_rad: 0.0,
            max_iterations: 10,
            step_size: 0.05,
            boundary_rule: BoundaryRule::CellEdge,
        };
        let solved = solve_component(list.as_slice(), &comps.as_slice()[0], &params);
        assert_eq!(solved, SolvedVertex::default());
    }
}
