use cms_geom::Vec3;
use cms_mesh_cpu::{
    BoundaryRule, CellCoord, CmsConfig, Face, MeshBuild, SegmentList, ShadingMode, face_config,
    face_normal, generate_face_segments, mesh_cell,
};
use cms_volume::{HermiteVolume, VoxelSample};

/// Ball of radius 0.5 centred on corner 0 of a single cell.
fn corner_ball() -> HermiteVolume {
    HermiteVolume::from_density((2, 2, 2), 1e-3, |p| 0.5 - p.length()).unwrap()
}

fn in_unit_cube(p: Vec3) -> bool {
    (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y) && (0.0..=1.0).contains(&p.z)
}

#[test]
fn uniform_cell_emits_nothing() {
    let vol = HermiteVolume::from_fn((2, 2, 2), |_, _, _| VoxelSample::new(1.0, Vec3::Y)).unwrap();
    let mut out = MeshBuild::default();
    let r = mesh_cell(&vol, CellCoord::new(0, 0, 0), &CmsConfig::new(1, 1), &mut out);
    assert_eq!(r.segments, 0);
    assert_eq!(r.components, 0);
    assert_eq!(r.triangles, 0);
    assert!(out.vertices.is_empty());
    assert!(out.indices.is_empty());
}

#[test]
fn single_solid_corner_face() {
    // NegZ walks cell corners 0, 3, 2, 1; only its last corner is solid.
    let mut d = [-1.0f32; 8];
    d[1] = 1.0;
    let samples = d.map(|v| VoxelSample::new(v, Vec3::Y));
    assert_eq!(face_config(&samples, Face::NegZ), 8);
    let mut segs = SegmentList::default();
    assert_eq!(generate_face_segments(&samples, Face::NegZ, 40f32.to_radians(), &mut segs), 1);
    let s = segs.as_slice()[0];
    assert_eq!(s.a.vertex.position, Vec3::new(0.5, 0.0, 0.0));
    assert_eq!(s.b.vertex.position, Vec3::new(1.0, 0.5, 0.0));
    assert!(s.sharp.is_none());
}

#[test]
fn single_empty_corner_face() {
    // Densities [1, 1, 1, -1] around NegZ: config 7, crossings at t = 0.5.
    let mut d = [-1.0f32; 8];
    d[0] = 1.0;
    d[3] = 1.0;
    d[2] = 1.0;
    d[1] = -1.0;
    let samples = d.map(|v| VoxelSample::new(v, Vec3::Y));
    assert_eq!(face_config(&samples, Face::NegZ), 7);
    let mut segs = SegmentList::default();
    generate_face_segments(&samples, Face::NegZ, 40f32.to_radians(), &mut segs);
    assert_eq!(segs.len(), 1);
    let s = segs.as_slice()[0];
    assert_eq!(s.a.vertex.position, Vec3::new(1.0, 0.5, 0.0));
    assert_eq!(s.b.vertex.position, Vec3::new(0.5, 0.0, 0.0));
}

#[test]
fn corner_ball_has_sharp_creases_at_default_angle() {
    let vol = corner_ball();
    let cfg = CmsConfig::new(1, 1);
    let mut out = MeshBuild::default();
    let r = mesh_cell(&vol, CellCoord::new(0, 0, 0), &cfg, &mut out);
    assert_eq!(r.segments, 3);
    assert_eq!(r.components, 1);
    assert_eq!(r.sharp_segments, 3);
    assert_eq!(r.sharp_components, 1);
    assert_eq!(r.triangles, 6);
    assert_eq!(out.triangle_count(), 6);
    assert_eq!(out.vertices.len(), 18);
    for v in &out.vertices {
        assert!(in_unit_cube(v.position), "{:?}", v.position);
        assert!(v.normal.dot(v.position.normalized()) > 0.0, "{:?}", v);
    }
}

#[test]
fn corner_ball_flat_normals_point_outward() {
    let vol = corner_ball();
    let cfg = CmsConfig {
        shading: ShadingMode::Flat,
        ..CmsConfig::new(1, 1)
    };
    let mut out = MeshBuild::default();
    mesh_cell(&vol, CellCoord::new(0, 0, 0), &cfg, &mut out);
    for [a, b, c] in out.triangles() {
        let n = face_normal(a.position, b.position, c.position);
        assert_eq!(a.normal, n);
        let centroid = (a.position + b.position + c.position) / 3.0;
        assert!(n.dot(centroid.normalized()) > 0.0);
    }
}

#[test]
fn straight_angle_threshold_disables_relaxation() {
    let vol = corner_ball();
    let cfg = CmsConfig {
        sharp_feature_angle_deg: 180.0,
        ..CmsConfig::new(1, 1)
    };
    let mut out = MeshBuild::default();
    let r = mesh_cell(&vol, CellCoord::new(0, 0, 0), &cfg, &mut out);
    assert_eq!(r.sharp_components, 0);
    assert_eq!(r.sharp_segments, 0);
    assert_eq!(r.triangles, 3);
    // The fan centre is the plain average of the three crossings.
    let c = out.vertices[0].position;
    assert!((c - Vec3::splat(0.5 / 3.0)).length() < 1e-6, "{:?}", c);
}

#[test]
fn face_rule_centre_averages_only_a_endpoints() {
    let vol = corner_ball();
    let cfg = CmsConfig {
        boundary_rule: BoundaryRule::CellFace,
        max_iterations: 0,
        ..CmsConfig::new(1, 1)
    };
    let mut out = MeshBuild::default();
    let r = mesh_cell(&vol, CellCoord::new(0, 0, 0), &cfg, &mut out);
    assert_eq!(r.sharp_components, 1);
    assert_eq!(r.triangles, 6);
    // Every fan starts at the component vertex.
    for [centre, _, _] in out.triangles() {
        let c = centre.position;
        assert!((c - Vec3::splat(0.5 / 3.0)).length() < 1e-6, "{:?}", c);
    }
}

#[test]
fn rerunning_a_cell_is_bit_identical() {
    let centre = Vec3::new(1.3, 0.8, 1.1);
    let vol = HermiteVolume::from_density((3, 3, 3), 1e-3, |p| 0.9 - (p - centre).length()).unwrap();
    let cfg = CmsConfig::new(2, 1);
    for z in 0..2 {
        for y in 0..2 {
            for x in 0..2 {
                let coord = CellCoord::new(x, y, z);
                let mut a = MeshBuild::default();
                let mut b = MeshBuild::default();
                let ra = mesh_cell(&vol, coord, &cfg, &mut a);
                let rb = mesh_cell(&vol, coord, &cfg, &mut b);
                assert_eq!(ra, rb);
                assert_eq!(a.vertices, b.vertices);
                assert_eq!(a.indices, b.indices);
            }
        }
    }
}

#[test]
fn stride_reads_every_other_lattice_point() {
    // Lattice points at odd coordinates would flip the sign if they were read.
    let vol = HermiteVolume::from_fn((3, 3, 3), |x, y, z| {
        let d = if (x, y, z) == (0, 0, 0) {
            1.0
        } else if x % 2 == 1 || y % 2 == 1 || z % 2 == 1 {
            5.0
        } else {
            -1.0
        };
        VoxelSample::new(d, Vec3::new(1.0, 1.0, 1.0).normalized())
    })
    .unwrap();
    let cfg = CmsConfig::new(1, 2);
    let mut out = MeshBuild::default();
    let r = mesh_cell(&vol, CellCoord::new(0, 0, 0), &cfg, &mut out);
    assert_eq!(r.segments, 3);
    assert_eq!(r.triangles, 3);
    for v in &out.vertices {
        assert!(v.position.x <= 2.0 && v.position.y <= 2.0 && v.position.z <= 2.0);
    }
    // Crossings sit halfway along the two-voxel edges.
    assert!(out.vertices.iter().any(|v| v.position == Vec3::new(1.0, 0.0, 0.0)));
}
