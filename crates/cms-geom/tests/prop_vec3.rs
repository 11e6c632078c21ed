use cms_geom::{Vec2, Vec3};
use proptest::num::f32::NORMAL;
use proptest::prelude::*;
use proptest::strategy::Strategy;

fn approx(a: f32, b: f32, eps: f32) -> bool { (a - b).abs() <= eps }
fn vapprox(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx(a.x, b.x, eps) && approx(a.y, b.y, eps) && approx(a.z, b.z, eps)
}

fn approx_abs_rel(a: f32, b: f32, atol: f32, rtol: f32) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= atol + rtol * scale
}

fn approx_zero_scaled(val: f32, scale: f32, atol: f32, rtol: f32) -> bool {
    val.abs() <= atol + rtol * scale
}

fn bounded_f32() -> impl Strategy<Value = f32> {
    NORMAL.prop_filter("bounded", |v| v.is_finite() && v.abs() <= 1e6)
}

fn bounded_nonzero_f32() -> impl Strategy<Value = f32> {
    NORMAL.prop_filter("bounded_nonzero", |v| v.is_finite() && {
        let a = v.abs();
        a >= 1e-6 && a <= 1e6
    })
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_f32(), bounded_f32(), bounded_f32())
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_nondegenerate_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_nonzero_f32(), bounded_nonzero_f32(), bounded_nonzero_f32())
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn unit_interval() -> impl Strategy<Value = f32> {
    0.0f32..=1.0
}

proptest! {
    // Addition commutativity: a + b == b + a (element-wise)
    #[test]
    fn vec3_add_commutative(a in arb_vec3(), b in arb_vec3()) {
        prop_assert!(vapprox(a + b, b + a, 1e-5));
    }

    // Distributive property of dot over addition: (a + b)·c = a·c + b·c
    #[test]
    fn vec3_dot_distributive(a in arb_vec3(), b in arb_vec3(), c in arb_vec3()) {
        let left = (a + b).dot(c);
        let right = a.dot(c) + b.dot(c);
        let scale = (a.length() + b.length()) * c.length();
        prop_assert!(approx_zero_scaled(left - right, scale, 1e-6, 1e-5));
    }

    // Cross orthogonality: a·(a×b) = 0 and b·(a×b) = 0
    #[test]
    fn vec3_cross_orthogonal(a in arb_nondegenerate_vec3(), b in arb_nondegenerate_vec3()) {
        let c = a.cross(b);
        let scale_a = a.length() * c.length();
        let scale_b = b.length() * c.length();
        prop_assert!(approx_zero_scaled(a.dot(c), scale_a, 1e-6, 1e-5));
        prop_assert!(approx_zero_scaled(b.dot(c), scale_b, 1e-6, 1e-5));
    }

    // Negation matches multiplication by -1
    #[test]
    fn vec3_neg_is_scale_minus_one(a in arb_vec3()) {
        prop_assert_eq!(-a, a * -1.0);
    }

    // Normalized length: |normalize(v)| = 1 for non-zero vectors
    #[test]
    fn vec3_normalized_length(v in arb_nondegenerate_vec3()) {
        prop_assert!(approx(v.normalized().length(), 1.0, 1e-3));
    }

    // Lerp hits both endpoints exactly and stays on the segment in between
    #[test]
    fn vec3_lerp_endpoints_and_bounds(a in arb_vec3(), b in arb_vec3(), t in unit_interval()) {
        prop_assert_eq!(a.lerp(b, 0.0), a);
        let end = a.lerp(b, 1.0);
        let tol = Vec3::new(a.x.abs() + b.x.abs(), a.y.abs() + b.y.abs(), a.z.abs() + b.z.abs()) * 1e-5;
        prop_assert!((end.x - b.x).abs() <= tol.x + 1e-6);
        prop_assert!((end.y - b.y).abs() <= tol.y + 1e-6);
        prop_assert!((end.z - b.z).abs() <= tol.z + 1e-6);
        let p = a.lerp(b, t);
        let lo = a.min(b);
        let hi = a.max(b);
        let slack = (hi - lo).length() * 1e-5 + 1e-6;
        prop_assert!(p.x >= lo.x - slack && p.x <= hi.x + slack);
        prop_assert!(p.y >= lo.y - slack && p.y <= hi.y + slack);
        prop_assert!(p.z >= lo.z - slack && p.z <= hi.z + slack);
    }

    // clamp01 always lands inside the unit cube and is idempotent
    #[test]
    fn vec3_clamp01_bounded(a in arb_vec3()) {
        let c = a.clamp01();
        for axis in 0..3 {
            prop_assert!((0.0..=1.0).contains(&c.axis(axis)));
        }
        prop_assert_eq!(c.clamp01(), c);
    }

    // with_axis only touches the requested component
    #[test]
    fn vec3_with_axis_roundtrip(a in arb_vec3(), v in bounded_f32(), axis in 0usize..3) {
        let b = a.with_axis(axis, v);
        prop_assert_eq!(b.axis(axis), v);
        for other in (0..3).filter(|&o| o != axis) {
            prop_assert_eq!(b.axis(other), a.axis(other));
        }
    }

    // Lagrange's identity: |a×b|^2 + (a·b)^2 = |a|^2 |b|^2
    #[test]
    fn vec3_lagrange_identity(a in arb_vec3(), b in arb_vec3()) {
        let lhs = a.cross(b).length().powi(2) + a.dot(b).powi(2);
        let rhs = a.dot(a) * b.dot(b);
        prop_assert!(approx_abs_rel(lhs, rhs, 1e-5, 1e-5));
    }

    // perp is orthogonal to its input and perp_dot equals dot with the perpendicular
    #[test]
    fn vec2_perp_properties(x in bounded_f32(), y in bounded_f32(), u in bounded_f32(), v in bounded_f32()) {
        let a = Vec2::new(x, y);
        let b = Vec2::new(u, v);
        prop_assert_eq!(a.perp().dot(a), 0.0);
        let scale = a.length() * b.length();
        prop_assert!(approx_zero_scaled(a.perp_dot(b) - a.perp().dot(b), scale, 1e-6, 1e-5));
    }
}
