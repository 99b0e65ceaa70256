//! Analytic ray-sphere intersection.

use crate::hittable::RayHit;
use lumen_core::Solid;
use lumen_math::{Interval, Ray};

/// Intersect a ray with a sphere solid.
///
/// Solves `a*t^2 + 2*b*t + c = 0` with `a = dot(d, d)`, so the direction
/// does not need to be unit length. The nearer root is tried first; the
/// farther one only if the nearer lies outside `ray_t`. Degenerate input
/// (zero direction, NaN) resolves to a miss.
pub fn hit_sphere<'a>(solid: &'a Solid, ray: &Ray, ray_t: Interval, rec: &mut RayHit<'a>) -> bool {
    let center = solid.position();
    let oc = ray.origin() - center;
    let a = ray.direction().length_squared();
    let b = oc.dot(ray.direction());
    let c = oc.length_squared() - solid.radius_squared();

    let discriminant = b * b - a * c;
    if !(discriminant > 0.0) || !(a > 0.0) {
        return false;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (-b - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (-b + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return false;
        }
    }

    rec.t = root;
    rec.position = ray.at(root);
    rec.normal = (rec.position - center) / solid.radius();
    rec.solid = solid;
    rec.ray = *ray;

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Vec3;

    fn unit_sphere_at(z: f32) -> Solid {
        Solid::sphere(0, Vec3::new(0.0, 0.0, z), 1.0)
    }

    #[test]
    fn test_sphere_hit_analytic_root() {
        let sphere = Solid::sphere(0, Vec3::new(0.0, 0.0, -5.0), 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = RayHit::default();

        assert!(hit_sphere(&sphere, &ray, Interval::FORWARD, &mut rec));
        assert!((rec.t - 3.0).abs() < 1e-5); // Should hit at t = 5 - 2
        assert!((rec.position - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-5);
        assert!((rec.normal.length() - 1.0).abs() < 1e-5);
        // Normal points away from the center, back toward the ray origin
        assert!((rec.normal - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        assert_eq!(rec.ray, ray);
    }

    #[test]
    fn test_sphere_hit_unnormalized_direction() {
        let sphere = unit_sphere_at(-5.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        let mut rec = RayHit::default();

        assert!(hit_sphere(&sphere, &ray, Interval::FORWARD, &mut rec));
        // World distance 4 at direction length 4
        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!((rec.position - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_at(-5.0);
        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let mut rec = RayHit::default();

        assert!(!hit_sphere(&sphere, &ray, Interval::FORWARD, &mut rec));
    }

    #[test]
    fn test_tangent_ray_is_a_miss() {
        let sphere = unit_sphere_at(-5.0);
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = RayHit::default();

        // Zero discriminant counts as no hit
        assert!(!hit_sphere(&sphere, &ray, Interval::FORWARD, &mut rec));
    }

    #[test]
    fn test_sphere_behind_origin() {
        let sphere = unit_sphere_at(5.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = RayHit::default();

        assert!(!hit_sphere(&sphere, &ray, Interval::FORWARD, &mut rec));
    }

    #[test]
    fn test_origin_inside_takes_far_root() {
        let sphere = unit_sphere_at(0.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = RayHit::default();

        assert!(hit_sphere(&sphere, &ray, Interval::FORWARD, &mut rec));
        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!((rec.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_interval_upper_bound_rejects() {
        let sphere = unit_sphere_at(-5.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = RayHit::default();

        assert!(!hit_sphere(&sphere, &ray, Interval::new(0.001, 3.5), &mut rec));
    }

    #[test]
    fn test_zero_direction_is_a_miss() {
        let sphere = unit_sphere_at(0.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO);
        let mut rec = RayHit::default();

        assert!(!hit_sphere(&sphere, &ray, Interval::FORWARD, &mut rec));
        assert!(rec.t.is_finite());
    }
}
