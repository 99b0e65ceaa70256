//! Hittable trait and RayHit for ray-solid intersection.

use crate::sphere::hit_sphere;
use lumen_core::{Solid, SolidKind};
use lumen_math::{Interval, Ray, Vec3};

/// Static placeholder solid for RayHit::default().
static NO_SOLID: Solid = Solid::EMPTY;

/// Record of a ray-solid intersection.
#[derive(Debug, Clone, Copy)]
pub struct RayHit<'a> {
    /// Point of intersection
    pub position: Vec3,
    /// Unit outward surface normal
    pub normal: Vec3,
    /// The solid that was struck
    pub solid: &'a Solid,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// The ray that produced this hit
    pub ray: Ray,
}

impl<'a> Default for RayHit<'a> {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::ZERO,
            solid: &NO_SOLID,
            t: 0.0,
            ray: Ray::default(),
        }
    }
}

/// Trait for things that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object within the given interval.
    ///
    /// Returns true if hit, and fills in the hit record.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut RayHit<'a>) -> bool;
}

impl Hittable for Solid {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut RayHit<'a>) -> bool {
        match self.kind() {
            Some(SolidKind::Sphere) => hit_sphere(self, ray, ray_t, rec),
            // Scene::new rejects every other kind, so reaching here means
            // the solid list was built around the validation.
            other => unreachable!(
                "solid {} with kind {:?} (raw {}) reached the intersector",
                self.id(),
                other,
                self.kind_raw()
            ),
        }
    }
}

impl Hittable for [Solid] {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut RayHit<'a>) -> bool {
        hit_nearest(self.iter(), ray, ray_t, rec)
    }
}

/// Nearest hit across `solids`. Linear scan, no acceleration.
///
/// The upper bound starts at `ray_t.max` and tightens to every accepted
/// hit, so `rec` ends up holding the closest one.
pub fn hit_nearest<'a>(
    solids: impl Iterator<Item = &'a Solid>,
    ray: &Ray,
    ray_t: Interval,
    rec: &mut RayHit<'a>,
) -> bool {
    let mut hit_anything = false;
    let mut closest_so_far = ray_t.max;

    for solid in solids {
        if solid.hit(ray, ray_t.with_max(closest_so_far), rec) {
            hit_anything = true;
            closest_so_far = rec.t;
        }
    }

    hit_anything
}
