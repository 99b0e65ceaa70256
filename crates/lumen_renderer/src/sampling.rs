//! Rejection samplers shared by the camera and the bounce estimator.

use crate::rng::unit_float;
use lumen_math::{Vec2, Vec3};
use rand::RngCore;

/// Uniform float in [0, 1) from any generator.
#[inline]
pub fn gen_f32<R: RngCore + ?Sized>(rng: &mut R) -> f32 {
    unit_float(rng.next_u32())
}

/// Sample a random point in the unit disk.
pub fn random_in_unit_disk<R: RngCore + ?Sized>(rng: &mut R) -> Vec2 {
    loop {
        let p = Vec2::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Sample a random point in the unit ball.
pub fn random_in_unit_sphere<R: RngCore + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng), gen_f32(rng), gen_f32(rng)) * 2.0 - Vec3::ONE;
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Reflect a vector about a unit normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
