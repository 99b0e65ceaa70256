//! Recursive radiance estimator.
//!
//! Shading combines three terms at every hit:
//! - direct light from shadow rays toward each light (or a flat floor)
//! - indirect light from one reflected bounce, recursively
//! - an approximate highlight, only for primary rays
//!
//! Recursion depth is bounded by `max_bounces`, so the call stack stays
//! shallow and no cycle is possible.

use std::f32::consts::PI;

use crate::camera::Camera;
use crate::hittable::{hit_nearest, Hittable, RayHit};
use crate::rng::XorShiftRng;
use crate::sampling::{random_in_unit_disk, random_in_unit_sphere, reflect};
use lumen_core::{RaytracerSettings, Scene, Solid};
use lumen_math::{Interval, Ray, Vec2, Vec3, Vec4};

/// Path tracer bound to one scene, one settings snapshot and one RNG.
///
/// A tracer is created per tile and counts every ray it casts.
pub struct PathTracer<'a> {
    scene: &'a Scene,
    settings: &'a RaytracerSettings,
    rng: &'a mut XorShiftRng,
    rays: u64,
}

impl<'a> PathTracer<'a> {
    pub fn new(scene: &'a Scene, settings: &'a RaytracerSettings, rng: &'a mut XorShiftRng) -> Self {
        Self {
            scene,
            settings,
            rng,
            rays: 0,
        }
    }

    /// Number of rays cast so far.
    pub fn ray_count(&self) -> u64 {
        self.rays
    }

    pub fn rng(&mut self) -> &mut XorShiftRng {
        &mut *self.rng
    }

    /// Find the nearest solid along `ray`, if any.
    pub fn cast_ray(&mut self, ray: &Ray) -> Option<RayHit<'a>> {
        self.rays += 1;
        let solids: &'a [Solid] = self.scene.solids();
        let mut rec = RayHit::default();
        solids.hit(ray, Interval::FORWARD, &mut rec).then_some(rec)
    }

    /// Nearest hit ignoring the solid with id `ignore`.
    fn cast_ray_ignoring(&mut self, ray: &Ray, ignore: u32) -> Option<RayHit<'a>> {
        self.rays += 1;
        let solids: &'a [Solid] = self.scene.solids();
        let mut rec = RayHit::default();
        let candidates = solids.iter().filter(|solid| solid.id() != ignore);
        hit_nearest(candidates, ray, Interval::FORWARD, &mut rec).then_some(rec)
    }

    /// Direct contribution of one light at a hit.
    ///
    /// The shadow ray starts at the light (whose own shell is ignored) and
    /// heads for the hit point. The light counts as visible when the first
    /// solid it reaches is the shaded one. The cosine term is not clamped,
    /// so a light reaching the far side of the same solid contributes a
    /// negative amount.
    pub fn sample_light(&mut self, hit: &RayHit<'a>, light: &Solid) -> Vec3 {
        let shadow_ray = Ray::new(light.position(), hit.position - light.position());

        match self.cast_ray_ignoring(&shadow_ray, light.id()) {
            Some(first) if first.solid.id() == hit.solid.id() => {
                let to_light = (light.position() - hit.position).normalize_or_zero();
                light.color().truncate() * light.emission() * to_light.dot(hit.normal)
            }
            _ => Vec3::ZERO,
        }
    }

    /// Direct lighting at a hit, floored by the minimum illumination.
    pub fn brightness_from_lights(&mut self, hit: &RayHit<'a>) -> Vec3 {
        let lights: &'a [Solid] = self.scene.lights();
        let mut brightness = Vec3::ZERO;

        if self.settings.sample_one_light {
            // Out-of-range selections contribute nothing
            if let Some(light) = lights.get(self.settings.sample_light_index) {
                brightness = self.sample_light(hit, light);
            }
        } else {
            for light in lights {
                brightness += self.sample_light(hit, light);
            }
        }

        brightness.max(Vec3::splat(self.settings.minimum_illumination))
    }

    /// Highlight term: squared sum of mirrored light directions seen from
    /// the ray origin, scaled by the solid's reflectivity.
    pub fn specular_brightness(&self, hit: &RayHit<'a>) -> f32 {
        let view = (-hit.ray.direction()).normalize_or_zero();
        let mut factor = 0.0;

        for light in self.scene.lights() {
            let light_dir = (hit.position - light.position()).normalize_or_zero();
            let reflection = reflect(light_dir, hit.normal);
            factor += reflection.dot(view).clamp(0.0, 1.0);
        }

        factor.powi(2) * hit.solid.reflectivity()
    }

    /// Indirect light arriving at `hit` from one reflected bounce.
    ///
    /// Returns zero once the next depth would exceed `max_bounces`.
    pub fn color_from_bounce(&mut self, hit: &RayHit<'a>, depth: u32) -> Vec3 {
        let depth = depth + 1;
        if depth > self.settings.max_bounces {
            return Vec3::ZERO;
        }

        let mut normal = hit.normal;
        if self.settings.randomize_bounce_on_roughness {
            let jitter = random_in_unit_sphere(&mut *self.rng) * hit.solid.roughness();
            normal = (normal + jitter).try_normalize().unwrap_or(hit.normal);
        }

        let bounced = Ray::new(hit.position, reflect(hit.ray.direction(), normal));
        self.color_for_ray(&bounced, depth).truncate()
    }

    /// Radiance along `ray` at bounce `depth` (0 for camera rays).
    ///
    /// A miss returns the background unchanged. Past the bounce budget the
    /// ray carries nothing.
    pub fn color_for_ray(&mut self, ray: &Ray, depth: u32) -> Vec4 {
        if depth > self.settings.max_bounces {
            return Vec4::ZERO;
        }

        let Some(hit) = self.cast_ray(ray) else {
            return self.scene.background();
        };

        let direct = if self.settings.diffuse_light_sampling {
            self.brightness_from_lights(&hit)
        } else {
            Vec3::splat(self.settings.minimum_illumination)
        };
        let bounce = self.color_from_bounce(&hit, depth);
        let specular = if depth == 0 && self.settings.specular_sampling {
            self.specular_brightness(&hit)
        } else {
            0.0
        };

        let solid = hit.solid;
        let base = solid.color();
        let emission = base.truncate() * solid.emission();

        let mut color = base.truncate() * (direct / PI) + bounce + Vec3::splat(specular) + emission;
        if depth > 0 {
            color *= 1.0 - solid.roughness();
        }

        color.extend(base.w)
    }

    /// Average of `samples_per_pixel` camera samples for pixel (x, y).
    ///
    /// Row 0 is the top of the image. With `randomize_camera_rays` each
    /// sample is jittered inside the pixel and across the lens; otherwise
    /// every sample goes through the pixel center as a pinhole ray.
    pub fn render_pixel(&mut self, camera: &Camera, x: u32, y: u32, width: u32, height: u32) -> Vec4 {
        let samples = self.settings.samples_per_pixel.max(1);
        let mut color = Vec4::ZERO;

        for _ in 0..samples {
            let (jx, jy, lens) = if self.settings.randomize_camera_rays {
                let jx = self.rng.next_float_unit();
                let jy = self.rng.next_float_unit();
                (jx, jy, random_in_unit_disk(&mut *self.rng))
            } else {
                (0.5, 0.5, Vec2::ZERO)
            };

            let s = (x as f32 + jx) / width as f32;
            let t = 1.0 - (y as f32 + jy) / height as f32;
            let ray = camera.get_ray(s, t, lens);
            color += self.color_for_ray(&ray, 0);
        }

        color / samples as f32
    }
}
