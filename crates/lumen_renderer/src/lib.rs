//! Lumen Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer over analytic spheres. The image is split into
//! buckets that render in parallel on a rayon pool, each with its own
//! xorshift generator, and every pass reports how many rays it cast.

mod bucket;
mod camera;
mod engine;
mod hittable;
mod rng;
mod sampling;
mod sphere;
mod tracer;

pub use bucket::{generate_buckets, render_bucket, split_frame, Bucket, TileContext, TileStats, TileTarget};
pub use camera::Camera;
pub use engine::{Engine, EngineConfig, EngineError, PassStats};
pub use hittable::{hit_nearest, Hittable, RayHit};
pub use rng::{unit_float, XorShiftRng};
pub use sampling::{random_in_unit_disk, random_in_unit_sphere, reflect};
pub use sphere::hit_sphere;
pub use tracer::PathTracer;

/// Re-export common math types from lumen_math
pub use lumen_math::{Interval, Ray, Vec2, Vec3, Vec4};
