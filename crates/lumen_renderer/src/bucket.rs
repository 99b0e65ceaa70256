//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel. Each bucket borrows its own rows of the
//! frame buffer, so workers write pixels in place without locking.

use std::cmp::Ordering;
use std::time::Instant;

use crate::camera::Camera;
use crate::rng::XorShiftRng;
use crate::tracer::PathTracer;
use lumen_core::{RaytracerSettings, Scene};
use lumen_math::Vec4;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Squared distance from the bucket center to the image center.
    fn distance_to_center(&self, image_width: u32, image_height: u32) -> f32 {
        let cx = self.x as f32 + self.width as f32 / 2.0 - image_width as f32 / 2.0;
        let cy = self.y as f32 + self.height as f32 / 2.0 - image_height as f32 / 2.0;
        cx * cx + cy * cy
    }
}

/// Row-major grid of buckets; edge buckets are clipped to the image.
fn grid_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    buckets
}

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Every pixel belongs to exactly one bucket. Buckets closer to the center
/// come first, so the middle of the image fills in early.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = grid_buckets(width, height, bucket_size);
    buckets.sort_by(|a, b| spiral_order(a, b, width, height));

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

fn spiral_order(a: &Bucket, b: &Bucket, width: u32, height: u32) -> Ordering {
    let a_dist = a.distance_to_center(width, height);
    let b_dist = b.distance_to_center(width, height);
    a_dist.partial_cmp(&b_dist).unwrap_or(Ordering::Equal)
}

/// A bucket together with mutable access to its pixels.
///
/// `rows[i]` is image row `bucket.y + i`, columns `bucket.x ..
/// bucket.x + bucket.width`.
pub struct TileTarget<'a> {
    pub bucket: Bucket,
    rows: Vec<&'a mut [Vec4]>,
}

impl<'a> TileTarget<'a> {
    /// Number of pixels this tile can write.
    pub fn pixel_count(&self) -> u64 {
        self.rows.iter().map(|row| row.len() as u64).sum()
    }
}

/// Split a row-major pixel slice into one disjoint target per bucket.
///
/// Targets come back in spiral order with `bucket.index` matching their
/// position. `pixels` must hold at least `width * height` entries.
pub fn split_frame(pixels: &mut [Vec4], width: u32, height: u32, bucket_size: u32) -> Vec<TileTarget<'_>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let bucket_size = bucket_size.max(1);
    let columns = width.div_ceil(bucket_size) as usize;
    let mut targets: Vec<TileTarget<'_>> = grid_buckets(width, height, bucket_size)
        .into_iter()
        .map(|bucket| TileTarget {
            bucket,
            rows: Vec::with_capacity(bucket.height as usize),
        })
        .collect();

    for (y, row) in pixels
        .chunks_mut(width as usize)
        .take(height as usize)
        .enumerate()
    {
        let first = (y / bucket_size as usize) * columns;
        let mut rest = row;
        for target in &mut targets[first..first + columns] {
            let (segment, tail) = std::mem::take(&mut rest).split_at_mut(target.bucket.width as usize);
            target.rows.push(segment);
            rest = tail;
        }
    }

    targets.sort_by(|a, b| spiral_order(&a.bucket, &b.bucket, width, height));
    for (i, target) in targets.iter_mut().enumerate() {
        target.bucket.index = i;
    }

    targets
}

/// Per-tile counters reported back to the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileStats {
    pub rays: u64,
    pub pixels_written: u64,
    pub pixels_skipped: u64,
    /// False when the deadline stopped the tile before its last row
    pub completed: bool,
}

/// Everything a tile needs besides its pixels and RNG.
#[derive(Clone, Copy)]
pub struct TileContext<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub settings: &'a RaytracerSettings,
    pub image_width: u32,
    pub image_height: u32,
    pub deadline: Option<Instant>,
}

/// Render one bucket in place.
///
/// Every pixel reseeds the tile RNG with its flat index, then may be
/// skipped with `skip_probability` percent chance, leaving whatever the
/// previous pass wrote. The deadline is checked between rows.
pub fn render_bucket(target: TileTarget<'_>, ctx: &TileContext<'_>, rng: &mut XorShiftRng) -> TileStats {
    let TileTarget { bucket, rows } = target;
    let mut tracer = PathTracer::new(ctx.scene, ctx.settings, rng);
    let mut stats = TileStats {
        completed: true,
        ..Default::default()
    };

    for (local_y, row) in rows.into_iter().enumerate() {
        if ctx.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            stats.completed = false;
            break;
        }

        let y = bucket.y + local_y as u32;
        for (local_x, pixel) in row.iter_mut().enumerate() {
            let x = bucket.x + local_x as u32;
            let index = y as u64 * ctx.image_width as u64 + x as u64;

            let rng = tracer.rng();
            rng.seed(index as u32);
            if ctx.settings.skip_probability > 0
                && rng.next_u32_in_range(0, 100) < ctx.settings.skip_probability
            {
                stats.pixels_skipped += 1;
                continue;
            }

            *pixel = tracer.render_pixel(ctx.camera, x, y, ctx.image_width, ctx.image_height);
            stats.pixels_written += 1;
        }
    }

    stats.rays = tracer.ray_count();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        // Total pixels should equal image size
        let total_pixels: u64 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        let total_pixels: u64 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_every_pixel_covered_once() {
        for (width, height, size) in [(1, 1, 150), (7, 3, 2), (301, 149, 150), (150, 450, 150), (33, 65, 8)] {
            let buckets = generate_buckets(width, height, size);
            let mut hits = vec![0u8; (width * height) as usize];

            for bucket in &buckets {
                for y in bucket.y..bucket.y + bucket.height {
                    for x in bucket.x..bucket.x + bucket.width {
                        hits[(y * width + x) as usize] += 1;
                    }
                }
            }

            assert!(
                hits.iter().all(|&count| count == 1),
                "{}x{} with bucket size {} has gaps or overlaps",
                width,
                height,
                size
            );
        }
    }

    #[test]
    fn test_empty_image_has_no_buckets() {
        assert!(generate_buckets(0, 10, 4).is_empty());
        assert!(generate_buckets(10, 0, 4).is_empty());
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!(first.x, 64);
        assert_eq!(first.y, 64);
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_split_frame_targets_are_disjoint_and_complete() {
        let (width, height) = (10u32, 7u32);
        let mut pixels = vec![Vec4::ZERO; (width * height) as usize];

        {
            let targets = split_frame(&mut pixels, width, height, 4);
            assert_eq!(targets.len(), 6); // 3 columns x 2 rows
            assert_eq!(targets.iter().map(TileTarget::pixel_count).sum::<u64>(), 70);

            for mut target in targets {
                let bucket = target.bucket;
                assert_eq!(target.rows.len(), bucket.height as usize);
                for (local_y, row) in target.rows.iter_mut().enumerate() {
                    assert_eq!(row.len(), bucket.width as usize);
                    for (local_x, pixel) in row.iter_mut().enumerate() {
                        let x = bucket.x + local_x as u32;
                        let y = bucket.y + local_y as u32;
                        // Record where the tile thinks it is writing
                        *pixel += Vec4::new(x as f32, y as f32, 0.0, 1.0);
                    }
                }
            }
        }

        for y in 0..height {
            for x in 0..width {
                let pixel = pixels[(y * width + x) as usize];
                assert_eq!(pixel, Vec4::new(x as f32, y as f32, 0.0, 1.0));
            }
        }
    }

    #[test]
    fn test_split_frame_matches_generate_buckets() {
        let mut pixels = vec![Vec4::ZERO; 300 * 200];
        let targets = split_frame(&mut pixels, 300, 200, 64);
        let buckets = generate_buckets(300, 200, 64);

        let split: Vec<Bucket> = targets.iter().map(|t| t.bucket).collect();
        assert_eq!(split, buckets);
    }
}
