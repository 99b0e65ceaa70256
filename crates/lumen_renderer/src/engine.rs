//! Render engine: owns the scene, camera, settings and RNG arena, and runs
//! tile-parallel passes into a caller-owned frame buffer.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

use crate::bucket::{render_bucket, split_frame, TileContext};
use crate::camera::Camera;
use crate::rng::XorShiftRng;
use lumen_core::{FrameBuffer, RaytracerSettings, Scene};

/// Errors raised while setting up an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Engine construction options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker threads for a dedicated pool; `None` uses rayon's global pool
    pub threads: Option<usize>,
}

/// Summary of one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Rays cast by all tiles, shadow and bounce rays included
    pub rays: u64,
    pub pixels_written: u64,
    pub pixels_skipped: u64,
    pub tiles: usize,
    pub tiles_completed: usize,
    pub elapsed: Duration,
}

impl PassStats {
    pub fn rays_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rays as f64 / secs
        } else {
            0.0
        }
    }

    /// True when no tile was cut short by a deadline.
    pub fn is_complete(&self) -> bool {
        self.tiles_completed == self.tiles
    }
}

/// Path tracing engine.
///
/// Passes take `&mut self`, so settings and camera can only change between
/// passes. Each tile index owns one RNG that persists across passes, which
/// makes a sequence of passes reproducible for a fixed tile layout.
pub struct Engine {
    scene: Scene,
    camera: Camera,
    settings: RaytracerSettings,
    rngs: Vec<XorShiftRng>,
    pool: Option<ThreadPool>,
    last_pass: Option<PassStats>,
}

impl Engine {
    /// Create an engine on rayon's global pool.
    pub fn new(scene: Scene, settings: RaytracerSettings) -> Self {
        let camera = Camera::from_params(scene.camera());
        Self {
            scene,
            camera,
            settings,
            rngs: Vec::new(),
            pool: None,
            last_pass: None,
        }
    }

    /// Create an engine, building a dedicated pool if `config` asks for one.
    pub fn with_config(
        scene: Scene,
        settings: RaytracerSettings,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let mut engine = Self::new(scene, settings);
        if let Some(threads) = config.threads {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("lumen-tile-{}", i))
                .build()?;
            log::info!("Render pool: {} threads", pool.current_num_threads());
            engine.pool = Some(pool);
        }
        Ok(engine)
    }

    /// Replace the scene and rebuild the camera from its parameters.
    ///
    /// The current aspect ratio is kept, since it follows the frame buffer
    /// rather than the scene.
    pub fn load_scene(&mut self, scene: Scene) {
        let aspect = self.camera.aspect();
        self.camera = Camera::from_params(scene.camera());
        self.camera.set_aspect(aspect);
        self.camera.recalculate();
        self.scene = scene;
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access. Call [`Camera::recalculate`] after edits.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn settings(&self) -> &RaytracerSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RaytracerSettings {
        &mut self.settings
    }

    pub fn set_settings(&mut self, settings: RaytracerSettings) {
        self.settings = settings;
    }

    /// Match the camera aspect to a frame buffer size.
    pub fn resize_camera(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect(width as f32 / height as f32);
        self.camera.recalculate();
    }

    /// Statistics of the most recent pass.
    pub fn last_pass(&self) -> Option<&PassStats> {
        self.last_pass.as_ref()
    }

    /// Render one full pass into `frame`, blocking until every tile is done.
    pub fn render_pass(&mut self, frame: &mut FrameBuffer) -> PassStats {
        self.run_pass(frame, None)
    }

    /// Render one pass, letting tiles stop at a row boundary once
    /// `deadline` has passed. Rows not reached keep their previous values.
    pub fn render_pass_until(&mut self, frame: &mut FrameBuffer, deadline: Instant) -> PassStats {
        self.run_pass(frame, Some(deadline))
    }

    fn run_pass(&mut self, frame: &mut FrameBuffer, deadline: Option<Instant>) -> PassStats {
        let start = Instant::now();
        let settings = self.settings.sanitized();

        let light_count = self.scene.lights().len();
        if settings.diffuse_light_sampling
            && settings.sample_one_light
            && light_count > 0
            && settings.sample_light_index >= light_count
        {
            log::warn!(
                "Light index {} out of range ({} lights); direct light disabled",
                settings.sample_light_index,
                light_count
            );
        }

        let (width, height) = (frame.width(), frame.height());
        let targets = split_frame(frame.pixels_mut(), width, height, settings.tile_size);
        let tiles = targets.len();
        ensure_rngs(&mut self.rngs, tiles);

        log::debug!(
            "Pass: {}x{} in {} tiles of {}px, {} spp, {} bounces",
            width,
            height,
            tiles,
            settings.tile_size,
            settings.samples_per_pixel,
            settings.max_bounces
        );

        let ctx = TileContext {
            scene: &self.scene,
            camera: &self.camera,
            settings: &settings,
            image_width: width,
            image_height: height,
            deadline,
        };
        let rngs = &mut self.rngs[..tiles];

        let rays = AtomicU64::new(0);
        let written = AtomicU64::new(0);
        let skipped = AtomicU64::new(0);
        let completed = AtomicUsize::new(0);

        let work = || {
            targets
                .into_par_iter()
                .zip(rngs.par_iter_mut())
                .for_each(|(target, rng)| {
                    let stats = render_bucket(target, &ctx, rng);
                    rays.fetch_add(stats.rays, Ordering::Relaxed);
                    written.fetch_add(stats.pixels_written, Ordering::Relaxed);
                    skipped.fetch_add(stats.pixels_skipped, Ordering::Relaxed);
                    if stats.completed {
                        completed.fetch_add(1, Ordering::Relaxed);
                    }
                });
        };

        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }

        let stats = PassStats {
            rays: rays.into_inner(),
            pixels_written: written.into_inner(),
            pixels_skipped: skipped.into_inner(),
            tiles,
            tiles_completed: completed.into_inner(),
            elapsed: start.elapsed(),
        };

        log::debug!(
            "Pass done in {:.2?}: {} rays, {} written, {} skipped, {}/{} tiles",
            stats.elapsed,
            stats.rays,
            stats.pixels_written,
            stats.pixels_skipped,
            stats.tiles_completed,
            stats.tiles
        );

        self.last_pass = Some(stats);
        stats
    }
}

/// Grow the arena to `count` generators, keeping existing state.
fn ensure_rngs(rngs: &mut Vec<XorShiftRng>, count: usize) {
    while rngs.len() < count {
        let i = rngs.len() as u32;
        rngs.push(XorShiftRng::new((i + 1).wrapping_mul(0x9E37_79B9)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{CameraParams, Solid};
    use lumen_math::{Vec3, Vec4};

    fn test_scene() -> Scene {
        let solids = vec![
            Solid::sphere(0, Vec3::ZERO, 1.0).with_color(Vec4::new(1.0, 0.0, 0.0, 1.0)),
            Solid::sphere(1, Vec3::new(0.0, 3.0, 3.0), 0.25).with_emission(1.0),
        ];
        Scene::new(CameraParams::default(), solids, Vec4::new(0.1, 0.2, 0.3, 1.0)).unwrap()
    }

    #[test]
    fn test_ensure_rngs_keeps_existing_state() {
        let mut rngs = Vec::new();
        ensure_rngs(&mut rngs, 2);
        rngs[0].next_u32();
        let advanced = rngs[0].state();

        ensure_rngs(&mut rngs, 4);
        assert_eq!(rngs.len(), 4);
        assert_eq!(rngs[0].state(), advanced);
        assert!(rngs.iter().all(|rng| rng.state() != 0));
    }

    #[test]
    fn test_resize_camera_updates_aspect() {
        let mut engine = Engine::new(test_scene(), RaytracerSettings::default());
        engine.resize_camera(200, 100);
        assert!((engine.camera().aspect() - 2.0).abs() < 1e-6);

        // Zero sizes are ignored
        engine.resize_camera(0, 100);
        assert!((engine.camera().aspect() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_scene_keeps_aspect() {
        let mut engine = Engine::new(test_scene(), RaytracerSettings::default());
        engine.resize_camera(300, 100);

        let camera = CameraParams {
            origin: Vec3::new(0.0, 0.0, 10.0),
            ..Default::default()
        };
        let scene = Scene::new(camera, Vec::new(), Vec4::ZERO).unwrap();
        engine.load_scene(scene);

        assert_eq!(engine.camera().origin(), Vec3::new(0.0, 0.0, 10.0));
        assert!((engine.camera().aspect() - 3.0).abs() < 1e-6);
        assert!(engine.scene().solids().is_empty());
    }

    #[test]
    fn test_pass_stats_counts_tiles() {
        let settings = RaytracerSettings {
            samples_per_pixel: 1,
            tile_size: 3,
            ..Default::default()
        };
        let mut engine = Engine::new(test_scene(), settings);
        let mut frame = FrameBuffer::new(8, 5);
        let stats = engine.render_pass(&mut frame);

        assert_eq!(stats.tiles, 6); // 3 columns x 2 rows
        assert!(stats.is_complete());
        assert_eq!(stats.pixels_written, 40);
        assert_eq!(stats.pixels_skipped, 0);
        assert_eq!(engine.last_pass(), Some(&stats));
    }

    #[test]
    fn test_empty_frame_renders_nothing() {
        let mut engine = Engine::new(test_scene(), RaytracerSettings::default());
        let mut frame = FrameBuffer::new(0, 0);
        let stats = engine.render_pass(&mut frame);

        assert_eq!(stats.tiles, 0);
        assert_eq!(stats.rays, 0);
        assert!(stats.is_complete());
    }

    #[test]
    fn test_dedicated_pool() {
        let config = EngineConfig { threads: Some(2) };
        let mut engine =
            Engine::with_config(test_scene(), RaytracerSettings::default(), &config).unwrap();
        let mut frame = FrameBuffer::new(16, 16);
        let stats = engine.render_pass(&mut frame);
        assert_eq!(stats.pixels_written, 256);
    }

    #[test]
    fn test_rays_per_second() {
        let stats = PassStats {
            rays: 1_000,
            elapsed: Duration::from_millis(500),
            ..Default::default()
        };
        assert!((stats.rays_per_second() - 2_000.0).abs() < 1e-6);
        assert_eq!(PassStats::default().rays_per_second(), 0.0);
    }
}
