//! Thin-lens camera for ray generation.

use lumen_core::CameraParams;
use lumen_math::{Ray, Vec2, Vec3};

/// Camera for generating rays into the scene.
///
/// The derived basis is cached. Any setter only changes the primary
/// fields; call [`Camera::recalculate`] afterwards or rays will be
/// generated from the stale basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    // Camera positioning
    origin: Vec3,
    look_at: Vec3,
    up: Vec3,

    // Lens settings
    vfov: f32, // Vertical field of view in degrees
    aspect: f32,
    aperture: f32,
    focus_distance: f32,

    // Cached computed values (set by recalculate())
    lens_radius: f32,
    right: Vec3,
    view_up: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
}

impl Camera {
    /// Create a camera and compute its basis.
    pub fn create(
        origin: Vec3,
        look_at: Vec3,
        up: Vec3,
        vfov: f32,
        aspect: f32,
        aperture: f32,
        focus_distance: f32,
    ) -> Self {
        let mut camera = Self {
            origin,
            look_at,
            up,
            vfov,
            aspect,
            aperture,
            focus_distance,
            lens_radius: aperture / 2.0,
            right: Vec3::X,
            view_up: Vec3::Y,
            lower_left_corner: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
        };
        camera.recalculate();
        camera
    }

    /// Create a camera from authored scene parameters.
    pub fn from_params(params: &CameraParams) -> Self {
        Self::create(
            params.origin,
            params.look_at,
            params.up,
            params.vfov,
            params.aspect,
            params.aperture,
            params.focus_distance,
        )
    }

    /// Recompute the lens radius and view basis from the primary fields.
    pub fn recalculate(&mut self) {
        let theta = self.vfov * std::f32::consts::PI / 180.0;
        let half_height = (theta / 2.0).tan();
        let half_width = self.aspect * half_height;
        let focus = self.focus_distance;

        self.lens_radius = self.aperture / 2.0;

        let view_dir = (self.origin - self.look_at).normalize();
        self.right = self.up.cross(view_dir).normalize();
        self.view_up = view_dir.cross(self.right);

        self.lower_left_corner = self.origin
            - half_width * focus * self.right
            - half_height * focus * self.view_up
            - focus * view_dir;
        self.horizontal = 2.0 * half_width * focus * self.right;
        self.vertical = 2.0 * half_height * focus * self.view_up;
    }

    /// Generate a ray through normalized screen position (s, t).
    ///
    /// (0, 0) is the lower-left corner of the view. `lens` is a point in
    /// the unit disk scaled by the lens radius; pass `Vec2::ZERO` for a
    /// pinhole ray. The direction is not normalized.
    pub fn get_ray(&self, s: f32, t: f32, lens: Vec2) -> Ray {
        let rd = self.lens_radius * lens;
        let offset = self.right * rd.x + self.view_up * rd.y;
        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical
                - self.origin
                - offset,
        )
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    pub fn set_look_at(&mut self, look_at: Vec3) {
        self.look_at = look_at;
    }

    pub fn set_vfov(&mut self, vfov: f32) {
        self.vfov = vfov;
    }

    /// Update aspect ratio (e.g., on frame buffer resize).
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn set_aperture(&mut self, aperture: f32) {
        self.aperture = aperture;
    }

    /// Move origin and look-at together (strafing).
    pub fn translate(&mut self, delta: Vec3) {
        self.origin += delta;
        self.look_at += delta;
    }
}
