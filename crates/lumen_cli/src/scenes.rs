//! Built-in scenes selectable by name from the command line.

use lumen_core::{CameraParams, Scene, SceneResult, Solid};
use lumen_math::{Vec3, Vec4};

/// Names accepted by [`preset`].
pub const PRESET_NAMES: &[&str] = &["book", "toy"];

/// Build a named scene for an image of `width` x `height`.
pub fn preset(name: &str, width: u32, height: u32) -> Option<SceneResult<Scene>> {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    match name {
        "book" => Some(book_scene(aspect)),
        "toy" => Some(toy_scene(aspect)),
        _ => None,
    }
}

/// Glowing yellow ground lighting blue, green and red spheres in a row.
fn book_scene(aspect: f32) -> SceneResult<Scene> {
    let origin = Vec3::new(9.5, 2.0, 2.5);
    let look_at = Vec3::new(3.0, 0.5, 0.65);
    let camera = CameraParams {
        origin,
        look_at,
        up: Vec3::Y,
        vfov: 25.0,
        aspect,
        aperture: 0.01,
        focus_distance: (origin - look_at).length(),
    };

    let solids = vec![
        Solid::sphere(0, Vec3::new(0.0, -1000.0, 0.0), 1000.0)
            .with_color(Vec4::new(1.0, 1.0, 0.0, 1.0))
            .with_emission(1.0),
        Solid::sphere(1, Vec3::new(0.0, 1.0, 0.0), 1.0).with_color(Vec4::new(0.0, 0.0, 1.0, 1.0)),
        Solid::sphere(2, Vec3::new(-4.0, 1.0, 0.0), 1.0).with_color(Vec4::new(0.0, 1.0, 0.0, 1.0)),
        Solid::sphere(3, Vec3::new(4.0, 1.0, 0.0), 1.0).with_color(Vec4::new(1.0, 0.0, 0.0, 1.0)),
    ];

    Scene::new(camera, solids, Vec4::ZERO)
}

/// Grey ground, two rough diffuse spheres and two small emitters.
fn toy_scene(aspect: f32) -> SceneResult<Scene> {
    let camera = CameraParams {
        origin: Vec3::new(0.0, 2.0, 3.0),
        look_at: Vec3::ZERO,
        up: Vec3::Y,
        vfov: 60.0,
        aspect,
        aperture: 0.1 * 0.2,
        focus_distance: 3.0,
    };

    let diffuse = |id, position, radius, rgb: Vec3| {
        Solid::sphere(id, position, radius)
            .with_color(rgb.extend(1.0))
            .with_roughness(0.5)
    };

    let solids = vec![
        diffuse(0, Vec3::new(0.0, -100.5, -1.0), 100.0, Vec3::splat(0.8)),
        diffuse(1, Vec3::new(2.0, 0.0, -1.0), 0.5, Vec3::new(0.8, 0.4, 0.4)),
        diffuse(2, Vec3::new(0.0, 0.0, -1.0), 0.5, Vec3::new(0.4, 0.8, 0.4)),
        Solid::sphere(3, Vec3::new(-1.5, 1.5, 0.0), 0.3).with_emission(10.0),
        Solid::sphere(4, Vec3::new(1.5, 1.5, -2.0), 0.3)
            .with_color(Vec4::new(0.8, 0.8, 0.2, 1.0))
            .with_emission(5.0),
    ];

    Scene::new(camera, solids, Vec4::ZERO)
}
