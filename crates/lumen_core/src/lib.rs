//! Lumen Core - Scene data, settings and frame buffer for the path tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Solid`, `SolidKind`, `CameraParams`, `Scene`
//! - **Settings**: `RaytracerSettings`, loadable from JSON
//! - **Output**: `FrameBuffer`, a row-major RGBA float image
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{CameraParams, Scene, Solid};
//! use lumen_math::{Vec3, Vec4};
//!
//! let solids = vec![
//!     Solid::sphere(0, Vec3::ZERO, 1.0).with_color(Vec4::new(1.0, 0.0, 0.0, 1.0)),
//!     Solid::sphere(1, Vec3::new(0.0, 3.0, 0.0), 0.25).with_emission(1.0),
//! ];
//! let scene = Scene::new(CameraParams::default(), solids, Vec4::ZERO)?;
//! println!("{} solids, {} lights", scene.solids().len(), scene.lights().len());
//! ```

pub mod framebuffer;
pub mod scene;
pub mod settings;
pub mod solid;

// Re-export commonly used types
pub use framebuffer::{color_to_rgba, FrameBuffer};
pub use scene::{CameraParams, Scene, SceneDesc, SceneError, SceneResult, SolidDesc};
pub use settings::{RaytracerSettings, SettingsError};
pub use solid::{Solid, SolidKind};
