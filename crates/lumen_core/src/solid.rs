//! Renderable primitives.
//!
//! A [`Solid`] is a flat, fixed-layout record so that a slice of them can be
//! uploaded to a GPU buffer as-is (`bytemuck::cast_slice`). Material
//! properties live inline; there is no separate material table.

use bytemuck::{Pod, Zeroable};
use lumen_math::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Discriminator for the shape of a [`Solid`].
///
/// Only spheres have an intersection routine. The other values are
/// reserved so that scene data written for a richer backend keeps its
/// numbering; `Scene::new` rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum SolidKind {
    #[default]
    Sphere = 0,
    Plane = 1,
    Box = 2,
}

impl SolidKind {
    /// Decode a raw discriminator, `None` for values outside the enumeration.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Sphere),
            1 => Some(Self::Plane),
            2 => Some(Self::Box),
            _ => None,
        }
    }

    /// Whether the renderer can intersect this kind.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Sphere)
    }
}

/// A renderable primitive with inline material properties.
///
/// Layout is `#[repr(C)]` with 4-byte scalars only (56 bytes, no padding).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Solid {
    kind: u32,
    radius: f32,
    radius_squared: f32,
    position: [f32; 3],
    color: [f32; 4],
    reflectivity: f32,
    emission: f32,
    roughness: f32,
    id: u32,
}

impl Solid {
    /// Create a solid of the given kind with a white, non-emissive material.
    pub fn new(kind: SolidKind, id: u32, position: Vec3, radius: f32) -> Self {
        Self {
            kind: kind as u32,
            radius,
            radius_squared: radius * radius,
            position: position.to_array(),
            color: [1.0, 1.0, 1.0, 1.0],
            reflectivity: 0.0,
            emission: 0.0,
            roughness: 0.0,
            id,
        }
    }

    /// Create a sphere.
    pub fn sphere(id: u32, position: Vec3, radius: f32) -> Self {
        Self::new(SolidKind::Sphere, id, position, radius)
    }

    /// Set the RGBA base color.
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color.to_array();
        self
    }

    /// Set the specular reflectivity coefficient.
    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    /// Set the emission strength. Anything above zero makes the solid a light.
    pub fn with_emission(mut self, emission: f32) -> Self {
        self.emission = emission;
        self
    }

    /// Set the roughness (0 = mirror-like bounce, 1 = fully rough).
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    /// Raw kind discriminator as stored.
    #[inline]
    pub fn kind_raw(&self) -> u32 {
        self.kind
    }

    /// Decoded kind, `None` if the stored discriminator is unknown.
    #[inline]
    pub fn kind(&self) -> Option<SolidKind> {
        SolidKind::from_raw(self.kind)
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn radius_squared(&self) -> f32 {
        self.radius_squared
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[inline]
    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }

    #[inline]
    pub fn reflectivity(&self) -> f32 {
        self.reflectivity
    }

    #[inline]
    pub fn emission(&self) -> f32 {
        self.emission
    }

    #[inline]
    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    /// Whether this solid belongs to the lights subset.
    #[inline]
    pub fn is_light(&self) -> bool {
        self.emission > 0.0
    }

    /// Placeholder used before any hit has been recorded.
    pub const EMPTY: Solid = Solid {
        kind: 0,
        radius: 0.0,
        radius_squared: 0.0,
        position: [0.0; 3],
        color: [0.0; 4],
        reflectivity: 0.0,
        emission: 0.0,
        roughness: 0.0,
        id: u32::MAX,
    };
}
