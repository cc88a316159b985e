//! Coordinate frames that attached proximities are expressed in.

use std::fmt;

use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

/// An external, possibly moving coordinate frame.
///
/// Implemented by whatever owns an entity's placement in the world. A frame
/// maps local coordinates to world coordinates as `p_world = T * R * S * p_local`.
pub trait Frame: fmt::Debug {
    /// World-space origin of the frame.
    fn position(&self) -> Point3<f32>;

    /// Orientation of the frame.
    fn rotation(&self) -> UnitQuaternion<f32>;

    /// Per-axis scale applied before rotation.
    fn scale(&self) -> Vector3<f32>;

    /// Maps a world point into the frame's local space.
    ///
    /// A zero scale component yields non-finite coordinates, which no shape contains.
    fn to_local(&self, world: &Point3<f32>) -> Point3<f32> {
        let unrotated = self.rotation().inverse_transform_vector(&(world - self.position()));
        Point3::from(unrotated.component_div(&self.scale()))
    }

    /// Maps a local point into world space.
    fn to_world(&self, local: &Point3<f32>) -> Point3<f32> {
        self.position() + self.rotation() * local.coords.component_mul(&self.scale())
    }
}

/// A plain translation, rotation and non-uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation in world units.
    pub translation: Vector3<f32>,
    /// Orientation.
    pub rotation: UnitQuaternion<f32>,
    /// Non-uniform scale, applied before rotation.
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transform (no translation, no rotation, unit scale).
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Creates a transform from components.
    pub fn new(
        translation: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
        scale: Vector3<f32>,
    ) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Pure translation.
    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Returns a copy with the given rotation.
    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns a copy with the given scale.
    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Frame for Transform {
    #[inline]
    fn position(&self) -> Point3<f32> {
        Point3::from(self.translation)
    }

    #[inline]
    fn rotation(&self) -> UnitQuaternion<f32> {
        self.rotation
    }

    #[inline]
    fn scale(&self) -> Vector3<f32> {
        self.scale
    }
}

impl Frame for Isometry3<f32> {
    #[inline]
    fn position(&self) -> Point3<f32> {
        Point3::from(self.translation.vector)
    }

    #[inline]
    fn rotation(&self) -> UnitQuaternion<f32> {
        self.rotation
    }

    #[inline]
    fn scale(&self) -> Vector3<f32> {
        Vector3::repeat(1.0)
    }

    fn to_local(&self, world: &Point3<f32>) -> Point3<f32> {
        self.inverse_transform_point(world)
    }

    fn to_world(&self, local: &Point3<f32>) -> Point3<f32> {
        self.transform_point(local)
    }
}
