//! Building proximities from configuration documents.
//!
//! Descriptors mirror the shape constructors one to one and go through the
//! same validation, so a bad document is rejected when it is loaded.
//!
//! ```toml
//! [[proximity]]
//! name = "landing pad"
//! shape = { kind = "box", center = [0.0, 0.0, 0.0], size = [10.0, inf, 10.0] }
//!
//! [[proximity]]
//! name = "hangar"
//! frame = { translation = [20.0, 0.0, 0.0], rotation_euler = [0.0, 1.57, 0.0] }
//!
//! [proximity.shape]
//! kind = "polygon"
//! points = [[0.0, 0.0], [8.0, 0.0], [4.0, 6.0]]
//! min_height = 0.0
//! max_height = 4.0
//! ```

use std::path::Path;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{Cuboid, Cylinder, Polygon, ProximityError, Result, Shape, Sphere, Transform};

/// Serialized form of a shape, tagged by `kind`.
///
/// Use `inf` for unbounded extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeDescriptor {
    /// Axis-aligned box.
    #[serde(rename = "box")]
    Cuboid {
        /// Center point.
        center: [f32; 3],
        /// Full size per axis.
        size: [f32; 3],
    },
    /// Sphere.
    Sphere {
        /// Center point.
        center: [f32; 3],
        /// Radius.
        radius: f32,
    },
    /// Axis-aligned cylinder.
    Cylinder {
        /// Principal axis, `"x"`, `"y"` or `"z"`.
        axis: String,
        /// Center point.
        center: [f32; 3],
        /// Radius.
        radius: f32,
        /// Full height along the axis.
        height: f32,
    },
    /// Polygon in the XZ plane.
    Polygon {
        /// `[x, z]` pairs.
        points: Vec<[f32; 2]>,
        /// Lower height bound; requires `max_height`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_height: Option<f32>,
        /// Upper height bound; requires `min_height`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_height: Option<f32>,
    },
}

impl TryFrom<&ShapeDescriptor> for Shape {
    type Error = ProximityError;

    fn try_from(descriptor: &ShapeDescriptor) -> Result<Self> {
        Ok(match descriptor {
            ShapeDescriptor::Cuboid { center, size } => {
                Cuboid::new(Point3::from(*center), Vector3::from(*size))?.into()
            }
            ShapeDescriptor::Sphere { center, radius } => {
                Sphere::new(Point3::from(*center), *radius)?.into()
            }
            ShapeDescriptor::Cylinder {
                axis,
                center,
                radius,
                height,
            } => Cylinder::new(axis.parse()?, Point3::from(*center), *radius, *height)?.into(),
            ShapeDescriptor::Polygon {
                points,
                min_height,
                max_height,
            } => {
                let height = match (min_height, max_height) {
                    (Some(lo), Some(hi)) => Some((*lo, *hi)),
                    (None, None) => None,
                    _ => {
                        return Err(ProximityError::Config(
                            "polygon needs both min_height and max_height, or neither".into(),
                        ));
                    }
                };
                Polygon::from_xz(points, height)?.into()
            }
        })
    }
}

impl TryFrom<ShapeDescriptor> for Shape {
    type Error = ProximityError;

    fn try_from(descriptor: ShapeDescriptor) -> Result<Self> {
        Shape::try_from(&descriptor)
    }
}

fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

/// Serialized frame: translation, Euler angles in radians (roll, pitch, yaw) and scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// World translation.
    #[serde(default)]
    pub translation: [f32; 3],
    /// Rotation about X, Y and Z, in radians.
    #[serde(default)]
    pub rotation_euler: [f32; 3],
    /// Per-axis scale.
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

impl Default for FrameDescriptor {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation_euler: [0.0; 3],
            scale: unit_scale(),
        }
    }
}

impl From<&FrameDescriptor> for Transform {
    fn from(descriptor: &FrameDescriptor) -> Self {
        let [roll, pitch, yaw] = descriptor.rotation_euler;
        Transform::new(
            Vector3::from(descriptor.translation),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
            Vector3::from(descriptor.scale),
        )
    }
}

/// A named proximity with an optional frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityDescriptor {
    /// Name used in logs and by callers.
    pub name: String,
    /// Shape in local coordinates.
    pub shape: ShapeDescriptor,
    /// Frame the shape is attached to; world space when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameDescriptor>,
}

impl ProximityDescriptor {
    /// Builds and validates the shape.
    pub fn build(&self) -> Result<Shape> {
        Shape::try_from(&self.shape)
    }

    /// The configured frame, identity when absent.
    pub fn transform(&self) -> Transform {
        self.frame.as_ref().map_or_else(Transform::identity, Transform::from)
    }
}

/// A document holding any number of `[[proximity]]` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProximitySet {
    /// The entries, in document order.
    #[serde(rename = "proximity", default)]
    pub proximities: Vec<ProximityDescriptor>,
}

impl ProximitySet {
    /// Parses a TOML document and validates every shape in it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let set: ProximitySet =
            toml::from_str(source).map_err(|e| ProximityError::Config(e.to_string()))?;
        for descriptor in &set.proximities {
            descriptor.build().map_err(|e| match e {
                ProximityError::Config(message) => {
                    ProximityError::Config(format!("{}: {message}", descriptor.name))
                }
                other => other,
            })?;
        }
        log::debug!("loaded {} proximity descriptors", set.proximities.len());
        Ok(set)
    }

    /// Reads and parses a TOML file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ProximityError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Serializes the set back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ProximityError::Config(e.to_string()))
    }

    /// Builds every shape with its frame, in document order.
    pub fn build_all(&self) -> Result<Vec<(String, Shape, Transform)>> {
        self.proximities
            .iter()
            .map(|d| Ok((d.name.clone(), d.build()?, d.transform())))
            .collect()
    }
}
