//! Shared drawing and scene utilities for the proximity visualizer.

use std::hash::{Hash, Hasher};

use macroquad::models::{Mesh, Vertex, draw_mesh};
use macroquad::prelude::*;
use nalgebra::{Point3, Vector3};
use proximity::{
    Bounds, Cylinder, Frame, Polygon, Proximity, Result, Shape, Transform, TriggerBackend,
    TriggerCollider, TriggerVolume,
};

/// Half extent used to draw unbounded axes.
pub const DRAW_EXTENT: f32 = 40.0;

const CIRCLE_SEGMENTS: usize = 32;

/// Converts a nalgebra point to a macroquad vector.
#[inline]
pub fn to_vec3(p: &Point3<f32>) -> Vec3 {
    vec3(p.x, p.y, p.z)
}

/// Deterministic color for a named proximity, so it keeps its color across runs.
pub fn name_color(name: &str) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    name.hash(&mut hasher);
    let hash = hasher.finish();

    let r = ((hash >> 16) & 0xFF) as u8;
    let g = ((hash >> 8) & 0xFF) as u8;
    let b = (hash & 0xFF) as u8;

    Color::from_rgba(r.max(60), g.max(60), b.max(60), 255)
}

fn clamp_extent(half: f32) -> f32 {
    half.min(DRAW_EXTENT)
}

/// Draws the 12 edges of a local box placed in `frame`.
fn draw_box(center: Point3<f32>, half: Vector3<f32>, frame: &Transform, color: Color) {
    let half = half.map(clamp_extent);
    let corners: [Vec3; 8] = std::array::from_fn(|i| {
        let sign = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
        let offset = Vector3::new(sign(1) * half.x, sign(2) * half.y, sign(4) * half.z);
        to_vec3(&frame.to_world(&(center + offset)))
    });
    for bit in [1, 2, 4] {
        for i in (0..8).filter(|i| i & bit == 0) {
            draw_line_3d(corners[i], corners[i | bit], color);
        }
    }
}

/// Draws a circle of `radius` spanned by the local unit vectors `u` and `v`.
fn draw_ring(
    center: Point3<f32>,
    u: Vector3<f32>,
    v: Vector3<f32>,
    radius: f32,
    frame: &Transform,
    color: Color,
) {
    let point = |k: usize| {
        let angle = k as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
        let local = center + (u * angle.cos() + v * angle.sin()) * radius;
        to_vec3(&frame.to_world(&local))
    };
    for k in 0..CIRCLE_SEGMENTS {
        draw_line_3d(point(k), point(k + 1), color);
    }
}

fn draw_cylinder(cylinder: &Cylinder, frame: &Transform, color: Color) {
    let (a, b) = cylinder.axis().planar();
    let (u, v) = (Vector3::ith(a, 1.0), Vector3::ith(b, 1.0));
    let along = cylinder.axis().unit() * clamp_extent(cylinder.height() * 0.5);
    let (bottom, top) = (cylinder.center() - along, cylinder.center() + along);
    let radius = cylinder.radius();

    draw_ring(bottom, u, v, radius, frame, color);
    draw_ring(top, u, v, radius, frame, color);
    for side in [u, -u, v, -v] {
        let offset = side * radius;
        draw_line_3d(
            to_vec3(&frame.to_world(&(bottom + offset))),
            to_vec3(&frame.to_world(&(top + offset))),
            color,
        );
    }
}

fn polygon_span(polygon: &Polygon) -> (f32, f32) {
    polygon
        .height()
        .map_or((-DRAW_EXTENT, DRAW_EXTENT), |h| (h.min(), h.max()))
}

fn draw_polygon_outline(polygon: &Polygon, frame: &Transform, color: Color) {
    let (lo, hi) = polygon_span(polygon);
    let at = |i: usize, y: f32| {
        let p = polygon.points()[i % polygon.points().len()];
        to_vec3(&frame.to_world(&Point3::new(p.x, y, p.y)))
    };
    for i in 0..polygon.points().len() {
        draw_line_3d(at(i, lo), at(i + 1, lo), color);
        draw_line_3d(at(i, hi), at(i + 1, hi), color);
        draw_line_3d(at(i, lo), at(i, hi), color);
    }
}

/// Builds a translucent macroquad mesh of an extruded polygon in world space.
fn polygon_fill(polygon: &Polygon, frame: &Transform, color: Color) -> Result<Option<Mesh>> {
    if polygon.height().is_none() {
        return Ok(None);
    }
    let mesh = polygon.mesh()?.transformed(frame);
    let fill = Color::new(color.r, color.g, color.b, 0.25);

    let vertices: Vec<Vertex> = mesh
        .world_vertices()
        .map(|p| Vertex::new2(to_vec3(&p), vec2(0.0, 0.0), fill))
        .collect();
    let indices: Option<Vec<u16>> = mesh.indices().iter().map(|&i| u16::try_from(i).ok()).collect();

    Ok(indices.map(|indices| Mesh {
        vertices,
        indices,
        texture: None,
    }))
}

/// A named shape placed in the scene.
pub struct SceneItem {
    /// Name from the scene document.
    pub name: String,
    /// The shape, in local coordinates.
    pub shape: Shape,
    /// Placement of the shape.
    pub frame: Transform,
    /// Wireframe color.
    pub color: Color,
    fill: Option<Mesh>,
}

impl SceneItem {
    /// Creates a scene item, precomputing the polygon fill if there is one.
    pub fn new(name: String, shape: Shape, frame: Transform) -> Self {
        let color = name_color(&name);
        let fill = match &shape {
            Shape::Polygon(polygon) => polygon_fill(polygon, &frame, color).unwrap_or_else(|e| {
                log::warn!("{name}: {e}, drawing outline only");
                None
            }),
            _ => None,
        };
        Self {
            name,
            shape,
            frame,
            color,
            fill,
        }
    }

    /// Draws the item; `active` items are highlighted.
    pub fn draw(&self, active: bool) {
        let color = if active { WHITE } else { self.color };
        let frame = &self.frame;
        match &self.shape {
            Shape::Cuboid(cuboid) => draw_box(cuboid.center(), cuboid.size() * 0.5, frame, color),
            Shape::Sphere(sphere) => {
                let (x, y, z) = (Vector3::x(), Vector3::y(), Vector3::z());
                for (u, v) in [(x, y), (y, z), (z, x)] {
                    draw_ring(sphere.center(), u, v, sphere.radius(), frame, color);
                }
            }
            Shape::Cylinder(cylinder) => draw_cylinder(cylinder, frame, color),
            Shape::Polygon(polygon) => {
                if let Some(fill) = &self.fill {
                    draw_mesh(fill);
                }
                draw_polygon_outline(polygon, frame, color);
            }
            Shape::Custom(custom) => {
                let bounds = custom.bounding_box();
                draw_box(bounds.center(), bounds.size() * 0.5, frame, color);
            }
        }
    }
}

/// Draws a probe, green while it is inside any proximity.
pub fn draw_probe(position: &Point3<f32>, inside: bool) {
    let color = if inside { GREEN } else { RED };
    draw_sphere(to_vec3(position), 0.6, None, color);
}

/// Axis-aligned box enclosing a trigger collider.
pub fn collider_bounds(collider: &TriggerCollider) -> Bounds {
    match collider {
        TriggerCollider::Cuboid {
            center,
            half_extents,
        } => Bounds::from_center_size(*center, half_extents * 2.0),
        TriggerCollider::Sphere { center, radius } => {
            Bounds::from_center_size(*center, Vector3::repeat(2.0 * radius))
        }
        TriggerCollider::Capsule {
            center,
            axis,
            half_height,
            radius,
        } => {
            let half = axis.unit() * *half_height + Vector3::repeat(*radius);
            Bounds::new(center - half, center + half)
        }
        TriggerCollider::Mesh(mesh) => Bounds::around_points(mesh.world_vertices())
            .unwrap_or_else(|| Bounds::singleton(mesh.origin())),
    }
}

/// Trigger volume of the visualizer's stand-in physics: just an index into
/// [`VizBackend::triggers`].
#[derive(Debug)]
pub struct VizTrigger {
    index: usize,
}

impl VizTrigger {
    /// Position of the volume in the backend's list.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl TriggerVolume for VizTrigger {
    fn release(&mut self) {
        log::debug!("released trigger {}", self.index);
    }
}

/// Stand-in physics that approximates every trigger by its bounding box.
#[derive(Debug, Default)]
pub struct VizBackend {
    triggers: Vec<Bounds>,
}

impl VizBackend {
    /// Bounds of every spawned trigger, in spawn order.
    pub fn triggers(&self) -> &[Bounds] {
        &self.triggers
    }

    /// Returns `true` if `point` overlaps the trigger at `index`.
    pub fn overlaps(&self, index: usize, point: &Point3<f32>) -> bool {
        self.triggers.get(index).is_some_and(|b| b.contains(point))
    }
}

impl TriggerBackend for VizBackend {
    type Volume = VizTrigger;

    fn spawn_trigger(&mut self, collider: &TriggerCollider) -> Result<VizTrigger> {
        let index = self.triggers.len();
        self.triggers.push(collider_bounds(collider));
        Ok(VizTrigger { index })
    }
}

const ZOOM_SPEED: f32 = 5.0;
const DISTANCE_RANGE: (f32, f32) = (10.0, 300.0);
/// Radians per frame while an arrow key is held.
const KEY_ORBIT_SPEED: f32 = 0.02;

/// Orbit camera driven by mouse drag, wheel and arrow keys.
pub struct OrbitCamera {
    distance: f32,
    yaw: f32,
    pitch: f32,
    target: Vec3,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: Vec3::ZERO,
        }
    }

    /// Aims at the center of `bounds` from far enough to see all of it.
    pub fn framing(mut self, bounds: &Bounds) -> Self {
        self.target = to_vec3(&bounds.center());
        let reach = bounds.size().map(clamp_extent).norm();
        self.distance = reach.clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
        self
    }

    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }
        let held = |key| if is_key_down(key) { KEY_ORBIT_SPEED } else { 0.0 };
        self.yaw += held(KeyCode::Left) - held(KeyCode::Right);
        self.pitch += held(KeyCode::Up) - held(KeyCode::Down);
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let zoomed = self.distance - mouse_wheel().1 * ZOOM_SPEED;
        self.distance = zoomed.clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
    }

    pub fn to_camera3d(&self) -> Camera3D {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        let offset = vec3(pitch_cos * yaw_sin, pitch_sin, pitch_cos * yaw_cos) * self.distance;
        Camera3D {
            position: self.target + offset,
            up: Vec3::Y,
            target: self.target,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proximity::{Axis, Cuboid};

    #[test]
    fn name_color_is_stable() {
        assert_eq!(name_color("hangar"), name_color("hangar"));
        let c = name_color("tower");
        assert!(c.r * 255.0 >= 59.0 && c.g * 255.0 >= 59.0 && c.b * 255.0 >= 59.0);
    }

    #[test]
    fn capsule_bounds_cover_the_caps() {
        let collider = TriggerCollider::Capsule {
            center: Point3::new(0.0, 5.0, 0.0),
            axis: Axis::Y,
            half_height: 5.0,
            radius: 2.0,
        };
        let bounds = collider_bounds(&collider);
        assert_eq!(bounds.size(), Vector3::new(4.0, 14.0, 4.0));
        assert!(bounds.contains(&Point3::new(0.0, 11.9, 0.0)));
    }

    #[test]
    fn backend_indexes_triggers_in_spawn_order() {
        let mut backend = VizBackend::default();
        let cuboid = Cuboid::new(Point3::origin(), Vector3::repeat(2.0)).unwrap();
        let first = backend.spawn_trigger(&cuboid.trigger_collider().unwrap()).unwrap();
        let sphere = TriggerCollider::Sphere {
            center: Point3::new(10.0, 0.0, 0.0),
            radius: 1.0,
        };
        let second = backend.spawn_trigger(&sphere).unwrap();

        assert_eq!((first.index(), second.index()), (0, 1));
        assert!(backend.overlaps(0, &Point3::new(0.5, 0.5, 0.5)));
        assert!(!backend.overlaps(0, &Point3::new(10.0, 0.0, 0.0)));
        assert!(backend.overlaps(1, &Point3::new(10.0, 0.0, 0.0)));
        assert!(!backend.overlaps(2, &Point3::origin()));
    }
}
