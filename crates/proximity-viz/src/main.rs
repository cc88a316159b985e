use std::collections::{HashMap, HashSet};

use macroquad::prelude::*;
use nalgebra::Point3;
use proximity::config::ProximitySet;
use proximity::{
    AttachedShape, Bounds, DisposalHandle, EntitySource, FnListener, Proximity, ProximityError,
    ProximityEvent, TrackingProximity, Transform,
};
use proximity_viz::{OrbitCamera, SceneItem, VizBackend, VizTrigger, draw_probe};

const SCENE: &str = r#"
[[proximity]]
name = "landing pad"
shape = { kind = "box", center = [0.0, 0.0, 0.0], size = [12.0, inf, 12.0] }

[[proximity]]
name = "beacon"
shape = { kind = "sphere", center = [0.0, 4.0, 0.0], radius = 6.0 }
frame = { translation = [-22.0, 0.0, 8.0] }

[[proximity]]
name = "tower"
shape = { kind = "cylinder", axis = "y", center = [0.0, 5.0, 0.0], radius = 5.0, height = 10.0 }
frame = { translation = [22.0, 0.0, -8.0] }

[[proximity]]
name = "hangar"
frame = { translation = [-7.0, 0.0, 14.0], rotation_euler = [0.0, 0.4, 0.0] }

[proximity.shape]
kind = "polygon"
points = [[0.0, 0.0], [14.0, 0.0], [14.0, 10.0], [7.0, 4.0], [0.0, 10.0]]
min_height = 0.0
max_height = 6.0
"#;

/// How often memberships are re-checked against positions, in frames.
const REVALIDATE_EVERY: u64 = 30;

type Tracker<'a> = TrackingProximity<AttachedShape<'a, Transform>, VizTrigger, u32>;

struct Tracked<'a> {
    item: &'a SceneItem,
    tracker: Tracker<'a>,
    trigger: usize,
    overlapping: HashSet<u32>,
}

/// Probes flying Lissajous paths through the scene.
struct Probes {
    positions: HashMap<u32, Point3<f32>>,
}

impl Probes {
    fn new(count: u32) -> Self {
        Self {
            positions: (0..count).map(|id| (id, Point3::origin())).collect(),
        }
    }

    fn advance(&mut self, t: f32) {
        for (&id, position) in &mut self.positions {
            let k = id as f32 + 1.0;
            *position = Point3::new(
                30.0 * (t * 0.23 * k).sin(),
                3.0 + 3.0 * (t * 0.5 + k).sin(),
                22.0 * (t * 0.17 * k + k).cos(),
            );
        }
    }
}

impl EntitySource<u32> for Probes {
    fn position(&self, entity: u32) -> Option<Point3<f32>> {
        self.positions.get(&entity).copied()
    }
}

fn log_event(name: &str, event: ProximityEvent<u32>) {
    match event {
        ProximityEvent::Enter(id, p) => {
            log::info!("probe {id} entered {name} at ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z)
        }
        ProximityEvent::Exit(id, p) => {
            log::info!("probe {id} left {name} at ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z)
        }
    }
}

/// Feeds bounding-box overlaps to a tracker the way a physics engine would.
fn step(tracked: &mut Tracked<'_>, backend: &VizBackend, probes: &Probes) -> proximity::Result<()> {
    let item = tracked.item;
    let mut listener = FnListener::new(|event: ProximityEvent<u32>| log_event(&item.name, event));
    for (&id, position) in &probes.positions {
        let touching = backend.overlaps(tracked.trigger, position);
        let was_touching = tracked.overlapping.contains(&id);
        match (touching, was_touching) {
            (true, false) => {
                tracked.overlapping.insert(id);
                tracked.tracker.on_overlap_enter(id, probes, &mut listener)?;
            }
            (true, true) => tracked.tracker.on_overlap_stay(id, probes, &mut listener)?,
            (false, true) => {
                tracked.overlapping.remove(&id);
                tracked.tracker.on_overlap_exit(id, probes, &mut listener)?;
            }
            (false, false) => {}
        }
    }
    Ok(())
}

fn revalidate(tracked: &mut Tracked<'_>, probes: &Probes) -> proximity::Result<usize> {
    let item = tracked.item;
    let mut listener = FnListener::new(|event: ProximityEvent<u32>| log_event(&item.name, event));
    tracked.tracker.revalidate(probes, &mut listener)
}

#[macroquad::main("Proximity Visualization")]
async fn main() {
    env_logger::init();

    let scene = ProximitySet::from_toml_str(SCENE).and_then(|set| set.build_all());
    let items: Vec<SceneItem> = match scene {
        Ok(built) => built
            .into_iter()
            .map(|(name, shape, frame)| SceneItem::new(name, shape, frame))
            .collect(),
        Err(e) => {
            log::error!("invalid scene: {e}");
            return;
        }
    };

    let mut backend = VizBackend::default();
    let mut tracked = Vec::with_capacity(items.len());
    let mut handles: Vec<DisposalHandle> = Vec::new();
    for item in &items {
        let spawned = item
            .shape
            .attach(&item.frame)
            .and_then(|shape| Tracker::spawn(shape, &mut backend));
        match spawned {
            Ok(tracker) => {
                handles.push(tracker.disposal_handle());
                tracked.push(Tracked {
                    item,
                    tracker,
                    trigger: backend.triggers().len() - 1,
                    overlapping: HashSet::new(),
                });
            }
            Err(e) => log::warn!("{}: not tracked: {e}", item.name),
        }
    }

    let scene_bounds = backend
        .triggers()
        .iter()
        .copied()
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(|| Bounds::singleton(Point3::origin()));
    let mut camera = OrbitCamera::new(80.0, 0.6, 0.5).framing(&scene_bounds);
    let mut probes = Probes::new(3);
    let mut frame_count: u64 = 0;

    loop {
        probes.advance(get_time() as f32);
        if is_key_pressed(KeyCode::D) {
            log::info!("disposing every tracker");
            handles.iter().for_each(DisposalHandle::request);
        }

        for entry in tracked.iter_mut().filter(|t| !t.tracker.is_disposed()) {
            let mut result = step(entry, &backend, &probes);
            if result.is_ok() && frame_count % REVALIDATE_EVERY == 0 {
                result = revalidate(entry, &probes).map(|_| ());
            }
            match result {
                Ok(()) | Err(ProximityError::Disposed) => {}
                Err(e) => log::warn!("{}: {e}", entry.item.name),
            }
        }
        frame_count += 1;

        clear_background(Color::from_rgba(18, 18, 24, 255));
        camera.update();
        set_camera(&camera.to_camera3d());
        draw_grid(40, 2.0, GRAY, DARKGRAY);

        for entry in &tracked {
            let active = entry.tracker.member_count().is_ok_and(|n| n > 0);
            entry.item.draw(active);
        }
        for (&id, position) in &probes.positions {
            let inside = tracked
                .iter()
                .any(|t| t.tracker.contains(id).unwrap_or(false));
            draw_probe(position, inside);
        }

        set_default_camera();
        draw_text("Proximity Visualization", 20.0, 40.0, 30.0, WHITE);
        let mut y = 70.0;
        for entry in &tracked {
            let shape = entry.tracker.shape();
            let members = entry
                .tracker
                .member_count()
                .map_or_else(|_| "disposed".to_string(), |n| n.to_string());
            let line = format!(
                "{:<12} {:<9} volume {:>9.1}  area {:>9.1}  members {members}",
                entry.item.name,
                shape.kind(),
                shape.volume(),
                shape.surface_area(),
            );
            draw_text(&line, 20.0, y, 20.0, entry.item.color);
            y += 22.0;
        }
        draw_text("drag/arrows: orbit   wheel: zoom   D: dispose", 20.0, y + 10.0, 18.0, GRAY);

        next_frame().await
    }
}
