use glam::{DQuat, DVec3};
use hecs::{Entity, World};

use crate::components::*;

/// Softbox panels are 2 x 2 units before scaling.
const SOFTBOX_HALF_SIZE: f64 = 1.0;

fn spawn_surface(
    world: &mut World,
    name: &str,
    local: LocalTransform,
    surface: Surface,
) -> Entity {
    world.spawn((
        Name(name.to_string()),
        local,
        GlobalTransform(local.matrix()),
        surface,
    ))
}

/// Floor plane through `height`, facing +Z, with finite bounds for Estimated mode.
pub fn spawn_floor(world: &mut World, height: f64, half_size: f64) -> Entity {
    let floor = spawn_surface(
        world,
        "Floor",
        LocalTransform::new(DVec3::new(0.0, 0.0, height)),
        Surface::Plane { normal: DVec3::Z },
    );
    let bounds = crate::math::Aabb::new(
        DVec3::new(-half_size, -half_size, 0.0),
        DVec3::new(half_size, half_size, 0.0),
    );
    let _ = world.insert_one(floor, LocalBounds(bounds));
    floor
}

pub fn spawn_sphere(world: &mut World, name: &str, center: DVec3, radius: f64) -> Entity {
    spawn_surface(
        world,
        name,
        LocalTransform::new(center),
        Surface::Sphere { radius },
    )
}

pub fn spawn_box(
    world: &mut World,
    name: &str,
    center: DVec3,
    half_extents: DVec3,
    rotation: DQuat,
) -> Entity {
    spawn_surface(
        world,
        name,
        LocalTransform::new(center).with_rotation(rotation),
        Surface::Cuboid { half_extents },
    )
}

/// Rectangular panel light in the managed group.
pub fn spawn_softbox(
    world: &mut World,
    name: &str,
    location: DVec3,
    settings: LightSettings,
) -> Entity {
    spawn_panel(world, name, location, settings, GroupRole::Light)
}

/// Softbox acting as a bounce card: other lights may target it.
pub fn spawn_reflector(world: &mut World, name: &str, location: DVec3, rotation: DQuat) -> Entity {
    let card = spawn_panel(
        world,
        name,
        location,
        LightSettings::default(),
        GroupRole::Reflector,
    );
    if let Ok(mut lt) = world.get::<&mut LocalTransform>(card) {
        lt.rotation = rotation;
    }
    if let Ok(mut gt) = world.get::<&mut GlobalTransform>(card) {
        gt.0 = LocalTransform::new(location).with_rotation(rotation).matrix();
    }
    card
}

/// Light without geometry (point, spot, sun, area lamp) in the managed group.
pub fn spawn_lamp(
    world: &mut World,
    name: &str,
    location: DVec3,
    settings: LightSettings,
) -> Entity {
    let local = LocalTransform::new(location);
    world.spawn((
        Name(name.to_string()),
        local,
        GlobalTransform(local.matrix()),
        Managed {
            role: GroupRole::Light,
        },
        LightRig::new(settings, location),
    ))
}

fn spawn_panel(
    world: &mut World,
    name: &str,
    location: DVec3,
    settings: LightSettings,
    role: GroupRole,
) -> Entity {
    let settings = LightSettings {
        kind: LightKind::Softbox,
        ..settings
    };
    let panel = spawn_surface(
        world,
        name,
        LocalTransform::new(location),
        Surface::Rect {
            half_width: SOFTBOX_HALF_SIZE,
            half_height: SOFTBOX_HALF_SIZE,
        },
    );
    let _ = world.insert(panel, (Managed { role }, LightRig::new(settings, location)));
    panel
}
