use glam::{DQuat, DVec3};
use hecs::{Entity, World};

use crate::components::LightSettings;
use crate::scene::prefabs::{spawn_box, spawn_floor, spawn_reflector, spawn_softbox, spawn_sphere};
use crate::systems::transform_propagation_system;

/// Handles to the notable entities of the studio scene.
pub struct Studio {
    pub floor: Entity,
    pub subject: Entity,
    pub pedestal: Entity,
    pub card: Entity,
    pub key_light: Entity,
}

/// Build a small product-shot studio: floor, a sphere on a pedestal, a bounce
/// card, and one softbox key light.
pub fn load_studio_scene(world: &mut World, key_settings: LightSettings) -> Studio {
    let floor = spawn_floor(world, 0.0, 10.0);

    let pedestal = spawn_box(
        world,
        "Pedestal",
        DVec3::new(0.0, 0.0, 0.5),
        DVec3::new(0.75, 0.75, 0.5),
        DQuat::IDENTITY,
    );
    let subject = spawn_sphere(world, "Subject", DVec3::new(0.0, 0.0, 2.0), 1.0);

    // Card standing upright on the left, facing +X toward the subject.
    let card = spawn_reflector(
        world,
        "Bounce card",
        DVec3::new(-4.0, 0.0, 2.0),
        DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2),
    );

    let key_light = spawn_softbox(world, "Key", DVec3::new(3.0, -3.0, 4.0), key_settings);

    transform_propagation_system(world);

    Studio {
        floor,
        subject,
        pedestal,
        card,
        key_light,
    }
}
