use std::collections::VecDeque;

use glam::DMat4;
use hecs::{Entity, World};

use crate::components::{Children, GlobalTransform, LocalTransform, Parent, ParentInverse};

/// Propagates LocalTransform down the hierarchy via BFS.
/// Roots (entities with LocalTransform but no Parent) compute GlobalTransform
/// from their own LocalTransform. Children inherit the parent's GlobalTransform,
/// corrected by their ParentInverse (if any), multiplied by their own LocalTransform.
pub fn transform_propagation_system(world: &mut World) {
    let mut queue: VecDeque<(Entity, DMat4)> = VecDeque::new();

    // Phase 1: update roots and seed BFS with their children.
    let roots: Vec<(Entity, DMat4)> = world
        .query::<&LocalTransform>()
        .without::<&Parent>()
        .iter()
        .map(|(entity, local)| (entity, local.matrix()))
        .collect();

    for (entity, global_mat) in &roots {
        if let Ok(mut gt) = world.get::<&mut GlobalTransform>(*entity) {
            gt.0 = *global_mat;
        }
        if let Ok(children) = world.get::<&Children>(*entity) {
            for &child in &children.0 {
                queue.push_back((child, *global_mat));
            }
        }
    }

    // Phase 2: BFS propagation
    while let Some((entity, parent_global)) = queue.pop_front() {
        let inherited = match world.get::<&ParentInverse>(entity) {
            Ok(inv) => parent_global * inv.0,
            Err(_) => parent_global,
        };
        let child_global = match world.get::<&LocalTransform>(entity) {
            Ok(local) => inherited * local.matrix(),
            Err(_) => inherited,
        };

        if let Ok(mut gt) = world.get::<&mut GlobalTransform>(entity) {
            gt.0 = child_global;
        }

        if let Ok(children) = world.get::<&Children>(entity) {
            for &child in &children.0 {
                queue.push_back((child, child_global));
            }
        }
    }
}
