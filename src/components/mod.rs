pub mod lighting;

use glam::{DMat4, DQuat, DVec3};
use hecs::{Entity, World};

use crate::math::Aabb;

pub use lighting::{GroupRole, LightKind, LightPose, LightRig, LightSettings, Managed, ReflectMode};

/// Spatial transform with position, rotation, and scale (local space).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl LocalTransform {
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }

    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Computed world-space transform matrix, updated by the propagation system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform(pub DMat4);

impl GlobalTransform {
    pub fn translation(&self) -> DVec3 {
        self.0.w_axis.truncate()
    }
}

/// Points to the parent entity in the transform hierarchy.
pub struct Parent(pub Entity);

/// Lists child entities in the transform hierarchy.
pub struct Children(pub Vec<Entity>);

/// Inverse of the parent's world matrix captured when the child was bound.
/// Keeps the child's world pose unchanged at bind time; later parent motion carries it along.
pub struct ParentInverse(pub DMat4);

/// Display name, used in logs and CLI output.
pub struct Name(pub String);

/// Marker: entity is not offered as a ray target.
pub struct Hidden;

/// Ray-intersectable shape, expressed in the entity's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    /// Infinite plane through the local origin.
    Plane { normal: DVec3 },
    /// Finite rectangle in the local XY plane, facing +Z.
    Rect { half_width: f64, half_height: f64 },
    Sphere { radius: f64 },
    Cuboid { half_extents: DVec3 },
}

impl Surface {
    /// Local bounds used when no explicit `LocalBounds` is attached.
    pub fn local_bounds(&self) -> Aabb {
        match *self {
            Surface::Plane { .. } => Aabb::new(DVec3::ZERO, DVec3::ZERO),
            Surface::Rect {
                half_width,
                half_height,
            } => Aabb::new(
                DVec3::new(-half_width, -half_height, 0.0),
                DVec3::new(half_width, half_height, 0.0),
            ),
            Surface::Sphere { radius } => Aabb::from_half_extents(DVec3::splat(radius)),
            Surface::Cuboid { half_extents } => Aabb::from_half_extents(half_extents),
        }
    }
}

/// Explicit local-space bounds, overriding what the surface reports.
pub struct LocalBounds(pub Aabb);

/// Manually placed world-space bounding-box center for Estimated reflection.
pub struct BoundsCenterOverride(pub DVec3);

/// Attach `child` under `parent`, detaching it from any previous parent.
/// The parent's current world inverse is stored so the child keeps its world pose.
///
/// Returns false (and changes nothing) when the binding would create a cycle.
pub fn bind_parent(world: &mut World, child: Entity, parent: Entity) -> bool {
    if is_ancestor_or_self(world, child, parent) {
        tracing::debug!(?child, ?parent, "refusing parent binding that would form a cycle");
        return false;
    }

    let old_parent = world.get::<&Parent>(child).ok().map(|p| p.0);
    if let Some(old) = old_parent {
        if old != parent {
            remove_child(world, old, child);
        }
    }

    let parent_world = world
        .get::<&GlobalTransform>(parent)
        .map(|g| g.0)
        .unwrap_or(DMat4::IDENTITY);

    let has_children = world.get::<&Children>(parent).is_ok();
    if has_children {
        if let Ok(mut children) = world.get::<&mut Children>(parent) {
            if !children.0.contains(&child) {
                children.0.push(child);
            }
        }
    } else {
        let _ = world.insert_one(parent, Children(vec![child]));
    }

    let _ = world.insert(child, (Parent(parent), ParentInverse(parent_world.inverse())));
    true
}

/// World matrix of the frame a child's LocalTransform is expressed in.
pub fn parent_frame(world: &World, child: Entity) -> DMat4 {
    let Ok(parent) = world.get::<&Parent>(child).map(|p| p.0) else {
        return DMat4::IDENTITY;
    };
    let parent_world = world
        .get::<&GlobalTransform>(parent)
        .map(|g| g.0)
        .unwrap_or(DMat4::IDENTITY);
    match world.get::<&ParentInverse>(child) {
        Ok(inv) => parent_world * inv.0,
        Err(_) => parent_world,
    }
}

/// True when `ancestor` is `entity` itself or one of its parents.
fn is_ancestor_or_self(world: &World, ancestor: Entity, entity: Entity) -> bool {
    let mut current = Some(entity);
    while let Some(e) = current {
        if e == ancestor {
            return true;
        }
        current = world.get::<&Parent>(e).ok().map(|p| p.0);
    }
    false
}

/// Detach `child` from `parent` in the transform hierarchy.
pub fn remove_child(world: &mut World, parent: Entity, child: Entity) {
    if let Ok(mut children) = world.get::<&mut Children>(parent) {
        children.0.retain(|&e| e != child);
    }
    let _ = world.remove::<(Parent, ParentInverse)>(child);
}
