use glam::{DMat4, DVec3};
use hecs::{Entity, World};

use crate::components::{
    BoundsCenterOverride, GlobalTransform, GroupRole, Hidden, LocalBounds, Managed, Surface,
};
use crate::math::{Aabb, Ray};

/// Intersection result in the surface's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalHit {
    pub point: DVec3,
    pub normal: DVec3,
}

/// Casts a local-space ray against a surface.
pub trait RayIntersector {
    type Surface;

    fn cast(&self, ray: &Ray, surface: &Self::Surface) -> Option<LocalHit>;
}

/// Where Estimated reflection measures the target's gross volume from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsCenter {
    /// Local bounds; the world center is the mean of the 8 transformed corners.
    Auto(Aabb),
    /// World-space point placed by the user.
    Manual(DVec3),
}

impl BoundsCenter {
    pub fn world_point(&self, world: &DMat4) -> DVec3 {
        match self {
            BoundsCenter::Auto(bounds) => bounds.world_center(world),
            BoundsCenter::Manual(point) => *point,
        }
    }
}

/// A candidate ray target as seen by the reflection solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Target<S> {
    pub id: Entity,
    pub world: DMat4,
    pub surface: S,
    /// `Some` for members of the managed light group.
    pub role: Option<GroupRole>,
    pub hidden: bool,
    pub bounds_center: BoundsCenter,
}

impl<S> Target<S> {
    pub fn is_reflector(&self) -> bool {
        self.role == Some(GroupRole::Reflector)
    }
}

/// Enumerates ray targets of a scene.
pub trait SceneEnumerator {
    type Surface: Clone;

    /// Every surface in the scene in stable order, regardless of visibility or group.
    fn targets(&self) -> Vec<Target<Self::Surface>>;

    fn target(&self, id: Entity) -> Option<Target<Self::Surface>>;
}

impl SceneEnumerator for World {
    type Surface = Surface;

    fn targets(&self) -> Vec<Target<Surface>> {
        let mut targets: Vec<Target<Surface>> = self
            .query::<(
                &Surface,
                &GlobalTransform,
                Option<&Managed>,
                Option<&Hidden>,
                Option<&LocalBounds>,
                Option<&BoundsCenterOverride>,
            )>()
            .iter()
            .map(|(id, (surface, global, managed, hidden, bounds, center))| {
                make_target(id, surface, global, managed, hidden, bounds, center)
            })
            .collect();
        // Archetype iteration order shifts as components come and go. Slot ids do not,
        // though hecs reuses a freed slot, so after a despawn this is not spawn order.
        targets.sort_by_key(|t| t.id.id());
        targets
    }

    fn target(&self, id: Entity) -> Option<Target<Surface>> {
        let mut query = self
            .query_one::<(
                &Surface,
                &GlobalTransform,
                Option<&Managed>,
                Option<&Hidden>,
                Option<&LocalBounds>,
                Option<&BoundsCenterOverride>,
            )>(id)
            .ok()?;
        let (surface, global, managed, hidden, bounds, center) = query.get()?;
        Some(make_target(id, surface, global, managed, hidden, bounds, center))
    }
}

fn make_target(
    id: Entity,
    surface: &Surface,
    global: &GlobalTransform,
    managed: Option<&Managed>,
    hidden: Option<&Hidden>,
    bounds: Option<&LocalBounds>,
    center: Option<&BoundsCenterOverride>,
) -> Target<Surface> {
    let bounds_center = match (center, bounds) {
        (Some(center), _) => BoundsCenter::Manual(center.0),
        (None, Some(bounds)) => BoundsCenter::Auto(bounds.0),
        (None, None) => BoundsCenter::Auto(surface.local_bounds()),
    };
    Target {
        id,
        world: global.0,
        surface: *surface,
        role: managed.map(|m| m.role),
        hidden: hidden.is_some(),
        bounds_center,
    }
}

/// Closed-form intersection against the analytic `Surface` shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticIntersector;

impl RayIntersector for AnalyticIntersector {
    type Surface = Surface;

    fn cast(&self, ray: &Ray, surface: &Surface) -> Option<LocalHit> {
        let hit = match *surface {
            Surface::Plane { normal } => ray_plane_intersection(ray, normal),
            Surface::Rect {
                half_width,
                half_height,
            } => ray_rect_intersection(ray, half_width, half_height),
            Surface::Sphere { radius } => ray_sphere_intersection(ray, radius),
            Surface::Cuboid { half_extents } => ray_aabb_intersection(ray, half_extents),
        };
        if hit.is_none() {
            tracing::trace!(?surface, "ray missed surface");
        }
        hit
    }
}

fn ray_plane_intersection(ray: &Ray, normal: DVec3) -> Option<LocalHit> {
    let normal = normal.try_normalize()?;
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = -normal.dot(ray.origin) / denom;
    if t <= 0.0 {
        return None;
    }
    Some(LocalHit {
        point: ray.at(t),
        normal,
    })
}

fn ray_rect_intersection(ray: &Ray, half_width: f64, half_height: f64) -> Option<LocalHit> {
    let hit = ray_plane_intersection(ray, DVec3::Z)?;
    if hit.point.x.abs() <= half_width && hit.point.y.abs() <= half_height {
        Some(hit)
    } else {
        None
    }
}

fn ray_sphere_intersection(ray: &Ray, radius: f64) -> Option<LocalHit> {
    let oc = ray.origin;
    let a = ray.direction.dot(ray.direction);
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if a == 0.0 || discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);

    let t = if t1 > 0.0 {
        t1
    } else if t2 > 0.0 {
        t2
    } else {
        return None;
    };
    let point = ray.at(t);
    Some(LocalHit {
        point,
        normal: point.try_normalize().unwrap_or(DVec3::Z),
    })
}

fn ray_aabb_intersection(ray: &Ray, half: DVec3) -> Option<LocalHit> {
    let min = -half;
    let max = half;
    let (origin, dir) = (ray.origin, ray.direction);
    let inv_dir = DVec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);

    let t1 = (min - origin) * inv_dir;
    let t2 = (max - origin) * inv_dir;

    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    if tmax < 0.0 || tmin > tmax {
        return None;
    }
    // If tmin < 0, ray starts inside the box; take the exit point
    let t = if tmin < 0.0 { tmax } else { tmin };
    let point = ray.at(t);

    // Face normal: the axis on which the hit lies closest to the box surface
    let rel = point / half;
    let abs = rel.abs();
    let normal = if abs.x >= abs.y && abs.x >= abs.z {
        DVec3::X * rel.x.signum()
    } else if abs.y >= abs.z {
        DVec3::Y * rel.y.signum()
    } else {
        DVec3::Z * rel.z.signum()
    };
    Some(LocalHit { point, normal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LocalTransform;
    use crate::math::approx_eq;

    #[test]
    fn sphere_hit_from_outside() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z);
        let hit = AnalyticIntersector
            .cast(&ray, &Surface::Sphere { radius: 1.0 })
            .expect("hit");
        assert!(approx_eq(hit.point, DVec3::Z, 1e-12));
        assert!(approx_eq(hit.normal, DVec3::Z, 1e-12));
    }

    #[test]
    fn plane_behind_origin_is_missed() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::Z);
        assert!(AnalyticIntersector
            .cast(&ray, &Surface::Plane { normal: DVec3::Z })
            .is_none());
    }

    #[test]
    fn rect_respects_extent() {
        let surface = Surface::Rect {
            half_width: 1.0,
            half_height: 0.5,
        };
        let inside = Ray::new(DVec3::new(0.9, 0.4, 3.0), DVec3::NEG_Z);
        let outside = Ray::new(DVec3::new(0.9, 0.6, 3.0), DVec3::NEG_Z);
        assert!(AnalyticIntersector.cast(&inside, &surface).is_some());
        assert!(AnalyticIntersector.cast(&outside, &surface).is_none());
    }

    #[test]
    fn cuboid_reports_face_normal() {
        let surface = Surface::Cuboid {
            half_extents: DVec3::new(1.0, 2.0, 3.0),
        };
        let ray = Ray::new(DVec3::new(5.0, 0.5, 0.5), DVec3::NEG_X);
        let hit = AnalyticIntersector.cast(&ray, &surface).expect("hit");
        assert!(approx_eq(hit.point, DVec3::new(1.0, 0.5, 0.5), 1e-12));
        assert!(approx_eq(hit.normal, DVec3::X, 1e-12));

        let ray = Ray::new(DVec3::new(0.2, 0.1, -9.0), DVec3::Z);
        let hit = AnalyticIntersector.cast(&ray, &surface).expect("hit");
        assert!(approx_eq(hit.normal, DVec3::NEG_Z, 1e-12));
    }

    #[test]
    fn world_targets_come_back_in_spawn_order() {
        let mut world = World::new();
        let a = world.spawn((
            Surface::Sphere { radius: 1.0 },
            GlobalTransform(LocalTransform::new(DVec3::X).matrix()),
        ));
        let b = world.spawn((
            Surface::Sphere { radius: 1.0 },
            GlobalTransform(DMat4::IDENTITY),
            Hidden,
        ));
        let c = world.spawn((
            Surface::Plane { normal: DVec3::Z },
            GlobalTransform(DMat4::IDENTITY),
            BoundsCenterOverride(DVec3::new(0.0, 0.0, -1.0)),
        ));

        let ids: Vec<Entity> = world.targets().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b, c]);

        let hidden = world.target(b).expect("target b");
        assert!(hidden.hidden);

        let manual = world.target(c).expect("target c");
        assert_eq!(
            manual.bounds_center,
            BoundsCenter::Manual(DVec3::new(0.0, 0.0, -1.0))
        );
    }
}
