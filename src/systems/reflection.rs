use glam::DVec3;
use hecs::Entity;

use crate::components::ReflectMode;
use crate::math::{reflect, transform_normal, Ray, EPSILON_SQ};

use super::raycast::{RayIntersector, SceneEnumerator, Target};

/// A surface struck by the pointer ray, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub point: DVec3,
    /// Unit length.
    pub normal: DVec3,
    pub target: Entity,
}

/// Outcome of a successful solve: where the light goes and which target it
/// should be attached to (`hit.target`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub hit: HitRecord,
    pub location: DVec3,
    /// Unit vector from the hit point toward the light.
    pub direction: DVec3,
}

/// Collect the ray targets for `light`.
///
/// With an explicit target only that entity is returned, hidden or not.
/// Otherwise every visible surface is returned. In both cases members of the
/// managed light group are skipped; reflector cards stay eligible unless they
/// are the light being moved.
pub fn select_targets<E: SceneEnumerator>(
    scene: &E,
    light: Entity,
    explicit: Option<Entity>,
) -> Vec<Target<E::Surface>> {
    if let Some(id) = explicit {
        return scene
            .target(id)
            .into_iter()
            .filter(|t| is_eligible(t, light))
            .collect();
    }

    scene
        .targets()
        .into_iter()
        .filter(|t| !t.hidden && is_eligible(t, light))
        .collect()
}

fn is_eligible<S>(target: &Target<S>, light: Entity) -> bool {
    match target.role {
        None => target.id != light,
        Some(_) => target.is_reflector() && target.id != light,
    }
}

/// Casts the pointer ray against candidate targets and derives the light
/// placement from the closest hit.
pub struct ReflectionSolver<'a, R> {
    intersector: &'a R,
    pub mode: ReflectMode,
    pub range: f64,
}

impl<'a, R: RayIntersector> ReflectionSolver<'a, R> {
    pub fn new(intersector: &'a R, mode: ReflectMode, range: f64) -> Self {
        Self {
            intersector,
            mode,
            range,
        }
    }

    /// Returns `None` when no candidate is hit; the caller keeps its pose.
    ///
    /// Among hits the one nearest to `ray.origin` wins. Equal distances keep
    /// the first candidate in slice order.
    pub fn solve(
        &self,
        ray: &Ray,
        view_vector: DVec3,
        candidates: &[Target<R::Surface>],
    ) -> Option<Solution> {
        let mut best: Option<(f64, Solution)> = None;

        for target in candidates {
            if target.world.determinant().abs() < f64::EPSILON {
                tracing::trace!(target = ?target.id, "skipping target with singular transform");
                continue;
            }
            let inv = target.world.inverse();
            let local_ray = ray.transformed(&inv);

            let Some(local) = self.intersector.cast(&local_ray, &target.surface) else {
                continue;
            };

            let point = target.world.transform_point3(local.point);
            let normal = transform_normal(&target.world, local.normal);
            let direction = self.direction(target, view_vector, point, normal);

            let dist_sq = (point - ray.origin).length_squared();
            let is_closer = best.as_ref().map_or(true, |(d, _)| dist_sq < *d);
            if is_closer {
                best = Some((
                    dist_sq,
                    Solution {
                        hit: HitRecord {
                            point,
                            normal,
                            target: target.id,
                        },
                        location: point + direction * self.range,
                        direction,
                    },
                ));
            }
        }

        best.map(|(_, solution)| solution)
    }

    fn direction(
        &self,
        target: &Target<R::Surface>,
        view_vector: DVec3,
        point: DVec3,
        normal: DVec3,
    ) -> DVec3 {
        match self.mode {
            ReflectMode::Accurate => reflect(view_vector.normalize_or_zero(), normal)
                .try_normalize()
                .unwrap_or(normal),
            ReflectMode::Normal => {
                // A bounce card sends light back toward the side it came from.
                if target.is_reflector() {
                    -normal
                } else {
                    normal
                }
            }
            ReflectMode::Estimated => {
                let center = target.bounds_center.world_point(&target.world);
                let away = point - center;
                if away.length_squared() < EPSILON_SQ {
                    normal
                } else {
                    away.normalize()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{DMat4, DQuat};
    use hecs::World;

    use super::*;
    use crate::components::{GroupRole, LightSettings, Surface};
    use crate::math::{approx_eq, Aabb};
    use crate::scene::prefabs::{spawn_floor, spawn_reflector, spawn_softbox};
    use crate::systems::raycast::{AnalyticIntersector, BoundsCenter};

    fn target(id: Entity, world: DMat4, surface: Surface) -> Target<Surface> {
        Target {
            id,
            world,
            bounds_center: BoundsCenter::Auto(surface.local_bounds()),
            surface,
            role: None,
            hidden: false,
        }
    }

    fn ids(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn accurate_mode_follows_law_of_reflection() {
        let ids = ids(1);
        let floor = target(ids[0], DMat4::IDENTITY, Surface::Plane { normal: DVec3::Z });
        let solver = ReflectionSolver::new(&AnalyticIntersector, ReflectMode::Accurate, 2.0);

        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z);
        let s = solver.solve(&ray, DVec3::NEG_Z, &[floor.clone()]).expect("hit");
        assert!(approx_eq(s.direction, DVec3::Z, 1e-12));
        assert!(approx_eq(s.location, DVec3::new(0.0, 0.0, 2.0), 1e-12));

        let slanted = DVec3::new(1.0, 0.0, -1.0).normalize();
        let ray = Ray::new(DVec3::new(-5.0, 0.0, 5.0), slanted);
        let s = solver.solve(&ray, slanted, &[floor]).expect("hit");
        assert!(approx_eq(s.direction, DVec3::new(1.0, 0.0, 1.0).normalize(), 1e-12));
    }

    #[test]
    fn normal_mode_flips_for_reflectors_only() {
        let ids = ids(2);
        // Plane facing +Y, one metre in front of the ray origin
        let world = DMat4::from_translation(DVec3::new(0.0, -1.0, 0.0));
        let surface = Surface::Plane { normal: DVec3::Y };
        let solver = ReflectionSolver::new(&AnalyticIntersector, ReflectMode::Normal, 1.0);
        let ray = Ray::new(DVec3::ZERO, DVec3::NEG_Y);

        let wall = target(ids[0], world, surface);
        let s = solver.solve(&ray, ray.direction, &[wall]).expect("hit");
        assert!(approx_eq(s.direction, DVec3::Y, 1e-12));

        let mut card = target(ids[1], world, surface);
        card.role = Some(GroupRole::Reflector);
        let s = solver.solve(&ray, ray.direction, &[card]).expect("hit");
        assert!(approx_eq(s.direction, DVec3::NEG_Y, 1e-12));
    }

    #[test]
    fn estimated_mode_points_away_from_bounds_center() {
        let ids = ids(1);
        let mut cube = target(
            ids[0],
            DMat4::IDENTITY,
            Surface::Cuboid {
                half_extents: DVec3::splat(2.0),
            },
        );
        cube.bounds_center = BoundsCenter::Auto(Aabb::from_half_extents(DVec3::ONE));
        let solver = ReflectionSolver::new(&AnalyticIntersector, ReflectMode::Estimated, 3.0);

        // Strikes the +X face at (2, 0, 0)
        let ray = Ray::new(DVec3::new(10.0, 0.0, 0.0), DVec3::NEG_X);
        let s = solver.solve(&ray, ray.direction, &[cube]).expect("hit");
        assert!(approx_eq(s.hit.point, DVec3::new(2.0, 0.0, 0.0), 1e-12));
        assert!(approx_eq(s.direction, DVec3::X, 1e-12));
        assert!(approx_eq(s.location, DVec3::new(5.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn estimated_mode_uses_manual_center() {
        let ids = ids(1);
        let mut floor = target(ids[0], DMat4::IDENTITY, Surface::Plane { normal: DVec3::Z });
        floor.bounds_center = BoundsCenter::Manual(DVec3::new(-1.0, 0.0, 0.0));
        let solver = ReflectionSolver::new(&AnalyticIntersector, ReflectMode::Estimated, 1.0);

        let ray = Ray::new(DVec3::new(0.0, 0.0, 4.0), DVec3::NEG_Z);
        let s = solver.solve(&ray, ray.direction, &[floor]).expect("hit");
        assert!(approx_eq(s.direction, DVec3::X, 1e-12));
    }

    #[test]
    fn closest_hit_wins() {
        let ids = ids(2);
        let far = target(
            ids[0],
            DMat4::from_translation(DVec3::new(0.0, 0.0, 10.0)),
            Surface::Plane { normal: DVec3::NEG_Z },
        );
        let near = target(
            ids[1],
            DMat4::from_translation(DVec3::new(0.0, 0.0, 5.0)),
            Surface::Plane { normal: DVec3::NEG_Z },
        );
        let solver = ReflectionSolver::new(&AnalyticIntersector, ReflectMode::Normal, 1.0);
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let s = solver.solve(&ray, ray.direction, &[far, near]).expect("hit");
        assert_eq!(s.hit.target, ids[1]);
        assert!(approx_eq(s.hit.point, DVec3::new(0.0, 0.0, 5.0), 1e-12));
    }

    #[test]
    fn equal_distance_keeps_first_candidate() {
        let ids = ids(2);
        let a = target(ids[0], DMat4::IDENTITY, Surface::Plane { normal: DVec3::Z });
        let b = target(ids[1], DMat4::IDENTITY, Surface::Plane { normal: DVec3::Z });
        let solver = ReflectionSolver::new(&AnalyticIntersector, ReflectMode::Normal, 1.0);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 3.0), DVec3::NEG_Z);

        let s = solver
            .solve(&ray, ray.direction, &[a.clone(), b.clone()])
            .expect("hit");
        assert_eq!(s.hit.target, ids[0]);
        let s = solver.solve(&ray, ray.direction, &[b, a]).expect("hit");
        assert_eq!(s.hit.target, ids[1]);
    }

    #[test]
    fn no_candidates_no_solution() {
        let solver = ReflectionSolver::new(&AnalyticIntersector, ReflectMode::Accurate, 1.0);
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);
        assert!(solver.solve(&ray, ray.direction, &[]).is_none());
    }

    #[test]
    fn normals_are_corrected_for_non_uniform_scale() {
        let ids = ids(1);
        let sphere = target(
            ids[0],
            DMat4::from_scale(DVec3::new(4.0, 1.0, 1.0)),
            Surface::Sphere { radius: 1.0 },
        );
        let solver = ReflectionSolver::new(&AnalyticIntersector, ReflectMode::Normal, 1.0);
        // Ellipsoid x²/16 + y² + z² = 1, hit at (2, 0, √0.75)
        let ray = Ray::new(DVec3::new(2.0, 0.0, 5.0), DVec3::NEG_Z);
        let s = solver.solve(&ray, ray.direction, &[sphere]).expect("hit");
        let z = 0.75_f64.sqrt();
        assert!(approx_eq(s.hit.point, DVec3::new(2.0, 0.0, z), 1e-9));
        let expected = DVec3::new(2.0 / 16.0, 0.0, z).normalize();
        assert!(approx_eq(s.hit.normal, expected, 1e-9), "normal={}", s.hit.normal);
    }

    #[test]
    fn explicit_target_skips_managed_lights() {
        let mut world = World::new();
        let floor = spawn_floor(&mut world, 0.0, 5.0);
        let settings = LightSettings::default();
        let key = spawn_softbox(&mut world, "Key", DVec3::new(0.0, 0.0, 4.0), settings);
        let fill = spawn_softbox(&mut world, "Fill", DVec3::new(4.0, 0.0, 4.0), settings);
        let card_at = DVec3::new(-4.0, 0.0, 2.0);
        let card = spawn_reflector(&mut world, "Card", card_at, DQuat::IDENTITY);

        let ids = |light, explicit| -> Vec<Entity> {
            select_targets(&world, light, explicit)
                .into_iter()
                .map(|t| t.id)
                .collect()
        };
        assert!(ids(key, Some(key)).is_empty());
        assert!(ids(key, Some(fill)).is_empty());
        assert!(ids(card, Some(card)).is_empty());
        assert_eq!(ids(key, Some(card)), vec![card]);
        assert_eq!(ids(key, Some(floor)), vec![floor]);
    }
}
