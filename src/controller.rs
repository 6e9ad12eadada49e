//! Interactive light placement: pointer events in, light poses out.

use glam::{DMat4, DQuat, DVec3, EulerRot};
use hecs::{Entity, World};

use crate::camera::{Camera, Viewport};
use crate::components::lighting::MIN_RANGE;
use crate::components::{
    bind_parent, parent_frame, LightPose, LightRig, LightSettings, LocalTransform, ReflectMode,
    Surface,
};
use crate::engine::{InputEvent, InputState, Modifiers, PointerButton};
use crate::fsm::StateMachine;
use crate::math::{track_quat, Ray};
use crate::scene::prefabs::spawn_softbox;
use crate::systems::{
    select_targets, transform_propagation_system, wrap_azimuth, AnalyticIntersector, HitRecord,
    RayIntersector, ReflectionSolver, SphericalState,
};

/// Interactive session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Inactive,
    /// Running, waiting for the primary button.
    Active,
    /// Primary button held: pointer moves reposition the light.
    Dragging,
}

/// What a single call did to the active light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseUpdate {
    /// The light moved. `hit` is set when the move came from a ray cast.
    Moved { hit: Option<HitRecord> },
    /// Rotation changed, location kept.
    Reoriented,
    /// Nothing changed (no hit, no active light, or the event was not ours).
    Unchanged,
}

/// Drives one light at a time from pointer input.
///
/// Pose and orbit state live in each light's `LightRig`; only this controller
/// writes them.
pub struct LightPlacementController<R = AnalyticIntersector> {
    intersector: R,
    session: StateMachine<Session>,
    input: InputState,
    active: Option<Entity>,
    /// Settings given to softboxes spawned by a click with no light selected.
    defaults: LightSettings,
}

impl LightPlacementController<AnalyticIntersector> {
    pub fn new(defaults: LightSettings) -> Self {
        Self::with_intersector(AnalyticIntersector, defaults)
    }
}

impl<R: RayIntersector<Surface = Surface>> LightPlacementController<R> {
    pub fn with_intersector(intersector: R, defaults: LightSettings) -> Self {
        Self {
            intersector,
            session: StateMachine::new(Session::Inactive),
            input: InputState::new(),
            active: None,
            defaults,
        }
    }

    pub fn session(&self) -> Session {
        self.session.state
    }

    pub fn active_light(&self) -> Option<Entity> {
        self.active
    }

    pub fn select(&mut self, light: Option<Entity>) {
        tracing::debug!(?light, "active light changed");
        self.active = light;
    }

    pub fn start(&mut self) {
        if self.session.go(Session::Active) {
            tracing::info!("light placement started");
        }
    }

    pub fn stop(&mut self) {
        if self.session.go(Session::Inactive) {
            tracing::info!(from = ?self.session.previous, "light placement stopped");
        }
    }

    /// Feed one host input event.
    pub fn handle_event(
        &mut self,
        world: &mut World,
        camera: &Camera,
        viewport: Viewport,
        event: InputEvent,
    ) -> PoseUpdate {
        if self.session.state == Session::Inactive {
            return PoseUpdate::Unchanged;
        }
        self.input.update(&event);

        match event {
            InputEvent::Cancel | InputEvent::ButtonPressed(PointerButton::Secondary) => {
                self.stop();
                PoseUpdate::Unchanged
            }
            InputEvent::ButtonPressed(PointerButton::Primary) => {
                if !viewport.contains(self.input.pointer) {
                    return PoseUpdate::Unchanged;
                }
                if self.active.is_none() {
                    let light = spawn_softbox(world, "Lumiere", DVec3::ZERO, self.defaults);
                    tracing::info!(?light, "spawned softbox");
                    self.active = Some(light);
                }
                self.session.go(Session::Dragging);
                self.pointer_update(world, camera, viewport)
            }
            InputEvent::ButtonReleased(PointerButton::Primary) => {
                self.session.go(Session::Active);
                PoseUpdate::Unchanged
            }
            InputEvent::PointerMoved { .. } if self.session.state == Session::Dragging => {
                self.pointer_update(world, camera, viewport)
            }
            _ => PoseUpdate::Unchanged,
        }
    }

    fn pointer_update(
        &mut self,
        world: &mut World,
        camera: &Camera,
        viewport: Viewport,
    ) -> PoseUpdate {
        let Some(light) = self.active else {
            return PoseUpdate::Unchanged;
        };
        if !viewport.contains(self.input.pointer) {
            return PoseUpdate::Unchanged;
        }
        let ray = camera.ray_through(self.input.pointer, viewport);
        self.reposition(world, light, &ray, self.input.modifiers)
    }

    /// Place `light` from a world-space pointer ray.
    ///
    /// With shift held the light keeps its location and only turns toward its pivot.
    pub fn reposition(
        &self,
        world: &mut World,
        light: Entity,
        ray: &Ray,
        modifiers: Modifiers,
    ) -> PoseUpdate {
        if modifiers.shift {
            return self.reorient(world, light);
        }
        let Some(rig) = rig_of(world, light) else {
            return PoseUpdate::Unchanged;
        };

        let targets = select_targets(&*world, light, rig.settings.target);
        let solver = ReflectionSolver::new(
            &self.intersector,
            rig.settings.reflect_mode,
            rig.settings.range,
        );
        let Some(solution) = solver.solve(ray, ray.direction, &targets) else {
            tracing::debug!(
                ?light,
                candidates = targets.len(),
                "no surface under pointer, pose unchanged"
            );
            return PoseUpdate::Unchanged;
        };

        let pose = LightPose {
            location: solution.location,
            orientation: track_quat(solution.direction),
            range: rig.settings.range,
            direction: solution.direction,
        };
        let prev = rig.spherical();
        let spherical =
            SphericalState::resync(solution.hit.point, pose.location, prev.azimuth, prev.polar);

        commit(world, light, pose, spherical);
        if bind_parent(world, light, solution.hit.target) {
            write_transform(world, light, &pose);
        }
        transform_propagation_system(world);

        tracing::trace!(
            ?light,
            target = ?solution.hit.target,
            location = %pose.location,
            "light placed"
        );
        PoseUpdate::Moved {
            hit: Some(solution.hit),
        }
    }

    /// Turn the light toward its pivot without moving it.
    pub fn reorient(&self, world: &mut World, light: Entity) -> PoseUpdate {
        let Some(rig) = rig_of(world, light) else {
            return PoseUpdate::Unchanged;
        };
        let mut pose = *rig.pose();
        let track = pose.location - rig.pivot();
        if track.length_squared() == 0.0 {
            return PoseUpdate::Unchanged;
        }
        pose.orientation = track_quat(track);
        pose.direction = track.normalize();

        commit(world, light, pose, *rig.spherical());
        transform_propagation_system(world);
        PoseUpdate::Reoriented
    }

    /// Move the light along its current direction to `range` from the pivot.
    pub fn set_range(&self, world: &mut World, light: Entity, range: f64) -> PoseUpdate {
        let Some(mut rig) = rig_of(world, light) else {
            return PoseUpdate::Unchanged;
        };
        let range = range.max(MIN_RANGE);
        rig.settings.range = range;
        set_settings(world, light, rig.settings);

        let pivot = rig.pivot();
        let location = pivot + rig.pose().direction * range;
        let pose = LightPose {
            location,
            orientation: track_quat(location - pivot),
            range,
            direction: rig.pose().direction,
        };
        let prev = rig.spherical();
        let spherical = SphericalState::resync(pivot, location, prev.azimuth, prev.polar);

        commit(world, light, pose, spherical);
        transform_propagation_system(world);
        PoseUpdate::Moved { hit: None }
    }

    /// Orbit the light around its pivot. Angles in degrees.
    pub fn set_orbit(
        &self,
        world: &mut World,
        light: Entity,
        azimuth: f64,
        polar: f64,
    ) -> PoseUpdate {
        let Some(rig) = rig_of(world, light) else {
            return PoseUpdate::Unchanged;
        };
        let spherical = SphericalState {
            range: rig.settings.range,
            azimuth: wrap_azimuth(azimuth),
            polar: polar.clamp(0.0, 180.0),
            pivot: rig.pivot(),
        };
        let location = spherical.location();
        let orientation = track_quat(location - spherical.pivot);
        let pose = LightPose {
            location,
            orientation,
            range: spherical.range,
            direction: orientation * DVec3::Z,
        };

        commit(world, light, pose, spherical);
        transform_propagation_system(world);
        PoseUpdate::Moved { hit: None }
    }

    /// Rotation of the light about its own Z axis, in radians.
    pub fn tilt(&self, world: &World, light: Entity) -> Option<f64> {
        let rig = rig_of(world, light)?;
        Some(rig.pose().orientation.to_euler(EulerRot::XYZ).2)
    }

    /// Spin the light about its own Z axis; location and direction are kept.
    pub fn set_tilt(&self, world: &mut World, light: Entity, tilt: f64) -> PoseUpdate {
        let Some(rig) = rig_of(world, light) else {
            return PoseUpdate::Unchanged;
        };
        let mut pose = *rig.pose();
        let (x, y, _) = pose.orientation.to_euler(EulerRot::XYZ);
        pose.orientation = DQuat::from_euler(EulerRot::XYZ, x, y, tilt);

        commit(world, light, pose, *rig.spherical());
        transform_propagation_system(world);
        PoseUpdate::Reoriented
    }

    pub fn set_reflect_mode(&self, world: &mut World, light: Entity, mode: ReflectMode) {
        if let Some(mut rig) = rig_of(world, light) {
            rig.settings.reflect_mode = mode;
            set_settings(world, light, rig.settings);
        }
    }

    /// Restrict ray casts to a single entity, or clear the restriction.
    pub fn set_target(&self, world: &mut World, light: Entity, target: Option<Entity>) {
        if let Some(mut rig) = rig_of(world, light) {
            rig.settings.target = target;
            set_settings(world, light, rig.settings);
        }
    }
}

fn rig_of(world: &World, light: Entity) -> Option<LightRig> {
    match world.get::<&LightRig>(light) {
        Ok(rig) => Some((*rig).clone()),
        Err(_) => {
            tracing::warn!(?light, "entity has no light rig");
            None
        }
    }
}

fn set_settings(world: &mut World, light: Entity, settings: LightSettings) {
    if let Ok(mut rig) = world.get::<&mut LightRig>(light) {
        rig.settings = settings;
    }
}

/// Store the new pose and orbit state, and mirror the pose onto the transform.
fn commit(world: &mut World, light: Entity, pose: LightPose, spherical: SphericalState) {
    if let Ok(mut rig) = world.get::<&mut LightRig>(light) {
        rig.set_pose(pose);
        rig.set_spherical(spherical);
    }
    write_transform(world, light, &pose);
}

/// Express the world-space pose in the light's parent frame.
fn write_transform(world: &mut World, light: Entity, pose: &LightPose) {
    let frame = parent_frame(world, light);
    let local = frame.inverse() * DMat4::from_rotation_translation(pose.orientation, pose.location);
    let (_, rotation, position) = local.to_scale_rotation_translation();
    if let Ok(mut lt) = world.get::<&mut LocalTransform>(light) {
        lt.position = position;
        lt.rotation = rotation;
    }
}
