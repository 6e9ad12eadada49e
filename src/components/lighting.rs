use clap::ValueEnum;
use glam::{DQuat, DVec3};
use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::systems::spherical::SphericalState;

/// Smallest range a light may be placed at.
pub const MIN_RANGE: f64 = 0.001;
pub const DEFAULT_RANGE: f64 = 2.0;

/// How the light's direction is derived from the struck surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReflectMode {
    /// Mirror the view vector about the surface normal so the light's
    /// reflection lands exactly under the pointer.
    Accurate,
    /// Follow the surface normal.
    Normal,
    /// Point away from the target's bounding-box center.
    #[default]
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    /// Rectangular emissive panel; the only kind with a ray-intersectable surface.
    #[default]
    Softbox,
    Point,
    Sun,
    Spot,
    Area,
}

/// Role of a member of the managed light group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    Light,
    /// Bounce card: a valid ray target for other lights.
    Reflector,
}

/// Marks an entity as belonging to the managed light group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Managed {
    pub role: GroupRole,
}

/// User-editable placement parameters of a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSettings {
    pub range: f64,
    pub reflect_mode: ReflectMode,
    /// When set, only this entity is tested by the ray.
    pub target: Option<Entity>,
    pub kind: LightKind,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            range: DEFAULT_RANGE,
            reflect_mode: ReflectMode::default(),
            target: None,
            kind: LightKind::default(),
        }
    }
}

/// World-space pose of a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPose {
    pub location: DVec3,
    pub orientation: DQuat,
    pub range: f64,
    /// Unit vector from the hit point toward the light.
    pub direction: DVec3,
}

impl Default for LightPose {
    fn default() -> Self {
        Self {
            location: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            range: DEFAULT_RANGE,
            direction: DVec3::Z,
        }
    }
}

/// Placement state attached to every managed light entity.
///
/// Pose and spherical state are only written by the placement controller,
/// so the two never drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub settings: LightSettings,
    pose: LightPose,
    spherical: SphericalState,
}

impl LightRig {
    pub fn new(settings: LightSettings, location: DVec3) -> Self {
        let pose = LightPose {
            location,
            range: settings.range,
            ..LightPose::default()
        };
        let pivot = pose.location - pose.direction * pose.range;
        let spherical = SphericalState::at(pivot, pose.location);
        Self {
            settings,
            pose,
            spherical,
        }
    }

    pub fn pose(&self) -> &LightPose {
        &self.pose
    }

    pub fn spherical(&self) -> &SphericalState {
        &self.spherical
    }

    /// Pivot the light orbits around (last hit point).
    pub fn pivot(&self) -> DVec3 {
        self.spherical.pivot
    }

    pub(crate) fn set_pose(&mut self, pose: LightPose) {
        self.pose = pose;
    }

    pub(crate) fn set_spherical(&mut self, spherical: SphericalState) {
        self.spherical = spherical;
    }
}
