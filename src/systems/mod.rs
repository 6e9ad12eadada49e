pub mod raycast;
pub mod reflection;
pub mod spherical;
mod transform;

pub use raycast::{
    AnalyticIntersector, BoundsCenter, LocalHit, RayIntersector, SceneEnumerator, Target,
};
pub use reflection::{select_targets, HitRecord, ReflectionSolver, Solution};
pub use spherical::{from_cartesian, to_cartesian, wrap_azimuth, SphericalState};
pub use transform::transform_propagation_system;
