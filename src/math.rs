use glam::{DMat3, DMat4, DQuat, DVec3};

/// Squared length below which a vector is treated as zero.
pub const EPSILON_SQ: f64 = 1e-18;

/// A ray in world (or local) space. `direction` is not required to be unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    /// Re-express the ray in the local space of an object whose world matrix inverse is `inv`.
    /// Both end points are transformed so non-uniform scale is handled.
    pub fn transformed(&self, inv: &DMat4) -> Ray {
        let origin = inv.transform_point3(self.origin);
        let target = inv.transform_point3(self.origin + self.direction);
        Ray::new(origin, target - origin)
    }
}

/// Law of reflection: `d - 2(d·n)n`.
pub fn reflect(d: DVec3, n: DVec3) -> DVec3 {
    d - 2.0 * d.dot(n) * n
}

/// Transform a local-space normal to world space via the inverse-transpose of
/// the upper 3x3 of `world`, re-normalized.
pub fn transform_normal(world: &DMat4, normal: DVec3) -> DVec3 {
    let m = DMat3::from_mat4(*world).inverse().transpose();
    (m * normal).try_normalize().unwrap_or(normal)
}

/// Look-from-direction basis: local +Z along `direction`, local +Y as close to
/// world +Z as possible. Falls back to world +Y as up when `direction` is vertical.
pub fn track_quat(direction: DVec3) -> DQuat {
    let z = direction.try_normalize().unwrap_or(DVec3::Z);
    let up = if z.cross(DVec3::Z).length_squared() < 1e-12 {
        DVec3::Y
    } else {
        DVec3::Z
    };
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    DQuat::from_mat3(&DMat3::from_cols(x, y, z)).normalize()
}

/// Axis-aligned bounds in an object's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    pub fn from_half_extents(half: DVec3) -> Self {
        Self::new(-half, half)
    }

    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(a.x, b.y, b.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(b.x, b.y, b.z),
        ]
    }

    /// Mean of the 8 corners transformed to world space.
    pub fn world_center(&self, world: &DMat4) -> DVec3 {
        world.transform_point3(corner_centroid(&self.corners()))
    }
}

pub fn corner_centroid(corners: &[DVec3; 8]) -> DVec3 {
    corners.iter().copied().sum::<DVec3>() * 0.125
}

/// Returns true when `a` and `b` differ by at most `eps` on every axis.
pub fn approx_eq(a: DVec3, b: DVec3, eps: f64) -> bool {
    (a - b).abs().max_element() <= eps
}
