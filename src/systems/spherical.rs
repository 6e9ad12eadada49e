use glam::DVec3;

/// Distance below which azimuth and polar angle are undefined.
const DEGENERATE_RANGE: f64 = 1e-9;

/// Orbit coordinates of a light around its pivot (the last hit point).
///
/// `azimuth` is measured in the XY plane from +X, in degrees within `[0, 360)`.
/// `polar` is measured down from +Z, in degrees within `[0, 180]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalState {
    pub range: f64,
    pub azimuth: f64,
    pub polar: f64,
    pub pivot: DVec3,
}

impl SphericalState {
    /// Derive the orbit coordinates of `location` around `pivot`.
    /// A light sitting on its pivot gets azimuth 0 and polar 0.
    pub fn at(pivot: DVec3, location: DVec3) -> Self {
        Self::resync(pivot, location, 0.0, 0.0)
    }

    /// Re-derive from a new location, keeping the previous angles when the
    /// light sits on the pivot.
    pub fn resync(pivot: DVec3, location: DVec3, prev_azimuth: f64, prev_polar: f64) -> Self {
        let (range, azimuth, polar) = from_cartesian(location, pivot, (prev_azimuth, prev_polar));
        Self {
            range,
            azimuth,
            polar,
            pivot,
        }
    }

    pub fn location(&self) -> DVec3 {
        to_cartesian(self.range, self.azimuth, self.polar, self.pivot)
    }

    /// Unit vector from the pivot toward the orbit location.
    pub fn direction(&self) -> DVec3 {
        to_cartesian(1.0, self.azimuth, self.polar, DVec3::ZERO)
    }
}

/// Orbit coordinates (angles in degrees) to a world-space point.
pub fn to_cartesian(range: f64, azimuth: f64, polar: f64, pivot: DVec3) -> DVec3 {
    let theta = azimuth.to_radians();
    let phi = polar.to_radians();
    DVec3::new(
        range * phi.sin() * theta.cos() + pivot.x,
        range * phi.sin() * theta.sin() + pivot.y,
        range * phi.cos() + pivot.z,
    )
}

/// Wrap degrees into `[0, 360)`.
pub fn wrap_azimuth(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // -1e-17 rem 360 rounds to 360.0
    if wrapped >= 360.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// World-space point to `(range, azimuth, polar)`, angles in degrees.
///
/// When `location` coincides with `pivot` the angles are undefined and
/// `previous` is returned unchanged with a zero range.
pub fn from_cartesian(location: DVec3, pivot: DVec3, previous: (f64, f64)) -> (f64, f64, f64) {
    let delta = location - pivot;
    let range = delta.length();
    if range < DEGENERATE_RANGE {
        return (range, previous.0, previous.1);
    }

    let azimuth = wrap_azimuth(delta.y.atan2(delta.x).to_degrees());
    let polar = (delta.z / range).clamp(-1.0, 1.0).acos().to_degrees();
    (range, azimuth, polar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    fn assert_round_trip(range: f64, azimuth: f64, polar: f64, pivot: DVec3) {
        let p = to_cartesian(range, azimuth, polar, pivot);
        let (r, a, f) = from_cartesian(p, pivot, (0.0, 0.0));
        assert!((r - range).abs() < 1e-4, "range {range} -> {r}");
        assert!((f - polar).abs() < 1e-4, "polar {polar} -> {f}");
        let da = (a - azimuth).abs();
        assert!(da < 1e-4 || (360.0 - da) < 1e-4, "azimuth {azimuth} -> {a}");
    }

    #[test]
    fn round_trip_over_grid() {
        let pivots = [
            DVec3::ZERO,
            DVec3::new(3.5, -2.0, 10.0),
            DVec3::new(-100.0, 40.0, -7.25),
        ];
        for pivot in pivots {
            for range in [0.01, 1.0, 2.0, 57.3, 1000.0] {
                for azimuth in [0.0, 0.5, 45.0, 90.0, 179.9, 180.0, 270.0, 359.5] {
                    for polar in [0.5, 10.0, 45.0, 90.0, 135.0, 179.5] {
                        assert_round_trip(range, azimuth, polar, pivot);
                    }
                }
            }
        }
    }

    #[test]
    fn azimuth_is_wrapped_into_positive_range() {
        let (_, azimuth, _) = from_cartesian(DVec3::new(0.0, -1.0, 0.0), DVec3::ZERO, (0.0, 0.0));
        assert!((azimuth - 270.0).abs() < 1e-9);
    }

    #[test]
    fn wrap_never_reaches_full_turn() {
        assert_eq!(wrap_azimuth(-1e-20), 0.0);
        assert_eq!(wrap_azimuth(360.0), 0.0);
        assert!((wrap_azimuth(-90.0) - 270.0).abs() < 1e-12);
        assert!((wrap_azimuth(725.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn pole_keeps_polar_angle() {
        let p = to_cartesian(2.0, 123.0, 0.0, DVec3::ZERO);
        let (r, _, polar) = from_cartesian(p, DVec3::ZERO, (0.0, 0.0));
        assert!((r - 2.0).abs() < 1e-9);
        assert!(polar.abs() < 1e-6);

        let p = to_cartesian(2.0, 40.0, 180.0, DVec3::ZERO);
        let (_, _, polar) = from_cartesian(p, DVec3::ZERO, (0.0, 0.0));
        assert!((polar - 180.0).abs() < 1e-6);
    }

    #[test]
    fn zero_range_keeps_previous_angles() {
        let pivot = DVec3::new(1.0, 2.0, 3.0);
        let (r, a, p) = from_cartesian(pivot, pivot, (42.0, 17.0));
        assert_eq!(r, 0.0);
        assert_eq!(a, 42.0);
        assert_eq!(p, 17.0);
        assert!(!a.is_nan() && !p.is_nan());
    }

    #[test]
    fn state_location_matches_source() {
        let pivot = DVec3::new(0.5, 0.5, 0.0);
        let location = DVec3::new(2.0, -1.0, 3.0);
        let state = SphericalState::at(pivot, location);
        assert!(approx_eq(state.location(), location, 1e-9));
        assert!(approx_eq(state.direction(), (location - pivot).normalize(), 1e-9));
    }
}
