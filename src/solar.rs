//! Closed-form solar ephemeris (NOAA solar calculator formulas).
//!
//! Angles are degrees unless a name says otherwise. The output frame is
//! Z up, +Y north, +X east.

use glam::{DQuat, DVec3, EulerRot};

use crate::math::track_quat;

/// Latitudes beyond this are clamped to keep the azimuth projection finite.
pub const MAX_LATITUDE: f64 = 89.93;

/// Julian day of 2000-01-01 12:00 UT.
const J2000: f64 = 2451545.0;
const DAYS_PER_CENTURY: f64 = 36525.0;

/// Date, time and place for a sun position query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarParameters {
    /// Local clock time in hours, 0..24.
    pub local_time: f64,
    pub latitude: f64,
    /// Degrees, east positive.
    pub longitude: f64,
    /// Hours ahead of UTC (Paris in winter is +1).
    pub utc_offset: f64,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Refraction-corrected elevation above the horizon.
    pub elevation: f64,
    /// Clockwise from north.
    pub azimuth: f64,
    /// Unit vector from the origin toward the sun.
    pub direction: DVec3,
    /// `direction` scaled by the requested distance.
    pub location: DVec3,
    /// Light orientation: local -Z faces the origin.
    pub orientation: DQuat,
}

impl SunPosition {
    /// Extrinsic X, Y, Z rotation angles (radians) equivalent to `orientation`.
    pub fn rotation_euler(&self) -> DVec3 {
        let (z, y, x) = self.orientation.to_euler(EulerRot::ZYX);
        DVec3::new(x, y, z)
    }
}

/// Sun position for `params`, with the light placed `distance` from the origin.
///
/// No calendar validation happens here: a day of 32 yields a defined but
/// meaningless position.
pub fn sun_position(params: &SolarParameters, distance: f64) -> SunPosition {
    let latitude = params
        .latitude
        .clamp(-MAX_LATITUDE, MAX_LATITUDE)
        .to_radians();
    // Internal formulas take west-positive longitude.
    let longitude = -params.longitude;

    let utc_time = params.local_time - params.utc_offset;
    let t = julian_century(utc_time, params.year, params.month, params.day);

    let obliquity = obliquity_correction(t).to_radians();
    let apparent_long = apparent_longitude(t).to_radians();
    let declination = (obliquity.sin() * apparent_long.sin()).asin();
    let eq_time = equation_of_time(t);

    let time_correction = eq_time - 4.0 * longitude - 60.0 * params.utc_offset;
    let true_solar_time = (params.local_time * 60.0 + time_correction).rem_euclid(1440.0);
    let mut hour_angle = true_solar_time / 4.0 - 180.0;
    if hour_angle < -180.0 {
        hour_angle += 360.0;
    }

    let cos_zenith = (latitude.sin() * declination.sin()
        + latitude.cos() * declination.cos() * hour_angle.to_radians().cos())
    .clamp(-1.0, 1.0);
    let zenith = cos_zenith.acos();

    let azimuth = solar_azimuth(latitude, declination, zenith, hour_angle);

    let exo_elevation = 90.0 - zenith.to_degrees();
    let elevation = exo_elevation + refraction_correction(exo_elevation);

    let theta = (90.0 - elevation).to_radians();
    let phi = -azimuth.to_radians();
    let direction = DVec3::new(
        phi.sin() * (-theta).sin(),
        theta.sin() * phi.cos(),
        theta.cos(),
    );

    tracing::trace!(elevation, azimuth, hour_angle, "sun position");

    SunPosition {
        elevation,
        azimuth,
        direction,
        location: direction * distance,
        orientation: track_quat(direction),
    }
}

fn solar_azimuth(latitude: f64, declination: f64, zenith: f64, hour_angle: f64) -> f64 {
    let denom = latitude.cos() * zenith.sin();
    let mut azimuth = if denom.abs() > 0.001 {
        let cos_az = ((latitude.sin() * zenith.cos() - declination.sin()) / denom).clamp(-1.0, 1.0);
        let az = 180.0 - cos_az.acos().to_degrees();
        if hour_angle > 0.0 {
            -az
        } else {
            az
        }
    } else if latitude > 0.0 {
        180.0
    } else {
        0.0
    };
    if azimuth < 0.0 {
        azimuth += 360.0;
    }
    azimuth
}

/// Empirical atmospheric refraction (degrees) for an airless elevation.
pub fn refraction_correction(elevation: f64) -> f64 {
    if elevation > 85.0 {
        return 0.0;
    }
    let te = elevation.to_radians().tan();
    let arcsec = if elevation > 5.0 {
        58.1 / te - 0.07 / te.powi(3) + 0.000086 / te.powi(5)
    } else if elevation > -0.575 {
        let s1 = -12.79 + elevation * 0.711;
        let s2 = 103.4 + elevation * s1;
        let s3 = -518.2 + elevation * s2;
        1735.0 + elevation * s3
    } else {
        -20.774 / te
    };
    arcsec / 3600.0
}

/// Julian day at 0h UT of a Gregorian calendar date.
pub fn julian_day(year: i32, month: u32, day: u32) -> f64 {
    let (mut y, mut m) = (year as f64, month as f64);
    if month <= 2 {
        y -= 1.0;
        m += 12.0;
    }
    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day as f64 + b - 1524.5
}

/// Julian centuries since J2000 for a UTC hour on a calendar date.
fn julian_century(utc_time: f64, year: i32, month: u32, day: u32) -> f64 {
    (julian_day(year, month, day) + utc_time / 24.0 - J2000) / DAYS_PER_CENTURY
}

fn mean_longitude(t: f64) -> f64 {
    (280.46646 + t * (36000.76983 + 0.0003032 * t)).rem_euclid(360.0)
}

fn mean_anomaly(t: f64) -> f64 {
    357.52911 + t * (35999.05029 - 0.0001537 * t)
}

fn eccentricity(t: f64) -> f64 {
    0.016708634 - t * (0.000042037 + 0.0000001267 * t)
}

fn equation_of_center(t: f64) -> f64 {
    let m = mean_anomaly(t).to_radians();
    m.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * m).sin() * 0.000289
}

fn true_longitude(t: f64) -> f64 {
    mean_longitude(t) + equation_of_center(t)
}

fn apparent_longitude(t: f64) -> f64 {
    let omega = 125.04 - 1934.136 * t;
    true_longitude(t) - 0.00569 - 0.00478 * omega.to_radians().sin()
}

fn mean_obliquity(t: f64) -> f64 {
    23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.00059 - t * 0.001813))) / 60.0) / 60.0
}

fn obliquity_correction(t: f64) -> f64 {
    let omega = 125.04 - 1934.136 * t;
    mean_obliquity(t) + 0.00256 * omega.to_radians().cos()
}

/// Equation of time in minutes.
fn equation_of_time(t: f64) -> f64 {
    let epsilon = obliquity_correction(t).to_radians();
    let l0 = mean_longitude(t).to_radians();
    let e = eccentricity(t);
    let m = mean_anomaly(t).to_radians();

    let y = (epsilon / 2.0).tan().powi(2);

    let etime = y * (2.0 * l0).sin() - 2.0 * e * m.sin()
        + 4.0 * e * y * m.sin() * (2.0 * l0).cos()
        - 0.5 * y * y * (4.0 * l0).sin()
        - 1.25 * e * e * (2.0 * m).sin();
    etime.to_degrees() * 4.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    fn params(
        local_time: f64,
        latitude: f64,
        longitude: f64,
        day: u32,
        month: u32,
    ) -> SolarParameters {
        SolarParameters {
            local_time,
            latitude,
            longitude,
            utc_offset: 0.0,
            day,
            month,
            year: 2024,
        }
    }

    #[test]
    fn julian_day_of_epoch() {
        assert_eq!(julian_day(2000, 1, 1) + 0.5, J2000);
        assert_eq!(julian_day(1987, 1, 27), 2446822.5);
    }

    #[test]
    fn equinox_noon_near_paris() {
        let sun = sun_position(&params(12.0, 48.87, 2.67, 20, 3), 1.0);
        assert!(sun.elevation > 0.0 && sun.elevation < 90.0);
        // NOAA calculator: ~41.2° at 12:00 UTC on 2024-03-20
        assert!((sun.elevation - 41.2).abs() < 0.5, "elevation={}", sun.elevation);
        // A few minutes after solar noon the sun sits just west of south.
        assert!((sun.azimuth - 180.0).abs() < 5.0, "azimuth={}", sun.azimuth);
    }

    #[test]
    fn morning_sun_is_in_the_east() {
        let sun = sun_position(&params(8.0, 48.87, 2.67, 21, 6), 1.0);
        assert!(sun.azimuth > 45.0 && sun.azimuth < 135.0, "azimuth={}", sun.azimuth);
        assert!(sun.direction.x > 0.0);
    }

    #[test]
    fn midnight_sun_is_below_horizon() {
        let sun = sun_position(&params(0.0, 48.87, 2.67, 20, 3), 1.0);
        assert!(sun.elevation < 0.0);
        assert!(sun.direction.z < 0.0);
    }

    #[test]
    fn utc_offset_shifts_local_clock() {
        let utc = sun_position(&params(12.0, 40.0, 15.0, 1, 8), 1.0);
        let mut local = params(13.0, 40.0, 15.0, 1, 8);
        local.utc_offset = 1.0;
        let local = sun_position(&local, 1.0);
        assert!((utc.elevation - local.elevation).abs() < 1e-9);
        assert!((utc.azimuth - local.azimuth).abs() < 1e-9);
    }

    #[test]
    fn location_and_orientation_agree() {
        let sun = sun_position(&params(15.5, -33.9, 151.2, 5, 12), 10.0);
        assert!((sun.direction.length() - 1.0).abs() < 1e-12);
        assert!(approx_eq(sun.location, sun.direction * 10.0, 1e-12));
        assert!(approx_eq(sun.orientation * DVec3::Z, sun.direction, 1e-9));

        let e = sun.rotation_euler();
        let rebuilt = DQuat::from_euler(EulerRot::ZYX, e.z, e.y, e.x);
        assert!(approx_eq(rebuilt * DVec3::Z, sun.direction, 1e-9));

        let elevation = sun.direction.z.asin().to_degrees();
        assert!((elevation - sun.elevation).abs() < 1e-9);
    }

    #[test]
    fn pole_latitude_is_clamped() {
        // Latitude 90 is clamped, so the result stays finite.
        let north = sun_position(&params(12.0, 90.0, 0.0, 21, 6), 1.0);
        assert!(north.elevation.is_finite() && north.azimuth.is_finite());
        assert!(north.elevation > 20.0 && north.elevation < 25.0);
    }

    #[test]
    fn azimuth_defaults_when_denominator_vanishes() {
        let lat = 10.0_f64.to_radians();
        assert_eq!(solar_azimuth(lat, lat, 0.0, 5.0), 180.0);
        assert_eq!(solar_azimuth(-lat, -lat, 0.0, 5.0), 0.0);
    }

    #[test]
    fn refraction_bands() {
        assert_eq!(refraction_correction(86.0), 0.0);
        // ~0.0165° near 45°
        let r45 = refraction_correction(45.0);
        assert!((r45 - 0.01613).abs() < 5e-4, "r45={r45}");
        // Horizon band: 1735 arc-seconds at 0°
        assert!((refraction_correction(0.0) - 1735.0 / 3600.0).abs() < 1e-12);
        let below = refraction_correction(-2.0);
        assert!(below > 0.0 && below.is_finite());
    }

    #[test]
    fn invalid_calendar_input_does_not_panic() {
        let sun = sun_position(&params(25.0, 48.0, 2.0, 32, 13), 1.0);
        assert!(sun.elevation.is_finite());
        assert!(sun.azimuth >= 0.0 && sun.azimuth < 360.0);
    }
}
