use glam::{DMat4, DVec2, DVec3, DVec4};

use crate::math::Ray;

/// Pixel size of the region the pointer moves in. Origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, pixel: DVec2) -> bool {
        pixel.x >= 0.0 && pixel.y >= 0.0 && pixel.x < self.width && pixel.y < self.height
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Perspective viewer in a Z-up world.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    /// Degrees around +Z, 0 looks along +X.
    pub yaw: f64,
    /// Degrees above the horizon.
    pub pitch: f64,
    /// Vertical field of view in degrees.
    pub fov: f64,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: DVec3::new(0.0, -8.0, 3.0),
            yaw: 90.0,
            pitch: -15.0,
            fov: 45.0,
        }
    }

    /// Camera at `position` aimed at `target`.
    pub fn looking_at(position: DVec3, target: DVec3, fov: f64) -> Self {
        let dir = (target - position).try_normalize().unwrap_or(DVec3::Y);
        Self {
            position,
            yaw: dir.y.atan2(dir.x).to_degrees(),
            pitch: dir.z.clamp(-1.0, 1.0).asin().to_degrees().clamp(-89.0, 89.0),
            fov,
            ..Self::new()
        }
    }

    pub fn front(&self) -> DVec3 {
        let yaw_rad = self.yaw.to_radians();
        let pitch_rad = self.pitch.to_radians();
        DVec3::new(
            yaw_rad.cos() * pitch_rad.cos(),
            yaw_rad.sin() * pitch_rad.cos(),
            pitch_rad.sin(),
        )
        .normalize()
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.position + self.front(), DVec3::Z)
    }

    pub fn projection_matrix(&self, aspect: f64) -> DMat4 {
        DMat4::perspective_rh_gl(self.fov.to_radians(), aspect, 0.1, 1000.0)
    }

    /// World-space ray from the eye through a viewport pixel.
    pub fn ray_through(&self, pixel: DVec2, viewport: Viewport) -> Ray {
        let ndc_x = 2.0 * pixel.x / viewport.width - 1.0;
        let ndc_y = 1.0 - 2.0 * pixel.y / viewport.height;

        let inv = (self.projection_matrix(viewport.aspect_ratio()) * self.view_matrix()).inverse();
        let far = inv * DVec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far = far.truncate() / far.w;

        let direction = (far - self.position)
            .try_normalize()
            .unwrap_or_else(|| self.front());
        Ray::new(self.position, direction)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
