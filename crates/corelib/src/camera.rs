use std::f32::consts::FRAC_PI_2;

use crate::{Mat4, Vec3};

/// Smallest allowed orbit radius; zooming never passes through the target.
pub const MIN_RADIUS: f32 = 0.05;

/// Pitch stops just short of the poles so the view basis never degenerates.
const MAX_PITCH: f32 = FRAC_PI_2 - 1e-3;

/// Orbit camera (right-handed, +Y up).
///
/// The eye position is derived from `target` + spherical `yaw`/`pitch`/`radius`,
/// so orbit, pan and zoom are plain field updates and the camera is always in a
/// valid state.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub target: Vec3,
    /// Azimuth around +Y, radians.
    pub yaw: f32,
    /// Elevation above the XZ plane, radians.
    pub pitch: f32,
    /// Distance from eye to target.
    pub radius: f32,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn new(target: Vec3, yaw: f32, pitch: f32, radius: f32, aspect: f32) -> Self {
        Self {
            target,
            yaw,
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            radius: radius.max(MIN_RADIUS),
            fov_y_rad: 60f32.to_radians(),
            z_near: 0.1,
            z_far: 1000.0,
            aspect,
        }
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        let dir = Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        );
        self.target + dir * self.radius
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Rotate the eye around the target. Deltas are radians.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Slide eye and target together in the view plane.
    /// Deltas are fractions of the viewport; scaled by radius so panning feels
    /// the same at any zoom level.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.eye()).normalize_or(Vec3::NEG_Z);
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        self.target += (right * -dx + up * dy) * self.radius;
    }

    /// Move the eye toward (positive delta) or away from the target.
    pub fn zoom(&mut self, delta: f32) {
        let factor = (1.0 - delta).clamp(0.1, 10.0);
        self.radius = (self.radius * factor).max(MIN_RADIUS);
    }

    /// Reposition so a bounding sphere fills the view, keeping orientation.
    pub fn frame(&mut self, center: Vec3, radius: f32) {
        self.target = center;
        let fit = radius.max(1e-3) / (self.fov_y_rad * 0.5).sin();
        self.radius = (fit * 1.2).max(MIN_RADIUS);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, -FRAC_PI_2, 0.5, 4.0, 16.0 / 9.0)
    }
}
