use bevy::prelude::*;
use constants::{
    camera::{DEFAULT_FRAMING_OFFSET, DEFAULT_FRAMING_TARGET},
    controls::{MIN_DOLLY_DISTANCE, POLAR_MARGIN},
};
use std::f32::consts::PI;

const DOLLY_EPSILON: f32 = 1e-5;

/// Camera position plus the look-at target it orbits, translated and dollied as a pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::default_framing()
    }
}

impl CameraRig {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Framing applied once a freshly loaded asset is ready.
    pub fn default_framing() -> Self {
        Self {
            position: DEFAULT_FRAMING_TARGET + DEFAULT_FRAMING_OFFSET,
            target: DEFAULT_FRAMING_TARGET,
        }
    }

    pub fn offset(&self) -> Vec3 {
        self.position - self.target
    }

    pub fn distance(&self) -> f32 {
        self.offset().length()
    }

    /// Move camera and target together, preserving orientation.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.target += delta;
    }

    /// View direction flattened onto the ground plane, and the matching right vector.
    pub fn planar_basis(&self) -> (Vec3, Vec3) {
        let mut forward = self.target - self.position;
        forward.y = 0.0;
        let forward = forward.try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = forward.cross(Vec3::Y).normalize();
        (forward, right)
    }

    /// Scale the camera-to-target offset. Shrinking stops at [`MIN_DOLLY_DISTANCE`];
    /// growing is unbounded. Returns whether the camera moved.
    pub fn dolly(&mut self, scale: f32) -> bool {
        if !scale.is_finite() || scale <= 0.0 || scale == 1.0 {
            return false;
        }
        let offset = self.offset();
        let length = offset.length();
        if length <= f32::EPSILON {
            return false;
        }

        let mut new_length = length * scale;
        if scale < 1.0 {
            new_length = new_length.max(MIN_DOLLY_DISTANCE);
            if length - new_length <= DOLLY_EPSILON {
                return false;
            }
        }
        self.position = self.target + offset * (new_length / length);
        true
    }

    /// Orbit the camera around the target: `yaw` about world up, `pitch` about the
    /// camera's right vector. Pitch that would carry the view over a pole is dropped.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let mut offset = Quat::from_axis_angle(Vec3::Y, yaw) * self.offset();

        if pitch != 0.0 {
            let right = (-offset).cross(Vec3::Y).normalize_or_zero();
            // Positive pitch about `right` moves the camera away from world up.
            let polar = offset.angle_between(Vec3::Y) + pitch;
            if right != Vec3::ZERO && polar > POLAR_MARGIN && polar < PI - POLAR_MARGIN {
                offset = Quat::from_axis_angle(right, pitch) * offset;
            }
        }

        self.position = self.target + offset;
    }

    /// Shift camera and target across the view plane by `right` and `up` world units.
    pub fn pan(&mut self, right: f32, up: f32) {
        let forward = (-self.offset()).normalize_or_zero();
        let right_axis = forward.cross(Vec3::Y).normalize_or_zero();
        let up_axis = right_axis.cross(forward);
        self.translate(right_axis * right + up_axis * up);
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).looking_at(self.target, Vec3::Y)
    }

    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        self.position.abs_diff_eq(other.position, tolerance)
            && self.target.abs_diff_eq(other.target, tolerance)
    }
}
