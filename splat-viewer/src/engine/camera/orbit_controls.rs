use bevy::prelude::*;
use constants::controls::{MOUSE_PAN_SPEED, MOUSE_ROTATE_SPEED, MOUSE_ZOOM_STEP};

use super::input::InputState;
use super::rig::CameraRig;

/// Mouse orbit controls with inertia.
///
/// Drags are accumulated as pending motion; each update applies a `damping_factor`
/// share of it and keeps the rest, so the camera eases to a stop after release.
/// A factor of `0.0` or `>= 1.0` disables damping.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    damping_factor: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: Vec2,
}

impl OrbitControls {
    pub fn new(damping_factor: f32) -> Self {
        Self {
            damping_factor,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: Vec2::ZERO,
        }
    }

    fn share(&self) -> f32 {
        if self.damping_factor > 0.0 && self.damping_factor < 1.0 {
            self.damping_factor
        } else {
            1.0
        }
    }

    /// Take this frame's mouse input and move `rig`.
    pub fn update(&mut self, rig: &mut CameraRig, input: &InputState) {
        self.pending_yaw -= input.rotate_drag.x * MOUSE_ROTATE_SPEED;
        self.pending_pitch -= input.rotate_drag.y * MOUSE_ROTATE_SPEED;
        // Pan scales with distance so the grabbed point tracks the cursor.
        let pan_scale = rig.distance() * MOUSE_PAN_SPEED;
        self.pending_pan += Vec2::new(-input.pan_drag.x, input.pan_drag.y) * pan_scale;

        if input.scroll != 0.0 {
            rig.dolly(MOUSE_ZOOM_STEP.powf(input.scroll));
        }

        let share = self.share();
        let yaw = self.pending_yaw * share;
        let pitch = self.pending_pitch * share;
        let pan = self.pending_pan * share;
        if yaw != 0.0 || pitch != 0.0 {
            rig.orbit(yaw, pitch);
        }
        if pan != Vec2::ZERO {
            rig.pan(pan.x, pan.y);
        }

        self.pending_yaw -= yaw;
        self.pending_pitch -= pitch;
        self.pending_pan -= pan;
        if self.pending_yaw.abs() < 1e-6 && self.pending_pitch.abs() < 1e-6 {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
        }
        if self.pending_pan.length_squared() < 1e-12 {
            self.pending_pan = Vec2::ZERO;
        }
    }

    /// Drop any motion still easing out.
    pub fn stop(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_pan = Vec2::ZERO;
    }
}
