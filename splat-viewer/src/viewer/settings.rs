use bevy::prelude::*;
use constants::{
    camera::{DEFAULT_FAR, DEFAULT_FOV_DEGREES, DEFAULT_NEAR},
    controls::{
        DEFAULT_DAMPING_FACTOR, DEFAULT_MOVEMENT_SPEED, DEFAULT_ORBIT_SPEED, MAX_MOVEMENT_SPEED,
        MIN_MOVEMENT_SPEED,
    },
    splat::SAMPLE_SPLAT_URL,
};

use super::ViewerKind;

/// Runtime settings every newly constructed viewer starts from.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub movement_speed: f32,
    pub orbit_speed: f32,
    pub damping_factor: f32,
    pub sample_url: String,
    pub default_viewer: ViewerKind,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            orbit_speed: DEFAULT_ORBIT_SPEED,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            sample_url: SAMPLE_SPLAT_URL.to_string(),
            default_viewer: ViewerKind::Splat,
        }
    }
}

impl ViewerSettings {
    pub fn projection(&self) -> PerspectiveProjection {
        PerspectiveProjection {
            fov: self.fov_degrees.to_radians(),
            near: self.near,
            far: self.far,
            ..default()
        }
    }

    /// Movement speed range offered by the speed controls.
    pub fn speed_range() -> std::ops::RangeInclusive<f32> {
        MIN_MOVEMENT_SPEED..=MAX_MOVEMENT_SPEED
    }
}
