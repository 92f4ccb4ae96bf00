use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::splat::VIEWER_CONFIG_PATH;
use serde::Deserialize;

use crate::engine::core::app_state::AppState;
use crate::viewer::{ViewerKind, settings::ViewerSettings};

/// Optional overrides read from `assets/viewer_config.json`.
#[derive(Asset, TypePath, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub fov_degrees: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    pub movement_speed: Option<f32>,
    pub orbit_speed: Option<f32>,
    pub damping_factor: Option<f32>,
    pub sample_url: Option<String>,
    pub default_viewer: Option<String>,
}

impl ViewerConfig {
    pub fn apply_to(&self, settings: &mut ViewerSettings) {
        if let Some(fov) = self.fov_degrees {
            settings.fov_degrees = fov;
        }
        if let Some(near) = self.near {
            settings.near = near;
        }
        if let Some(far) = self.far {
            settings.far = far;
        }
        if let Some(speed) = self.movement_speed {
            settings.movement_speed = speed;
        }
        if let Some(speed) = self.orbit_speed {
            settings.orbit_speed = speed;
        }
        if let Some(damping) = self.damping_factor {
            settings.damping_factor = damping.clamp(0.0, 1.0);
        }
        if let Some(url) = &self.sample_url {
            settings.sample_url = url.clone();
        }
        if let Some(name) = &self.default_viewer {
            match ViewerKind::from_string(name) {
                Some(kind) => settings.default_viewer = kind,
                None => warn!("Ignoring unknown default_viewer '{}'", name),
            }
        }
    }
}

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<ViewerConfig>>,
}

pub fn start_loading(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(VIEWER_CONFIG_PATH));
}

/// Apply the config once it resolves; fall back to defaults if it cannot be read.
pub fn load_config_system(
    loader: Res<ConfigLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<ViewerConfig>>,
    mut settings: ResMut<ViewerSettings>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = &loader.handle else {
        return;
    };

    if let Some(config) = configs.get(handle) {
        config.apply_to(&mut settings);
        info!("Viewer config loaded from {}", VIEWER_CONFIG_PATH);
        next_state.set(AppState::Running);
        return;
    }

    if let LoadState::Failed(err) = asset_server.load_state(handle) {
        warn!("Viewer config unavailable ({}), using defaults", err);
        next_state.set(AppState::Running);
    }
}
