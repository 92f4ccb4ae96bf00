use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::core::app_state::{AppState, log_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::config_loader::{
    ConfigLoader, ViewerConfig, load_config_system, start_loading,
};
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::shell::ShellPlugin;
use crate::ui::ControlsPlugin;
use crate::viewer::settings::ViewerSettings;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::{create_fps_overlay, fps_text_update_system};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers ViewerConfig as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<ViewerConfig>::new(&["json"]))
        .add_plugins(ShellPlugin)
        .add_plugins(ControlsPlugin)
        .add_plugins(WebRpcPlugin);

    app.init_resource::<ViewerSettings>()
        .init_resource::<ConfigLoader>()
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));

    app.add_systems(Startup, start_loading)
        .add_systems(
            Update,
            load_config_system.run_if(in_state(AppState::LoadingConfig)),
        )
        .add_systems(OnEnter(AppState::Running), log_running)
        .add_systems(
            Update,
            fps_notification_system.run_if(in_state(AppState::Running)),
        );

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Startup, create_fps_overlay)
            .add_systems(Update, fps_text_update_system);
    }

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
