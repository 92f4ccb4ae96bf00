//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration and the config-gated
//! transition into the running state for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with the viewer shell, controls, RPC bridge and
/// platform-specific configuration.
pub mod app_setup;

/// Application state machine: config loading, then running.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
