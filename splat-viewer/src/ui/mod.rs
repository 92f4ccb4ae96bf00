//! User-facing controls.
//!
//! Both builds turn user actions into [`ShellCommand`]s and show
//! [`ShellNotice`]s back to the user:
//!
//! - **Web**: listeners on the host page's static controls (`#viewer-type`,
//!   `#load-button` with `#file-input`, `#load-sample`, `#speed-slider` with
//!   `#speed-value`); errors are raised with `window.alert`.
//! - **Native**: a `bevy_ui` panel, keyboard shortcuts and file drag-and-drop.
//!
//! [`ShellCommand`]: crate::shell::commands::ShellCommand
//! [`ShellNotice`]: crate::shell::commands::ShellNotice

/// DOM control wiring for the browser build.
#[cfg(target_arch = "wasm32")]
pub mod dom;

/// Control panel, shortcuts and drag-and-drop for the desktop build.
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

use bevy::prelude::*;
use constants::controls::MOVEMENT_SPEED_STEP;

use crate::engine::core::app_state::AppState;
use crate::viewer::settings::ViewerSettings;

/// Speed label text, e.g. `2.0`.
pub fn format_speed(speed: f32) -> String {
    format!("{speed:.1}")
}

/// Parse a slider value. Out-of-range values are passed through unchanged.
pub fn parse_speed(value: &str) -> Option<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|speed| speed.is_finite())
}

/// Move `speed` by `steps` slider steps, staying inside the slider range.
pub fn step_speed(speed: f32, steps: i32) -> f32 {
    let range = ViewerSettings::speed_range();
    let stepped = speed + steps as f32 * MOVEMENT_SPEED_STEP;
    // Snap to the step grid so repeated presses do not accumulate float error.
    let snapped = (stepped / MOVEMENT_SPEED_STEP).round() * MOVEMENT_SPEED_STEP;
    snapped.clamp(*range.start(), *range.end())
}

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(target_arch = "wasm32")]
        {
            app.add_systems(OnEnter(AppState::Running), dom::setup_dom_controls)
                .add_systems(
                    Update,
                    (
                        dom::drain_dom_commands,
                        dom::show_dom_notices,
                        dom::sync_speed_controls,
                    )
                        .run_if(in_state(AppState::Running)),
                );
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            app.add_systems(Startup, native::spawn_control_panel)
                .add_systems(
                    Update,
                    (
                        native::panel_button_interaction,
                        native::handle_control_shortcuts,
                        native::handle_dropped_files,
                        native::update_status_text,
                        native::update_panel_labels,
                    )
                        .run_if(in_state(AppState::Running)),
                );
        }
    }
}
