use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    /// Waiting for the viewer config asset to resolve or fail.
    #[default]
    LoadingConfig,
    Running,
}

#[derive(Component)]
pub struct FpsText;

pub fn log_running(state: Res<State<AppState>>) {
    info!("→ Entered {:?} state", state.get());
}
