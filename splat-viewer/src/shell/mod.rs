//! Application shell: owns the single active viewer and drives its lifecycle.
//!
//! Viewer switches always run in the order cancel frame loop, dispose, clear
//! container, construct, init, and only then start a new frame loop, so no two
//! viewers are ever alive at once and no callback outlives its viewer.

/// Shell commands, user-facing notices and the systems that apply them.
pub mod commands;
/// Cancelable per-frame callback registry.
pub mod frame_loop;
/// Forwarding of window input to the active viewer.
pub mod input_routing;

use bevy::prelude::*;

use crate::engine::camera::input::InputState;
use crate::engine::core::app_state::AppState;
use crate::viewer::{
    LoadedSplat, SplatFile, Viewer, ViewerError, ViewerKind, scene::ViewerContainer,
    settings::ViewerSettings, turntable_viewer::spin_turntables,
};

use commands::{
    ShellCommand, ShellNotice, SplatLoaded, apply_shell_commands, poll_shell_load, shutdown_on_exit,
    start_shell,
};
use frame_loop::{FrameCallbackId, FrameScheduler, run_frame_loop};
use input_routing::route_viewer_input;

/// Where a load request gets its bytes from.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    File(SplatFile),
    Url(String),
}

impl LoadRequest {
    pub fn name(&self) -> &str {
        match self {
            LoadRequest::File(file) => &file.name,
            LoadRequest::Url(url) => url,
        }
    }
}

#[derive(Resource)]
pub struct ViewerShell {
    container: Entity,
    viewer: Option<Box<dyn Viewer>>,
    frame_loop: Option<FrameCallbackId>,
    load_in_flight: bool,
    speed: f32,
}

impl FromWorld for ViewerShell {
    fn from_world(world: &mut World) -> Self {
        let speed = world
            .get_resource::<ViewerSettings>()
            .map_or_else(|| ViewerSettings::default().movement_speed, |s| s.movement_speed);
        let container = world
            .spawn((
                ViewerContainer,
                Name::new("viewer_container"),
                Transform::default(),
                Visibility::default(),
            ))
            .id();
        Self {
            container,
            viewer: None,
            frame_loop: None,
            load_in_flight: false,
            speed,
        }
    }
}

impl ViewerShell {
    pub fn container(&self) -> Entity {
        self.container
    }

    pub fn active_kind(&self) -> Option<ViewerKind> {
        self.viewer.as_ref().map(|viewer| viewer.kind())
    }

    pub fn viewer(&self) -> Option<&dyn Viewer> {
        self.viewer.as_deref()
    }

    pub fn frame_loop(&self) -> Option<FrameCallbackId> {
        self.frame_loop
    }

    pub fn is_loading(&self) -> bool {
        self.load_in_flight
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Input sink of the active viewer, if it takes direct input.
    pub fn input_mut(&mut self) -> Option<&mut InputState> {
        self.viewer.as_mut()?.input_mut()
    }

    /// Create the configured default viewer.
    pub fn start(&mut self, world: &mut World) -> Result<(), ViewerError> {
        let kind = settings(world).default_viewer;
        self.switch_viewer(world, kind).map(|_| ())
    }

    /// Replace the active viewer with a fresh one of `kind`. Returns `Ok(false)`
    /// when `kind` is already active.
    pub fn switch_viewer(&mut self, world: &mut World, kind: ViewerKind) -> Result<bool, ViewerError> {
        if self.active_kind() == Some(kind) {
            return Ok(false);
        }

        self.teardown(world);

        let mut viewer = kind.create(&settings(world), self.container);
        if let Err(err) = viewer.init(world) {
            error!("Failed to initialise {} viewer: {}", kind, err);
            if let Err(dispose_err) = viewer.dispose(world) {
                warn!("Cleanup after failed init: {}", dispose_err);
            }
            self.clear_container(world);
            return Err(err);
        }
        viewer.set_movement_speed(world, self.speed);

        if viewer.needs_frame_loop() {
            self.frame_loop = Some(world.get_resource_or_init::<FrameScheduler>().request());
        }
        info!("Active viewer: {}", kind);
        self.viewer = Some(viewer);
        Ok(true)
    }

    /// Forward a load to the active viewer, creating the default viewer first if
    /// none exists. Only one load may be in flight.
    pub fn load(&mut self, world: &mut World, request: LoadRequest) -> Result<(), ViewerError> {
        if self.load_in_flight {
            return Err(ViewerError::LoadInProgress);
        }
        if self.viewer.is_none() {
            self.start(world)?;
        }
        let viewer = self.viewer.as_mut().ok_or(ViewerError::NotInitialized)?;
        match request {
            LoadRequest::File(file) => viewer.load_from_file(world, file)?,
            LoadRequest::Url(url) => viewer.load_from_url(world, &url)?,
        }
        self.load_in_flight = true;
        Ok(())
    }

    /// Complete the in-flight load once the viewer reports it finished.
    pub fn poll_load(&mut self, world: &mut World) -> Option<Result<LoadedSplat, ViewerError>> {
        if !self.load_in_flight {
            return None;
        }
        let result = self.viewer.as_mut()?.poll_load(world)?;
        self.load_in_flight = false;
        Some(result)
    }

    /// Call the active viewer's `update` if its frame loop is still scheduled.
    pub fn run_frame(&mut self, world: &mut World, dt: f32) {
        let Some(id) = self.frame_loop else {
            return;
        };
        let scheduled = world
            .get_resource::<FrameScheduler>()
            .is_some_and(|scheduler| scheduler.is_scheduled(id));
        if !scheduled {
            return;
        }
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.update(world, dt);
        }
    }

    /// Set the movement speed of the active viewer and of every viewer created later.
    pub fn set_speed(&mut self, world: &mut World, speed: f32) {
        self.speed = speed;
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.set_movement_speed(world, speed);
        }
    }

    pub fn reset_camera(&mut self, world: &mut World) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.reset_camera(world);
        }
    }

    /// Tear down the active viewer and leave the container empty.
    pub fn shutdown(&mut self, world: &mut World) {
        self.teardown(world);
    }

    fn teardown(&mut self, world: &mut World) {
        if let Some(id) = self.frame_loop.take() {
            if let Some(mut scheduler) = world.get_resource_mut::<FrameScheduler>() {
                scheduler.cancel(id);
            }
        }
        if let Some(mut viewer) = self.viewer.take() {
            if let Err(err) = viewer.dispose(world) {
                warn!("Disposing {} viewer: {}", viewer.kind(), err);
            }
        }
        self.load_in_flight = false;
        self.clear_container(world);
    }

    fn clear_container(&self, world: &mut World) {
        let children = world
            .get::<Children>(self.container)
            .map(|children| children.to_vec())
            .unwrap_or_default();
        for child in children {
            world.despawn(child);
        }
    }
}

fn settings(world: &World) -> ViewerSettings {
    world
        .get_resource::<ViewerSettings>()
        .cloned()
        .unwrap_or_default()
}

/// Registers the shell resources, events and per-frame systems.
pub struct ShellPlugin;

impl Plugin for ShellPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameScheduler>()
            .add_event::<ShellCommand>()
            .add_event::<ShellNotice>()
            .add_event::<SplatLoaded>()
            .add_systems(OnEnter(AppState::Running), start_shell)
            .add_systems(
                Update,
                (
                    route_viewer_input,
                    apply_shell_commands,
                    poll_shell_load,
                    run_frame_loop,
                    spin_turntables,
                )
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(Last, shutdown_on_exit);
    }
}
