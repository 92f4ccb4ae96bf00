use bevy::app::AppExit;
use bevy::prelude::*;
use serde::Serialize;

use crate::viewer::{SplatFile, ViewerKind, settings::ViewerSettings};

use super::{LoadRequest, ViewerShell};

/// Requests from controls, shortcuts and the RPC bridge.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum ShellCommand {
    SwitchViewer(ViewerKind),
    LoadFile(SplatFile),
    LoadUrl(String),
    LoadSample,
    SetSpeed(f32),
    ResetCamera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Message meant for the user.
#[derive(Event, Debug, Clone, PartialEq, Serialize)]
pub struct ShellNotice {
    pub level: NoticeLevel,
    pub message: String,
}

impl ShellNotice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Sent once an asset is attached and the camera framed.
#[derive(Event, Debug, Clone, PartialEq, Serialize)]
pub struct SplatLoaded {
    pub name: String,
    pub splat_count: usize,
}

/// Create the shell and its default viewer once configuration is in.
pub fn start_shell(world: &mut World) {
    world.init_resource::<ViewerShell>();
    let result = world.resource_scope(|world, mut shell: Mut<ViewerShell>| shell.start(world));
    if let Err(err) = result {
        error!("Failed to start viewer: {}", err);
        world.send_event(ShellNotice::error(format!("Failed to start viewer: {err}")));
    }
}

/// Apply every queued [`ShellCommand`] in order.
pub fn apply_shell_commands(world: &mut World) {
    let commands: Vec<ShellCommand> = world
        .resource_mut::<Events<ShellCommand>>()
        .drain()
        .collect();
    if commands.is_empty() || !world.contains_resource::<ViewerShell>() {
        return;
    }

    let sample_url = world
        .get_resource::<ViewerSettings>()
        .map(|settings| settings.sample_url.clone())
        .unwrap_or_else(|| ViewerSettings::default().sample_url);

    let notices = world.resource_scope(|world, mut shell: Mut<ViewerShell>| {
        let mut notices = Vec::new();
        for command in commands {
            match command {
                ShellCommand::SwitchViewer(kind) => {
                    if let Err(err) = shell.switch_viewer(world, kind) {
                        notices.push(ShellNotice::error(format!(
                            "Failed to switch to {}: {err}",
                            kind.label()
                        )));
                    }
                }
                ShellCommand::LoadFile(file) => {
                    notices.push(start_load(world, &mut shell, LoadRequest::File(file)));
                }
                ShellCommand::LoadUrl(url) => {
                    notices.push(start_load(world, &mut shell, LoadRequest::Url(url)));
                }
                ShellCommand::LoadSample => {
                    let request = LoadRequest::Url(sample_url.clone());
                    notices.push(start_load(world, &mut shell, request));
                }
                ShellCommand::SetSpeed(speed) => shell.set_speed(world, speed),
                ShellCommand::ResetCamera => shell.reset_camera(world),
            }
        }
        notices
    });

    for notice in notices {
        world.send_event(notice);
    }
}

fn start_load(
    world: &mut World,
    shell: &mut ViewerShell,
    request: LoadRequest,
) -> ShellNotice {
    let name = request.name().to_string();
    match shell.load(world, request) {
        Ok(()) => ShellNotice::info(format!("Loading {name}...")),
        Err(err) => {
            error!("Failed to load splat '{}': {}", name, err);
            ShellNotice::error(format!("Failed to load splat: {err}"))
        }
    }
}

/// Report the outcome of the in-flight load, if it finished this frame.
pub fn poll_shell_load(world: &mut World) {
    if !world.contains_resource::<ViewerShell>() {
        return;
    }
    let Some(result) = world.resource_scope(|world, mut shell: Mut<ViewerShell>| shell.poll_load(world))
    else {
        return;
    };

    match result {
        Ok(loaded) => {
            info!("Loaded '{}' with {} splats", loaded.name, loaded.splat_count);
            if let Some((min, max)) = loaded.bounds {
                debug!("Splat bounds: {} .. {}", min, max);
            }
            world.send_event(ShellNotice::info(format!(
                "Loaded {} ({} splats)",
                loaded.name, loaded.splat_count
            )));
            world.send_event(SplatLoaded {
                name: loaded.name,
                splat_count: loaded.splat_count,
            });
        }
        Err(err) => {
            error!("Failed to load splat: {}", err);
            world.send_event(ShellNotice::error(format!("Failed to load splat: {err}")));
        }
    }
}

/// Dispose the active viewer when the app is closing.
pub fn shutdown_on_exit(world: &mut World) {
    let exiting = world
        .get_resource::<Events<AppExit>>()
        .is_some_and(|events| !events.is_empty());
    if !exiting || !world.contains_resource::<ViewerShell>() {
        return;
    }
    world.resource_scope(|world, mut shell: Mut<ViewerShell>| shell.shutdown(world));
    debug!("Viewer shell shut down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::frame_loop::FrameScheduler;

    fn shell_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<ViewerSettings>()
            .init_resource::<FrameScheduler>()
            .add_event::<ShellCommand>()
            .add_event::<ShellNotice>()
            .add_event::<SplatLoaded>()
            .add_systems(Startup, start_shell)
            .add_systems(Update, (apply_shell_commands, poll_shell_load).chain());
        app.update();
        app
    }

    fn notices(app: &mut App) -> Vec<ShellNotice> {
        app.world_mut()
            .resource_mut::<Events<ShellNotice>>()
            .drain()
            .collect()
    }

    #[test]
    fn startup_creates_the_default_viewer() {
        let app = shell_app();
        let shell = app.world().resource::<ViewerShell>();
        assert_eq!(shell.active_kind(), Some(ViewerKind::Splat));
    }

    #[test]
    fn commands_are_applied_in_order() {
        let mut app = shell_app();
        app.world_mut().send_event(ShellCommand::SwitchViewer(ViewerKind::Turntable));
        app.world_mut().send_event(ShellCommand::SetSpeed(4.0));
        app.update();

        let shell = app.world().resource::<ViewerShell>();
        assert_eq!(shell.active_kind(), Some(ViewerKind::Turntable));
        assert_eq!(shell.speed(), 4.0);
        assert_eq!(shell.viewer().unwrap().movement_speed(), 4.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn failed_load_is_reported_to_the_user() {
        let mut app = shell_app();
        let missing = std::env::temp_dir().join("splat-viewer-missing-file.ply");
        app.world_mut()
            .send_event(ShellCommand::LoadFile(SplatFile::from_path(missing)));

        let mut reported = None;
        for _ in 0..500 {
            app.update();
            reported = notices(&mut app)
                .into_iter()
                .find(|notice| notice.level == NoticeLevel::Error);
            if reported.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let notice = reported.expect("error notice");
        assert!(notice.message.starts_with("Failed to load splat"));
        assert!(notice.message.contains("splat-viewer-missing-file.ply"));
        assert!(!app.world().resource::<ViewerShell>().is_loading());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn sample_loads_from_the_configured_url() {
        let mut app = shell_app();
        let path = std::env::temp_dir().join("splat-viewer-configured-sample.splat");
        let mut record = Vec::new();
        for value in [0.0f32, 1.0, 2.0, 0.1, 0.1, 0.1] {
            record.extend_from_slice(&value.to_le_bytes());
        }
        record.extend_from_slice(&[255, 255, 255, 255, 128, 128, 128, 255]);
        std::fs::write(&path, record).unwrap();
        app.world_mut().resource_mut::<ViewerSettings>().sample_url =
            format!("file://{}", path.display());

        app.world_mut().send_event(ShellCommand::LoadSample);
        let mut loaded = None;
        for _ in 0..500 {
            app.update();
            loaded = app
                .world_mut()
                .resource_mut::<Events<SplatLoaded>>()
                .drain()
                .next();
            if loaded.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let loaded = loaded.expect("sample loaded");
        assert_eq!(loaded.name, "splat-viewer-configured-sample.splat");
        assert_eq!(loaded.splat_count, 1);
        assert!(
            notices(&mut app)
                .iter()
                .all(|notice| notice.level != NoticeLevel::Error)
        );
    }

    #[test]
    fn exit_disposes_the_viewer() {
        let mut app = shell_app();
        app.add_systems(Last, shutdown_on_exit);
        app.world_mut().send_event(AppExit::Success);
        app.update();
        assert!(app.world().resource::<ViewerShell>().active_kind().is_none());
    }
}
