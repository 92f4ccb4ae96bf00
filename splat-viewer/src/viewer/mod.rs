//! Viewer implementations and the capability trait the shell drives them through.
//!
//! A viewer owns its scene entities, camera and attached splat asset. The shell
//! holds exactly one boxed [`Viewer`] at a time and never shares resources
//! between two live viewers.

/// Viewer error taxonomy.
pub mod error;
/// Scene, camera and single-asset attachment shared by the viewers.
pub mod scene;
/// Runtime settings new viewers start from.
pub mod settings;
/// Free-flying splat viewer driven by keyboard, mouse and gamepad.
pub mod splat_viewer;
/// Self-orbiting showcase viewer.
pub mod turntable_viewer;

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::camera::input::InputState;

pub use error::ViewerError;
use settings::ViewerSettings;
use splat_viewer::SplatViewer;
use turntable_viewer::TurntableViewer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerKind {
    #[default]
    Splat,
    Turntable,
}

impl ViewerKind {
    pub const ALL: [ViewerKind; 2] = [ViewerKind::Splat, ViewerKind::Turntable];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerKind::Splat => "splat",
            ViewerKind::Turntable => "turntable",
        }
    }

    pub fn from_string(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "splat" => Some(ViewerKind::Splat),
            "turntable" => Some(ViewerKind::Turntable),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewerKind::Splat => "Splat viewer",
            ViewerKind::Turntable => "Turntable",
        }
    }

    /// Construct an uninitialised viewer of this kind under `container`.
    pub fn create(&self, settings: &ViewerSettings, container: Entity) -> Box<dyn Viewer> {
        match self {
            ViewerKind::Splat => Box::new(SplatViewer::new(settings, container)),
            ViewerKind::Turntable => Box::new(TurntableViewer::new(settings, container)),
        }
    }
}

impl fmt::Display for ViewerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File contents handed to [`Viewer::load_from_file`].
#[derive(Debug, Clone, PartialEq)]
pub enum FileContents {
    Bytes(Vec<u8>),
    /// Read from disk in the background.
    #[cfg(not(target_arch = "wasm32"))]
    Path(std::path::PathBuf),
}

/// A local file selected by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatFile {
    pub name: String,
    pub contents: FileContents,
}

impl SplatFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            contents: FileContents::Bytes(bytes),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: std::path::PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            contents: FileContents::Path(path),
        }
    }

    pub(crate) fn into_pending(self) -> crate::engine::loading::pending::PendingLoad {
        use crate::engine::loading::pending::PendingLoad;
        match self.contents {
            FileContents::Bytes(bytes) => PendingLoad::from_bytes(&self.name, bytes),
            #[cfg(not(target_arch = "wasm32"))]
            FileContents::Path(path) => PendingLoad::from_path(path),
        }
    }
}

/// Summary of a successfully attached asset.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSplat {
    pub name: String,
    pub splat_count: usize,
    pub bounds: Option<(Vec3, Vec3)>,
}

/// Capability contract every viewer implements.
///
/// Loads are split in two: `load_from_*` attaches a placeholder and starts the
/// work, `poll_load` completes it once the data is ready. Until then the viewer
/// keeps rendering.
pub trait Viewer: Send + Sync {
    fn kind(&self) -> ViewerKind;

    /// Spawn scene and camera. Idempotent.
    fn init(&mut self, world: &mut World) -> Result<(), ViewerError>;

    /// Replace the attached asset with the contents of `file`.
    fn load_from_file(&mut self, world: &mut World, file: SplatFile) -> Result<(), ViewerError>;

    /// Replace the attached asset with the one at `url`.
    fn load_from_url(&mut self, world: &mut World, url: &str) -> Result<(), ViewerError>;

    /// `None` while nothing is pending or the data is not ready yet.
    fn poll_load(&mut self, world: &mut World) -> Option<Result<LoadedSplat, ViewerError>>;

    /// Apply this frame's input to the camera. Called once per frame while the
    /// viewer's frame loop is scheduled.
    fn update(&mut self, world: &mut World, dt: f32);

    /// Tear everything down. Every step runs; the viewer must not be driven afterwards.
    fn dispose(&mut self, world: &mut World) -> Result<(), ViewerError>;

    /// Return the camera to the baseline captured at the last successful load.
    fn reset_camera(&mut self, world: &mut World);

    fn movement_speed(&self) -> f32;

    fn set_movement_speed(&mut self, world: &mut World, speed: f32);

    /// Whether the shell must call [`Viewer::update`] every frame.
    fn needs_frame_loop(&self) -> bool;

    /// Input sink, for viewers that take direct input.
    fn input_mut(&mut self) -> Option<&mut InputState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_string_round_trip() {
        for kind in ViewerKind::ALL {
            assert_eq!(ViewerKind::from_string(kind.as_str()), Some(kind));
        }
        assert_eq!(ViewerKind::from_string(" Turntable "), Some(ViewerKind::Turntable));
        assert_eq!(ViewerKind::from_string("gltf"), None);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&ViewerKind::Turntable).unwrap();
        assert_eq!(json, "\"turntable\"");
        let kind: ViewerKind = serde_json::from_str("\"splat\"").unwrap();
        assert_eq!(kind, ViewerKind::Splat);
    }

    #[test]
    fn only_the_splat_viewer_needs_the_frame_loop() {
        let settings = ViewerSettings::default();
        let container = Entity::PLACEHOLDER;
        assert!(ViewerKind::Splat.create(&settings, container).needs_frame_loop());
        assert!(!ViewerKind::Turntable.create(&settings, container).needs_frame_loop());
    }
}
