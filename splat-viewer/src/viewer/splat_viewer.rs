use bevy::input::gamepad::Gamepad;
use bevy::prelude::*;

use crate::engine::camera::{
    input::{GamepadSnapshot, InputState},
    movement::{apply_gamepad, apply_keyboard},
    orbit_controls::OrbitControls,
    rig::CameraRig,
};
use crate::engine::loading::{fetch::display_name, pending::PendingLoad};

use super::scene::ViewerScene;
use super::settings::ViewerSettings;
use super::{LoadedSplat, SplatFile, Viewer, ViewerError, ViewerKind};

/// Free-flying viewer: keyboard and gamepad translate the camera, the mouse
/// orbits it, and the shell frame loop applies both once per frame.
pub struct SplatViewer {
    scene: ViewerScene,
    projection: PerspectiveProjection,
    rig: CameraRig,
    baseline: CameraRig,
    controls: OrbitControls,
    input: InputState,
    movement_speed: f32,
    orbit_speed: f32,
}

impl SplatViewer {
    pub fn new(settings: &ViewerSettings, container: Entity) -> Self {
        Self {
            scene: ViewerScene::new(container),
            projection: settings.projection(),
            rig: CameraRig::default_framing(),
            baseline: CameraRig::default_framing(),
            controls: OrbitControls::new(settings.damping_factor),
            input: InputState::default(),
            movement_speed: settings.movement_speed,
            orbit_speed: settings.orbit_speed,
        }
    }

    fn sync_camera(&self, world: &mut World) {
        self.scene.set_camera_transform(world, self.rig.transform());
    }

    /// Sample the tracked gamepad, adopting the first connected one if none is tracked.
    fn poll_gamepad(&mut self, world: &mut World) -> Option<GamepadSnapshot> {
        if let Some(entity) = self.input.gamepad {
            if let Some(gamepad) = world.get::<Gamepad>(entity) {
                return Some(GamepadSnapshot::from_gamepad(gamepad));
            }
            info!("Gamepad {} disconnected", entity);
            self.input.gamepad = None;
        }

        let mut gamepads = world.query::<(Entity, &Gamepad)>();
        let (entity, gamepad) = gamepads.iter(world).next()?;
        info!("Using gamepad {}", entity);
        let snapshot = GamepadSnapshot::from_gamepad(gamepad);
        self.input.gamepad = Some(entity);
        Some(snapshot)
    }
}

impl Viewer for SplatViewer {
    fn kind(&self) -> ViewerKind {
        ViewerKind::Splat
    }

    fn init(&mut self, world: &mut World) -> Result<(), ViewerError> {
        if self
            .scene
            .init(world, "splat", self.projection.clone(), self.rig.transform())?
        {
            debug!("Splat viewer initialised");
        }
        Ok(())
    }

    fn load_from_file(&mut self, world: &mut World, file: SplatFile) -> Result<(), ViewerError> {
        self.scene.ensure_ready()?;
        let name = file.name.clone();
        self.scene.begin_load(world, name, file.into_pending())
    }

    fn load_from_url(&mut self, world: &mut World, url: &str) -> Result<(), ViewerError> {
        self.scene.ensure_ready()?;
        self.scene
            .begin_load(world, display_name(url), PendingLoad::from_url(url))
    }

    fn poll_load(&mut self, world: &mut World) -> Option<Result<LoadedSplat, ViewerError>> {
        let result = self.scene.poll_load(world)?;
        if result.is_ok() {
            self.rig = CameraRig::default_framing();
            self.baseline = self.rig;
            self.controls.stop();
            self.sync_camera(world);
        }
        Some(result)
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        if !self.scene.is_ready() {
            return;
        }

        if self.input.reset_requested() {
            self.reset_camera(world);
        }
        apply_keyboard(
            &mut self.rig,
            self.input.keyboard_axes(),
            self.movement_speed,
            dt,
        );

        if let Some(pad) = self.poll_gamepad(world).filter(|pad| !pad.is_idle()) {
            if pad.reset {
                self.reset_camera(world);
            }
            apply_gamepad(
                &mut self.rig,
                &pad,
                self.movement_speed,
                self.orbit_speed,
                dt,
            );
        }

        self.controls.update(&mut self.rig, &self.input);
        self.sync_camera(world);
        self.input.end_frame();
    }

    fn dispose(&mut self, world: &mut World) -> Result<(), ViewerError> {
        self.input.clear();
        self.controls.stop();
        self.scene.dispose(world)
    }

    fn reset_camera(&mut self, world: &mut World) {
        self.rig = self.baseline;
        self.controls.stop();
        self.sync_camera(world);
    }

    fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    fn set_movement_speed(&mut self, _world: &mut World, speed: f32) {
        self.movement_speed = speed;
    }

    fn needs_frame_loop(&self) -> bool {
        true
    }

    fn input_mut(&mut self) -> Option<&mut InputState> {
        Some(&mut self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::scene::{
        ViewerSurface,
        tests::{cloud, container_children, test_world},
    };
    use bevy::input::gamepad::{GamepadAxis, GamepadButton};
    use constants::controls::{GAMEPAD_DEADZONE, MIN_DOLLY_DISTANCE};

    fn loaded_viewer(world: &mut World, container: Entity) -> SplatViewer {
        let mut viewer = SplatViewer::new(&ViewerSettings::default(), container);
        viewer.init(world).unwrap();
        viewer
            .scene
            .begin_load(world, "sample.splat", PendingLoad::resolved(Ok(cloud(4))))
            .unwrap();
        viewer.poll_load(world).unwrap().unwrap();
        viewer
    }

    fn camera_transform(world: &mut World) -> Transform {
        *world
            .query_filtered::<&Transform, With<ViewerSurface>>()
            .single(world)
            .unwrap()
    }

    #[test]
    fn load_frames_the_default_view() {
        let (mut world, container) = test_world();
        let viewer = loaded_viewer(&mut world, container);

        assert_eq!(viewer.rig, CameraRig::default_framing());
        assert_eq!(viewer.baseline, CameraRig::default_framing());
        let transform = camera_transform(&mut world);
        assert!(
            transform
                .translation
                .abs_diff_eq(CameraRig::default_framing().position, 1e-5)
        );
    }

    #[test]
    fn reset_restores_baseline_after_navigation() {
        let (mut world, container) = test_world();
        let mut viewer = loaded_viewer(&mut world, container);

        viewer.rig.translate(Vec3::new(4.0, 1.0, -2.0));
        viewer.rig.orbit(0.7, -0.3);
        viewer.rig.dolly(0.2);
        viewer.input_mut().unwrap().key_down(KeyCode::KeyW);
        viewer.update(&mut world, 0.5);
        assert!(!viewer.rig.approx_eq(&viewer.baseline, 1e-3));

        viewer.reset_camera(&mut world);
        assert!(viewer.rig.approx_eq(&viewer.baseline, 1e-5));
        let transform = camera_transform(&mut world);
        assert!(transform.translation.abs_diff_eq(viewer.baseline.position, 1e-5));
    }

    #[test]
    fn reset_key_is_applied_during_update() {
        let (mut world, container) = test_world();
        let mut viewer = loaded_viewer(&mut world, container);
        viewer.rig.translate(Vec3::X * 10.0);

        viewer.input_mut().unwrap().key_down(KeyCode::KeyR);
        viewer.update(&mut world, 0.016);
        assert!(viewer.rig.approx_eq(&viewer.baseline, 1e-5));
    }

    #[test]
    fn held_key_translates_by_speed_and_time() {
        let (mut world, container) = test_world();
        let mut viewer = loaded_viewer(&mut world, container);
        viewer.set_movement_speed(&mut world, 4.0);

        viewer.input_mut().unwrap().key_down(KeyCode::KeyE);
        viewer.update(&mut world, 0.25);

        let moved = viewer.rig.target - viewer.baseline.target;
        assert!(moved.abs_diff_eq(Vec3::Y, 1e-5));
        assert_eq!(viewer.movement_speed(), 4.0);
    }

    #[test]
    fn gamepad_deadzone_suppresses_drift() {
        let (mut world, container) = test_world();
        let mut viewer = loaded_viewer(&mut world, container);

        let mut gamepad = Gamepad::default();
        gamepad
            .analog_mut()
            .set(GamepadAxis::LeftStickX, GAMEPAD_DEADZONE * 0.5);
        let pad = world.spawn(gamepad).id();

        viewer.update(&mut world, 1.0);
        assert_eq!(viewer.input_mut().unwrap().gamepad, Some(pad));
        assert!(viewer.rig.approx_eq(&viewer.baseline, 1e-6));

        world
            .get_mut::<Gamepad>(pad)
            .unwrap()
            .analog_mut()
            .set(GamepadAxis::LeftStickX, 0.5);
        viewer.update(&mut world, 1.0);
        assert!(!viewer.rig.approx_eq(&viewer.baseline, 1e-3));
    }

    #[test]
    fn gamepad_trigger_respects_minimum_distance() {
        let (mut world, container) = test_world();
        let mut viewer = loaded_viewer(&mut world, container);

        let mut gamepad = Gamepad::default();
        gamepad
            .analog_mut()
            .set(GamepadButton::RightTrigger2, 1.0);
        world.spawn(gamepad);

        for _ in 0..200 {
            viewer.update(&mut world, 0.1);
        }
        assert!(viewer.rig.distance() >= MIN_DOLLY_DISTANCE - 1e-4);
    }

    #[test]
    fn dispose_leaves_no_surface_and_stops_updates() {
        let (mut world, container) = test_world();
        let mut viewer = loaded_viewer(&mut world, container);
        viewer.input_mut().unwrap().key_down(KeyCode::KeyW);

        viewer.dispose(&mut world).unwrap();
        assert_eq!(container_children(&world, container), 0);
        assert!(!viewer.input_mut().unwrap().is_held(KeyCode::KeyW));

        let rig = viewer.rig;
        viewer.update(&mut world, 1.0);
        assert_eq!(viewer.rig, rig);
        viewer.dispose(&mut world).unwrap();
    }

    #[test]
    fn load_after_dispose_fails() {
        let (mut world, container) = test_world();
        let mut viewer = SplatViewer::new(&ViewerSettings::default(), container);
        viewer.init(&mut world).unwrap();
        viewer.dispose(&mut world).unwrap();

        let file = SplatFile::from_bytes("a.splat", vec![0; 32]);
        assert_eq!(
            viewer.load_from_file(&mut world, file).unwrap_err(),
            ViewerError::Disposed
        );
    }
}
