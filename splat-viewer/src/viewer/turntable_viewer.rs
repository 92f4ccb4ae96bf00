use bevy::prelude::*;
use constants::camera::{
    DEFAULT_FRAMING_OFFSET, DEFAULT_FRAMING_TARGET, TURNTABLE_HEIGHT_RATIO, TURNTABLE_RATE,
};

use crate::engine::camera::input::InputState;
use crate::engine::loading::{fetch::display_name, pending::PendingLoad};

use super::scene::{ViewerScene, ViewerSurface};
use super::settings::ViewerSettings;
use super::{LoadedSplat, SplatFile, Viewer, ViewerError, ViewerKind};

/// Camera that circles a target at a fixed radius and height.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Turntable {
    pub target: Vec3,
    pub radius: f32,
    pub height: f32,
    pub angle: f32,
    pub start_angle: f32,
    /// Multiplier on [`TURNTABLE_RATE`].
    pub speed: f32,
}

impl Turntable {
    /// Circle through the default framing position.
    pub fn framing(speed: f32) -> Self {
        let offset = DEFAULT_FRAMING_OFFSET;
        let radius = Vec2::new(offset.x, offset.z).length();
        let angle = offset.x.atan2(offset.z);
        Self {
            target: DEFAULT_FRAMING_TARGET,
            radius,
            height: radius * TURNTABLE_HEIGHT_RATIO,
            angle,
            start_angle: angle,
            speed,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + TURNTABLE_RATE * self.speed * dt) % std::f32::consts::TAU;
    }

    pub fn rewind(&mut self) {
        self.angle = self.start_angle;
    }

    pub fn position(&self) -> Vec3 {
        self.target
            + Vec3::new(
                self.radius * self.angle.sin(),
                self.height,
                self.radius * self.angle.cos(),
            )
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.target, Vec3::Y)
    }
}

/// Rotate every turntable camera. Runs every frame on its own, outside the shell loop.
pub fn spin_turntables(
    time: Res<Time>,
    mut turntables: Query<(&mut Turntable, &mut Transform), With<ViewerSurface>>,
) {
    let dt = time.delta_secs();
    for (mut turntable, mut transform) in &mut turntables {
        turntable.advance(dt);
        *transform = turntable.transform();
    }
}

/// Showcase viewer whose camera orbits the asset by itself. It takes no direct
/// input and does not need the shell frame loop.
pub struct TurntableViewer {
    scene: ViewerScene,
    projection: PerspectiveProjection,
    movement_speed: f32,
}

impl TurntableViewer {
    pub fn new(settings: &ViewerSettings, container: Entity) -> Self {
        Self {
            scene: ViewerScene::new(container),
            projection: settings.projection(),
            movement_speed: settings.movement_speed,
        }
    }

    fn with_turntable(&self, world: &mut World, f: impl FnOnce(&mut Turntable)) {
        let Some(camera) = self.scene.camera() else {
            return;
        };
        let Some(mut turntable) = world.get_mut::<Turntable>(camera) else {
            return;
        };
        f(&mut turntable);
        let transform = turntable.transform();
        self.scene.set_camera_transform(world, transform);
    }

    pub fn turntable<'w>(&self, world: &'w World) -> Option<&'w Turntable> {
        world.get::<Turntable>(self.scene.camera()?)
    }
}

impl Viewer for TurntableViewer {
    fn kind(&self) -> ViewerKind {
        ViewerKind::Turntable
    }

    fn init(&mut self, world: &mut World) -> Result<(), ViewerError> {
        let turntable = Turntable::framing(self.movement_speed);
        let created =
            self.scene
                .init(world, "turntable", self.projection.clone(), turntable.transform())?;
        if created {
            if let Some(camera) = self.scene.camera() {
                world.entity_mut(camera).insert(turntable);
            }
            debug!("Turntable viewer initialised");
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
            self.with_turntable(world, Turntable::rewind);
        }
        Some(result)
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        if self.scene.is_ready() {
            self.with_turntable(world, |turntable| turntable.advance(dt));
        }
    }

    fn dispose(&mut self, world: &mut World) -> Result<(), ViewerError> {
        self.scene.dispose(world)
    }

    fn reset_camera(&mut self, world: &mut World) {
        self.with_turntable(world, Turntable::rewind);
    }

    fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    fn set_movement_speed(&mut self, world: &mut World, speed: f32) {
        self.movement_speed = speed;
        self.with_turntable(world, |turntable| turntable.speed = speed);
    }

    fn needs_frame_loop(&self) -> bool {
        false
    }

    fn input_mut(&mut self) -> Option<&mut InputState> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::scene::tests::{cloud, container_children, test_world};

    fn ready_viewer(world: &mut World, container: Entity) -> TurntableViewer {
        let mut viewer = TurntableViewer::new(&ViewerSettings::default(), container);
        viewer.init(world).unwrap();
        viewer
    }

    #[test]
    fn framing_passes_through_default_offset_direction() {
        let turntable = Turntable::framing(1.0);
        let offset = turntable.position() - turntable.target;
        let expected = DEFAULT_FRAMING_OFFSET;
        assert!(
            Vec2::new(offset.x, offset.z)
                .normalize()
                .abs_diff_eq(Vec2::new(expected.x, expected.z).normalize(), 1e-5)
        );
        assert!((offset.y - turntable.radius * TURNTABLE_HEIGHT_RATIO).abs() < 1e-6);
    }

    #[test]
    fn advance_keeps_radius_and_scales_with_speed() {
        let mut slow = Turntable::framing(1.0);
        let mut fast = Turntable::framing(2.0);
        slow.advance(0.5);
        fast.advance(0.5);

        let start = Turntable::framing(1.0).start_angle;
        assert!(((fast.angle - start) - 2.0 * (slow.angle - start)).abs() < 1e-5);
        let horizontal = fast.position() - fast.target;
        assert!((Vec2::new(horizontal.x, horizontal.z).length() - fast.radius).abs() < 1e-4);
    }

    #[test]
    fn speed_reaches_the_camera_component() {
        let (mut world, container) = test_world();
        let mut viewer = ready_viewer(&mut world, container);
        viewer.set_movement_speed(&mut world, 3.5);
        assert_eq!(viewer.turntable(&world).unwrap().speed, 3.5);
        assert_eq!(viewer.movement_speed(), 3.5);
    }

    #[test]
    fn spin_system_moves_the_camera() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .add_systems(Update, spin_turntables);
        let container = app
            .world_mut()
            .spawn((
                crate::viewer::scene::ViewerContainer,
                Transform::default(),
                Visibility::default(),
            ))
            .id();
        let viewer = ready_viewer(app.world_mut(), container);

        let start = viewer.turntable(app.world()).unwrap().angle;
        for _ in 0..3 {
            std::thread::sleep(std::time::Duration::from_millis(5));
            app.update();
        }
        assert_ne!(viewer.turntable(app.world()).unwrap().angle, start);
    }

    #[test]
    fn load_and_reset_rewind_the_turntable() {
        let (mut world, container) = test_world();
        let mut viewer = ready_viewer(&mut world, container);
        viewer.update(&mut world, 2.0);
        let start = Turntable::framing(1.0).start_angle;
        assert_ne!(viewer.turntable(&world).unwrap().angle, start);

        viewer
            .scene
            .begin_load(&mut world, "a.splat", PendingLoad::resolved(Ok(cloud(2))))
            .unwrap();
        let loaded = viewer.poll_load(&mut world).unwrap().unwrap();
        assert_eq!(loaded.splat_count, 2);
        assert_eq!(viewer.turntable(&world).unwrap().angle, start);

        viewer.update(&mut world, 1.0);
        viewer.reset_camera(&mut world);
        assert_eq!(viewer.turntable(&world).unwrap().angle, start);
    }

    #[test]
    fn dispose_clears_the_container() {
        let (mut world, container) = test_world();
        let mut viewer = ready_viewer(&mut world, container);
        assert!(viewer.input_mut().is_none());
        viewer.dispose(&mut world).unwrap();
        assert_eq!(container_children(&world, container), 0);
    }
}
