use bevy::prelude::*;
use constants::coordinate_system::SPLAT_CORRECTION;

use crate::engine::loading::pending::PendingLoad;

use super::{LoadedSplat, ViewerError};

/// Parent of every entity a viewer spawns. Clearing its children empties the view.
#[derive(Component, Debug, Default)]
pub struct ViewerContainer;

/// Camera entity a viewer renders through.
#[derive(Component, Debug)]
pub struct ViewerSurface;

/// Scene graph root the splat asset hangs off.
#[derive(Component, Debug)]
pub struct ViewerSceneRoot;

/// The splat asset currently attached to a scene, loaded or still loading.
#[derive(Component, Debug)]
pub struct AttachedSplat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Ready,
    Disposed,
}

/// Keeps at most one splat asset attached under a scene root.
#[derive(Default)]
struct SplatAttachment {
    entity: Option<Entity>,
    mesh: Option<Handle<Mesh>>,
    pending: Option<(String, PendingLoad)>,
}

impl SplatAttachment {
    /// Release the current asset and attach an empty one that `pending` will fill.
    fn begin_load(&mut self, world: &mut World, root: Entity, name: String, pending: PendingLoad) {
        self.release(world);
        let entity = world
            .spawn((
                AttachedSplat,
                Name::new(format!("splat:{name}")),
                Transform::from_rotation(SPLAT_CORRECTION),
                Visibility::default(),
                ChildOf(root),
            ))
            .id();
        self.entity = Some(entity);
        self.pending = Some((name, pending));
    }

    fn poll(
        &mut self,
        world: &mut World,
        material: &Handle<StandardMaterial>,
    ) -> Option<Result<LoadedSplat, ViewerError>> {
        let result = self.pending.as_ref()?.1.take()?;
        let (name, _) = self.pending.take()?;

        match result {
            Ok(cloud) => {
                // The container may have been cleared underneath us.
                let Some(entity) = self.entity.filter(|e| world.get_entity(*e).is_ok()) else {
                    self.entity = None;
                    return Some(Err(ViewerError::Disposed));
                };
                let mesh = world.resource_mut::<Assets<Mesh>>().add(cloud.to_mesh());
                world
                    .entity_mut(entity)
                    .insert((Mesh3d(mesh.clone()), MeshMaterial3d(material.clone())));
                self.mesh = Some(mesh);
                Some(Ok(LoadedSplat {
                    name,
                    splat_count: cloud.len(),
                    bounds: cloud.bounds(),
                }))
            }
            Err(err) => {
                // Nothing stays attached after a failed load.
                if let Some(entity) = self.entity.take() {
                    world.despawn(entity);
                }
                Some(Err(err))
            }
        }
    }

    /// Despawn the attached entity and drop its mesh. Returns a failure description
    /// if the entity was already gone.
    fn release(&mut self, world: &mut World) -> Option<String> {
        self.pending = None;
        let mut failure = None;
        if let Some(entity) = self.entity.take() {
            match world.get_entity_mut(entity) {
                Ok(splat) => splat.despawn(),
                Err(err) => failure = Some(format!("splat asset: {err}")),
            }
        }
        if let Some(mesh) = self.mesh.take() {
            if let Some(mut meshes) = world.get_resource_mut::<Assets<Mesh>>() {
                meshes.remove(&mesh);
            }
        }
        failure
    }
}

/// Scene, camera and asset plumbing shared by every viewer implementation.
pub struct ViewerScene {
    container: Entity,
    state: Lifecycle,
    root: Option<Entity>,
    camera: Option<Entity>,
    material: Option<Handle<StandardMaterial>>,
    attachment: SplatAttachment,
}

impl ViewerScene {
    pub fn new(container: Entity) -> Self {
        Self {
            container,
            state: Lifecycle::Created,
            root: None,
            camera: None,
            material: None,
            attachment: SplatAttachment::default(),
        }
    }

    /// Spawn the scene root and camera under the container. Repeated calls on a
    /// ready scene do nothing and return `Ok(false)`.
    pub fn init(
        &mut self,
        world: &mut World,
        label: &str,
        projection: PerspectiveProjection,
        camera_transform: Transform,
    ) -> Result<bool, ViewerError> {
        match self.state {
            Lifecycle::Ready => return Ok(false),
            Lifecycle::Disposed => return Err(ViewerError::Disposed),
            Lifecycle::Created => {}
        }
        if !world.contains_resource::<Assets<Mesh>>() {
            return Err(ViewerError::RendererUnavailable("Assets<Mesh>"));
        }
        if !world.contains_resource::<Assets<StandardMaterial>>() {
            return Err(ViewerError::RendererUnavailable("Assets<StandardMaterial>"));
        }
        if world.get_entity(self.container).is_err() {
            return Err(ViewerError::RendererUnavailable("viewer container"));
        }

        let material = world
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color: Color::WHITE,
                unlit: true,
                ..default()
            });
        let root = world
            .spawn((
                ViewerSceneRoot,
                Name::new(format!("{label}_scene")),
                Transform::default(),
                Visibility::default(),
                ChildOf(self.container),
            ))
            .id();
        let camera = world
            .spawn((
                ViewerSurface,
                Name::new(format!("{label}_camera")),
                Camera3d::default(),
                Projection::Perspective(projection),
                camera_transform,
                ChildOf(self.container),
            ))
            .id();

        self.material = Some(material);
        self.root = Some(root);
        self.camera = Some(camera);
        self.state = Lifecycle::Ready;
        Ok(true)
    }

    pub fn ensure_ready(&self) -> Result<(), ViewerError> {
        match self.state {
            Lifecycle::Ready => Ok(()),
            Lifecycle::Created => Err(ViewerError::NotInitialized),
            Lifecycle::Disposed => Err(ViewerError::Disposed),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == Lifecycle::Ready
    }

    pub fn camera(&self) -> Option<Entity> {
        self.camera
    }

    pub fn is_loading(&self) -> bool {
        self.attachment.pending.is_some()
    }

    /// Replace the attached asset with one that resolves from `pending`.
    pub fn begin_load(
        &mut self,
        world: &mut World,
        name: impl Into<String>,
        pending: PendingLoad,
    ) -> Result<(), ViewerError> {
        self.ensure_ready()?;
        let root = self.root.ok_or(ViewerError::NotInitialized)?;
        let name = name.into();
        info!("Loading splat '{}'", name);
        self.attachment.begin_load(world, root, name, pending);
        Ok(())
    }

    /// Finish a pending load once its data is ready.
    pub fn poll_load(&mut self, world: &mut World) -> Option<Result<LoadedSplat, ViewerError>> {
        if !self.is_ready() {
            return None;
        }
        let material = self.material.clone()?;
        self.attachment.poll(world, &material)
    }

    pub fn set_camera_transform(&self, world: &mut World, transform: Transform) {
        if let Some(mut current) = self
            .camera
            .and_then(|camera| world.get_mut::<Transform>(camera))
        {
            *current = transform;
        }
    }

    /// Release the asset, material, camera and scene root. Every step runs even
    /// when an earlier one fails; failures are reported together.
    pub fn dispose(&mut self, world: &mut World) -> Result<(), ViewerError> {
        if self.state == Lifecycle::Disposed {
            return Ok(());
        }
        self.state = Lifecycle::Disposed;

        let mut failures = Vec::new();
        failures.extend(self.attachment.release(world));

        if let Some(material) = self.material.take() {
            if let Some(mut materials) = world.get_resource_mut::<Assets<StandardMaterial>>() {
                materials.remove(&material);
            }
        }

        for (label, entity) in [("camera", self.camera.take()), ("scene root", self.root.take())] {
            let Some(entity) = entity else { continue };
            match world.get_entity_mut(entity) {
                Ok(entity) => entity.despawn(),
                Err(err) => failures.push(format!("{label}: {err}")),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ViewerError::Dispose(failures))
        }
    }
}
