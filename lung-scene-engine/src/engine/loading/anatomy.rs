use bevy::asset::RecursiveDependencyLoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::render::mesh::MeshAabb;
use bevy::scene::{SceneInstance, SceneSpawner};
use constants::anatomy::DISPLAY_SIZE;

use crate::engine::scene::registry::{
    OwnedAsset, SceneAssets, SceneCategory, SceneObject, SceneRegistry,
};

/// Request to (re)load the anatomical reference mesh from an asset path.
#[derive(Event, Debug, Clone)]
pub struct LoadAnatomy(pub String);

#[derive(Component)]
pub struct AnatomyRoot;

/// An in-flight reference mesh load.
#[derive(Debug)]
struct PendingAnatomy {
    generation: u64,
    path: String,
    handle: Handle<Gltf>,
    /// Hidden scene root, spawned once the glTF resolves.
    root: Option<Entity>,
}

/// Tracks the single outstanding anatomy load. A newer request supersedes
/// the pending one; anything the old request produced is discarded.
#[derive(Resource, Default, Debug)]
pub struct AnatomyLoader {
    generation: u64,
    pending: Option<PendingAnatomy>,
}

impl AnatomyLoader {
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}

pub fn request_anatomy_load(
    mut requests: EventReader<LoadAnatomy>,
    mut loader: ResMut<AnatomyLoader>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
) {
    let Some(LoadAnatomy(path)) = requests.read().last() else {
        return;
    };

    loader.generation += 1;
    let generation = loader.generation;
    if let Some(stale) = loader.pending.take() {
        debug!(
            "Anatomy load {} ({}) superseded",
            stale.generation, stale.path
        );
        if let Some(root) = stale.root {
            commands.entity(root).despawn();
        }
    }

    info!("Loading anatomy from {path}");
    loader.pending = Some(PendingAnatomy {
        generation,
        path: path.clone(),
        handle: asset_server.load(path.as_str()),
        root: None,
    });
}

/// Spawn the glTF scene hidden once it and its dependencies are loaded.
/// A failed load is logged and leaves no anatomy attached.
pub fn poll_anatomy_load(
    mut loader: ResMut<AnatomyLoader>,
    mut registry: ResMut<SceneRegistry>,
    mut scene_assets: SceneAssets,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
) {
    let Some(pending) = loader.pending.as_mut() else {
        return;
    };
    if pending.root.is_some() {
        return;
    }

    match asset_server.get_recursive_dependency_load_state(&pending.handle) {
        Some(RecursiveDependencyLoadState::Loaded) => {}
        Some(RecursiveDependencyLoadState::Failed(error)) => {
            error!("Failed to load anatomy {}: {error}", pending.path);
            loader.pending = None;
            registry.replace(SceneCategory::Anatomy, None, &mut scene_assets);
            return;
        }
        _ => return,
    }

    let scene = gltfs
        .get(&pending.handle)
        .and_then(|gltf| gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()));
    let Some(scene) = scene else {
        error!("Anatomy asset {} contains no scene", pending.path);
        loader.pending = None;
        registry.replace(SceneCategory::Anatomy, None, &mut scene_assets);
        return;
    };

    let root = scene_assets
        .commands
        .spawn((
            Name::new("Anatomy"),
            SceneRoot(scene),
            Transform::IDENTITY,
            Visibility::Hidden,
            AnatomyRoot,
        ))
        .id();
    pending.root = Some(root);
}

/// Normalise and attach the anatomy once its scene instance has spawned.
pub fn attach_spawned_anatomy(
    mut loader: ResMut<AnatomyLoader>,
    mut registry: ResMut<SceneRegistry>,
    mut scene_assets: SceneAssets,
    scene_spawner: Res<SceneSpawner>,
    instances: Query<&SceneInstance>,
    nodes: Query<(Option<&Transform>, Option<&Mesh3d>, Option<&Children>)>,
) {
    let Some(pending) = loader.pending.as_ref() else {
        return;
    };
    let Some(root) = pending.root else {
        return;
    };
    let Ok(instance) = instances.get(root) else {
        return;
    };
    if !scene_spawner.instance_is_ready(**instance) {
        return;
    }

    let transform = match hierarchy_bounds(root, &nodes, &scene_assets.meshes) {
        Some((min, max)) => normalising_transform(min, max),
        None => {
            warn!("Anatomy {} has no mesh geometry", pending.path);
            Transform::IDENTITY
        }
    };

    scene_assets
        .commands
        .entity(root)
        .insert((transform, Visibility::Inherited));

    let object = SceneObject::new(root).with_asset(OwnedAsset::Gltf(pending.handle.clone()));
    registry.replace(SceneCategory::Anatomy, Some(object), &mut scene_assets);
    info!(
        "Anatomy {} attached (scale {:.3})",
        pending.path, transform.scale.x
    );
    loader.pending = None;
}

/// Uniform scale and offset that fit `[min, max]` to the display size and
/// centre it on the origin.
pub fn normalising_transform(min: Vec3, max: Vec3) -> Transform {
    let size = max - min;
    let largest = size.max_element();
    let scale = if largest > f32::EPSILON {
        DISPLAY_SIZE / largest
    } else {
        1.0
    };
    let centre = (min + max) * 0.5;

    Transform::from_translation(-centre * scale).with_scale(Vec3::splat(scale))
}

/// World-independent bounds of every mesh under `root`, expressed in the
/// root's local space. The root's own transform is excluded.
pub fn hierarchy_bounds(
    root: Entity,
    nodes: &Query<(Option<&Transform>, Option<&Mesh3d>, Option<&Children>)>,
    meshes: &Assets<Mesh>,
) -> Option<(Vec3, Vec3)> {
    let mut bounds: Option<(Vec3, Vec3)> = None;
    let mut stack = vec![(root, Mat4::IDENTITY)];

    while let Some((entity, parent_matrix)) = stack.pop() {
        let Ok((transform, mesh, children)) = nodes.get(entity) else {
            continue;
        };
        let matrix = if entity == root {
            Mat4::IDENTITY
        } else {
            parent_matrix * transform.map_or(Mat4::IDENTITY, Transform::compute_matrix)
        };

        if let Some(aabb) = mesh
            .and_then(|mesh| meshes.get(&mesh.0))
            .and_then(Mesh::compute_aabb)
        {
            let centre = Vec3::from(aabb.center);
            let half = Vec3::from(aabb.half_extents);
            for corner in 0..8 {
                let sign = Vec3::new(
                    if corner & 1 == 0 { -1.0 } else { 1.0 },
                    if corner & 2 == 0 { -1.0 } else { 1.0 },
                    if corner & 4 == 0 { -1.0 } else { 1.0 },
                );
                let point = matrix.transform_point3(centre + half * sign);
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(point), max.max(point)),
                    None => (point, point),
                });
            }
        }

        if let Some(children) = children {
            let children: &[Entity] = children;
            stack.extend(children.iter().map(|child| (*child, matrix)));
        }
    }

    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::volume::material::VolumeMaterial;
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;

    fn loader_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Gltf>()
            .init_asset::<Mesh>()
            .init_asset::<Image>()
            .init_asset::<StandardMaterial>()
            .init_asset::<VolumeMaterial>()
            .init_resource::<SceneRegistry>()
            .init_resource::<AnatomyLoader>()
            .add_event::<LoadAnatomy>();
        app
    }

    #[test]
    fn failed_load_leaves_no_anatomy_attached() {
        let mut app = loader_app();
        app.add_systems(Update, (request_anatomy_load, poll_anatomy_load).chain());

        app.world_mut()
            .send_event(LoadAnatomy("models/does_not_exist.glb".to_string()));
        app.update();
        assert!(app.world().resource::<AnatomyLoader>().is_loading());

        for _ in 0..200 {
            if !app.world().resource::<AnatomyLoader>().is_loading() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
            app.update();
        }

        assert!(!app.world().resource::<AnatomyLoader>().is_loading());
        assert!(
            !app.world()
                .resource::<SceneRegistry>()
                .is_attached(SceneCategory::Anatomy)
        );
    }

    #[test]
    fn newer_request_discards_the_pending_scene() {
        let mut app = loader_app();
        app.add_systems(Update, request_anatomy_load);

        app.world_mut()
            .send_event(LoadAnatomy("models/first.glb".to_string()));
        app.update();

        // The first load resolved far enough to spawn its hidden root.
        let stale = app
            .world_mut()
            .spawn((AnatomyRoot, Visibility::Hidden))
            .id();
        if let Some(pending) = app.world_mut().resource_mut::<AnatomyLoader>().pending.as_mut() {
            pending.root = Some(stale);
        }

        app.world_mut()
            .send_event(LoadAnatomy("models/second.glb".to_string()));
        app.update();

        assert!(app.world().get_entity(stale).is_err());
        let loader = app.world().resource::<AnatomyLoader>();
        let pending = loader.pending.as_ref().unwrap();
        assert_eq!(pending.generation, 2);
        assert_eq!(pending.path, "models/second.glb");
        assert!(pending.root.is_none());
        assert!(
            !app.world()
                .resource::<SceneRegistry>()
                .is_attached(SceneCategory::Anatomy)
        );
    }

    #[test]
    fn largest_dimension_maps_to_display_size() {
        let transform = normalising_transform(Vec3::ZERO, Vec3::new(2.0, 4.0, 1.0));

        assert_eq!(transform.scale, Vec3::splat(3.0));
        assert_eq!(transform.translation, Vec3::new(-3.0, -6.0, -1.5));

        let min = transform.transform_point(Vec3::ZERO);
        let max = transform.transform_point(Vec3::new(2.0, 4.0, 1.0));
        assert!(((max - min).max_element() - DISPLAY_SIZE).abs() < 1e-5);
        assert!(((min + max) * 0.5).length() < 1e-5);
    }

    #[test]
    fn degenerate_bounds_keep_unit_scale() {
        let point = Vec3::new(1.0, 2.0, 3.0);
        let transform = normalising_transform(point, point);

        assert_eq!(transform.scale, Vec3::ONE);
        assert_eq!(transform.translation, -point);
    }

    #[test]
    fn bounds_follow_child_transforms() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>();

        let cube = app
            .world_mut()
            .resource_mut::<Assets<Mesh>>()
            .add(Cuboid::from_length(2.0));
        let world = app.world_mut();
        let child = world
            .spawn((
                Mesh3d(cube),
                Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::new(1.0, 3.0, 1.0)),
            ))
            .id();
        let root = world
            .spawn(Transform::from_xyz(100.0, 100.0, 100.0))
            .add_child(child)
            .id();

        let bounds = app
            .world_mut()
            .run_system_once(
                move |nodes: Query<(Option<&Transform>, Option<&Mesh3d>, Option<&Children>)>,
                      meshes: Res<Assets<Mesh>>| {
                    hierarchy_bounds(root, &nodes, &meshes)
                },
            )
            .unwrap();

        let (min, max) = bounds.unwrap();
        assert!((min - Vec3::new(9.0, -3.0, -1.0)).length() < 1e-5);
        assert!((max - Vec3::new(11.0, 3.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn hierarchy_without_meshes_has_no_bounds() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>();
        let root = app.world_mut().spawn(Transform::IDENTITY).id();

        let bounds = app
            .world_mut()
            .run_system_once(
                move |nodes: Query<(Option<&Transform>, Option<&Mesh3d>, Option<&Children>)>,
                      meshes: Res<Assets<Mesh>>| {
                    hierarchy_bounds(root, &nodes, &meshes)
                },
            )
            .unwrap();

        assert!(bounds.is_none());
    }
}
