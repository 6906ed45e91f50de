use bevy::prelude::*;
use constants::volume::CUBE_DISPLAY_SIZE;

use super::dataset::VolumePayload;
use super::material::{RenderStyle, VolumeMaterial, VolumeUniform};
use super::texture_builder::{ProxyVolume, build_proxy_volume};
use crate::engine::core::config::ViewerConfig;
use crate::engine::scene::registry::{
    OwnedAsset, SceneAssets, SceneCategory, SceneObject, SceneRegistry,
};

/// Who asked for a volume build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VolumeOrigin {
    /// Host request, numbered in arrival order.
    Host(u64),
    /// Startup data or a local shortcut.
    #[default]
    Local,
}

/// Replace the live volume. A `None` payload removes it.
#[derive(Event, Debug, Clone)]
pub struct SetVolume {
    pub payload: Option<VolumePayload>,
    pub origin: VolumeOrigin,
}

impl SetVolume {
    pub fn local(payload: Option<VolumePayload>) -> Self {
        Self {
            payload,
            origin: VolumeOrigin::Local,
        }
    }
}

/// A new volume cube has been attached.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct VolumeReady {
    pub shape: [u32; 3],
    pub fallback: bool,
    /// Origin of the request that was built.
    pub origin: VolumeOrigin,
}

#[derive(Component)]
pub struct VolumeCube;

/// Build the newest requested volume and swap it into the scene. Earlier
/// requests from the same frame are superseded and never built.
pub fn apply_volume_updates(
    mut updates: EventReader<SetVolume>,
    mut registry: ResMut<SceneRegistry>,
    mut scene: SceneAssets,
    config: Res<ViewerConfig>,
    mut ready: EventWriter<VolumeReady>,
) {
    let Some(SetVolume { payload, origin }) = updates.read().last() else {
        return;
    };

    let Some(payload) = payload else {
        if registry.replace(SceneCategory::Volume, None, &mut scene) {
            info!("Volume removed");
        }
        return;
    };

    let volume = build_proxy_volume(payload, config.fallback_seed);
    let object = spawn_volume_cube(&mut scene, &volume, &config);
    registry.replace(SceneCategory::Volume, Some(object), &mut scene);

    info!(
        "Volume attached: {:?} -> {}x{} proxy ({:?})",
        volume.shape.to_array(),
        volume.texture_width(),
        volume.texture_height(),
        volume.source
    );
    ready.write(VolumeReady {
        shape: volume.shape.to_array(),
        fallback: volume.source.is_fallback(),
        origin: *origin,
    });
}

/// Upload the proxy texture and spawn the bounding cube that samples it.
pub fn spawn_volume_cube(
    scene: &mut SceneAssets,
    volume: &ProxyVolume,
    config: &ViewerConfig,
) -> SceneObject {
    let image = scene.images.add(volume.to_image());
    let material = scene.volume_materials.add(VolumeMaterial {
        params: VolumeUniform::new(
            volume.shape,
            config.isovalue,
            config.intensity_clamp,
            RenderStyle::from_index(config.render_style),
            config.ray_march_steps,
        ),
        volume: image.clone(),
    });
    let mesh = scene.meshes.add(Cuboid::from_length(CUBE_DISPLAY_SIZE));

    let root = scene
        .commands
        .spawn((
            Name::new("Volume"),
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::IDENTITY,
            VolumeCube,
        ))
        .id();

    SceneObject::new(root)
        .with_asset(OwnedAsset::Mesh(mesh))
        .with_asset(OwnedAsset::Image(image))
        .with_asset(OwnedAsset::VolumeMaterial(material))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::volume::dataset::VolumeDataset;
    use constants::volume::FALLBACK_EDGE;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<Image>()
            .init_asset::<StandardMaterial>()
            .init_asset::<VolumeMaterial>()
            .init_resource::<SceneRegistry>()
            .init_resource::<ViewerConfig>()
            .add_event::<SetVolume>()
            .add_event::<VolumeReady>()
            .add_systems(Update, apply_volume_updates);
        app
    }

    fn uniform_cube(value: u8) -> SetVolume {
        SetVolume::local(Some(VolumePayload::Dataset(VolumeDataset {
            samples: vec![value; 8],
            shape: Some([2, 2, 2]),
            ..default()
        })))
    }

    fn live_cubes(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, With<VolumeCube>>()
            .iter(app.world())
            .count()
    }

    fn ready_events(app: &App) -> Vec<VolumeReady> {
        let events = app.world().resource::<Events<VolumeReady>>();
        events.get_cursor().read(events).cloned().collect()
    }

    #[test]
    fn repeated_uploads_keep_a_single_texture_and_material() {
        let mut app = test_app();

        app.world_mut().send_event(uniform_cube(200));
        app.update();
        app.world_mut().send_event(uniform_cube(90));
        app.update();

        assert_eq!(live_cubes(&mut app), 1);
        assert_eq!(app.world().resource::<Assets<Image>>().len(), 1);
        assert_eq!(app.world().resource::<Assets<VolumeMaterial>>().len(), 1);
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 1);
        assert!(
            app.world()
                .resource::<SceneRegistry>()
                .is_attached(SceneCategory::Volume)
        );
    }

    #[test]
    fn only_the_last_request_in_a_frame_is_built() {
        let mut app = test_app();

        app.world_mut().send_event(uniform_cube(200));
        app.world_mut().send_event(SetVolume {
            payload: Some(VolumePayload::Flat(vec![7; 27])),
            origin: VolumeOrigin::Host(4),
        });
        app.update();

        assert_eq!(live_cubes(&mut app), 1);
        assert_eq!(
            ready_events(&app),
            vec![VolumeReady {
                shape: [3, 3, 3],
                fallback: false,
                origin: VolumeOrigin::Host(4),
            }]
        );
    }

    #[test]
    fn malformed_dataset_attaches_the_fallback_cube() {
        let mut app = test_app();

        app.world_mut()
            .send_event(SetVolume::local(Some(VolumePayload::Dataset(
                VolumeDataset {
                    samples: vec![1, 2, 3],
                    shape: Some([2, 2, 2]),
                    ..default()
                },
            ))));
        app.update();

        assert_eq!(live_cubes(&mut app), 1);
        assert_eq!(
            ready_events(&app),
            vec![VolumeReady {
                shape: [FALLBACK_EDGE; 3],
                fallback: true,
                origin: VolumeOrigin::Local,
            }]
        );
    }

    #[test]
    fn null_volume_detaches_and_frees_everything() {
        let mut app = test_app();

        app.world_mut().send_event(uniform_cube(200));
        app.update();
        app.world_mut().send_event(SetVolume::local(None));
        app.update();

        assert_eq!(live_cubes(&mut app), 0);
        assert_eq!(app.world().resource::<Assets<Image>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<VolumeMaterial>>().len(), 0);
        assert!(
            !app.world()
                .resource::<SceneRegistry>()
                .is_attached(SceneCategory::Volume)
        );
    }
}
