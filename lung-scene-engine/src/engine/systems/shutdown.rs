use bevy::app::AppExit;
use bevy::prelude::*;

use crate::engine::camera::orbit_camera::OrbitController;
use crate::engine::scene::registry::{SceneAssets, SceneRegistry};

/// Teardown stages, run in order in `Last` on the frame an exit is requested.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownSet {
    DetachListeners,
    DisposeScene,
    ReleaseController,
}

pub fn configure_shutdown(app: &mut App) {
    app.configure_sets(
        Last,
        (
            ShutdownSet::DetachListeners,
            ShutdownSet::DisposeScene,
            ShutdownSet::ReleaseController,
        )
            .chain(),
    )
    .add_systems(
        Last,
        (
            dispose_scene.in_set(ShutdownSet::DisposeScene),
            release_controller.in_set(ShutdownSet::ReleaseController),
        )
            .run_if(on_event::<AppExit>),
    );
}

/// Free every attached object and the GPU assets it owns.
pub fn dispose_scene(mut registry: ResMut<SceneRegistry>, mut scene: SceneAssets) {
    let attached: Vec<_> = registry.attached().map(|c| c.as_str()).collect();
    registry.clear(&mut scene);
    info!("Scene disposed ({})", attached.join(", "));
}

pub fn release_controller(mut controller: ResMut<OrbitController>) {
    controller.set_enabled(false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::config::ViewerConfig;
    use crate::engine::scene::registry::SceneCategory;
    use crate::engine::volume::dataset::VolumePayload;
    use crate::engine::volume::material::VolumeMaterial;
    use crate::engine::volume::systems::{SetVolume, VolumeReady, apply_volume_updates};

    #[test]
    fn exit_disposes_the_scene_then_disables_the_controller() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<Image>()
            .init_asset::<StandardMaterial>()
            .init_asset::<VolumeMaterial>()
            .init_resource::<SceneRegistry>()
            .init_resource::<ViewerConfig>()
            .init_resource::<OrbitController>()
            .add_event::<SetVolume>()
            .add_event::<VolumeReady>()
            .add_event::<AppExit>()
            .add_systems(Update, apply_volume_updates);
        configure_shutdown(&mut app);

        app.world_mut()
            .send_event(SetVolume::local(Some(VolumePayload::Synthetic)));
        app.update();
        assert!(
            app.world()
                .resource::<SceneRegistry>()
                .is_attached(SceneCategory::Volume)
        );
        assert!(app.world().resource::<OrbitController>().enabled);

        app.world_mut().send_event(AppExit::Success);
        app.update();

        assert_eq!(app.world().resource::<SceneRegistry>().attached().count(), 0);
        assert_eq!(app.world().resource::<Assets<Image>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<VolumeMaterial>>().len(), 0);
        assert!(!app.world().resource::<OrbitController>().enabled);
    }
}
