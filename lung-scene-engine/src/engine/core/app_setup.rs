use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::logging::LOG_FILTER;

use crate::engine::camera::orbit_camera::{OrbitController, orbit_camera_controller};
use crate::engine::core::app_state::{
    AppState, ConfigLoader, FpsText, request_reference_mesh, resolve_viewer_config, start_loading,
};
use crate::engine::core::config::ViewerConfig;
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::anatomy::{
    AnatomyLoader, LoadAnatomy, attach_spawned_anatomy, poll_anatomy_load, request_anatomy_load,
};
use crate::engine::loading::startup_data::{StartupDataPlugin, request_startup_data};
use crate::engine::scene::registry::SceneRegistry;
use crate::engine::scene::rig::{setup_scene, sync_viewport_on_resize};
use crate::engine::session::SessionPlugin;
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::engine::systems::shutdown::configure_shutdown;
use crate::engine::timeline::TimelinePlugin;
use crate::engine::timeline::prediction::PredictionSeries;
use crate::engine::volume::VolumePlugin;
use crate::engine::volume::dataset::VolumeDataset;
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::dev_shortcuts::handle_dev_shortcuts;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::fps_text_update_system;
#[cfg(not(target_arch = "wasm32"))]
use crate::rpc::web_rpc::RpcSet;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers the JSON-backed asset types by their compound extensions.
        .add_plugins(JsonAssetPlugin::<ViewerConfig>::new(&["config.json"]))
        .add_plugins(JsonAssetPlugin::<VolumeDataset>::new(&["volume.json"]))
        .add_plugins(JsonAssetPlugin::<PredictionSeries>::new(&[
            "predictions.json",
        ]))
        .add_plugins((
            VolumePlugin,
            TimelinePlugin,
            SessionPlugin,
            StartupDataPlugin,
            WebRpcPlugin,
        ));

    // Initialise resources early; the session plugin's first OnEnter needs
    // the orbit controller.
    app.init_resource::<ViewerConfig>()
        .init_resource::<ConfigLoader>()
        .init_resource::<OrbitController>()
        .init_resource::<SceneRegistry>()
        .init_resource::<AnatomyLoader>()
        .add_event::<LoadAnatomy>();

    configure_shutdown(&mut app);

    app.add_systems(Startup, (setup_scene, start_loading))
        .add_systems(
            Update,
            resolve_viewer_config.run_if(in_state(AppState::Loading)),
        )
        .add_systems(
            OnEnter(AppState::Running),
            (request_reference_mesh, request_startup_data),
        );

    let runtime_systems = (
        orbit_camera_controller,
        sync_viewport_on_resize,
        fps_notification_system,
        (request_anatomy_load, poll_anatomy_load, attach_spawned_anatomy).chain(),
    );
    app.add_systems(Update, runtime_systems);

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Startup, create_native_overlays)
            .add_systems(
                Update,
                (fps_text_update_system, handle_dev_shortcuts.before(RpcSet)),
            );
    }

    app
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(mut commands: Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.06, 0.73, 0.51)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        filter: LOG_FILTER.to_string(),
        level: Level::INFO,
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
