use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::anatomy::CONFIG_ASSET_PATH;

use super::config::ViewerConfig;
use crate::engine::loading::anatomy::LoadAnatomy;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    /// Waiting for the viewer config to resolve.
    #[default]
    Loading,
    Running,
}

#[derive(Component)]
pub struct FpsText;

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<ViewerConfig>>,
}

pub fn start_loading(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(CONFIG_ASSET_PATH));
}

/// Adopt the loaded config, or keep the compiled defaults if it failed.
pub fn resolve_viewer_config(
    loader: Res<ConfigLoader>,
    configs: Res<Assets<ViewerConfig>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = &loader.handle else {
        return;
    };

    if let Some(config) = configs.get(handle) {
        info!("Viewer config loaded from {CONFIG_ASSET_PATH}");
        commands.insert_resource(config.clone());
    } else if let Some(LoadState::Failed(error)) = asset_server.get_load_state(handle) {
        warn!("Viewer config unavailable ({error}), using defaults");
    } else {
        return;
    }

    info!("Transitioning to Running state");
    next_state.set(AppState::Running);
}

pub fn request_reference_mesh(config: Res<ViewerConfig>, mut loads: EventWriter<LoadAnatomy>) {
    loads.write(LoadAnatomy(config.anatomy_asset.clone()));
}
