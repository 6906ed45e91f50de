use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::core::config::ViewerConfig;
use crate::engine::timeline::prediction::{PredictionSeries, resolve_all};
use crate::engine::timeline::systems::SetPredictions;
use crate::engine::volume::dataset::{VolumeDataset, VolumePayload};
use crate::engine::volume::systems::SetVolume;
use crate::rpc::web_rpc::RpcSet;

/// Forwards startup data ahead of host messages, so host data sent in the
/// same frame replaces it.
pub struct StartupDataPlugin;

impl Plugin for StartupDataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StartupData>().add_systems(
            Update,
            (supersede_startup_data, deliver_startup_data)
                .chain()
                .before(RpcSet),
        );
    }
}

/// Optional volume and prediction assets named by the viewer config. Each
/// is dropped if the host sends its own data before the asset resolves.
#[derive(Resource, Default, Debug)]
pub struct StartupData {
    volume: Option<Handle<VolumeDataset>>,
    predictions: Option<Handle<PredictionSeries>>,
}

impl StartupData {
    pub fn is_pending(&self) -> bool {
        self.volume.is_some() || self.predictions.is_some()
    }
}

pub fn request_startup_data(
    config: Res<ViewerConfig>,
    asset_server: Res<AssetServer>,
    mut startup: ResMut<StartupData>,
) {
    if let Some(path) = &config.startup_volume {
        info!("Loading startup volume {path}");
        startup.volume = Some(asset_server.load(path.as_str()));
    }
    if let Some(path) = &config.startup_predictions {
        info!("Loading startup predictions {path}");
        startup.predictions = Some(asset_server.load(path.as_str()));
    }
}

/// Host data wins over startup data that has not arrived yet.
pub fn supersede_startup_data(
    mut startup: ResMut<StartupData>,
    mut volumes: EventReader<SetVolume>,
    mut predictions: EventReader<SetPredictions>,
) {
    if volumes.read().count() > 0 && startup.volume.take().is_some() {
        debug!("Startup volume superseded");
    }
    if predictions.read().count() > 0 && startup.predictions.take().is_some() {
        debug!("Startup predictions superseded");
    }
}

pub fn deliver_startup_data(
    mut startup: ResMut<StartupData>,
    asset_server: Res<AssetServer>,
    datasets: Res<Assets<VolumeDataset>>,
    series: Res<Assets<PredictionSeries>>,
    mut set_volume: EventWriter<SetVolume>,
    mut set_predictions: EventWriter<SetPredictions>,
) {
    if let Some(handle) = startup.volume.clone() {
        if let Some(dataset) = datasets.get(&handle) {
            set_volume.write(SetVolume::local(Some(VolumePayload::Dataset(
                dataset.clone(),
            ))));
            startup.volume = None;
        } else if let Some(LoadState::Failed(error)) = asset_server.get_load_state(&handle) {
            warn!("Startup volume failed to load: {error}");
            startup.volume = None;
        }
    }

    if let Some(handle) = startup.predictions.clone() {
        if let Some(loaded) = series.get(&handle) {
            set_predictions.write(SetPredictions(resolve_all(&loaded.predictions)));
            startup.predictions = None;
        } else if let Some(LoadState::Failed(error)) = asset_server.get_load_state(&handle) {
            warn!("Startup predictions failed to load: {error}");
            startup.predictions = None;
        }
    }
}
