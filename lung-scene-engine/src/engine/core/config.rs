use bevy::prelude::*;
use constants::{anatomy, volume};
use serde::{Deserialize, Serialize};

/// Runtime viewer settings, read from `viewer.config.json` when present.
/// Every field falls back to the compiled default when omitted.
#[derive(Resource, Asset, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// glTF asset holding the anatomical reference mesh.
    pub anatomy_asset: String,
    /// Classification threshold forwarded to the volume shader.
    pub isovalue: f32,
    /// Intensity clamp range forwarded to the volume shader.
    pub intensity_clamp: [f32; 2],
    /// 0 = single depth-weighted sample, 1 = front-to-back ray march.
    pub render_style: u32,
    pub ray_march_steps: u32,
    /// Seed for the synthetic fallback volume.
    pub fallback_seed: u64,
    /// Optional `*.volume.json` asset shown once configuration resolves.
    pub startup_volume: Option<String>,
    /// Optional `*.predictions.json` asset shown once configuration resolves.
    pub startup_predictions: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            anatomy_asset: anatomy::DEFAULT_ASSET_PATH.to_string(),
            isovalue: volume::DEFAULT_ISOVALUE,
            intensity_clamp: volume::DEFAULT_INTENSITY_CLAMP,
            render_style: 0,
            ray_march_steps: volume::RAY_MARCH_STEPS,
            fallback_seed: volume::FALLBACK_SEED,
            startup_volume: None,
            startup_predictions: None,
        }
    }
}
