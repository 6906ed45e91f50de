/// Largest dimension of the reference mesh after normalisation.
pub const DISPLAY_SIZE: f32 = 12.0;

/// Default asset path of the reference lung mesh.
pub const DEFAULT_ASSET_PATH: &str = "models/realistic_human_lungs.glb";

/// Default path of the viewer configuration asset.
pub const CONFIG_ASSET_PATH: &str = "config/viewer.config.json";
