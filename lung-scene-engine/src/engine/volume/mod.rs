//! Volumetric scan rendering.
//!
//! Raw intensity grids are laid out as a vertically tiled 2D proxy texture
//! and drawn through a back-face cube whose fragment stage re-assembles the
//! third axis and classifies tissue with a banded transfer function.

use bevy::prelude::*;

/// Scan payloads as delivered by the ingestion service, and their validation.
pub mod dataset;

/// Volume material, uniform block and pipeline specialisation.
pub mod material;

/// Spawning and replacing the volume cube on data updates.
pub mod systems;

/// CPU-side tiled proxy texture construction and the synthetic fallback volume.
pub mod texture_builder;

/// Tissue classification bands shared with the shader.
pub mod transfer;

use material::VolumeMaterial;
use systems::{SetVolume, VolumeReady, apply_volume_updates};

pub struct VolumePlugin;

impl Plugin for VolumePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<VolumeMaterial>::default())
            .add_event::<SetVolume>()
            .add_event::<VolumeReady>()
            .add_systems(Update, apply_volume_updates);
    }
}
