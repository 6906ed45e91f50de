//! Forced-vital-capacity projection curve.
//!
//! Turns an ordered prediction sequence into a polyline, one marker sphere
//! per point and a camera-facing label placeholder above each marker.

use bevy::prelude::*;

/// Normalisation of weeks and FVC into curve-local display coordinates.
pub mod layout;

/// Prediction records, their JSON forms and the startup asset.
pub mod prediction;

/// Curve spawning, replacement and label billboarding.
pub mod systems;

use systems::{PredictionsReady, SetPredictions, apply_prediction_updates, billboard_labels};

pub struct TimelinePlugin;

impl Plugin for TimelinePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SetPredictions>()
            .add_event::<PredictionsReady>()
            .add_systems(Update, (apply_prediction_updates, billboard_labels).chain());
    }
}
