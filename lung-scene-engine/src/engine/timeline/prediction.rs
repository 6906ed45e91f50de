use bevy::prelude::*;
use constants::timeline::{DEFAULT_CONFIDENCE, IMPLICIT_WEEK_STRIDE};
use serde::Deserialize;
use thiserror::Error;

/// One projected FVC measurement, with every optional field resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionPoint {
    pub week: u32,
    /// Predicted forced vital capacity in mL.
    pub fvc_predicted: f32,
    /// Percent.
    pub confidence: f32,
}

/// A prediction as the forecasting service sends it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPrediction {
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default, alias = "fvcPredicted")]
    pub fvc_predicted: Option<f32>,
    #[serde(default)]
    pub fvc: Option<f32>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl RawPrediction {
    /// Fill the gaps: week defaults to `index * 4`, FVC falls back to `fvc`
    /// then zero, confidence to 95%.
    pub fn resolve(&self, index: usize) -> PredictionPoint {
        PredictionPoint {
            week: self
                .week
                .unwrap_or(index as u32 * IMPLICIT_WEEK_STRIDE),
            fvc_predicted: self.fvc_predicted.or(self.fvc).unwrap_or(0.0),
            confidence: self.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        }
    }
}

/// Resolve a sequence, keeping its order.
pub fn resolve_all(raw: &[RawPrediction]) -> Vec<PredictionPoint> {
    raw.iter()
        .enumerate()
        .map(|(index, prediction)| prediction.resolve(index))
        .collect()
}

#[derive(Debug, Error)]
pub enum PredictionParseError {
    #[error("predictions must be an array or an object with a 'predictions' array")]
    NotASequence,
    #[error("invalid prediction entry: {0}")]
    InvalidEntry(#[from] serde_json::Error),
}

/// Parse host JSON: a bare array, `{ "predictions": [...] }`, or `null` (empty).
pub fn parse_predictions(
    value: &serde_json::Value,
) -> Result<Vec<PredictionPoint>, PredictionParseError> {
    let entries = match value {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(map) => match map.get("predictions") {
            Some(serde_json::Value::Null) => return Ok(Vec::new()),
            Some(entries @ serde_json::Value::Array(_)) => entries,
            _ => return Err(PredictionParseError::NotASequence),
        },
        _ => return Err(PredictionParseError::NotASequence),
    };

    let raw = Vec::<RawPrediction>::deserialize(entries)?;
    Ok(resolve_all(&raw))
}

/// `*.predictions.json` asset used to seed the timeline at startup.
#[derive(Asset, TypePath, Debug, Clone, Default, Deserialize)]
pub struct PredictionSeries {
    #[serde(default)]
    pub predictions: Vec<RawPrediction>,
}
