use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a dataset cannot be laid out as given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VolumeError {
    #[error("volume shape missing")]
    MissingShape,
    #[error("volume shape {0:?} has a zero extent")]
    ZeroExtent([u32; 3]),
    #[error("volume shape {0:?} overflows the addressable sample count")]
    ShapeOverflow([u32; 3]),
    #[error("expected {expected} samples for the declared shape, found {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },
    #[error("{0} samples do not form a cube")]
    NotCubic(usize),
    #[error("volume slice {0:?} exceeds the proxy texture size")]
    TextureTooLarge([u32; 3]),
    #[error("volume payload not recognised")]
    Unrecognised,
}

/// Width, height and depth of a voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeShape {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl VolumeShape {
    pub fn cube(edge: u32) -> Self {
        Self {
            width: edge,
            height: edge,
            depth: edge,
        }
    }

    /// Validate extents and return the sample count they address.
    pub fn voxel_count(&self) -> Result<usize, VolumeError> {
        let dims = self.to_array();
        if dims.contains(&0) {
            return Err(VolumeError::ZeroExtent(dims));
        }
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(self.depth as usize))
            .ok_or(VolumeError::ShapeOverflow(dims))
    }

    pub fn to_array(&self) -> [u32; 3] {
        [self.width, self.height, self.depth]
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.width as f32, self.height as f32, self.depth as f32)
    }
}

/// Volumetric scan as delivered by the ingestion service.
///
/// Accepts both the service's snake_case field names (`data`, `hu_range`,
/// `radiomic_features`) and the camelCase names used elsewhere.
#[derive(Asset, TypePath, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeDataset {
    #[serde(alias = "data")]
    pub samples: Vec<u8>,
    #[serde(default)]
    pub shape: Option<[u32; 3]>,
    #[serde(default, alias = "hu_range", alias = "intensityRange")]
    pub intensity_range: Option<[f32; 2]>,
    /// Passed through untouched.
    #[serde(default, alias = "radiomic_features", alias = "derivedFeatures")]
    pub derived_features: Option<BTreeMap<String, f64>>,
    #[serde(default, alias = "patientId")]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub num_slices: Option<u32>,
}

impl VolumeDataset {
    /// Shape of the dataset, provided it addresses exactly `samples.len()` voxels.
    pub fn validated_shape(&self) -> Result<VolumeShape, VolumeError> {
        let [width, height, depth] = self.shape.ok_or(VolumeError::MissingShape)?;
        let shape = VolumeShape {
            width,
            height,
            depth,
        };
        let expected = shape.voxel_count()?;
        if expected != self.samples.len() {
            return Err(VolumeError::SampleCountMismatch {
                expected,
                actual: self.samples.len(),
            });
        }
        Ok(shape)
    }
}

/// Every form a volume update may arrive in.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumePayload {
    Dataset(VolumeDataset),
    /// Bare sample array; the shape is inferred as a cube.
    Flat(Vec<u8>),
    /// Produce the synthetic test volume.
    Synthetic,
    Unrecognised,
}

impl VolumePayload {
    /// Interpret host JSON. `null` means "remove the volume" and yields `None`;
    /// anything unparseable becomes [`VolumePayload::Unrecognised`].
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Array(_) => Some(
                serde_json::from_value::<Vec<u8>>(value)
                    .map(Self::Flat)
                    .unwrap_or(Self::Unrecognised),
            ),
            serde_json::Value::Object(_) => Some(
                serde_json::from_value::<VolumeDataset>(value)
                    .map(Self::Dataset)
                    .unwrap_or(Self::Unrecognised),
            ),
            _ => Some(Self::Unrecognised),
        }
    }

    /// Resolve the payload into a shape and the samples it addresses.
    pub fn resolve(&self) -> Result<(VolumeShape, &[u8]), VolumeError> {
        match self {
            Self::Dataset(dataset) => Ok((dataset.validated_shape()?, &dataset.samples)),
            Self::Flat(samples) => Ok((infer_cubic_shape(samples.len())?, samples)),
            Self::Synthetic | Self::Unrecognised => Err(VolumeError::Unrecognised),
        }
    }
}

fn infer_cubic_shape(len: usize) -> Result<VolumeShape, VolumeError> {
    let edge = (len as f64).cbrt().round() as u32;
    let shape = VolumeShape::cube(edge);
    match shape.voxel_count() {
        Ok(count) if count == len => Ok(shape),
        _ => Err(VolumeError::NotCubic(len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn service_field_names_are_accepted() {
        let payload = VolumePayload::from_json(json!({
            "data": [1, 2, 3, 4, 5, 6, 7, 8],
            "shape": [2, 2, 2],
            "hu_range": [-1000.0, 400.0],
            "radiomic_features": { "entropy": 4.5 },
            "patient_id": "ID00007637202177411956430",
            "num_slices": 2
        }));

        let Some(VolumePayload::Dataset(dataset)) = payload else {
            panic!("expected a dataset payload");
        };
        assert_eq!(dataset.intensity_range, Some([-1000.0, 400.0]));
        assert_eq!(
            dataset.derived_features.as_ref().and_then(|f| f.get("entropy")),
            Some(&4.5)
        );
        assert_eq!(dataset.validated_shape(), Ok(VolumeShape::cube(2)));
    }

    #[test]
    fn sample_count_mismatch_is_reported() {
        let dataset = VolumeDataset {
            samples: vec![1, 2, 3],
            shape: Some([2, 2, 2]),
            ..default()
        };
        assert_eq!(
            dataset.validated_shape(),
            Err(VolumeError::SampleCountMismatch {
                expected: 8,
                actual: 3
            })
        );
    }

    #[test]
    fn zero_extent_and_missing_shape_are_rejected() {
        let zero = VolumeDataset {
            samples: vec![],
            shape: Some([4, 0, 4]),
            ..default()
        };
        assert_eq!(zero.validated_shape(), Err(VolumeError::ZeroExtent([4, 0, 4])));

        let missing = VolumeDataset {
            samples: vec![1],
            ..default()
        };
        assert_eq!(missing.validated_shape(), Err(VolumeError::MissingShape));
    }

    #[test]
    fn flat_arrays_infer_a_cube() {
        let payload = VolumePayload::Flat(vec![9; 27]);
        let (shape, samples) = payload.resolve().unwrap();
        assert_eq!(shape, VolumeShape::cube(3));
        assert_eq!(samples.len(), 27);

        assert_eq!(
            VolumePayload::Flat(vec![9; 26]).resolve(),
            Err(VolumeError::NotCubic(26))
        );
    }

    #[test]
    fn null_removes_and_garbage_is_unrecognised() {
        assert_eq!(VolumePayload::from_json(json!(null)), None);
        assert_eq!(
            VolumePayload::from_json(json!("scan.dcm")),
            Some(VolumePayload::Unrecognised)
        );
        assert_eq!(
            VolumePayload::from_json(json!([1, 2, 999])),
            Some(VolumePayload::Unrecognised)
        );
        assert_eq!(
            VolumePayload::from_json(json!({ "shape": [2, 2, 2] })),
            Some(VolumePayload::Unrecognised)
        );
    }
}
