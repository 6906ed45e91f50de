//! Medical transfer function shared by the CPU reference path and the shader.

use constants::volume::{
    AIR_RGB, ALPHA_PER_INTENSITY, DENSE_TISSUE_RGB, DENSE_TISSUE_THRESHOLD, LIGHT_TISSUE_RGB,
    LIGHT_TISSUE_THRESHOLD, SOFT_TISSUE_RGB, SOFT_TISSUE_THRESHOLD,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TissueBand {
    Dense,
    Soft,
    /// Light tissue and aerated lung.
    Light,
    Air,
}

impl TissueBand {
    /// Band for a normalised intensity in [0, 1].
    pub fn classify(intensity: f32) -> Self {
        if intensity > DENSE_TISSUE_THRESHOLD {
            Self::Dense
        } else if intensity > SOFT_TISSUE_THRESHOLD {
            Self::Soft
        } else if intensity > LIGHT_TISSUE_THRESHOLD {
            Self::Light
        } else {
            Self::Air
        }
    }

    pub fn colour(&self) -> [f32; 3] {
        match self {
            Self::Dense => DENSE_TISSUE_RGB,
            Self::Soft => SOFT_TISSUE_RGB,
            Self::Light => LIGHT_TISSUE_RGB,
            Self::Air => AIR_RGB,
        }
    }
}

/// Colour and opacity for a normalised intensity, as the fragment stage emits it.
pub fn classify_rgba(intensity: f32) -> [f32; 4] {
    let [r, g, b] = TissueBand::classify(intensity).colour();
    [r, g, b, intensity * ALPHA_PER_INTENSITY]
}
