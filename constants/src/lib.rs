//! Shared display constants for the pulmonary scene.

/// Perspective camera and orbit controller defaults.
pub mod camera;

/// Reference grid and axis marker dimensions.
pub mod grid;

/// Light rig colours and intensities.
pub mod lighting;

/// Volume proxy texture layout and transfer function bands.
pub mod volume;

/// FVC timeline geometry placement.
pub mod timeline;

/// Anatomical reference mesh sizing and location.
pub mod anatomy;

/// Log filter applied before configuration resolves.
pub mod logging;
