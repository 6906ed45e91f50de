//! Desktop camera navigation.
//!
//! Provides a damped orbit controller (rotate, pan, zoom) around the scene
//! origin. Immersive sessions suspend it while head tracking drives the view.

/// Orbit controller resource and its per-frame input system.
pub mod orbit_camera;
