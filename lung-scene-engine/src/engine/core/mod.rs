//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, startup state
//! transitions and plugin initialisation for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with the volume material, scene registry, loaders,
/// session controller and web bridge.
pub mod app_setup;

/// Startup state machine gating runtime systems on configuration.
pub mod app_state;

/// Viewer configuration asset and its defaults.
pub mod config;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
