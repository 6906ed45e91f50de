//! Asynchronous asset loading for the reference mesh and startup data.
//!
//! Loads are fire-and-forget requests on the asset server; systems poll each
//! frame and hand finished results to the scene registry. A newer request
//! always supersedes an unresolved older one.

/// glTF reference mesh loading, bounds normalisation and stale-load discard.
///
/// Failed loads are logged and leave no anatomy attached.
pub mod anatomy;

/// Volume and prediction assets named by the viewer config.
pub mod startup_data;
