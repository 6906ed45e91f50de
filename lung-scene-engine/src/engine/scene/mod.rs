//! Scene graph ownership.
//!
//! Owns the camera, light rig and reference grid, and mediates every
//! attach and detach of data-driven objects through the category registry.

/// Ground grid and axis marker line meshes.
pub mod grid;

/// Category-exclusive registry of live objects and their disposal.
///
/// Guarantees at most one attached object per category and frees the GPU
/// assets of whatever it replaces.
pub mod registry;

/// Camera, lighting and viewport setup.
pub mod rig;
