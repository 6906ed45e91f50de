//! Runtime systems outside any single scene category.
//!
//! Frame-rate reporting, native keyboard shortcuts and the ordered teardown
//! run when the app exits.

/// Keyboard shortcuts for exercising the engine without a host page.
///
/// Native builds only; the web build is driven over RPC instead.
pub mod dev_shortcuts;

/// FPS tracking and notification systems for performance monitoring.
///
/// Sends frame rate updates to the host via RPC and updates the native overlay.
pub mod fps_tracking;

/// Ordered scene teardown on `AppExit`.
pub mod shutdown;
