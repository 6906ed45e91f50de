//! JSON-RPC 2.0 bridge to the embedding web page.
//!
//! Implements bidirectional messaging between the engine and its host page
//! via iframe postMessage, supporting both request-response and notification
//! patterns.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Engine (iframe)
//!        │                                          │
//!        ├─ Request (with ID) ────────────────────> │
//!        │                                          ├─ Apply scene command
//!        │ <─────────────────── Response (with ID) ─┤
//!        │                                          │
//!        │ <──────────── Notification (no ID) ──────┤
//! ```
//!
//! `set_volume` replies once the volume has actually been built, so the
//! response carries the attached shape and whether the fallback was used.
//! Every other method replies in the frame it arrives.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32700`: Parse error
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//!
//! ## Methods
//!
//! ### Scene data
//! - `set_volume`: Dataset object, bare sample array, or `null` to remove
//! - `set_predictions`: `{ "predictions": [...] }` or a bare array
//!
//! ### Session
//! - `session_start` / `session_end`: Immersive display lifecycle
//!
//! ### Queries
//! - `get_scene_state`: Session mode and attached categories
//! - `get_fps`: Current smoothed frame rate
//!
//! ### Lifecycle
//! - `shutdown`: Request app exit and ordered teardown
//!
//! ## Notifications
//!
//! `volume_ready`, `predictions_ready`, `session_mode_changed`, `fps_update`.

/// JSON-RPC 2.0 bidirectional communication system for host integration.
///
/// Handles request dispatch, deferred replies, notifications, and the WASM
/// message listener.
pub mod web_rpc;
