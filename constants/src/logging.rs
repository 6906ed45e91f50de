/// Default `tracing` filter. wgpu is noisy at info level.
pub const LOG_FILTER: &str = "wgpu=error,naga=warn,bevy_render=info,lung_scene_engine=debug";

/// Seconds between `fps_update` notifications.
pub const FPS_NOTIFY_INTERVAL_SECS: f32 = 0.5;
