/// Ambient term relative to full white.
pub const AMBIENT_INTENSITY: f32 = 0.5;

pub const KEY_LIGHT_INTENSITY: f32 = 1.0;
pub const KEY_LIGHT_POSITION: [f32; 3] = [10.0, 10.0, 10.0];

pub const FILL_LIGHT_INTENSITY: f32 = 0.5;
pub const FILL_LIGHT_POSITION: [f32; 3] = [-10.0, -5.0, -10.0];

pub const POINT_LIGHT_INTENSITY: f32 = 0.5;
pub const POINT_LIGHT_POSITION: [f32; 3] = [0.0, 10.0, 0.0];

/// Scale from unit intensity to Bevy ambient brightness (cd/m^2).
pub const AMBIENT_BRIGHTNESS_SCALE: f32 = 500.0;

/// Scale from unit intensity to directional illuminance (lux).
pub const DIRECTIONAL_ILLUMINANCE_SCALE: f32 = 4000.0;

/// Scale from unit intensity to point light power (lumens).
pub const POINT_LUMENS_SCALE: f32 = 400_000.0;
