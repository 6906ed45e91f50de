/// Vertical field of view in degrees.
pub const FIELD_OF_VIEW_DEGREES: f32 = 75.0;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;

/// Initial camera position, above and behind the origin.
pub const INITIAL_POSITION: [f32; 3] = [0.0, 5.0, 25.0];

/// Fraction of remaining motion removed per 60 Hz frame.
pub const ORBIT_DAMPING: f32 = 0.05;

pub const ORBIT_MIN_DISTANCE: f32 = 2.0;
pub const ORBIT_MAX_DISTANCE: f32 = 100.0;

pub const ORBIT_ROTATE_SPEED: f32 = 0.005;
pub const ORBIT_PAN_SPEED: f32 = 0.0025;
pub const ORBIT_ZOOM_STEP: f32 = 0.95;

/// Pitch is kept just short of the poles so the up vector stays defined.
pub const ORBIT_PITCH_LIMIT: f32 = 1.55;

/// Scene clear colour (0x0a0a0a).
pub const BACKGROUND_RGB: [u8; 3] = [0x0a, 0x0a, 0x0a];
