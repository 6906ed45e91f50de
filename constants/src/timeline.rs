/// Horizontal span of the curve; weeks map onto [-WEEK_SPAN / 2, WEEK_SPAN / 2].
pub const WEEK_SPAN: f32 = 10.0;

/// Vertical span of the curve; FVC maps onto [-FVC_SPAN / 2, FVC_SPAN / 2].
pub const FVC_SPAN: f32 = 5.0;

/// Translation applied to the whole curve, clear of the volume cube.
pub const ANCHOR: [f32; 3] = [-5.0, -3.0, 5.0];

/// Weeks between implicit prediction points.
pub const IMPLICIT_WEEK_STRIDE: u32 = 4;

/// Confidence assumed when a prediction carries none.
pub const DEFAULT_CONFIDENCE: f32 = 95.0;

/// Curve and marker colour (0x10b981).
pub const CURVE_RGB: [u8; 3] = [0x10, 0xb9, 0x81];

pub const MARKER_RADIUS: f32 = 0.1;
pub const MARKER_SEGMENTS: u32 = 8;

pub const LABEL_SIZE: [f32; 2] = [0.5, 0.3];
pub const LABEL_OFFSET_Y: f32 = 0.5;
pub const LABEL_OPACITY: f32 = 0.8;
