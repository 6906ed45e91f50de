/// Edge length of the synthetic cube used when a dataset is unusable.
pub const FALLBACK_EDGE: u32 = 64;

/// Seed for the synthetic volume generator.
pub const FALLBACK_SEED: u64 = 0x5EED_1F0C;

/// Display edge length of the volume bounding cube.
pub const CUBE_DISPLAY_SIZE: f32 = 10.0;

/// Normalised intensity at or below which a voxel is fully transparent.
pub const VISIBILITY_THRESHOLD: f32 = 0.1;

/// Per-channel multipliers applied to the normalised intensity.
pub const CHANNEL_SCALE: [f32; 3] = [255.0, 200.0, 150.0];

/// Default classification threshold passed to the shader.
pub const DEFAULT_ISOVALUE: f32 = 0.5;

/// Default intensity clamp range passed to the shader.
pub const DEFAULT_INTENSITY_CLAMP: [f32; 2] = [0.0, 1.0];

/// Samples taken along each view ray in the ray-march render style.
pub const RAY_MARCH_STEPS: u32 = 128;

/// Lower bounds of the transfer function bands, densest first.
pub const DENSE_TISSUE_THRESHOLD: f32 = 0.7;
pub const SOFT_TISSUE_THRESHOLD: f32 = 0.4;
pub const LIGHT_TISSUE_THRESHOLD: f32 = 0.1;

pub const DENSE_TISSUE_RGB: [f32; 3] = [1.0, 0.3, 0.2];
pub const SOFT_TISSUE_RGB: [f32; 3] = [1.0, 0.8, 0.4];
pub const LIGHT_TISSUE_RGB: [f32; 3] = [0.4, 0.6, 1.0];
pub const AIR_RGB: [f32; 3] = [0.1, 0.2, 0.4];

/// Opacity per unit of normalised intensity.
pub const ALPHA_PER_INTENSITY: f32 = 0.8;

/// Largest proxy texture extent on either axis. Deeper volumes drop slices
/// to fit; wider or taller slices fall back to the synthetic volume.
pub const MAX_PROXY_ROWS: u32 = 8192;
