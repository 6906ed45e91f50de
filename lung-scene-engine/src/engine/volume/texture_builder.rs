//! Volume proxy texture construction.
//!
//! A `w x h x d` grid becomes a `w x (h * d)` RGBA8 image with depth slices
//! stacked vertically: slice `z` occupies rows `[z * h, (z + 1) * h)`. Because
//! the samples arrive in x-fastest, then y, then z order, texel
//! `(x, z * h + y)` is sample `(z * h + y) * w + x`.

use bevy::asset::RenderAssetUsages;
use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use constants::volume::{CHANNEL_SCALE, FALLBACK_EDGE, MAX_PROXY_ROWS, VISIBILITY_THRESHOLD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::dataset::{VolumeError, VolumePayload, VolumeShape};
#[cfg(test)]
use super::transfer::classify_rgba;

/// Where a proxy volume's samples came from.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeSource {
    Dataset,
    /// Depth slices were dropped to fit the texture height limit.
    Decimated { stride: u32 },
    /// Synthetic substitute for a payload that could not be laid out.
    Fallback(VolumeError),
    Synthetic,
}

impl VolumeSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// CPU-side proxy texture ready for upload.
#[derive(Debug, Clone)]
pub struct ProxyVolume {
    pub shape: VolumeShape,
    /// Tightly packed RGBA8 texels, `texture_width * texture_height * 4` bytes.
    pub rgba: Vec<u8>,
    pub source: VolumeSource,
}

impl ProxyVolume {
    pub fn texture_width(&self) -> u32 {
        self.shape.width
    }

    pub fn texture_height(&self) -> u32 {
        self.shape.height * self.shape.depth
    }

    /// GPU image with linear filtering, as sampled by the volume material.
    pub fn to_image(&self) -> Image {
        let mut image = Image::new(
            Extent3d {
                width: self.texture_width(),
                height: self.texture_height(),
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            self.rgba.clone(),
            TextureFormat::Rgba8Unorm,
            RenderAssetUsages::RENDER_WORLD,
        );
        image.sampler = ImageSampler::linear();
        image
    }
}

/// CPU reference of the shader's sampling, used to check texture layout.
#[cfg(test)]
impl ProxyVolume {
    /// Texel at image column `column`, row `row`.
    fn texel_at_row(&self, column: u32, row: u32) -> [u8; 4] {
        let offset = (row as usize * self.shape.width as usize + column as usize) * 4;
        [
            self.rgba[offset],
            self.rgba[offset + 1],
            self.rgba[offset + 2],
            self.rgba[offset + 3],
        ]
    }

    /// Texel holding voxel `(x, y, z)`.
    fn texel(&self, x: u32, y: u32, z: u32) -> [u8; 4] {
        self.texel_at_row(x, z * self.shape.height + y)
    }

    /// Normalised texture coordinate of in-slice position `uv` on slice `slice`.
    /// `uv` spans texel centres, so `0` and `1` land on the first and last
    /// voxel of the slice and never on a neighbouring slice's boundary row.
    fn slice_texel_coordinate(&self, uv: Vec2, slice: u32) -> Vec2 {
        let (w, h) = (self.shape.width as f32, self.shape.height as f32);
        Vec2::new(
            (0.5 + uv.x * (w - 1.0)) / w,
            (slice as f32 * h + 0.5 + uv.y * (h - 1.0)) / (h * self.shape.depth as f32),
        )
    }

    /// Classify the slice-interpolated intensity at normalised coordinate
    /// `uvw`. Nearest texel within a slice.
    fn classify_at(&self, uvw: Vec3) -> [f32; 4] {
        let uvw = uvw.clamp(Vec3::ZERO, Vec3::ONE);

        let z = uvw.z * (self.shape.depth - 1) as f32;
        let z_index = z.floor() as u32;
        let z_frac = z - z_index as f32;

        let sample = |slice: u32| {
            let coordinate = self.slice_texel_coordinate(Vec2::new(uvw.x, uvw.y), slice);
            let column = (coordinate.x * self.texture_width() as f32).floor() as u32;
            let row = (coordinate.y * self.texture_height() as f32).floor() as u32;
            // Red carries the unscaled intensity.
            self.texel_at_row(column, row)[0] as f32 / 255.0
        };

        let lower = sample(z_index);
        let intensity = if z_index + 1 < self.shape.depth {
            lower + (sample(z_index + 1) - lower) * z_frac
        } else {
            lower
        };
        classify_rgba(intensity)
    }
}

/// Expand one 0-255 sample into RGBA8. Colour channels are truncated scaled
/// fractions of the normalised intensity; alpha gates out near-air voxels.
pub fn expand_intensity(sample: u8) -> [u8; 4] {
    let value = sample as f32 / 255.0;
    let channel = |scale: f32| -> u8 { (sample as f32 * scale / 255.0) as u8 };
    [
        channel(CHANNEL_SCALE[0]),
        channel(CHANNEL_SCALE[1]),
        channel(CHANNEL_SCALE[2]),
        if value > VISIBILITY_THRESHOLD { 255 } else { 0 },
    ]
}

/// Pseudo-random cube of intensities, reproducible for a given seed.
pub fn synthetic_samples(edge: u32, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = edge as usize * edge as usize * edge as usize;
    (0..count).map(|_| rng.r#gen::<u8>()).collect()
}

/// Lay out a payload as a proxy texture. Never fails: anything that cannot be
/// resolved produces the synthetic fallback cube.
pub fn build_proxy_volume(payload: &VolumePayload, seed: u64) -> ProxyVolume {
    if matches!(payload, VolumePayload::Synthetic) {
        return synthetic_volume(seed, VolumeSource::Synthetic);
    }

    match payload.resolve().and_then(check_slice_extent) {
        Ok((shape, samples)) => tile_samples(shape, samples),
        Err(error) => {
            warn!("Volume payload rejected ({error}); substituting synthetic volume");
            synthetic_volume(seed, VolumeSource::Fallback(error))
        }
    }
}

/// A single slice must fit the texture on its own; only depth is decimated.
fn check_slice_extent(
    (shape, samples): (VolumeShape, &[u8]),
) -> Result<(VolumeShape, &[u8]), VolumeError> {
    if shape.width > MAX_PROXY_ROWS || shape.height > MAX_PROXY_ROWS {
        return Err(VolumeError::TextureTooLarge(shape.to_array()));
    }
    Ok((shape, samples))
}

fn synthetic_volume(seed: u64, source: VolumeSource) -> ProxyVolume {
    let shape = VolumeShape::cube(FALLBACK_EDGE);
    let mut volume = tile_samples(shape, &synthetic_samples(FALLBACK_EDGE, seed));
    volume.source = source;
    volume
}

fn tile_samples(shape: VolumeShape, samples: &[u8]) -> ProxyVolume {
    let stride = depth_stride(shape);
    if stride == 1 {
        return ProxyVolume {
            shape,
            rgba: samples.iter().flat_map(|s| expand_intensity(*s)).collect(),
            source: VolumeSource::Dataset,
        };
    }

    let slice_len = shape.width as usize * shape.height as usize;
    let kept: Vec<&[u8]> = samples.chunks_exact(slice_len).step_by(stride as usize).collect();
    let decimated = VolumeShape {
        depth: kept.len() as u32,
        ..shape
    };
    warn!(
        "Volume {:?} exceeds {} texture rows; keeping every {} slice",
        shape.to_array(),
        MAX_PROXY_ROWS,
        stride
    );

    ProxyVolume {
        shape: decimated,
        rgba: kept
            .into_iter()
            .flatten()
            .flat_map(|s| expand_intensity(*s))
            .collect(),
        source: VolumeSource::Decimated { stride },
    }
}

/// Smallest slice stride that keeps the stacked height within [`MAX_PROXY_ROWS`].
fn depth_stride(shape: VolumeShape) -> u32 {
    let max_slices = (MAX_PROXY_ROWS / shape.height).max(1);
    shape.depth.div_ceil(max_slices).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::volume::dataset::VolumeDataset;

    fn dataset(samples: Vec<u8>, shape: [u32; 3]) -> VolumePayload {
        VolumePayload::Dataset(VolumeDataset {
            samples,
            shape: Some(shape),
            ..default()
        })
    }

    #[test]
    fn uniform_cube_expands_to_opaque_tissue_colour() {
        let volume = build_proxy_volume(&dataset(vec![200; 8], [2, 2, 2]), 1);

        assert_eq!(volume.source, VolumeSource::Dataset);
        assert_eq!((volume.texture_width(), volume.texture_height()), (2, 4));
        assert_eq!(volume.rgba.len(), 2 * 4 * 4);
        for texel in volume.rgba.chunks_exact(4) {
            assert_eq!(texel, &[200, 156, 117, 255]);
        }
    }

    #[test]
    fn slices_stack_vertically_without_loss() {
        let (w, h, d) = (3u32, 2u32, 4u32);
        let samples: Vec<u8> = (0..(w * h * d)).map(|i| (i * 7 % 256) as u8).collect();
        let volume = build_proxy_volume(&dataset(samples.clone(), [w, h, d]), 1);

        assert_eq!(volume.texture_width(), w);
        assert_eq!(volume.texture_height(), h * d);
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    let index = ((z * h + y) * w + x) as usize;
                    assert_eq!(volume.texel_at_row(x, z * h + y), expand_intensity(samples[index]));
                    assert_eq!(volume.texel(x, y, z)[0], samples[index]);
                }
            }
        }
    }

    #[test]
    fn alpha_gates_near_air_samples() {
        assert_eq!(expand_intensity(0), [0, 0, 0, 0]);
        assert_eq!(expand_intensity(25)[3], 0);
        assert_eq!(expand_intensity(26)[3], 255);
        assert_eq!(expand_intensity(255), [255, 200, 150, 255]);
    }

    #[test]
    fn mismatched_sample_count_falls_back_to_synthetic_cube() {
        let volume = build_proxy_volume(&dataset(vec![1, 2, 3], [2, 2, 2]), 9);

        assert!(volume.source.is_fallback());
        assert_eq!(volume.shape, VolumeShape::cube(FALLBACK_EDGE));
        assert_eq!(volume.texture_height(), FALLBACK_EDGE * FALLBACK_EDGE);
        assert_eq!(
            volume.rgba.len(),
            (FALLBACK_EDGE * FALLBACK_EDGE * FALLBACK_EDGE * 4) as usize
        );
    }

    #[test]
    fn unrecognised_payloads_fall_back_as_well() {
        let volume = build_proxy_volume(&VolumePayload::Unrecognised, 9);
        assert_eq!(volume.source, VolumeSource::Fallback(VolumeError::Unrecognised));
        assert_eq!(volume.shape, VolumeShape::cube(FALLBACK_EDGE));
    }

    #[test]
    fn fallback_is_reproducible_for_a_seed() {
        assert_eq!(synthetic_samples(8, 42), synthetic_samples(8, 42));
        assert_ne!(synthetic_samples(8, 42), synthetic_samples(8, 43));
    }

    #[test]
    fn tall_volumes_are_decimated_along_depth() {
        let (w, h, d) = (1u32, 4096u32, 5u32);
        let samples: Vec<u8> = (0..d)
            .flat_map(|z| std::iter::repeat(z as u8 * 40).take((w * h) as usize))
            .collect();
        let volume = build_proxy_volume(&dataset(samples, [w, h, d]), 1);

        assert_eq!(volume.source, VolumeSource::Decimated { stride: 3 });
        assert_eq!(volume.shape.depth, 2);
        assert!(volume.texture_height() <= MAX_PROXY_ROWS);
        assert_eq!(volume.texel(0, 0, 0)[0], 0);
        assert_eq!(volume.texel(0, 0, 1)[0], 120);
    }

    #[test]
    fn depth_interpolation_blends_adjacent_slices() {
        // Slice 0 is air, slice 1 is dense: the midpoint lands in the soft band.
        let volume = build_proxy_volume(&dataset(vec![0, 0, 0, 0, 255, 255, 255, 255], [2, 2, 2]), 1);

        let bottom = volume.classify_at(Vec3::new(0.0, 0.0, 0.0));
        let middle = volume.classify_at(Vec3::new(0.0, 0.0, 0.5));
        let top = volume.classify_at(Vec3::new(1.0, 1.0, 1.0));

        assert_eq!(bottom[3], 0.0);
        assert_eq!(&middle[..3], &constants::volume::SOFT_TISSUE_RGB);
        assert_eq!(&top[..3], &constants::volume::DENSE_TISSUE_RGB);
    }

    #[test]
    fn slices_taller_than_the_texture_limit_fall_back() {
        let shape = [1, MAX_PROXY_ROWS + 1, 2];
        let volume = build_proxy_volume(&dataset(vec![90; 2 * (MAX_PROXY_ROWS as usize + 1)], shape), 1);

        assert_eq!(volume.source, VolumeSource::Fallback(VolumeError::TextureTooLarge(shape)));
        assert!(volume.texture_width() <= MAX_PROXY_ROWS);
        assert!(volume.texture_height() <= MAX_PROXY_ROWS);
    }

    #[test]
    fn slices_wider_than_the_texture_limit_fall_back() {
        let volume = build_proxy_volume(&dataset(vec![90; 9000], [9000, 1, 1]), 1);

        assert!(volume.source.is_fallback());
        assert!(volume.texture_width() <= MAX_PROXY_ROWS);
        assert!(volume.texture_height() <= MAX_PROXY_ROWS);
    }

    #[test]
    fn slice_coordinates_land_on_texel_centres_of_their_own_slice() {
        let volume = build_proxy_volume(&dataset(vec![0, 0, 0, 0, 255, 255, 255, 255], [2, 2, 2]), 1);

        // 2 x 4 texture: slice 1 covers rows 2 and 3.
        let first = volume.slice_texel_coordinate(Vec2::ZERO, 1) * Vec2::new(2.0, 4.0);
        let last = volume.slice_texel_coordinate(Vec2::ONE, 1) * Vec2::new(2.0, 4.0);
        assert_eq!(first, Vec2::new(0.5, 2.5));
        assert_eq!(last, Vec2::new(1.5, 3.5));

        let top_corner = volume.classify_at(Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(&top_corner[..3], &constants::volume::DENSE_TISSUE_RGB);
    }
}
