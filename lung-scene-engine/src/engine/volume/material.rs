use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::render::mesh::MeshVertexBufferLayoutRef;
use bevy::render::render_resource::{
    AsBindGroup, Face, RenderPipelineDescriptor, ShaderRef, ShaderType,
    SpecializedMeshPipelineError,
};
use bevy::{prelude::*, reflect::TypePath};
use constants::volume::CUBE_DISPLAY_SIZE;

use super::dataset::VolumeShape;

pub const VOLUME_SHADER_PATH: &str = "shaders/volume_raycast.wgsl";

/// Fragment stage selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    /// One depth-weighted sample per fragment.
    #[default]
    DepthWeighted = 0,
    /// Front-to-back accumulation along the view ray.
    RayMarch = 1,
}

impl RenderStyle {
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => Self::RayMarch,
            _ => Self::DepthWeighted,
        }
    }
}

/// Uniform block read by `volume_raycast.wgsl`. Field order matches the WGSL struct.
#[derive(Debug, Clone, Copy, ShaderType)]
pub struct VolumeUniform {
    /// Voxel extents (width, height, depth).
    pub size: Vec3,
    pub isovalue: f32,
    /// Intensity clamp range.
    pub clim: Vec2,
    pub render_style: u32,
    pub steps: u32,
    /// Edge length of the bounding cube in local units.
    pub cube_size: f32,
}

impl VolumeUniform {
    pub fn new(
        shape: VolumeShape,
        isovalue: f32,
        clim: [f32; 2],
        render_style: RenderStyle,
        steps: u32,
    ) -> Self {
        Self {
            size: shape.as_vec3(),
            isovalue,
            clim: Vec2::from(clim),
            render_style: render_style as u32,
            steps: steps.max(1),
            cube_size: CUBE_DISPLAY_SIZE,
        }
    }
}

/// Tiled-proxy volume material. Only back faces are drawn, blended over the scene.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct VolumeMaterial {
    #[uniform(0)]
    pub params: VolumeUniform,

    #[texture(1)]
    #[sampler(2)]
    pub volume: Handle<Image>,
}

impl Material for VolumeMaterial {
    fn vertex_shader() -> ShaderRef {
        VOLUME_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        VOLUME_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Blend
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_NORMAL.at_shader_location(1),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        // Cull the near faces so the interior is shaded from the far side.
        descriptor.primitive.cull_mode = Some(Face::Front);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_render_styles_use_the_single_sample_path() {
        assert_eq!(RenderStyle::from_index(0), RenderStyle::DepthWeighted);
        assert_eq!(RenderStyle::from_index(1), RenderStyle::RayMarch);
        assert_eq!(RenderStyle::from_index(7), RenderStyle::DepthWeighted);
    }

    #[test]
    fn uniform_carries_shape_and_never_zero_steps() {
        let uniform = VolumeUniform::new(
            VolumeShape {
                width: 4,
                height: 5,
                depth: 6,
            },
            0.5,
            [0.0, 1.0],
            RenderStyle::RayMarch,
            0,
        );
        assert_eq!(uniform.size, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(uniform.steps, 1);
        assert_eq!(uniform.render_style, 1);
        assert_eq!(uniform.cube_size, CUBE_DISPLAY_SIZE);
    }
}
