/// Renderable static mesh with a pass-keyed pipeline cache
///
/// A mesh owns its vertex/index buffers and material constants. Pipelines
/// are pass-signature-specific, so the mesh creates one lazily per shading
/// pass it is first rendered with and caches it keyed by pass identity.

use std::sync::{Arc, Mutex};

use glam::Vec4;
use rustc_hash::FxHashMap;

use crate::engine_bail;
use crate::error::Result;
use crate::render::effect::{Effect, PassId, ShadingPass};
use crate::renderer::{
    Buffer, BufferDesc, BufferUsage, CommandList, GraphicsDevice, IndexType,
    Pipeline, PipelineDesc, ShaderView, TextureDesc, TextureFormat, TextureUsage,
    VertexAttribute, VertexFormat, VertexLayout,
};

/// Floats per interleaved vertex: position (3) + normal (3) + texcoord (2)
pub const VERTEX_FLOATS: usize = 8;

/// Bytes per interleaved vertex
pub const VERTEX_STRIDE: u32 = (VERTEX_FLOATS * 4) as u32;

/// Material constants of the deferred shading model
#[derive(Clone)]
pub struct Material {
    /// Base color
    pub albedo: Vec4,
    /// Metalness scalar
    pub metalness: f32,
    /// Glossiness scalar
    pub glossiness: f32,
    /// Optional albedo texture view
    pub albedo_map: Option<Arc<dyn ShaderView>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vec4::new(0.58, 0.58, 0.58, 1.0),
            metalness: 0.02,
            glossiness: 0.04,
            albedo_map: None,
        }
    }
}

impl Material {
    /// Load an albedo map from a raw RGBA8 pixel file
    ///
    /// A missing or short file is not fatal: the material proceeds without a
    /// texture and the mesh renders with its color constants only.
    pub fn load_albedo_map(
        &mut self,
        device: &Arc<dyn GraphicsDevice>,
        path: &str,
        width: u32,
        height: u32,
    ) {
        let expected = (width as usize) * (height as usize) * 4;
        let data = match std::fs::read(path) {
            Ok(data) if data.len() == expected => data,
            Ok(data) => {
                crate::engine_warn!("nova3d::Material",
                    "Texture '{}' has {} bytes, expected {}; continuing without it",
                    path, data.len(), expected);
                return;
            }
            Err(e) => {
                crate::engine_warn!("nova3d::Material",
                    "Failed to read texture '{}': {}; continuing without it", path, e);
                return;
            }
        };

        let loaded = device
            .create_texture(&TextureDesc {
                width,
                height,
                format: TextureFormat::R8G8B8A8_UNORM,
                usage: TextureUsage::Sampled,
                data: Some(data),
            })
            .and_then(|texture| device.create_shader_view(&texture));
        match loaded {
            Ok(view) => self.albedo_map = Some(view),
            Err(e) => {
                crate::engine_warn!("nova3d::Material",
                    "Failed to upload texture '{}': {}; continuing without it", path, e);
            }
        }
    }
}

/// GPU-resident static mesh
pub struct StaticMesh {
    vertex_buffer: Arc<dyn Buffer>,
    index_buffer: Arc<dyn Buffer>,
    index_count: u32,
    material: Material,
    vertex_layout: VertexLayout,
    /// Albedo slot binding when the material has no texture
    fallback_map: Arc<dyn ShaderView>,
    /// Pipelines created so far, keyed by pass identity
    pipelines: Mutex<FxHashMap<PassId, Arc<dyn Pipeline>>>,
}

impl StaticMesh {
    /// Upload an interleaved vertex stream and 32-bit indices
    ///
    /// # Arguments
    ///
    /// * `vertices` - Interleaved position/normal/texcoord floats, 8 per vertex
    /// * `indices` - Triangle list indices
    /// * `material` - Material constants and optional texture
    pub fn create(
        device: &Arc<dyn GraphicsDevice>,
        vertices: &[f32],
        indices: &[u32],
        material: Material,
    ) -> Result<Self> {
        if vertices.is_empty() || vertices.len() % VERTEX_FLOATS != 0 {
            engine_bail!("nova3d::StaticMesh",
                "create: vertex stream of {} floats is not a whole number of vertices",
                vertices.len());
        }
        if indices.is_empty() || indices.len() % 3 != 0 {
            engine_bail!("nova3d::StaticMesh",
                "create: {} indices is not a whole number of triangles", indices.len());
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let vertex_buffer = device.create_buffer(
            &BufferDesc {
                usage: BufferUsage::Vertex,
                size: vertex_bytes.len() as u64,
            },
            vertex_bytes,
        )?;

        let index_bytes: &[u8] = bytemuck::cast_slice(indices);
        let index_buffer = device.create_buffer(
            &BufferDesc {
                usage: BufferUsage::Index,
                size: index_bytes.len() as u64,
            },
            index_bytes,
        )?;

        // 1x1 white pixel keeps the albedo slot bound for untextured draws
        let fallback_texture = device.create_texture(&TextureDesc {
            width: 1,
            height: 1,
            format: TextureFormat::R8G8B8A8_UNORM,
            usage: TextureUsage::Sampled,
            data: Some(vec![255, 255, 255, 255]),
        })?;
        let fallback_map = device.create_shader_view(&fallback_texture)?;

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            material,
            vertex_layout: Self::vertex_layout(),
            fallback_map,
            pipelines: Mutex::new(FxHashMap::default()),
        })
    }

    /// Layout of the interleaved vertex stream
    fn vertex_layout() -> VertexLayout {
        VertexLayout {
            stride: VERTEX_STRIDE,
            attributes: vec![
                VertexAttribute { location: 0, format: VertexFormat::Float32x3, offset: 0 },
                VertexAttribute { location: 1, format: VertexFormat::Float32x3, offset: 12 },
                VertexAttribute { location: 2, format: VertexFormat::Float32x2, offset: 24 },
            ],
        }
    }

    /// Number of indices drawn per render
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Material constants
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Number of distinct passes this mesh has built pipelines for
    pub fn cached_pipeline_count(&self) -> usize {
        self.pipelines.lock().unwrap().len()
    }

    /// Render the mesh through a shading pass: set material constants, bind
    /// buffers and the pass-keyed pipeline, apply the pass, and issue one
    /// indexed draw over the full index buffer
    pub fn render(
        &self,
        device: &Arc<dyn GraphicsDevice>,
        cmd: &mut dyn CommandList,
        effect: &mut Effect,
        pass: &ShadingPass,
    ) -> Result<()> {
        effect.set_vec4("g_albedo_clr", self.material.albedo);
        effect.set_f32("g_metalness_clr", self.material.metalness);
        effect.set_f32("g_glossiness_clr", self.material.glossiness);
        match &self.material.albedo_map {
            Some(view) => {
                effect.set_u32("g_albedo_map_enabled", 1);
                effect.set_texture("g_albedo_tex", view.clone());
            }
            None => {
                effect.set_u32("g_albedo_map_enabled", 0);
                effect.set_texture("g_albedo_tex", self.fallback_map.clone());
            }
        }

        let pipeline = self.pipeline_for(device, pass)?;
        cmd.bind_vertex_buffer(&self.vertex_buffer, 0)?;
        cmd.bind_index_buffer(&self.index_buffer, 0, IndexType::U32)?;
        effect.apply_pass(cmd, pass, &pipeline)?;
        cmd.draw_indexed(self.index_count, 0, 0)
    }

    /// Return the cached pipeline for the pass, creating it on first use
    fn pipeline_for(
        &self,
        device: &Arc<dyn GraphicsDevice>,
        pass: &ShadingPass,
    ) -> Result<Arc<dyn Pipeline>> {
        let mut cache = self.pipelines.lock().unwrap();
        if let Some(pipeline) = cache.get(&pass.id) {
            return Ok(pipeline.clone());
        }

        crate::engine_debug!("nova3d::StaticMesh",
            "Building pipeline for pass '{}'", pass.name);
        let pipeline = device.create_pipeline(&PipelineDesc {
            vertex_shader: pass.vertex_shader.clone(),
            fragment_shader: pass.fragment_shader.clone(),
            vertex_layout: self.vertex_layout.clone(),
            topology: pass.topology,
            rasterization: pass.rasterization,
            depth_stencil: pass.depth_stencil,
            color_blend: pass.color_blend,
            color_formats: pass.color_formats.clone(),
            depth_format: pass.depth_format,
            constant_block_size: pass.constant_block_size(),
            constant_stages: pass.constant_stages(),
            texture_slot_count: pass.textures.len() as u32,
        })?;
        cache.insert(pass.id, pipeline.clone());
        Ok(pipeline)
    }
}

#[cfg(test)]
#[path = "renderable_tests.rs"]
mod tests;
