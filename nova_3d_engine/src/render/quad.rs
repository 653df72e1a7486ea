/// Full-screen quad used by the lighting and post-process passes

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::render::effect::{Effect, PassId, ShadingPass};
use crate::renderer::{
    Buffer, BufferDesc, BufferUsage, CommandList, GraphicsDevice, IndexType,
    Pipeline, PipelineDesc, VertexAttribute, VertexFormat, VertexLayout,
};

/// Two-triangle quad covering the full viewport
///
/// Vertices carry clip-space position and texcoord only. Like a mesh, the
/// quad keeps its own pass-keyed pipeline cache since the post-process
/// passes have a different vertex signature than the geometry passes.
pub struct Quad {
    vertex_buffer: Arc<dyn Buffer>,
    index_buffer: Arc<dyn Buffer>,
    vertex_layout: VertexLayout,
    pipelines: Mutex<FxHashMap<PassId, Arc<dyn Pipeline>>>,
}

impl Quad {
    /// Upload the quad geometry
    pub fn create(device: &Arc<dyn GraphicsDevice>) -> Result<Self> {
        // x, y, u, v
        let vertices: [f32; 16] = [
            -1.0, -1.0, 0.0, 1.0,
             1.0, -1.0, 1.0, 1.0,
             1.0,  1.0, 1.0, 0.0,
            -1.0,  1.0, 0.0, 0.0,
        ];
        let indices: [u32; 6] = [0, 1, 2, 0, 2, 3];

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
        let vertex_buffer = device.create_buffer(
            &BufferDesc {
                usage: BufferUsage::Vertex,
                size: vertex_bytes.len() as u64,
            },
            vertex_bytes,
        )?;

        let index_bytes: &[u8] = bytemuck::cast_slice(&indices);
        let index_buffer = device.create_buffer(
            &BufferDesc {
                usage: BufferUsage::Index,
                size: index_bytes.len() as u64,
            },
            index_bytes,
        )?;

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_layout: VertexLayout {
                stride: 16,
                attributes: vec![
                    VertexAttribute { location: 0, format: VertexFormat::Float32x2, offset: 0 },
                    VertexAttribute { location: 1, format: VertexFormat::Float32x2, offset: 8 },
                ],
            },
            pipelines: Mutex::new(FxHashMap::default()),
        })
    }

    /// Draw the quad through a shading pass
    pub fn render(
        &self,
        device: &Arc<dyn GraphicsDevice>,
        cmd: &mut dyn CommandList,
        effect: &Effect,
        pass: &ShadingPass,
    ) -> Result<()> {
        let pipeline = self.pipeline_for(device, pass)?;
        cmd.bind_vertex_buffer(&self.vertex_buffer, 0)?;
        cmd.bind_index_buffer(&self.index_buffer, 0, IndexType::U32)?;
        effect.apply_pass(cmd, pass, &pipeline)?;
        cmd.draw_indexed(6, 0, 0)
    }

    fn pipeline_for(
        &self,
        device: &Arc<dyn GraphicsDevice>,
        pass: &ShadingPass,
    ) -> Result<Arc<dyn Pipeline>> {
        let mut cache = self.pipelines.lock().unwrap();
        if let Some(pipeline) = cache.get(&pass.id) {
            return Ok(pipeline.clone());
        }

        crate::engine_debug!("nova3d::Quad", "Building pipeline for pass '{}'", pass.name);
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
