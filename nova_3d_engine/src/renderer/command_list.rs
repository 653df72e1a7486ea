/// CommandList trait - for recording rendering commands

use std::sync::Arc;
use crate::error::Result;
use crate::renderer::{Buffer, IndexType, Pipeline, ShaderView, Texture};

/// Load operation for a color target at the start of a target pass
#[derive(Debug, Clone, Copy)]
pub enum ColorLoadOp {
    /// Clear the target to the given RGBA color
    Clear([f32; 4]),
    /// Keep the existing contents (additive accumulation path)
    Load,
}

/// Load operation for the depth target at the start of a target pass
#[derive(Debug, Clone, Copy)]
pub enum DepthLoadOp {
    /// Clear to far depth / zero stencil
    Clear { depth: f32, stencil: u32 },
    /// Keep the existing contents
    Load,
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport with the standard 0..1 depth range
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Command list for recording one frame of rendering commands
///
/// Commands are recorded and later executed via `GraphicsDevice::submit()`.
/// A target pass is the bind-targets unit: everything drawn between
/// `begin_target_pass` and `end_target_pass` goes to that target set, and a
/// target must not be sampled while its pass is open.
pub trait CommandList {
    /// Begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Bind a set of color targets plus an optional depth target as the
    /// active render output, replacing whatever was previously bound
    ///
    /// # Arguments
    ///
    /// * `color_targets` - Color targets, bound at slots 0..N
    /// * `color_ops` - Per-target load operation (same length as targets)
    /// * `depth_target` - Optional depth/stencil target
    /// * `depth_op` - Load operation for the depth target
    fn begin_target_pass(
        &mut self,
        color_targets: &[Arc<dyn Texture>],
        color_ops: &[ColorLoadOp],
        depth_target: Option<&Arc<dyn Texture>>,
        depth_op: DepthLoadOp,
    ) -> Result<()>;

    /// Unbind the current target set
    fn end_target_pass(&mut self) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Bind shader views at fragment texture slots 0..N for the next draws
    fn bind_shader_views(&mut self, views: &[Arc<dyn ShaderView>]) -> Result<()>;

    /// Push the pass constant block, visible to both shader stages
    fn push_constants(&mut self, data: &[u8]) -> Result<()>;

    /// Bind a vertex buffer
    ///
    /// # Arguments
    ///
    /// * `buffer` - Buffer to bind
    /// * `offset` - Offset into the buffer in bytes
    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()>;

    /// Bind an index buffer
    ///
    /// # Arguments
    ///
    /// * `buffer` - Buffer to bind
    /// * `offset` - Offset into the buffer in bytes
    /// * `index_type` - Type of indices (U16 or U32)
    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()>;

    /// Draw vertices
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Draw indexed vertices
    ///
    /// # Arguments
    ///
    /// * `index_count` - Number of indices to draw
    /// * `first_index` - Index of first index
    /// * `vertex_offset` - Value added to each index before fetching
    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()>;
}
