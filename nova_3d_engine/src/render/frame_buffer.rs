/// FrameBuffer - a bindable set of color targets plus one depth target
///
/// All targets share identical dimensions, fixed at creation. A resize
/// never mutates a frame buffer; the engine drops and recreates all of its
/// frame buffers together.

use std::sync::Arc;

use crate::engine_bail;
use crate::error::Result;
use crate::renderer::{
    ColorLoadOp, CommandList, DepthLoadOp, GraphicsDevice, ShaderView, Texture,
    TextureDesc, TextureFormat, TextureUsage,
};

/// Pixel format of offscreen color targets
pub const COLOR_TARGET_FORMAT: TextureFormat = TextureFormat::R8G8B8A8_UNORM;

/// Pixel format of depth targets
pub const DEPTH_TARGET_FORMAT: TextureFormat = TextureFormat::D32_FLOAT;

/// A set of color render targets plus one depth target
///
/// Offscreen color targets are created shader-readable so later passes can
/// sample them; read views are created lazily on first request and cached.
/// A frame buffer may instead wrap the swap-chain back buffer as its single
/// color target, in which case it still owns its depth target but the color
/// target can never be read back.
pub struct FrameBuffer {
    device: Arc<dyn GraphicsDevice>,
    width: u32,
    height: u32,
    color_targets: Vec<Arc<dyn Texture>>,
    depth_target: Arc<dyn Texture>,
    shader_views: Vec<Option<Arc<dyn ShaderView>>>,
    /// False when the color target is the externally-owned back buffer
    owns_color_targets: bool,
}

impl FrameBuffer {
    /// Create a frame buffer with `color_target_count` offscreen color
    /// targets and one depth target, all sized `width` x `height`
    pub fn create(
        device: Arc<dyn GraphicsDevice>,
        width: u32,
        height: u32,
        color_target_count: u32,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            engine_bail!("nova3d::FrameBuffer",
                "create: degenerate dimensions {}x{}", width, height);
        }
        if color_target_count == 0 {
            engine_bail!("nova3d::FrameBuffer", "create: at least one color target required");
        }

        let mut color_targets = Vec::with_capacity(color_target_count as usize);
        for _ in 0..color_target_count {
            color_targets.push(device.create_texture(&TextureDesc {
                width,
                height,
                format: COLOR_TARGET_FORMAT,
                usage: TextureUsage::SampledAndRenderTarget,
                data: None,
            })?);
        }
        let depth_target = Self::create_depth_target(&device, width, height)?;

        let shader_views = vec![None; color_target_count as usize];
        Ok(Self {
            device,
            width,
            height,
            color_targets,
            depth_target,
            shader_views,
            owns_color_targets: true,
        })
    }

    /// Create a frame buffer wrapping an externally-owned back buffer as its
    /// single color target; a private depth target is still allocated
    pub fn create_from_back_buffer(
        device: Arc<dyn GraphicsDevice>,
        back_buffer: Arc<dyn Texture>,
    ) -> Result<Self> {
        let info = back_buffer.info();
        let (width, height) = (info.width, info.height);
        if width == 0 || height == 0 {
            engine_bail!("nova3d::FrameBuffer",
                "create_from_back_buffer: degenerate back buffer {}x{}", width, height);
        }
        let depth_target = Self::create_depth_target(&device, width, height)?;
        Ok(Self {
            device,
            width,
            height,
            color_targets: vec![back_buffer],
            depth_target,
            shader_views: vec![None],
            owns_color_targets: false,
        })
    }

    fn create_depth_target(
        device: &Arc<dyn GraphicsDevice>,
        width: u32,
        height: u32,
    ) -> Result<Arc<dyn Texture>> {
        device.create_texture(&TextureDesc {
            width,
            height,
            format: DEPTH_TARGET_FORMAT,
            usage: TextureUsage::DepthStencil,
            data: None,
        })
    }

    /// Bind all color targets plus the depth target as the active render
    /// output, starting a target pass on `cmd`
    ///
    /// # Arguments
    ///
    /// * `clear` - `Some(color)` clears every color target to the color and
    ///   depth to far/zero; `None` keeps existing contents so a later pass
    ///   can accumulate into the same targets
    pub fn bind(&self, cmd: &mut dyn CommandList, clear: Option<[f32; 4]>) -> Result<()> {
        let (color_op, depth_op) = match clear {
            Some(color) => (
                ColorLoadOp::Clear(color),
                DepthLoadOp::Clear { depth: 1.0, stencil: 0 },
            ),
            None => (ColorLoadOp::Load, DepthLoadOp::Load),
        };
        let color_ops = vec![color_op; self.color_targets.len()];
        cmd.begin_target_pass(
            &self.color_targets,
            &color_ops,
            Some(&self.depth_target),
            depth_op,
        )
    }

    /// Lazily create, cache, and return the read view for color target
    /// `index`, so a later pass can sample this frame buffer's output
    ///
    /// Fails with `InvalidResource` on a back-buffer-wrapping frame buffer
    /// (the swap-chain target is never read back) or an out-of-range index.
    pub fn shader_view(&mut self, index: usize) -> Result<Arc<dyn ShaderView>> {
        if !self.owns_color_targets {
            engine_bail!("nova3d::FrameBuffer",
                "shader_view: the swap-chain back buffer cannot be sampled");
        }
        if index >= self.color_targets.len() {
            engine_bail!("nova3d::FrameBuffer",
                "shader_view: target index {} out of range ({} targets)",
                index, self.color_targets.len());
        }
        if let Some(view) = &self.shader_views[index] {
            return Ok(view.clone());
        }
        let view = self.device.create_shader_view(&self.color_targets[index])?;
        self.shader_views[index] = Some(view.clone());
        Ok(view)
    }

    /// Width in pixels shared by all targets
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels shared by all targets
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of color targets
    pub fn color_target_count(&self) -> usize {
        self.color_targets.len()
    }

    /// Color target at `index`, if in range
    pub fn color_target(&self, index: usize) -> Option<&Arc<dyn Texture>> {
        self.color_targets.get(index)
    }

    /// The depth target
    pub fn depth_target(&self) -> &Arc<dyn Texture> {
        &self.depth_target
    }
}

#[cfg(test)]
#[path = "frame_buffer_tests.rs"]
mod tests;
