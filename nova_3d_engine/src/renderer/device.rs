/// GraphicsDevice trait - backend factory for all GPU resources

use std::sync::Arc;
use crate::error::Result;
use crate::renderer::{
    Buffer, BufferDesc, CommandList, Pipeline, PipelineDesc, Shader, ShaderDesc,
    ShaderView, SwapChain, Texture, TextureDesc,
};

/// Factory trait implemented by rendering backends
///
/// One device exists per engine instance. It owns the GPU device, the
/// immediate submission queue, and the window surface it was created
/// against; every other GPU object is created through it and must be
/// dropped before the device itself.
///
/// Backend entry points (dynamic library function tables) are resolved once
/// per process on first device creation, not per device.
pub trait GraphicsDevice: Send + Sync {
    /// Create a texture
    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a shader-readable view over a texture
    ///
    /// Fails with `Error::InvalidResource` if the texture was not created
    /// with a sampled usage.
    fn create_shader_view(&self, texture: &Arc<dyn Texture>) -> Result<Arc<dyn ShaderView>>;

    /// Create a buffer with initial contents
    ///
    /// `data` must be exactly `desc.size` bytes.
    fn create_buffer(&self, desc: &BufferDesc, data: &[u8]) -> Result<Arc<dyn Buffer>>;

    /// Load a compiled shader stage
    fn create_shader(&self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>>;

    /// Create a graphics pipeline
    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Create the swap chain for the window this device was created against
    ///
    /// Called once; subsequent size changes go through `SwapChain::resize`.
    fn create_swap_chain(&self, width: u32, height: u32) -> Result<Box<dyn SwapChain>>;

    /// Create a command list for recording one frame
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Execute a recorded command list and wait for completion
    fn submit(&self, cmd_list: &mut dyn CommandList) -> Result<()>;

    /// Block until the GPU is idle (teardown barrier)
    fn wait_idle(&self) -> Result<()>;
}
