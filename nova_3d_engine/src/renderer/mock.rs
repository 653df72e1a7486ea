/// Mock graphics device for unit tests (no GPU required)
///
/// Records every factory call and recorded command into a shared log so
/// tests can assert the exact sequence the engine produces. Resources get
/// monotonically increasing ids, which lets tests check identity changes
/// across resizes.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::engine_bail;
use crate::error::{Error, Result};
use crate::renderer::{
    Buffer, BufferDesc, BufferUsage, ColorLoadOp, CommandList, DepthLoadOp,
    GraphicsDevice, IndexType, Pipeline, PipelineDesc, Shader, ShaderDesc,
    ShaderStage, ShaderView, SwapChain, Texture, TextureDesc, TextureFormat,
    TextureInfo, TextureUsage, Viewport, SWAP_CHAIN_BUFFER_COUNT,
};

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub id: u64,
    pub info: TextureInfo,
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

#[derive(Debug)]
pub struct MockShaderView {
    pub texture_id: u64,
    pub info: TextureInfo,
}

impl ShaderView for MockShaderView {
    fn texture_info(&self) -> &TextureInfo {
        &self.info
    }
}

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub usage: BufferUsage,
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }
}

#[derive(Debug)]
pub struct MockShader {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub path: String,
}

impl Shader for MockShader {
    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn entry_point(&self) -> &str {
        &self.entry_point
    }
}

#[derive(Debug)]
pub struct MockPipeline {
    pub id: u64,
}

impl Pipeline for MockPipeline {}

// ============================================================================
// Mock command list
// ============================================================================

/// Command list pushing each recorded command into the device's shared log
pub struct MockCommandList {
    log: Arc<Mutex<Vec<String>>>,
}

fn texture_id(texture: &Arc<dyn Texture>) -> u64 {
    // Tests only ever hand mock textures to the mock device
    let mock = unsafe { &*(texture.as_ref() as *const dyn Texture as *const MockTexture) };
    mock.id
}

fn view_id(view: &Arc<dyn ShaderView>) -> u64 {
    let mock = unsafe { &*(view.as_ref() as *const dyn ShaderView as *const MockShaderView) };
    mock.texture_id
}

impl MockCommandList {
    fn push(&self, command: String) {
        self.log.lock().unwrap().push(command);
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        self.push("begin".to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.push("end".to_string());
        Ok(())
    }

    fn begin_target_pass(
        &mut self,
        color_targets: &[Arc<dyn Texture>],
        color_ops: &[ColorLoadOp],
        depth_target: Option<&Arc<dyn Texture>>,
        depth_op: DepthLoadOp,
    ) -> Result<()> {
        if color_targets.len() != color_ops.len() {
            engine_bail!("nova3d::mock",
                "begin_target_pass: {} color targets but {} load ops",
                color_targets.len(), color_ops.len());
        }
        let colors: Vec<String> = color_targets
            .iter()
            .zip(color_ops)
            .map(|(target, op)| match op {
                ColorLoadOp::Clear(c) => format!("{}:clear({:?})", texture_id(target), c),
                ColorLoadOp::Load => format!("{}:load", texture_id(target)),
            })
            .collect();
        let depth = match (depth_target, depth_op) {
            (Some(target), DepthLoadOp::Clear { .. }) => {
                format!(" depth={}:clear", texture_id(target))
            }
            (Some(target), DepthLoadOp::Load) => format!(" depth={}:load", texture_id(target)),
            (None, _) => String::new(),
        };
        self.push(format!("begin_target_pass colors=[{}]{}", colors.join(", "), depth));
        Ok(())
    }

    fn end_target_pass(&mut self) -> Result<()> {
        self.push("end_target_pass".to_string());
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.push(format!("set_viewport {}x{}", viewport.width, viewport.height));
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        let mock =
            unsafe { &*(pipeline.as_ref() as *const dyn Pipeline as *const MockPipeline) };
        self.push(format!("bind_pipeline id={}", mock.id));
        Ok(())
    }

    fn bind_shader_views(&mut self, views: &[Arc<dyn ShaderView>]) -> Result<()> {
        let ids: Vec<String> = views.iter().map(|v| view_id(v).to_string()).collect();
        self.push(format!("bind_shader_views [{}]", ids.join(", ")));
        Ok(())
    }

    fn push_constants(&mut self, data: &[u8]) -> Result<()> {
        self.push(format!("push_constants {}", data.len()));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()> {
        self.push(format!("bind_vertex_buffer size={} offset={}", buffer.size(), offset));
        Ok(())
    }

    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()> {
        self.push(format!(
            "bind_index_buffer size={} offset={} {:?}",
            buffer.size(),
            offset,
            index_type
        ));
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.push(format!("draw {} {}", vertex_count, first_vertex));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.push(format!("draw_indexed {} {} {}", index_count, first_index, vertex_offset));
        Ok(())
    }
}

// ============================================================================
// Mock swap chain
// ============================================================================

pub struct MockSwapChain {
    log: Arc<Mutex<Vec<String>>>,
    next_id: Arc<AtomicU64>,
    width: u32,
    height: u32,
    back_buffer: Arc<dyn Texture>,
}

impl MockSwapChain {
    fn make_back_buffer(next_id: &AtomicU64, width: u32, height: u32) -> Arc<dyn Texture> {
        Arc::new(MockTexture {
            id: next_id.fetch_add(1, Ordering::SeqCst),
            info: TextureInfo {
                width,
                height,
                format: TextureFormat::B8G8R8A8_UNORM,
                usage: TextureUsage::RenderTarget,
            },
        })
    }
}

impl SwapChain for MockSwapChain {
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.back_buffer = Self::make_back_buffer(&self.next_id, width, height);
        self.log
            .lock()
            .unwrap()
            .push(format!("swap_chain_resize {}x{}", width, height));
        Ok(())
    }

    fn back_buffer(&self) -> Result<Arc<dyn Texture>> {
        Ok(self.back_buffer.clone())
    }

    fn present(&mut self) -> Result<()> {
        self.log.lock().unwrap().push("present".to_string());
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn buffer_count(&self) -> u32 {
        SWAP_CHAIN_BUFFER_COUNT
    }
}

// ============================================================================
// Mock device
// ============================================================================

/// Mock device tracking every created resource and recorded command
pub struct MockDevice {
    /// Shared log of factory calls and commands, in order
    pub log: Arc<Mutex<Vec<String>>>,
    /// Next resource id
    pub next_id: Arc<AtomicU64>,
    /// Number of pipelines created
    pub pipeline_count: Arc<AtomicU32>,
    /// Number of swap chains created
    pub swap_chain_count: Arc<AtomicU32>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            pipeline_count: Arc::new(AtomicU32::new(0)),
            swap_chain_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Snapshot of the log
    pub fn commands(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }
}

impl GraphicsDevice for MockDevice {
    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!(
            "create_texture {}x{} {:?} {:?} id={}",
            desc.width, desc.height, desc.format, desc.usage, id
        ));
        Ok(Arc::new(MockTexture {
            id,
            info: TextureInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                usage: desc.usage,
            },
        }))
    }

    fn create_shader_view(&self, texture: &Arc<dyn Texture>) -> Result<Arc<dyn ShaderView>> {
        let info = texture.info();
        if !info.usage.is_sampled() {
            engine_bail!("nova3d::mock",
                "create_shader_view: texture usage {:?} is not shader-readable",
                info.usage);
        }
        let id = texture_id(texture);
        self.log
            .lock()
            .unwrap()
            .push(format!("create_shader_view tex={}", id));
        Ok(Arc::new(MockShaderView {
            texture_id: id,
            info: info.clone(),
        }))
    }

    fn create_buffer(&self, desc: &BufferDesc, data: &[u8]) -> Result<Arc<dyn Buffer>> {
        if data.len() as u64 != desc.size {
            engine_bail!("nova3d::mock",
                "create_buffer: {} bytes of data for a {} byte buffer",
                data.len(), desc.size);
        }
        self.log
            .lock()
            .unwrap()
            .push(format!("create_buffer {:?} size={}", desc.usage, desc.size));
        Ok(Arc::new(MockBuffer {
            size: desc.size,
            usage: desc.usage,
        }))
    }

    fn create_shader(&self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        // Paths ending in ".invalid" simulate a compile failure with
        // diagnostics, for error path tests
        if desc.path.ends_with(".invalid") {
            return Err(Error::ShaderCompilation {
                path: desc.path.clone(),
                diagnostics: "mock: not a valid shader module".to_string(),
            });
        }
        self.log.lock().unwrap().push(format!(
            "create_shader {:?} {} {}",
            desc.stage, desc.path, desc.entry_point
        ));
        Ok(Arc::new(MockShader {
            stage: desc.stage,
            entry_point: desc.entry_point.clone(),
            path: desc.path.clone(),
        }))
    }

    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.pipeline_count.fetch_add(1, Ordering::SeqCst);
        let blend = if desc.color_blend.blend_enable { "additive" } else { "opaque" };
        self.log.lock().unwrap().push(format!(
            "create_pipeline id={} targets={} blend={}",
            id,
            desc.color_formats.len(),
            blend
        ));
        Ok(Arc::new(MockPipeline { id }))
    }

    fn create_swap_chain(&self, width: u32, height: u32) -> Result<Box<dyn SwapChain>> {
        self.swap_chain_count.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap()
            .push(format!("create_swap_chain {}x{}", width, height));
        let back_buffer = MockSwapChain::make_back_buffer(&self.next_id, width, height);
        Ok(Box::new(MockSwapChain {
            log: self.log.clone(),
            next_id: self.next_id.clone(),
            width,
            height,
            back_buffer,
        }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList {
            log: self.log.clone(),
        }))
    }

    fn submit(&self, _cmd_list: &mut dyn CommandList) -> Result<()> {
        self.log.lock().unwrap().push("submit".to_string());
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
