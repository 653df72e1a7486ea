/// RenderEngine - owns the device, swap chain, and pipeline frame buffers,
/// and drives the deferred shading passes in fixed order
///
/// Frame anatomy: G-buffer pass writes geometry/material attributes into
/// two color targets, the ambient and sun lighting passes accumulate into
/// one lighting buffer, and the gamma-correction pass resolves the lighting
/// buffer into the swap-chain back buffer before presenting.

use std::sync::Arc;

use glam::Vec3;

use crate::engine_bail;
use crate::error::Result;
use crate::render::camera::Camera;
use crate::render::effect::Effect;
use crate::render::frame_buffer::FrameBuffer;
use crate::render::light::{AmbientLight, DirectionalLight};
use crate::render::quad::Quad;
use crate::render::renderable::StaticMesh;
use crate::renderer::{GraphicsDevice, SwapChain, Viewport};

/// Name of the geometry/material pass
pub const PASS_GBUFFER: &str = "gbuffer";
/// Name of the ambient lighting pass
pub const PASS_AMBIENT: &str = "ambient";
/// Name of the directional sun lighting pass
pub const PASS_SUN: &str = "sun";
/// Name of the gamma-correction pass
pub const PASS_SRGB: &str = "srgb";

/// Number of color targets in the G-buffer
pub const G_BUFFER_TARGETS: u32 = 2;

const OPAQUE_BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const TRANSPARENT_BLACK: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// Deferred rendering orchestrator
///
/// `resize()` runs once inside `create()`; afterwards the window
/// collaborator invokes it on resize notifications, and `frame()` renders
/// and presents one frame. Renderable lifetime stays with the caller; the
/// engine only holds shared references in its draw list.
pub struct RenderEngine {
    device: Arc<dyn GraphicsDevice>,
    swap_chain: Option<Box<dyn SwapChain>>,
    g_buffer: Option<FrameBuffer>,
    lighting: Option<FrameBuffer>,
    present: Option<FrameBuffer>,
    effect: Effect,
    quad: Quad,
    camera: Camera,
    renderables: Vec<Arc<StaticMesh>>,
    ambient: AmbientLight,
    sun: DirectionalLight,
    width: u32,
    height: u32,
}

impl RenderEngine {
    /// Initialize the engine: load the shading effect, create the
    /// full-screen quad helper, and run the first resize (which creates the
    /// swap chain and the three frame buffers)
    ///
    /// Any failure aborts construction; a half-initialized engine is never
    /// returned.
    pub fn create(
        device: Arc<dyn GraphicsDevice>,
        width: u32,
        height: u32,
        effect_manifest: &str,
    ) -> Result<Self> {
        crate::engine_info!("nova3d::RenderEngine",
            "Creating engine {}x{} with effect '{}'", width, height, effect_manifest);

        let effect = Effect::load(&device, effect_manifest)?;
        let quad = Quad::create(&device)?;

        let mut engine = Self {
            device,
            swap_chain: None,
            g_buffer: None,
            lighting: None,
            present: None,
            effect,
            quad,
            camera: Camera::default(),
            renderables: Vec::new(),
            ambient: AmbientLight::default(),
            sun: DirectionalLight::default(),
            width: 0,
            height: 0,
        };
        engine.resize(width, height)?;
        Ok(engine)
    }

    /// (Re)allocate everything sized to the window client area, in
    /// dependency order
    ///
    /// The three frame buffers are released first (nothing is bound outside
    /// `frame()`, so the targets are free to go), then the swap chain is
    /// resized in place, or created on the first call. All three frame
    /// buffers are then rebuilt at the new size, never partially.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            engine_bail!("nova3d::RenderEngine",
                "resize: degenerate dimensions {}x{}", width, height);
        }

        // Release before the swap chain touches its buffers
        self.g_buffer = None;
        self.lighting = None;
        self.present = None;

        let swap_chain = match self.swap_chain.take() {
            Some(mut swap_chain) => {
                swap_chain.resize(width, height)?;
                swap_chain
            }
            None => self.device.create_swap_chain(width, height)?,
        };
        let back_buffer = swap_chain.back_buffer()?;
        self.swap_chain = Some(swap_chain);

        self.g_buffer = Some(FrameBuffer::create(
            self.device.clone(),
            width,
            height,
            G_BUFFER_TARGETS,
        )?);
        self.lighting = Some(FrameBuffer::create(self.device.clone(), width, height, 1)?);
        self.present = Some(FrameBuffer::create_from_back_buffer(
            self.device.clone(),
            back_buffer,
        )?);

        self.width = width;
        self.height = height;
        crate::engine_debug!("nova3d::RenderEngine", "Resized to {}x{}", width, height);
        Ok(())
    }

    /// Render and present one frame
    pub fn frame(&mut self) -> Result<()> {
        let Some(g_buffer) = self.g_buffer.as_mut() else {
            engine_bail!("nova3d::RenderEngine", "frame() called before resize()");
        };
        let Some(lighting) = self.lighting.as_mut() else {
            engine_bail!("nova3d::RenderEngine", "frame() called before resize()");
        };
        let Some(present) = self.present.as_mut() else {
            engine_bail!("nova3d::RenderEngine", "frame() called before resize()");
        };
        let Some(swap_chain) = self.swap_chain.as_mut() else {
            engine_bail!("nova3d::RenderEngine", "frame() called before resize()");
        };

        let viewport = Viewport::full(self.width, self.height);
        let mut cmd = self.device.create_command_list()?;
        cmd.begin()?;

        // 1. G-buffer pass: geometry and material attributes
        let pass_gbuffer = self.effect.pass(PASS_GBUFFER)?;
        g_buffer.bind(cmd.as_mut(), Some(OPAQUE_BLACK))?;
        cmd.set_viewport(viewport)?;
        self.camera.bind(&mut self.effect);
        for mesh in &self.renderables {
            mesh.render(&self.device, cmd.as_mut(), &mut self.effect, &pass_gbuffer)?;
        }
        cmd.end_target_pass()?;

        // The G-buffer is unbound now; its targets become pass inputs
        self.effect.set_texture("g_buffer_tex0", g_buffer.shader_view(0)?);
        self.effect.set_texture("g_buffer_tex1", g_buffer.shader_view(1)?);

        // 2. Ambient lighting pass: the only clear of the lighting buffer
        let pass_ambient = self.effect.pass(PASS_AMBIENT)?;
        lighting.bind(cmd.as_mut(), Some(TRANSPARENT_BLACK))?;
        cmd.set_viewport(viewport)?;
        Self::bind_light(
            &mut self.effect,
            &self.camera,
            self.ambient.direction,
            self.ambient.color,
            self.ambient.attrib,
        );
        self.quad.render(&self.device, cmd.as_mut(), &self.effect, &pass_ambient)?;
        cmd.end_target_pass()?;

        // 3. Sun pass accumulates into the same buffer, no clear between
        let pass_sun = self.effect.pass(PASS_SUN)?;
        lighting.bind(cmd.as_mut(), None)?;
        cmd.set_viewport(viewport)?;
        Self::bind_light(
            &mut self.effect,
            &self.camera,
            self.camera.view_direction(),
            self.sun.color,
            self.sun.attrib,
        );
        self.quad.render(&self.device, cmd.as_mut(), &self.effect, &pass_sun)?;
        cmd.end_target_pass()?;

        // 4. Gamma correction into the back buffer
        let pass_srgb = self.effect.pass(PASS_SRGB)?;
        self.effect.set_texture("g_pp_tex", lighting.shader_view(0)?);
        present.bind(cmd.as_mut(), Some(OPAQUE_BLACK))?;
        cmd.set_viewport(viewport)?;
        self.quad.render(&self.device, cmd.as_mut(), &self.effect, &pass_srgb)?;
        cmd.end_target_pass()?;

        cmd.end()?;
        self.device.submit(cmd.as_mut())?;

        // 5. Present with no vsync wait
        swap_chain.present()
    }

    /// Transform a world-space light direction into eye space and bind the
    /// light constants
    fn bind_light(
        effect: &mut Effect,
        camera: &Camera,
        direction: Vec3,
        color: glam::Vec4,
        attrib: glam::Vec4,
    ) {
        let dir_es = camera.view.transform_vector3(direction).normalize_or_zero();
        effect.set_vec3("g_light_dir_es", dir_es);
        effect.set_vec4("g_light_color", color);
        effect.set_vec4("g_light_attrib", attrib);
    }

    /// Add a renderable to the draw list; the caller keeps ownership
    pub fn add_renderable(&mut self, mesh: Arc<StaticMesh>) {
        self.renderables.push(mesh);
    }

    /// The active camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the active camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The ambient light
    pub fn ambient_light_mut(&mut self) -> &mut AmbientLight {
        &mut self.ambient
    }

    /// The sun light
    pub fn sun_light_mut(&mut self) -> &mut DirectionalLight {
        &mut self.sun
    }

    /// The effect's variable table, for caller-driven constants
    pub fn effect_mut(&mut self) -> &mut Effect {
        &mut self.effect
    }

    /// Current G-buffer frame buffer
    pub fn g_buffer(&self) -> Option<&FrameBuffer> {
        self.g_buffer.as_ref()
    }

    /// Current lighting frame buffer
    pub fn lighting_buffer(&self) -> Option<&FrameBuffer> {
        self.lighting.as_ref()
    }

    /// Current present frame buffer (wraps the swap-chain back buffer)
    pub fn present_buffer(&self) -> Option<&FrameBuffer> {
        self.present.as_ref()
    }

    /// The swap chain, once the first resize has run
    pub fn swap_chain(&self) -> Option<&dyn SwapChain> {
        self.swap_chain.as_deref()
    }

    /// Current client width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current client height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Release every GPU resource the engine owns, in dependency order
    ///
    /// Runs automatically on drop; safe to call more than once.
    pub fn destroy(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            crate::engine_warn!("nova3d::RenderEngine",
                "wait_idle failed during destroy: {}", e);
        }
        self.renderables.clear();
        self.g_buffer = None;
        self.lighting = None;
        self.present = None;
        if self.swap_chain.take().is_some() {
            crate::engine_info!("nova3d::RenderEngine", "Engine destroyed");
        }
    }
}

impl Drop for RenderEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "render_engine_tests.rs"]
mod tests;
