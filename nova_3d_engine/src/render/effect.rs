/// Effect - the compiled shading techniques and their named passes
///
/// An effect is loaded from a small text manifest naming each shading pass
/// with its shader stages, fixed-function state, target signature, and the
/// constants/textures the pass reads. The engine selects passes by name and
/// drives renderables and full-screen quads through them.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::engine_bail;
use crate::error::{Error, Result};
use crate::renderer::{
    ColorBlendState, CommandList, CullMode, DepthStencilState, GraphicsDevice,
    Pipeline, PrimitiveTopology, RasterizationState, Shader, ShaderDesc,
    ShaderStage, ShaderStageFlags, ShaderView, TextureFormat,
};

/// Identity of a shading pass, stable for the lifetime of the effect
///
/// Renderables key their pipeline caches by this: two renders through the
/// same pass share one pipeline, a previously-unseen pass triggers one
/// pipeline creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassId(u64);

static NEXT_PASS_ID: AtomicU64 = AtomicU64::new(1);

impl PassId {
    fn next() -> Self {
        PassId(NEXT_PASS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Declared type of a pass constant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Mat4,
    Vec4,
    Vec3,
    Float,
    Uint,
}

impl ParamType {
    /// Size in bytes of the 16-byte-aligned slot this type occupies in the
    /// serialized constant block
    pub fn slot_size(&self) -> usize {
        match self {
            ParamType::Mat4 => 64,
            _ => 16,
        }
    }

    fn parse(word: &str) -> Option<Self> {
        match word {
            "mat4" => Some(ParamType::Mat4),
            "vec4" => Some(ParamType::Vec4),
            "vec3" => Some(ParamType::Vec3),
            "float" => Some(ParamType::Float),
            "uint" => Some(ParamType::Uint),
            _ => None,
        }
    }
}

/// Value bound to an effect variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Mat4(Mat4),
    Vec4(Vec4),
    Vec3(Vec3),
    Float(f32),
    Uint(u32),
}

impl ParamValue {
    fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Mat4(_) => ParamType::Mat4,
            ParamValue::Vec4(_) => ParamType::Vec4,
            ParamValue::Vec3(_) => ParamType::Vec3,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Uint(_) => ParamType::Uint,
        }
    }

    /// Write the value into the start of `slot`, leaving the rest zeroed
    fn write_into(&self, slot: &mut [u8]) {
        match self {
            ParamValue::Mat4(m) => slot[..64].copy_from_slice(bytemuck::bytes_of(m)),
            ParamValue::Vec4(v) => slot[..16].copy_from_slice(bytemuck::bytes_of(v)),
            ParamValue::Vec3(v) => slot[..12].copy_from_slice(bytemuck::bytes_of(v)),
            ParamValue::Float(f) => slot[..4].copy_from_slice(&f.to_le_bytes()),
            ParamValue::Uint(u) => slot[..4].copy_from_slice(&u.to_le_bytes()),
        }
    }
}

/// Declared constant of a pass: name + type, in block order
#[derive(Debug, Clone)]
pub struct PassConstant {
    pub name: String,
    pub param_type: ParamType,
}

/// One named shading pass: shaders + fixed-function state + declared inputs
pub struct ShadingPass {
    /// Unique pass identity, the pipeline cache key
    pub id: PassId,
    /// Pass name as declared in the manifest
    pub name: String,
    /// Vertex shader
    pub vertex_shader: Arc<dyn Shader>,
    /// Fragment shader
    pub fragment_shader: Arc<dyn Shader>,
    /// Primitive topology
    pub topology: PrimitiveTopology,
    /// Rasterization state
    pub rasterization: RasterizationState,
    /// Depth testing state
    pub depth_stencil: DepthStencilState,
    /// Color blending state
    pub color_blend: ColorBlendState,
    /// Formats of the color targets this pass renders into
    pub color_formats: Vec<TextureFormat>,
    /// Format of the depth target
    pub depth_format: Option<TextureFormat>,
    /// Constants the pass reads, in constant block order
    pub constants: Vec<PassConstant>,
    /// Texture slot names the pass samples, in slot order
    pub textures: Vec<String>,
}

impl ShadingPass {
    /// Size in bytes of the serialized constant block
    pub fn constant_block_size(&self) -> u32 {
        self.constants.iter().map(|c| c.param_type.slot_size() as u32).sum()
    }

    /// Stages the constant block is visible to, the union of the pass's
    /// shader stages
    pub fn constant_stages(&self) -> ShaderStageFlags {
        ShaderStageFlags::from(self.vertex_shader.stage())
            | ShaderStageFlags::from(self.fragment_shader.stage())
    }
}

/// The compiled effect: named passes plus the variable/texture tables
///
/// Variables are set by name (camera transforms, light attributes, material
/// constants) and serialized per pass into the pass's declared constant
/// block when the pass is applied. Setting a name no pass declares is legal;
/// it simply never reaches a shader.
pub struct Effect {
    passes: FxHashMap<String, Arc<ShadingPass>>,
    values: FxHashMap<String, ParamValue>,
    textures: FxHashMap<String, Arc<dyn ShaderView>>,
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("passes", &self.passes.keys().collect::<Vec<_>>())
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .field("textures", &self.textures.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Effect {
    /// Load an effect from a manifest file
    ///
    /// Shader paths in the manifest are resolved relative to the manifest's
    /// directory.
    pub fn load(device: &Arc<dyn GraphicsDevice>, manifest_path: &str) -> Result<Self> {
        let source = std::fs::read_to_string(manifest_path).map_err(|e| {
            crate::engine_error!("nova3d::Effect",
                "Failed to read effect manifest '{}': {}", manifest_path, e);
            Error::InvalidResource(format!(
                "Failed to read effect manifest '{}': {}",
                manifest_path, e
            ))
        })?;
        let base_dir = Path::new(manifest_path)
            .parent()
            .unwrap_or_else(|| Path::new(""));
        let effect = Self::from_source(device, &source, base_dir)?;
        crate::engine_info!("nova3d::Effect",
            "Loaded effect '{}' with {} passes", manifest_path, effect.passes.len());
        Ok(effect)
    }

    /// Parse an effect manifest from a string
    pub fn from_source(
        device: &Arc<dyn GraphicsDevice>,
        source: &str,
        base_dir: &Path,
    ) -> Result<Self> {
        let mut passes: FxHashMap<String, Arc<ShadingPass>> = FxHashMap::default();
        let mut current: Option<PassBuilder> = None;

        for (line_index, raw_line) in source.lines().enumerate() {
            let line_number = line_index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let words: Vec<&str> = line.split_whitespace().collect();

            if words[0] == "pass" {
                if current.is_some() {
                    engine_bail!("nova3d::Effect",
                        "manifest line {}: 'pass' inside an open pass block", line_number);
                }
                if words.len() != 2 {
                    engine_bail!("nova3d::Effect",
                        "manifest line {}: expected 'pass <name>'", line_number);
                }
                if passes.contains_key(words[1]) {
                    engine_bail!("nova3d::Effect",
                        "manifest line {}: duplicate pass '{}'", line_number, words[1]);
                }
                current = Some(PassBuilder::new(words[1]));
            } else if words[0] == "end" {
                match current.take() {
                    Some(builder) => {
                        let pass = builder.build(device, base_dir, line_number)?;
                        passes.insert(pass.name.clone(), Arc::new(pass));
                    }
                    None => {
                        engine_bail!("nova3d::Effect",
                            "manifest line {}: 'end' outside a pass block", line_number);
                    }
                }
            } else if let Some(builder) = current.as_mut() {
                builder.line(&words, line_number)?;
            } else {
                engine_bail!("nova3d::Effect",
                    "manifest line {}: unexpected '{}' outside a pass block",
                    line_number, words[0]);
            }
        }

        if let Some(builder) = current {
            engine_bail!("nova3d::Effect",
                "manifest: pass '{}' is missing its 'end'", builder.name);
        }
        if passes.is_empty() {
            engine_bail!("nova3d::Effect", "manifest declares no passes");
        }

        Ok(Self {
            passes,
            values: FxHashMap::default(),
            textures: FxHashMap::default(),
        })
    }

    /// Look up a shading pass by name
    pub fn pass(&self, name: &str) -> Result<Arc<ShadingPass>> {
        match self.passes.get(name) {
            Some(pass) => Ok(pass.clone()),
            None => {
                engine_bail!("nova3d::Effect", "unknown shading pass '{}'", name);
            }
        }
    }

    /// Number of passes in the effect
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    // ===== VARIABLE TABLE =====

    pub fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.values.insert(name.to_string(), ParamValue::Mat4(value));
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.values.insert(name.to_string(), ParamValue::Vec4(value));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.values.insert(name.to_string(), ParamValue::Vec3(value));
    }

    pub fn set_f32(&mut self, name: &str, value: f32) {
        self.values.insert(name.to_string(), ParamValue::Float(value));
    }

    pub fn set_u32(&mut self, name: &str, value: u32) {
        self.values.insert(name.to_string(), ParamValue::Uint(value));
    }

    /// Bind a shader view to a named texture slot
    pub fn set_texture(&mut self, name: &str, view: Arc<dyn ShaderView>) {
        self.textures.insert(name.to_string(), view);
    }

    /// Current value of a variable, if set
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Serialize the pass's declared constants from the variable table into
    /// a 16-byte-aligned block
    ///
    /// Unset variables leave their slot zeroed; a set variable whose type
    /// differs from the declaration is a contract violation.
    pub fn serialize_constants(&self, pass: &ShadingPass) -> Result<Vec<u8>> {
        let mut block = vec![0u8; pass.constant_block_size() as usize];
        let mut offset = 0usize;
        for constant in &pass.constants {
            let slot_size = constant.param_type.slot_size();
            match self.values.get(&constant.name) {
                Some(value) if value.param_type() == constant.param_type => {
                    value.write_into(&mut block[offset..offset + slot_size]);
                }
                Some(value) => {
                    engine_bail!("nova3d::Effect",
                        "variable '{}' set as {:?} but pass '{}' declares {:?}",
                        constant.name, value.param_type(), pass.name, constant.param_type);
                }
                None => {
                    crate::engine_trace!("nova3d::Effect",
                        "variable '{}' unset for pass '{}', slot zeroed",
                        constant.name, pass.name);
                }
            }
            offset += slot_size;
        }
        Ok(block)
    }

    /// Apply a pass to the command list: bind the pipeline, push the
    /// serialized constant block, and bind the declared texture slots
    ///
    /// The pipeline must be the one the caller created (and cached) for this
    /// pass and its own vertex layout.
    pub fn apply_pass(
        &self,
        cmd: &mut dyn CommandList,
        pass: &ShadingPass,
        pipeline: &Arc<dyn Pipeline>,
    ) -> Result<()> {
        cmd.bind_pipeline(pipeline)?;

        if !pass.constants.is_empty() {
            let block = self.serialize_constants(pass)?;
            cmd.push_constants(&block)?;
        }

        if !pass.textures.is_empty() {
            let mut views = Vec::with_capacity(pass.textures.len());
            for name in &pass.textures {
                match self.textures.get(name) {
                    Some(view) => views.push(view.clone()),
                    None => {
                        engine_bail!("nova3d::Effect",
                            "texture '{}' not bound for pass '{}'", name, pass.name);
                    }
                }
            }
            cmd.bind_shader_views(&views)?;
        }

        Ok(())
    }
}

// ===== MANIFEST PASS BUILDER =====

struct PassBuilder {
    name: String,
    vertex_shader: Option<(String, String)>,
    fragment_shader: Option<(String, String)>,
    rasterization: RasterizationState,
    depth_stencil: DepthStencilState,
    color_blend: ColorBlendState,
    color_formats: Option<Vec<TextureFormat>>,
    constants: Vec<PassConstant>,
    textures: Vec<String>,
}

impl PassBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vertex_shader: None,
            fragment_shader: None,
            rasterization: RasterizationState::default(),
            depth_stencil: DepthStencilState::enabled(),
            color_blend: ColorBlendState::opaque(),
            color_formats: None,
            constants: Vec::new(),
            textures: Vec::new(),
        }
    }

    fn line(&mut self, words: &[&str], line_number: usize) -> Result<()> {
        match words {
            ["vs", path, entry] => {
                self.vertex_shader = Some((path.to_string(), entry.to_string()));
            }
            ["fs", path, entry] => {
                self.fragment_shader = Some((path.to_string(), entry.to_string()));
            }
            ["depth", mode] => {
                self.depth_stencil = match *mode {
                    "on" => DepthStencilState::enabled(),
                    "off" => DepthStencilState::disabled(),
                    "read" => DepthStencilState::read_only(),
                    other => {
                        engine_bail!("nova3d::Effect",
                            "manifest line {}: unknown depth mode '{}'", line_number, other);
                    }
                };
            }
            ["blend", mode] => {
                self.color_blend = match *mode {
                    "opaque" => ColorBlendState::opaque(),
                    "additive" => ColorBlendState::additive(),
                    other => {
                        engine_bail!("nova3d::Effect",
                            "manifest line {}: unknown blend mode '{}'", line_number, other);
                    }
                };
            }
            ["cull", mode] => {
                self.rasterization.cull_mode = match *mode {
                    "back" => CullMode::Back,
                    "front" => CullMode::Front,
                    "none" => CullMode::None,
                    other => {
                        engine_bail!("nova3d::Effect",
                            "manifest line {}: unknown cull mode '{}'", line_number, other);
                    }
                };
            }
            ["targets", "present"] => {
                self.color_formats = Some(vec![TextureFormat::B8G8R8A8_UNORM]);
            }
            ["targets", count] => {
                let count: u32 = count.parse().map_err(|_| {
                    Error::InvalidResource(format!(
                        "manifest line {}: invalid target count '{}'",
                        line_number, count
                    ))
                })?;
                if count == 0 {
                    engine_bail!("nova3d::Effect",
                        "manifest line {}: pass needs at least one target", line_number);
                }
                self.color_formats =
                    Some(vec![super::frame_buffer::COLOR_TARGET_FORMAT; count as usize]);
            }
            ["constant", type_word, name] => {
                let param_type = match ParamType::parse(type_word) {
                    Some(t) => t,
                    None => {
                        engine_bail!("nova3d::Effect",
                            "manifest line {}: unknown constant type '{}'",
                            line_number, type_word);
                    }
                };
                self.constants.push(PassConstant {
                    name: name.to_string(),
                    param_type,
                });
            }
            ["texture", name] => {
                self.textures.push(name.to_string());
            }
            _ => {
                engine_bail!("nova3d::Effect",
                    "manifest line {}: unrecognized directive '{}'",
                    line_number, words.join(" "));
            }
        }
        Ok(())
    }

    fn build(
        self,
        device: &Arc<dyn GraphicsDevice>,
        base_dir: &Path,
        line_number: usize,
    ) -> Result<ShadingPass> {
        let (vs_path, vs_entry) = match self.vertex_shader {
            Some(vs) => vs,
            None => {
                engine_bail!("nova3d::Effect",
                    "manifest line {}: pass '{}' declares no vertex shader",
                    line_number, self.name);
            }
        };
        let (fs_path, fs_entry) = match self.fragment_shader {
            Some(fs) => fs,
            None => {
                engine_bail!("nova3d::Effect",
                    "manifest line {}: pass '{}' declares no fragment shader",
                    line_number, self.name);
            }
        };
        let color_formats = match self.color_formats {
            Some(formats) => formats,
            None => {
                engine_bail!("nova3d::Effect",
                    "manifest line {}: pass '{}' declares no targets",
                    line_number, self.name);
            }
        };

        let vertex_shader = device.create_shader(&ShaderDesc {
            path: base_dir.join(&vs_path).to_string_lossy().into_owned(),
            entry_point: vs_entry,
            stage: ShaderStage::Vertex,
        })?;
        let fragment_shader = device.create_shader(&ShaderDesc {
            path: base_dir.join(&fs_path).to_string_lossy().into_owned(),
            entry_point: fs_entry,
            stage: ShaderStage::Fragment,
        })?;

        Ok(ShadingPass {
            id: PassId::next(),
            name: self.name,
            vertex_shader,
            fragment_shader,
            topology: PrimitiveTopology::TriangleList,
            rasterization: self.rasterization,
            depth_stencil: self.depth_stencil,
            color_blend: self.color_blend,
            color_formats,
            depth_format: Some(super::frame_buffer::DEPTH_TARGET_FORMAT),
            constants: self.constants,
            textures: self.textures,
        })
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
