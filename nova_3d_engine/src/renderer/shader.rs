/// Shader trait, shader descriptor, and shader stage flags

use bitflags::bitflags;

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment (pixel) shader
    Fragment,
}

bitflags! {
    /// Set of shader stages, used for push constant visibility
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0b01;
        const FRAGMENT = 0b10;
    }
}

impl From<ShaderStage> for ShaderStageFlags {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => ShaderStageFlags::FRAGMENT,
        }
    }
}

/// Descriptor for loading a compiled shader stage
///
/// The path points at a SPIR-V binary produced by the external shader
/// compiler collaborator. Load or validation failures surface as
/// `Error::ShaderCompilation` carrying the collaborator's diagnostics.
#[derive(Debug, Clone)]
pub struct ShaderDesc {
    /// Path of the compiled shader file
    pub path: String,
    /// Entry point name
    pub entry_point: String,
    /// Stage this shader runs at
    pub stage: ShaderStage,
}

/// Shader module trait
///
/// Implemented by backend-specific shader types (e.g., VulkanShader).
pub trait Shader: Send + Sync {
    /// Stage this shader runs at
    fn stage(&self) -> ShaderStage;

    /// Entry point name
    fn entry_point(&self) -> &str;
}
