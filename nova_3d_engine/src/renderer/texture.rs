/// Texture and shader view traits, texture descriptor, and texture info

/// Texture pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    D32_FLOAT,
}

impl TextureFormat {
    /// Returns true for depth formats
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D32_FLOAT)
    }
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as render target
    RenderTarget,
    /// Texture can be used for both
    SampledAndRenderTarget,
    /// Texture can be used as depth/stencil attachment
    DepthStencil,
}

impl TextureUsage {
    /// Returns true if the texture can be bound as a render output
    pub fn is_target(&self) -> bool {
        !matches!(self, TextureUsage::Sampled)
    }

    /// Returns true if the texture can be read back in a shader
    pub fn is_sampled(&self) -> bool {
        matches!(self, TextureUsage::Sampled | TextureUsage::SampledAndRenderTarget)
    }
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Optional initial data to upload at creation time
    pub data: Option<Vec<u8>>,
}

/// Read-only properties of a created texture.
///
/// Returned by `Texture::info()` to query texture properties
/// without exposing backend-specific details.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types (e.g., VulkanTexture).
/// The texture is automatically destroyed when dropped.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}

/// Shader-readable view over a texture
///
/// Created lazily via `GraphicsDevice::create_shader_view()` so a pass can
/// sample a previously rendered target. The view keeps the underlying
/// texture alive.
pub trait ShaderView: Send + Sync {
    /// Properties of the texture this view reads
    fn texture_info(&self) -> &TextureInfo;
}
